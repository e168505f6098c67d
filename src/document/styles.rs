//! Style catalog: styles, font table and theme fonts available to a document
//!
//! The catalog is read once when a document is loaded and is not written
//! back; the parts it comes from are passed through untouched.

use crate::error::{Error, Result};
use crate::xml::{self, get_attr, get_w_attr, get_w_val};
use quick_xml::events::Event;

/// Kind of a style definition (w:style/@w:type)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "paragraph" => Some(StyleType::Paragraph),
            "character" => Some(StyleType::Character),
            "table" => Some(StyleType::Table),
            "numbering" => Some(StyleType::Numbering),
            _ => None,
        }
    }
}

/// One style definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Style {
    /// Style id, the value elements refer to
    pub id: String,
    /// Display name (w:name), if any
    pub name: Option<String>,
    pub style_type: StyleType,
    /// Default style for its type
    pub is_default: bool,
}

/// Read-only view of the styles, table fonts and theme fonts of a document
#[derive(Clone, Debug, Default)]
pub struct StyleCatalog {
    styles: Vec<Style>,
    table_fonts: Vec<String>,
    theme_fonts: Vec<String>,
}

impl StyleCatalog {
    /// Build the catalog from the styles, font table and theme parts; a
    /// missing part contributes nothing
    pub fn from_parts(
        styles: Option<&str>,
        font_table: Option<&str>,
        theme: Option<&str>,
    ) -> Result<Self> {
        Ok(StyleCatalog {
            styles: styles.map(parse_styles).transpose()?.unwrap_or_default(),
            table_fonts: font_table.map(parse_font_table).transpose()?.unwrap_or_default(),
            theme_fonts: theme.map(parse_theme_fonts).transpose()?.unwrap_or_default(),
        })
    }

    /// All style definitions in document order
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Ids of paragraph styles in document order
    pub fn paragraph_styles(&self) -> Vec<&str> {
        self.ids_of(StyleType::Paragraph)
    }

    /// Ids of table styles in document order
    pub fn table_styles(&self) -> Vec<&str> {
        self.ids_of(StyleType::Table)
    }

    /// Font families declared in the font table
    pub fn table_fonts(&self) -> &[String] {
        &self.table_fonts
    }

    /// Theme fonts, major (headings) before minor (body)
    pub fn theme_fonts(&self) -> &[String] {
        &self.theme_fonts
    }

    /// Display name of the style with `id`
    pub fn style_name(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.name.as_deref())
    }

    pub fn has_paragraph_style(&self, id: &str) -> bool {
        self.has(StyleType::Paragraph, id)
    }

    pub fn has_table_style(&self, id: &str) -> bool {
        self.has(StyleType::Table, id)
    }

    fn has(&self, style_type: StyleType, id: &str) -> bool {
        self.styles
            .iter()
            .any(|s| s.style_type == style_type && s.id == id)
    }

    fn ids_of(&self, style_type: StyleType) -> Vec<&str> {
        self.styles
            .iter()
            .filter(|s| s.style_type == style_type)
            .map(|s| s.id.as_str())
            .collect()
    }
}

fn parse_styles(content: &str) -> Result<Vec<Style>> {
    let mut reader = xml::part_reader(content);
    let mut styles = Vec::new();
    let mut current: Option<Style> = None;
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"styles" => seen_root = true,
                b"style" => {
                    current = get_w_attr(&e, "type")
                        .as_deref()
                        .and_then(StyleType::parse)
                        .map(|style_type| Style {
                            id: get_w_attr(&e, "styleId").unwrap_or_default(),
                            name: None,
                            style_type,
                            is_default: matches!(
                                get_w_attr(&e, "default").as_deref(),
                                Some("1" | "true" | "on")
                            ),
                        });
                }
                // properties of a style hold no nested w:name
                b"pPr" | b"rPr" | b"tblPr" | b"trPr" | b"tcPr" | b"tblStylePr" => {
                    xml::skip_element(&mut reader, &e)?;
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"styles" => seen_root = true,
                b"name" => {
                    if let Some(style) = current.as_mut() {
                        style.name = get_w_val(&e);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"style" => {
                styles.extend(current.take());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::UnsupportedSchema(
            "styles part has no w:styles root".into(),
        ));
    }
    Ok(styles)
}

fn parse_font_table(content: &str) -> Result<Vec<String>> {
    let mut reader = xml::part_reader(content);
    let mut fonts = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"font" => {
                if let Some(name) = get_w_attr(&e, "name") {
                    fonts.push(name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fonts)
}

fn parse_theme_fonts(content: &str) -> Result<Vec<String>> {
    let mut reader = xml::part_reader(content);
    let mut major = None;
    let mut minor = None;
    let mut in_major_font = false;
    let mut in_minor_font = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"majorFont" => in_major_font = true,
                b"minorFont" => in_minor_font = true,
                b"latin" => {
                    let font = get_attr(&e, "typeface").filter(|f| !f.is_empty());
                    if in_major_font && major.is_none() {
                        major = font;
                    } else if in_minor_font && minor.is_none() {
                        minor = font;
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"majorFont" => in_major_font = false,
                b"minorFont" => in_minor_font = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(major.into_iter().chain(minor).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::template;

    fn default_catalog() -> StyleCatalog {
        StyleCatalog::from_parts(
            Some(template::STYLES_XML),
            Some(template::FONT_TABLE_XML),
            Some(template::THEME_XML),
        )
        .unwrap()
    }

    #[test]
    fn test_default_template_catalog() {
        let catalog = default_catalog();

        let paragraph = catalog.paragraph_styles();
        assert_eq!(paragraph[0], "Normal");
        assert!(paragraph.contains(&"Heading1"));
        assert!(paragraph.contains(&"ListParagraph"));
        assert!(!paragraph.contains(&"TableGrid"));

        assert_eq!(
            catalog.table_styles(),
            vec!["TableNormal", "TableGrid", "LightShading", "LightList", "MediumShading1"]
        );
        assert!(catalog.table_fonts().iter().any(|f| f == "Times New Roman"));
        assert_eq!(catalog.theme_fonts(), ["Calibri Light", "Calibri"]);
    }

    #[test]
    fn test_lookup() {
        let catalog = default_catalog();
        assert_eq!(catalog.style_name("Heading1"), Some("heading 1"));
        assert!(catalog.has_paragraph_style("Quote"));
        assert!(!catalog.has_paragraph_style("TableGrid"));
        assert!(catalog.has_table_style("TableGrid"));
        assert_eq!(catalog.style_name("Missing"), None);
        assert!(catalog.styles()[0].is_default);
    }

    #[test]
    fn test_missing_parts_are_empty() {
        let catalog = StyleCatalog::from_parts(None, None, None).unwrap();
        assert!(catalog.paragraph_styles().is_empty());
        assert!(catalog.table_fonts().is_empty());
        assert!(catalog.theme_fonts().is_empty());
    }

    #[test]
    fn test_styles_without_root_rejected() {
        let err = StyleCatalog::from_parts(Some("<w:document/>"), None, None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedSchema);
    }
}
