//! Table cell elements (w:tc, w:tcPr)

use crate::document::Paragraph;
use crate::error::Result;
use crate::xml::{self, get_w_attr, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Child order of w:tcPr
const TCPR_ORDER: &[&str] = &[
    "cnfStyle", "tcW", "gridSpan", "hMerge", "vMerge", "tcBorders", "shd", "noWrap", "tcMar",
    "textDirection", "tcFitText", "vAlign", "hideMark", "cellIns", "cellDel", "cellMerge",
    "tcPrChange",
];

/// Table cell (w:tc)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    /// Cell properties
    pub properties: TableCellProperties,
    /// Paragraphs interleaved with preserved content (nested tables etc.)
    content: Vec<CellContent>,
}

/// Block content of a cell
#[derive(Clone, Debug, PartialEq)]
enum CellContent {
    Paragraph(Paragraph),
    Unknown(RawXmlNode),
}

/// Table cell properties
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCellProperties {
    /// Cell width in twips
    pub width: Option<u32>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl TableCell {
    /// Create a cell holding one empty paragraph
    pub fn new() -> Self {
        TableCell {
            content: vec![CellContent::Paragraph(Paragraph::new())],
            ..Default::default()
        }
    }

    /// Set the cell text
    ///
    /// The first paragraph keeps its formatting and takes the text; any
    /// further paragraphs are dropped.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut seen = false;
        self.content.retain(|c| match c {
            CellContent::Paragraph(_) if seen => false,
            CellContent::Paragraph(_) => {
                seen = true;
                true
            }
            CellContent::Unknown(_) => true,
        });
        if let Some(para) = self.paragraphs_mut().next() {
            para.set_text(text);
            return;
        }
        self.content
            .push(CellContent::Paragraph(Paragraph::with_text(text)));
    }

    /// Append a paragraph after the existing content
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.content.push(CellContent::Paragraph(para));
    }

    /// Set cell width (in twips)
    pub fn set_width(&mut self, width: u32) {
        self.properties.width = Some(width);
    }

    /// Get cell width in twips
    pub fn width(&self) -> Option<u32> {
        self.properties.width
    }

    /// Parse from reader (after w:tc start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut cell = TableCell::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"tcPr" => cell.properties = TableCellProperties::from_reader(reader)?,
                    b"p" => cell
                        .content
                        .push(CellContent::Paragraph(Paragraph::from_reader(reader, &e)?)),
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        cell.content.push(CellContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"p" => cell
                        .content
                        .push(CellContent::Paragraph(Paragraph::from_empty(&e))),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        cell.content.push(CellContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"tc" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(cell)
    }

    /// Get cell text (all paragraphs, newline separated)
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|c| match c {
            CellContent::Paragraph(p) => Some(p),
            CellContent::Unknown(_) => None,
        })
    }

    /// Get mutable paragraphs iterator
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|c| match c {
            CellContent::Paragraph(p) => Some(p),
            CellContent::Unknown(_) => None,
        })
    }

    /// Get paragraph at index
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs().nth(index)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tc")))?;

        self.properties.write_to(writer)?;

        let mut has_paragraph = false;
        for item in &self.content {
            match item {
                CellContent::Paragraph(para) => {
                    has_paragraph = true;
                    para.write_to(writer)?;
                }
                CellContent::Unknown(node) => node.write_to(writer)?,
            }
        }

        // A cell must hold at least one paragraph
        if !has_paragraph {
            writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
        Ok(())
    }
}

impl TableCellProperties {
    /// Parse from reader (after w:tcPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = TableCellProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    props.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => {
                    let width = (e.local_name().as_ref() == b"tcW"
                        && get_w_attr(&e, "type").as_deref() == Some("dxa"))
                    .then(|| get_w_attr(&e, "w").and_then(|v| v.parse().ok()))
                    .flatten();
                    match width {
                        Some(w) => props.width = Some(w),
                        None => {
                            let raw = RawXmlElement::from_empty(&e);
                            props.unknown_children.push(RawXmlNode::Element(raw));
                        }
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"tcPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Whether nothing would be written
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.unknown_children.is_empty()
    }

    /// Write to XML writer, children in schema order
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let mut children = Vec::new();
        if let Some(width) = self.width {
            children.push(RawXmlNode::Element(
                RawXmlElement::new("w:tcW")
                    .with_attr("w:w", width.to_string())
                    .with_attr("w:type", "dxa")
                    .empty(),
            ));
        }
        children.extend(self.unknown_children.iter().cloned());
        xml::write_ordered(writer, "w:tcPr", children, TCPR_ORDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> TableCell {
        let mut reader = crate::xml::part_reader(xml);
        let mut buf = Vec::new();
        loop {
            if let Event::Start(e) = reader.read_event_into(&mut buf).unwrap() {
                return TableCell::from_reader(&mut reader, &e.into_owned()).unwrap();
            }
            buf.clear();
        }
    }

    fn write(cell: &TableCell) -> String {
        let mut writer = Writer::new(Vec::new());
        cell.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_new_cell_has_one_empty_paragraph() {
        let cell = TableCell::new();
        assert_eq!(cell.paragraphs().count(), 1);
        assert_eq!(cell.text(), "");
        assert_eq!(cell.width(), None);
    }

    #[test]
    fn test_set_text_keeps_first_paragraph_only() {
        let mut cell = TableCell::new();
        cell.add_paragraph(Paragraph::with_text("second"));
        cell.set_text("X");
        assert_eq!(cell.paragraphs().count(), 1);
        assert_eq!(cell.text(), "X");
    }

    #[test]
    fn test_set_text_without_paragraph_adds_one() {
        let mut cell = parse(r#"<w:tc><w:tbl/></w:tc>"#);
        assert_eq!(cell.paragraphs().count(), 0);

        cell.set_text("X");
        assert_eq!(cell.paragraphs().count(), 1);
        assert_eq!(cell.text(), "X");
        assert!(write(&cell).starts_with("<w:tc><w:tbl/><w:p>"));
    }

    #[test]
    fn test_width_written_as_dxa() {
        let mut cell = TableCell::new();
        cell.set_width(3120);
        assert_eq!(
            write(&cell),
            r#"<w:tc><w:tcPr><w:tcW w:w="3120" w:type="dxa"/></w:tcPr><w:p/></w:tc>"#
        );
    }

    #[test]
    fn test_nested_content_keeps_position() {
        let xml = r#"<w:tc><w:tcPr><w:vAlign w:val="center"/><w:tcW w:w="100" w:type="dxa"/></w:tcPr><w:p/><w:tbl/><w:p/></w:tc>"#;
        let cell = parse(xml);
        assert_eq!(cell.width(), Some(100));
        assert_eq!(cell.paragraphs().count(), 2);
        assert_eq!(
            write(&cell),
            r#"<w:tc><w:tcPr><w:tcW w:w="100" w:type="dxa"/><w:vAlign w:val="center"/></w:tcPr><w:p/><w:tbl/><w:p/></w:tc>"#
        );
    }

    #[test]
    fn test_percent_width_preserved_raw() {
        let cell = parse(r#"<w:tc><w:tcPr><w:tcW w:w="2500" w:type="pct"/></w:tcPr><w:p/></w:tc>"#);
        assert_eq!(cell.width(), None);
        assert_eq!(cell.properties.unknown_children.len(), 1);
    }
}
