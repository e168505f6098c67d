//! Relationships handling for OPC packages
//!
//! Parses and generates `.rels` files

use crate::error::{Error, Result};
use crate::xml::PR;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Ordered collection of relationships
///
/// As with content types, an unmodified collection is written back
/// byte-for-byte.
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
    source: Option<String>,
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target (part within the package)
    #[default]
    Internal,
    /// External target (hyperlink, etc.)
    External,
}

impl Relationships {
    /// Create empty relationships
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        rels.items.push(parse_relationship(&e)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        rels.source = Some(xml.to_string());
        Ok(rels)
    }

    /// Serialize to XML bytes
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        if let Some(source) = &self.source {
            writer.write_all(source.as_bytes())?;
            return Ok(());
        }

        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut rels_elem = BytesStart::new("Relationships");
        rels_elem.push_attribute(("xmlns", PR));
        xml.write_event(Event::Start(rels_elem))?;

        for rel in &self.items {
            let mut rel_elem = BytesStart::new("Relationship");
            rel_elem.push_attribute(("Id", rel.id.as_str()));
            rel_elem.push_attribute(("Type", rel.rel_type.as_str()));
            rel_elem.push_attribute(("Target", rel.target.as_str()));
            if rel.target_mode == TargetMode::External {
                rel_elem.push_attribute(("TargetMode", "External"));
            }
            xml.write_event(Event::Empty(rel_elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(())
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type (returns first match)
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get all relationships of a given type
    pub fn all_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items.iter().filter(|r| r.rel_type == rel_type).collect()
    }

    /// Add an internal relationship and return its generated ID
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add_with_id(&id, rel_type, target, TargetMode::Internal);
        id
    }

    /// Add a relationship with a specific ID, replacing any existing one
    pub fn add_with_id(&mut self, id: &str, rel_type: &str, target: &str, mode: TargetMode) {
        let rel = Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: mode,
        };
        match self.items.iter_mut().find(|r| r.id == id) {
            Some(existing) => *existing = rel,
            None => self.items.push(rel),
        }
        self.source = None;
    }

    /// Remove a relationship by ID
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        self.source = None;
        Some(self.items.remove(pos))
    }

    /// Iterate over all relationships in order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next free `rIdN`, one above the highest numeric id in use
    fn next_id(&self) -> String {
        let max_id = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max_id + 1)
    }
}

fn parse_relationship(element: &BytesStart) -> Result<Relationship> {
    let mut id = None;
    let mut rel_type = None;
    let mut target = None;
    let mut target_mode = TargetMode::Internal;

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.to_string();

        match attr.key.local_name().as_ref() {
            b"Id" => id = Some(value),
            b"Type" => rel_type = Some(value),
            b"Target" => target = Some(value),
            b"TargetMode" if value == "External" => target_mode = TargetMode::External,
            _ => {}
        }
    }

    let missing = |attr: &str| Error::MissingAttribute {
        element: "Relationship".into(),
        attr: attr.into(),
    };

    Ok(Relationship {
        id: id.ok_or_else(|| missing("Id"))?,
        rel_type: rel_type.ok_or_else(|| missing("Type"))?,
        target: target.ok_or_else(|| missing("Target"))?,
        target_mode,
    })
}

/// Well-known relationship types
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const FONT_TABLE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/></Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::from_xml(SAMPLE).unwrap();
        assert_eq!(rels.len(), 2);

        let styles = rels.by_type(rel_types::STYLES).unwrap();
        assert_eq!(styles.id, "rId3");
        assert_eq!(styles.target_mode, TargetMode::Internal);

        let link = rels.get("rId7").unwrap();
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
        assert_eq!(link.target_mode, TargetMode::External);
    }

    #[test]
    fn test_untouched_written_verbatim() {
        let rels = Relationships::from_xml(SAMPLE).unwrap();
        assert_eq!(rels.to_xml().unwrap(), SAMPLE.as_bytes());
    }

    #[test]
    fn test_ids_allocated_above_max() {
        let mut rels = Relationships::from_xml(SAMPLE).unwrap();
        let id = rels.add(rel_types::IMAGE, "media/image1.png");
        assert_eq!(id, "rId8");

        let xml = String::from_utf8(rels.to_xml().unwrap()).unwrap();
        let reparsed = Relationships::from_xml(&xml).unwrap();
        let ids: Vec<&str> = reparsed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId3", "rId7", "rId8"]);
        assert_eq!(
            reparsed.get("rId7").unwrap().target,
            "https://example.com/?a=1&b=2"
        );
    }

    #[test]
    fn test_auto_id_on_empty() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel_types::STYLES, "styles.xml"), "rId1");
        assert_eq!(rels.add(rel_types::NUMBERING, "numbering.xml"), "rId2");
        assert_eq!(rels.all_by_type(rel_types::STYLES).len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut rels = Relationships::from_xml(SAMPLE).unwrap();
        assert!(rels.remove("rId3").is_some());
        assert!(rels.remove("rId3").is_none());
        assert_eq!(rels.len(), 1);
    }
}
