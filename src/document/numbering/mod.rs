//! Numbering definitions (numbering.xml)
//!
//! Paragraphs refer to a list by numbering id and level only. The definitions
//! live here, one `w:num`/`w:abstractNum` pair per numbering id, so any number
//! of paragraphs can share a list without duplicating its format.

mod abstract_num;
mod level;
mod num;
mod types;

pub use abstract_num::AbstractNum;
pub use level::Level;
pub use num::Num;
pub use types::{NumberFormat, NumberingKind, NumberingRef, MAX_LEVEL};

use crate::error::{Error, Result};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;

/// Numbering definitions from numbering.xml
#[derive(Clone, Debug)]
pub struct Numbering {
    /// Abstract numbering definitions
    pub abstract_nums: BTreeMap<u32, AbstractNum>,
    /// Numbering instances
    pub nums: BTreeMap<u32, Num>,
    /// Unknown children (preserved for round-trip)
    pub unknown_children: Vec<RawXmlNode>,
    /// Attributes of the root element (namespace declarations)
    root_attrs: Vec<(String, String)>,
    /// Set when a definition changed since load or the last save
    dirty: bool,
}

impl Default for Numbering {
    fn default() -> Self {
        Numbering {
            abstract_nums: BTreeMap::new(),
            nums: BTreeMap::new(),
            unknown_children: Vec::new(),
            root_attrs: vec![
                ("xmlns:w".to_string(), xml::W.to_string()),
                ("xmlns:r".to_string(), xml::R.to_string()),
            ],
            dirty: false,
        }
    }
}

impl Numbering {
    /// Create a new empty numbering definitions
    pub fn new() -> Self {
        Numbering::default()
    }

    /// Parse numbering.xml content
    pub fn from_xml(content: &str) -> Result<Self> {
        let mut reader = xml::part_reader(content);
        let mut numbering = Numbering::default();
        let mut seen_root = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"numbering" => {
                        seen_root = true;
                        numbering.root_attrs = RawXmlElement::from_empty(&e).attributes;
                    }
                    b"abstractNum" => {
                        let abs_num = AbstractNum::from_reader(&mut reader, &e)?;
                        numbering.abstract_nums.insert(abs_num.abstract_num_id, abs_num);
                    }
                    b"num" => {
                        let num = Num::from_reader(&mut reader, &e)?;
                        numbering.nums.insert(num.num_id, num);
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(&mut reader, &e)?;
                        numbering.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"numbering" {
                        seen_root = true;
                        numbering.root_attrs = RawXmlElement::from_empty(&e).attributes;
                    } else {
                        let raw = RawXmlElement::from_empty(&e);
                        numbering.unknown_children.push(RawXmlNode::Element(raw));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(Error::UnsupportedSchema(
                "numbering part has no w:numbering root".into(),
            ));
        }

        Ok(numbering)
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut start = BytesStart::new("w:numbering");
        for (key, value) in &self.root_attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start))?;

        // Picture bullets come first, everything else unknown after the instances
        let (pictures, rest): (Vec<_>, Vec<_>) = self.unknown_children.iter().partition(|c| {
            c.as_element()
                .map(|e| e.local_name() == "numPicBullet")
                .unwrap_or(false)
        });
        for child in pictures {
            child.write_to(&mut writer)?;
        }
        for abs_num in self.abstract_nums.values() {
            abs_num.write_to(&mut writer)?;
        }
        for num in self.nums.values() {
            num.write_to(&mut writer)?;
        }
        for child in rest {
            child.write_to(&mut writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:numbering")))?;
        Ok(writer.into_inner())
    }

    /// Register `kind` for the 1-based `level` of numbering `id`
    ///
    /// The first reference to an id creates its definition; later references
    /// add levels to it. Re-defining a level with another kind replaces the
    /// kind. Returns whether anything changed.
    pub fn define(&mut self, id: u32, level: u8, kind: NumberingKind) -> Result<bool> {
        types::check_level(level)?;
        let ilvl = level - 1;

        let abstract_id = match self.nums.get(&id) {
            Some(num) if self.abstract_nums.contains_key(&num.abstract_num_id) => {
                num.abstract_num_id
            }
            _ => {
                let abstract_id = self.next_abstract_id();
                self.abstract_nums
                    .insert(abstract_id, AbstractNum::new(abstract_id));
                self.nums
                    .entry(id)
                    .and_modify(|num| num.abstract_num_id = abstract_id)
                    .or_insert_with(|| Num::new(id, abstract_id));
                self.dirty = true;
                abstract_id
            }
        };

        if self.kind_of(id, level) == Some(kind) {
            return Ok(false);
        }
        let abstract_id = self.detach_shared(id, abstract_id);

        let Some(abs_num) = self.abstract_nums.get_mut(&abstract_id) else {
            return Ok(false);
        };
        match abs_num.levels.get_mut(&ilvl) {
            Some(existing) if existing.kind() == kind => Ok(false),
            Some(existing) => {
                log::warn!(
                    "numbering {} level {} redefined from {:?} to {:?}",
                    id,
                    level,
                    existing.kind(),
                    kind
                );
                existing.set_kind(kind);
                self.dirty = true;
                Ok(true)
            }
            None => {
                abs_num.add_level(Level::for_kind(ilvl, kind));
                self.dirty = true;
                Ok(true)
            }
        }
    }

    /// Rendering kind of the 1-based `level` of numbering `id`
    pub fn kind_of(&self, id: u32, level: u8) -> Option<NumberingKind> {
        self.level(id, level).map(Level::kind)
    }

    /// Level definition for numbering `id` at 1-based `level`
    pub fn level(&self, id: u32, level: u8) -> Option<&Level> {
        let num = self.nums.get(&id)?;
        let abs_num = self.abstract_nums.get(&num.abstract_num_id)?;
        abs_num.levels.get(&level.checked_sub(1)?)
    }

    /// Number of numbering ids defined
    pub fn definition_count(&self) -> usize {
        self.nums.len()
    }

    /// Number of levels defined for numbering `id`
    pub fn level_count(&self, id: u32) -> usize {
        self.nums
            .get(&id)
            .and_then(|num| self.abstract_nums.get(&num.abstract_num_id))
            .map(|abs_num| abs_num.levels.len())
            .unwrap_or(0)
    }

    /// Whether definitions changed since load or the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Give numbering `id` its own copy of `abstract_id` when other
    /// instances point at the same abstract definition
    fn detach_shared(&mut self, id: u32, abstract_id: u32) -> u32 {
        let shared = self
            .nums
            .values()
            .any(|num| num.num_id != id && num.abstract_num_id == abstract_id);
        if !shared {
            return abstract_id;
        }
        let Some(source) = self.abstract_nums.get(&abstract_id) else {
            return abstract_id;
        };

        let copy_id = self.next_abstract_id();
        let mut copy = source.clone();
        copy.abstract_num_id = copy_id;
        // nsid identifies the list; the copy is a different one
        copy.unknown_children.retain(|c| {
            c.as_element()
                .map(|e| e.local_name() != "nsid")
                .unwrap_or(true)
        });
        self.abstract_nums.insert(copy_id, copy);
        if let Some(num) = self.nums.get_mut(&id) {
            num.abstract_num_id = copy_id;
        }
        self.dirty = true;
        log::debug!(
            "numbering {} split from shared abstract {} into {}",
            id,
            abstract_id,
            copy_id
        );
        copy_id
    }

    fn next_abstract_id(&self) -> u32 {
        self.abstract_nums
            .keys()
            .next_back()
            .map(|id| id + 1)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml">
  <w:abstractNum w:abstractNumId="0">
    <w:nsid w:val="1A2B3C4D"/>
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="decimal"/>
      <w:lvlText w:val="%1."/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
    <w:lvl w:ilvl="1">
      <w:start w:val="1"/>
      <w:numFmt w:val="lowerLetter"/>
      <w:lvlText w:val="%2)"/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="bullet"/>
      <w:lvlText w:val="•"/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
  </w:abstractNum>
  <w:num w:numId="1">
    <w:abstractNumId w:val="0"/>
  </w:num>
  <w:num w:numId="2">
    <w:abstractNumId w:val="1"/>
  </w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_numbering() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();

        assert_eq!(numbering.abstract_nums.len(), 2);
        assert_eq!(numbering.definition_count(), 2);
        assert_eq!(numbering.level_count(1), 2);

        assert_eq!(numbering.kind_of(1, 1), Some(NumberingKind::Numeric));
        assert_eq!(numbering.kind_of(1, 2), Some(NumberingKind::Alphabetic));
        assert_eq!(numbering.kind_of(2, 1), Some(NumberingKind::Bullet));
        assert_eq!(numbering.kind_of(1, 3), None);
        assert_eq!(numbering.kind_of(9, 1), None);
        assert!(!numbering.is_dirty());
    }

    #[test]
    fn test_roundtrip_keeps_namespaces_and_nsid() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        let bytes = numbering.to_xml().unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(xml.contains("xmlns:w15="));
        assert!(xml.find("w:nsid").unwrap() < xml.find("w:multiLevelType").unwrap());

        let numbering2 = Numbering::from_xml(&xml).unwrap();
        assert_eq!(numbering.abstract_nums, numbering2.abstract_nums);
        assert_eq!(numbering.nums, numbering2.nums);
    }

    #[test]
    fn test_define_shares_one_definition_per_id() {
        let mut numbering = Numbering::new();
        assert!(numbering.define(1, 1, NumberingKind::Numeric).unwrap());
        assert!(!numbering.define(1, 1, NumberingKind::Numeric).unwrap());
        assert!(numbering.define(1, 2, NumberingKind::Alphabetic).unwrap());
        assert!(numbering.define(1, 3, NumberingKind::Roman).unwrap());

        assert_eq!(numbering.definition_count(), 1);
        assert_eq!(numbering.abstract_nums.len(), 1);
        assert_eq!(numbering.level_count(1), 3);
        assert_eq!(numbering.kind_of(1, 3), Some(NumberingKind::Roman));
        assert!(numbering.is_dirty());

        let level = numbering.level(1, 3).unwrap();
        assert_eq!(level.level_text.as_deref(), Some("%3."));
    }

    #[test]
    fn test_define_replaces_kind() {
        let mut numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        assert!(numbering.define(1, 2, NumberingKind::Roman).unwrap());
        assert_eq!(numbering.kind_of(1, 2), Some(NumberingKind::Roman));
        assert_eq!(numbering.definition_count(), 2);
    }

    #[test]
    fn test_define_leaves_sibling_instances_alone() {
        let xml = SAMPLE_NUMBERING.replace(
            r#"<w:num w:numId="2">
    <w:abstractNumId w:val="1"/>"#,
            r#"<w:num w:numId="2">
    <w:abstractNumId w:val="0"/>"#,
        );
        let mut numbering = Numbering::from_xml(&xml).unwrap();
        assert_eq!(numbering.kind_of(2, 1), Some(NumberingKind::Numeric));

        assert!(numbering.define(1, 1, NumberingKind::Roman).unwrap());
        assert_eq!(numbering.kind_of(1, 1), Some(NumberingKind::Roman));
        assert_eq!(numbering.kind_of(2, 1), Some(NumberingKind::Numeric));
        assert_eq!(numbering.kind_of(1, 2), Some(NumberingKind::Alphabetic));

        assert_eq!(numbering.nums[&1].abstract_num_id, 2);
        assert_eq!(numbering.nums[&2].abstract_num_id, 0);
        assert_eq!(numbering.abstract_nums.len(), 3);

        let out = String::from_utf8(numbering.to_xml().unwrap()).unwrap();
        assert_eq!(out.matches("w:nsid").count(), 1);

        // once split, further levels go to the copy without another split
        assert!(numbering.define(1, 3, NumberingKind::Numeric).unwrap());
        assert_eq!(numbering.abstract_nums.len(), 3);
        assert_eq!(numbering.level_count(2), 2);
    }

    #[test]
    fn test_define_new_id_gets_fresh_abstract() {
        let mut numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        numbering.define(7, 1, NumberingKind::Numeric).unwrap();

        assert_eq!(numbering.nums[&7].abstract_num_id, 2);
        assert_eq!(numbering.kind_of(7, 1), Some(NumberingKind::Numeric));
    }

    #[test]
    fn test_define_rejects_bad_level() {
        let mut numbering = Numbering::new();
        let err = numbering.define(1, 0, NumberingKind::Numeric).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert!(numbering.define(1, 10, NumberingKind::Numeric).is_err());
        assert!(!numbering.is_dirty());
    }

    #[test]
    fn test_malformed_ids_are_corrupt() {
        let xml = SAMPLE_NUMBERING.replace(r#"w:numId="2""#, r#"w:numId="two""#);
        let err = Numbering::from_xml(&xml).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptArchive);
        assert!(err.to_string().contains("'two'"));

        let xml = SAMPLE_NUMBERING.replace(r#"w:abstractNumId="1""#, r#"w:abstractNumId="-1""#);
        assert!(Numbering::from_xml(&xml).is_err());
    }

    #[test]
    fn test_missing_root_is_unsupported() {
        let err = Numbering::from_xml("<w:styles/>").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedSchema);
    }
}
