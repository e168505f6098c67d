//! Abstract numbering definitions

use crate::error::Result;
use crate::xml::{get_w_val, parse_w_attr, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::BufRead;

use super::level::Level;

/// Abstract numbering definition (w:abstractNum)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbstractNum {
    /// Abstract numbering ID
    pub abstract_num_id: u32,
    /// Multi-level type
    pub multi_level_type: Option<String>,
    /// Level definitions by level index
    pub levels: BTreeMap<u8, Level>,
    /// Unknown children such as nsid and tmpl (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl AbstractNum {
    /// Create a new abstract numbering definition
    pub fn new(id: u32) -> Self {
        AbstractNum {
            abstract_num_id: id,
            multi_level_type: Some("hybridMultilevel".to_string()),
            ..Default::default()
        }
    }

    /// Add or replace a level
    pub fn add_level(&mut self, level: Level) {
        self.levels.insert(level.ilvl, level);
    }

    pub(crate) fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
    ) -> Result<Self> {
        let mut abs_num = AbstractNum {
            abstract_num_id: parse_w_attr(start, "abstractNumId")?.unwrap_or(0),
            ..Default::default()
        };

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"lvl" => {
                        let lvl = Level::from_reader(reader, &e)?;
                        abs_num.levels.insert(lvl.ilvl, lvl);
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        abs_num.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"multiLevelType" => abs_num.multi_level_type = get_w_val(&e),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        abs_num.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"abstractNum" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(abs_num)
    }

    pub(crate) fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:abstractNum");
        start.push_attribute(("w:abstractNumId", self.abstract_num_id.to_string().as_str()));
        writer.write_event(Event::Start(start))?;

        // nsid precedes multiLevelType; tmpl, name and style links follow it
        let (nsid, rest): (Vec<_>, Vec<_>) = self.unknown_children.iter().partition(|c| {
            c.as_element()
                .map(|e| e.local_name() == "nsid")
                .unwrap_or(false)
        });
        for child in nsid {
            child.write_to(writer)?;
        }
        if let Some(mlt) = &self.multi_level_type {
            RawXmlElement::val("w:multiLevelType", mlt.as_str()).write_to(writer)?;
        }
        for child in rest {
            child.write_to(writer)?;
        }

        for level in self.levels.values() {
            level.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:abstractNum")))?;
        Ok(())
    }
}
