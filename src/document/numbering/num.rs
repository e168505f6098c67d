//! Numbering instance definitions

use crate::error::Result;
use crate::xml::{parse_w_attr, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Numbering instance (w:num)
#[derive(Clone, Debug, PartialEq)]
pub struct Num {
    /// Numbering ID (referenced by paragraphs)
    pub num_id: u32,
    /// Referenced abstract numbering ID
    pub abstract_num_id: u32,
    /// Level overrides and other children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl Num {
    /// Create a new numbering instance
    pub fn new(num_id: u32, abstract_num_id: u32) -> Self {
        Num {
            num_id,
            abstract_num_id,
            unknown_children: Vec::new(),
        }
    }

    pub(crate) fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
    ) -> Result<Self> {
        let mut num = Num::new(parse_w_attr(start, "numId")?.unwrap_or(0), 0);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    num.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"abstractNumId" => {
                        num.abstract_num_id = parse_w_attr(&e, "val")?.unwrap_or(0);
                    }
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        num.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"num" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(num)
    }

    pub(crate) fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:num");
        start.push_attribute(("w:numId", self.num_id.to_string().as_str()));
        writer.write_event(Event::Start(start))?;

        RawXmlElement::val("w:abstractNumId", self.abstract_num_id.to_string())
            .write_to(writer)?;
        for child in &self.unknown_children {
            child.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:num")))?;
        Ok(())
    }
}
