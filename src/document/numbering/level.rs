//! Level definitions for numbering

use crate::error::{Error, Result};
use crate::xml::{self, get_w_val, sole_w_val, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use super::types::{NumberFormat, NumberingKind};

/// Child order of w:lvl
const LVL_ORDER: &[&str] = &[
    "start", "numFmt", "lvlRestart", "pStyle", "isLgl", "suff", "lvlText", "lvlPicBulletId",
    "legacy", "lvlJc", "pPr", "rPr",
];

/// Level definition (w:lvl)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    /// Level index (0-8)
    pub ilvl: u8,
    /// Start value
    pub start: Option<u32>,
    /// Number format
    pub num_fmt: Option<NumberFormat>,
    /// Level text (e.g., "%1.", "%1.%2.")
    pub level_text: Option<String>,
    /// Level justification
    pub lvl_jc: Option<String>,
    /// Other attributes of w:lvl (tplc, tentative)
    pub unknown_attrs: Vec<(String, String)>,
    /// Unknown children, including pPr and rPr (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl Level {
    /// Create a new level with the given index
    pub fn new(ilvl: u8) -> Self {
        Level {
            ilvl,
            start: Some(1),
            ..Default::default()
        }
    }

    /// Standard markup for a kind at zero-based `ilvl`: counter text `%N.`,
    /// left aligned, indented half an inch per level with a quarter inch hang
    pub fn for_kind(ilvl: u8, kind: NumberingKind) -> Self {
        let level = ilvl + 1;
        let ind = RawXmlElement::new("w:ind")
            .with_attr("w:left", (720 * level as u32).to_string())
            .with_attr("w:hanging", "360")
            .empty();
        let mut lvl = Level::new(ilvl)
            .with_format(kind.format())
            .with_text(kind.level_text(level))
            .with_justification("left");
        lvl.unknown_children
            .push(RawXmlNode::Element(RawXmlElement::new("w:pPr").with_child(ind)));
        lvl
    }

    /// Set the number format
    pub fn with_format(mut self, fmt: NumberFormat) -> Self {
        self.num_fmt = Some(fmt);
        self
    }

    /// Set the level text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.level_text = Some(text.into());
        self
    }

    /// Set the justification
    pub fn with_justification(mut self, jc: impl Into<String>) -> Self {
        self.lvl_jc = Some(jc.into());
        self
    }

    /// Rendering kind of this level; a level without a format is numeric
    pub fn kind(&self) -> NumberingKind {
        self.num_fmt
            .as_ref()
            .map(NumberingKind::from_format)
            .unwrap_or_default()
    }

    /// Switch the level to `kind`, rewriting its format and counter text
    pub(crate) fn set_kind(&mut self, kind: NumberingKind) {
        self.num_fmt = Some(kind.format());
        self.level_text = Some(kind.level_text(self.ilvl + 1));
    }

    pub(crate) fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
    ) -> Result<Self> {
        let mut level = Level::default();

        for attr in start.attributes().filter_map(|a| a.ok()) {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = String::from_utf8_lossy(&attr.value).to_string();
            if key == "w:ilvl" || key == "ilvl" {
                level.ilvl = value.parse().map_err(|_| Error::InvalidAttribute {
                    element: "w:lvl".into(),
                    attr: key.clone(),
                    value: value.clone(),
                })?;
            } else {
                level.unknown_attrs.push((key, value));
            }
        }

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    level.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"start" => match sole_w_val(&e).and_then(|v| v.parse().ok()) {
                        Some(start) => level.start = Some(start),
                        None => level
                            .unknown_children
                            .push(RawXmlNode::Element(RawXmlElement::from_empty(&e))),
                    },
                    b"numFmt" => {
                        level.num_fmt = get_w_val(&e).and_then(|v| v.parse().ok());
                    }
                    b"lvlText" => level.level_text = get_w_val(&e),
                    b"lvlJc" => level.lvl_jc = get_w_val(&e),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        level.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"lvl" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(level)
    }

    pub(crate) fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut children = Vec::new();
        if let Some(s) = self.start {
            children.push(RawXmlElement::val("w:start", s.to_string()));
        }
        if let Some(fmt) = &self.num_fmt {
            children.push(RawXmlElement::val("w:numFmt", fmt.as_str()));
        }
        if let Some(txt) = &self.level_text {
            children.push(RawXmlElement::val("w:lvlText", txt.as_str()));
        }
        if let Some(jc) = &self.lvl_jc {
            children.push(RawXmlElement::val("w:lvlJc", jc.as_str()));
        }
        let mut children: Vec<RawXmlNode> =
            children.into_iter().map(RawXmlNode::Element).collect();
        children.extend(self.unknown_children.iter().cloned());

        let mut lvl = RawXmlElement::new("w:lvl").with_attr("w:ilvl", self.ilvl.to_string());
        lvl.attributes.extend(self.unknown_attrs.iter().cloned());
        xml::write_ordered_element(writer, &lvl, children, LVL_ORDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_level_markup() {
        let lvl = Level::for_kind(1, NumberingKind::Alphabetic);
        let mut writer = Writer::new(Vec::new());
        lvl.write_to(&mut writer).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(
            xml,
            r#"<w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%2."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="1440" w:hanging="360"/></w:pPr></w:lvl>"#
        );
    }

    fn parse_level(xml: &str) -> Result<Level> {
        let mut reader = xml::part_reader(xml);
        let mut buf = Vec::new();
        let Event::Start(e) = reader.read_event_into(&mut buf).unwrap() else {
            panic!("expected start tag");
        };
        let e = e.into_owned();
        Level::from_reader(&mut reader, &e)
    }

    #[test]
    fn test_malformed_values() {
        let err = parse_level(r#"<w:lvl w:ilvl="one"><w:numFmt w:val="decimal"/></w:lvl>"#)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptArchive);

        let xml = r#"<w:lvl w:ilvl="0"><w:start w:val="x"/><w:numFmt w:val="decimal"/></w:lvl>"#;
        let lvl = parse_level(xml).unwrap();
        assert_eq!(lvl.start, None);

        let mut writer = Writer::new(Vec::new());
        lvl.write_to(&mut writer).unwrap();
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), xml);
    }

    #[test]
    fn test_parse_keeps_extras() {
        let xml = r#"<w:lvl w:ilvl="0" w:tplc="04090019"><w:start w:val="1"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%1)"/><w:lvlJc w:val="right"/><w:rPr><w:b/></w:rPr></w:lvl>"#;
        let mut reader = xml::part_reader(xml);
        let mut buf = Vec::new();
        let Event::Start(e) = reader.read_event_into(&mut buf).unwrap() else {
            panic!("expected start tag");
        };
        let e = e.into_owned();
        let lvl = Level::from_reader(&mut reader, &e).unwrap();

        assert_eq!(lvl.kind(), NumberingKind::Roman);
        assert_eq!(lvl.unknown_attrs.len(), 1);

        let mut writer = Writer::new(Vec::new());
        lvl.write_to(&mut writer).unwrap();
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), xml);
    }
}
