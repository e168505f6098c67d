//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::document::Color;
use crate::error::Result;
use crate::xml::{
    self, get_attr, get_w_attr, get_w_val, parse_bool, sole_w_val, RawXmlElement, RawXmlNode,
};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    /// Run properties
    pub properties: RunProperties,
    /// Run content
    pub content: Vec<RunContent>,
    /// Attributes of w:r (rsid etc.), preserved
    pub unknown_attrs: Vec<(String, String)>,
}

/// Content within a run
#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    /// Text (w:t)
    Text(String),
    /// Tab (w:tab)
    Tab,
    /// Break (w:br)
    Break(BreakType),
    /// Carriage return (w:cr)
    CarriageReturn,
    /// Anything else (drawings, fields, ...), preserved
    Unknown(RawXmlNode),
}

/// Break type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

/// Run properties (w:rPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProperties {
    /// Character style ID
    pub style: Option<String>,
    /// Font family (w:rFonts ascii/hAnsi)
    pub font_family: Option<String>,
    /// Other w:rFonts attributes (eastAsia, theme fonts, ...)
    pub font_attrs: Vec<(String, String)>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Underline type (w:u/@w:val)
    pub underline: Option<String>,
    /// Font size in half-points (24 = 12pt)
    pub size: Option<u32>,
    pub color: Option<Color>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl Run {
    /// Create a new run with text
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: vec![RunContent::Text(text.into())],
            ..Default::default()
        }
    }

    /// Parse from reader (after w:r start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut run = Self::from_empty(start);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rPr" => run.properties = RunProperties::from_reader(reader)?,
                    b"t" => {
                        let text = xml::read_text(reader, &e)?;
                        run.content.push(RunContent::Text(text));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        run.content.push(RunContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"rPr" => {}
                    b"t" => run.content.push(RunContent::Text(String::new())),
                    b"tab" => run.content.push(RunContent::Tab),
                    b"br" => {
                        let break_type = match get_w_attr(&e, "type").as_deref() {
                            Some("page") => BreakType::Page,
                            Some("column") => BreakType::Column,
                            _ => BreakType::TextWrapping,
                        };
                        run.content.push(RunContent::Break(break_type));
                    }
                    b"cr" => run.content.push(RunContent::CarriageReturn),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        run.content.push(RunContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"r" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    /// Create from an empty (or not yet read) w:r tag
    pub fn from_empty(start: &BytesStart) -> Self {
        Run {
            unknown_attrs: RawXmlElement::from_empty(start).attributes,
            ..Default::default()
        }
    }

    /// Text of this run
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => result.push_str(t),
                RunContent::Tab => result.push('\t'),
                RunContent::Break(BreakType::TextWrapping) | RunContent::CarriageReturn => {
                    result.push('\n')
                }
                _ => {}
            }
        }
        result
    }

    /// Replace all text content with `text`, keeping non-text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut text = Some(text.into());
        let mut content = Vec::with_capacity(self.content.len());
        for item in self.content.drain(..) {
            match item {
                RunContent::Text(_)
                | RunContent::Tab
                | RunContent::Break(BreakType::TextWrapping)
                | RunContent::CarriageReturn => {
                    if let Some(t) = text.take() {
                        content.push(RunContent::Text(t));
                    }
                }
                other => content.push(other),
            }
        }
        if let Some(t) = text {
            content.push(RunContent::Text(t));
        }
        self.content = content;
    }

    /// Whether the run holds a drawing (inline or anchored)
    pub fn has_drawing(&self) -> bool {
        self.content.iter().any(|c| match c {
            RunContent::Unknown(RawXmlNode::Element(e)) => {
                e.local_name() == "drawing" || e.find("drawing").is_some()
            }
            _ => false,
        })
    }

    pub fn font_family(&self) -> Option<&str> {
        self.properties.font_family.as_deref()
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        self.properties.font_family = Some(family.into());
    }

    /// Font size in points
    pub fn font_size(&self) -> Option<f32> {
        self.properties.size.map(|s| s as f32 / 2.0)
    }

    /// Set font size in points (rounded to the nearest half point)
    pub fn set_font_size(&mut self, points: f32) {
        self.properties.size = Some((points * 2.0).round().max(0.0) as u32);
    }

    pub fn color(&self) -> Option<Color> {
        self.properties.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.properties.color = Some(color);
    }

    pub fn bold(&self) -> bool {
        self.properties.bold.unwrap_or(false)
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.properties.bold = Some(bold);
    }

    pub fn italic(&self) -> bool {
        self.properties.italic.unwrap_or(false)
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.properties.italic = Some(italic);
    }

    /// Whether any underline other than "none" applies
    pub fn underline(&self) -> bool {
        matches!(self.properties.underline.as_deref(), Some(u) if u != "none")
    }

    /// Set a single underline, or clear it
    pub fn set_underline(&mut self, underline: bool) {
        self.properties.underline = underline.then(|| "single".to_string());
    }

    pub fn with_bold(mut self) -> Self {
        self.set_bold(true);
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.set_italic(true);
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.set_underline(true);
        self
    }

    pub fn with_font(mut self, family: impl Into<String>, points: f32) -> Self {
        self.set_font_family(family);
        self.set_font_size(points);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:r");
        for (key, value) in &self.unknown_attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_empty() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        self.properties.write_to(writer)?;
        for content in &self.content {
            content.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }
}

impl RunContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RunContent::Text(text) => {
                let mut start = BytesStart::new("w:t");
                if text.starts_with(char::is_whitespace)
                    || text.ends_with(char::is_whitespace)
                    || text.contains("  ")
                {
                    start.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Tab => xml::write_empty(writer, "w:tab", &[])?,
            RunContent::Break(break_type) => {
                let attrs: &[(&str, &str)] = match break_type {
                    BreakType::Page => &[("w:type", "page")],
                    BreakType::Column => &[("w:type", "column")],
                    BreakType::TextWrapping => &[],
                };
                xml::write_empty(writer, "w:br", attrs)?;
            }
            RunContent::CarriageReturn => xml::write_empty(writer, "w:cr", &[])?,
            RunContent::Unknown(node) => node.write_to(writer)?,
        }
        Ok(())
    }
}

impl RunProperties {
    /// Parse from reader (after w:rPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = RunProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    props.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"rStyle" => props.style = get_w_val(&e),
                    b"rFonts" => props.read_fonts(&e),
                    b"b" => props.bold = Some(parse_bool(&e)),
                    b"i" => props.italic = Some(parse_bool(&e)),
                    b"u" => props.underline = Some(get_w_val(&e).unwrap_or_else(|| "single".into())),
                    b"sz" => match sole_w_val(&e).and_then(|v| v.parse().ok()) {
                        Some(size) => props.size = Some(size),
                        None => props
                            .unknown_children
                            .push(RawXmlNode::Element(RawXmlElement::from_empty(&e))),
                    },
                    b"color" => match sole_w_val(&e).and_then(|v| {
                        Color::from_hex(&v).filter(|c| c.to_hex() == v)
                    }) {
                        Some(color) => props.color = Some(color),
                        None => props
                            .unknown_children
                            .push(RawXmlNode::Element(RawXmlElement::from_empty(&e))),
                    },
                    _ => props
                        .unknown_children
                        .push(RawXmlNode::Element(RawXmlElement::from_empty(&e))),
                },
                Event::End(e) if e.local_name().as_ref() == b"rPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    fn read_fonts(&mut self, e: &BytesStart) {
        self.font_family = get_attr(e, "w:ascii").or_else(|| get_attr(e, "w:hAnsi"));
        self.font_attrs = RawXmlElement::from_empty(e)
            .attributes
            .into_iter()
            .filter(|(key, _)| key != "w:ascii" && key != "w:hAnsi")
            .collect();
    }

    /// Whether nothing would be written
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.font_family.is_none()
            && self.font_attrs.is_empty()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.size.is_none()
            && self.color.is_none()
            && self.unknown_children.is_empty()
    }

    /// Write to XML writer, children in schema order
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let mut children = Vec::new();
        let mut push = |e: RawXmlElement| children.push(RawXmlNode::Element(e));

        if let Some(style) = &self.style {
            push(RawXmlElement::val("w:rStyle", style));
        }
        if self.font_family.is_some() || !self.font_attrs.is_empty() {
            let mut fonts = RawXmlElement::new("w:rFonts").empty();
            if let Some(font) = &self.font_family {
                fonts = fonts.with_attr("w:ascii", font).with_attr("w:hAnsi", font);
            }
            for (k, v) in &self.font_attrs {
                fonts = fonts.with_attr(k, v);
            }
            push(fonts);
        }
        if let Some(bold) = self.bold {
            push(toggle("w:b", bold));
        }
        if let Some(italic) = self.italic {
            push(toggle("w:i", italic));
        }
        if let Some(color) = self.color {
            push(RawXmlElement::val("w:color", color.to_hex()));
        }
        if let Some(size) = self.size {
            push(RawXmlElement::val("w:sz", size.to_string()));
        }
        if let Some(underline) = &self.underline {
            push(RawXmlElement::val("w:u", underline));
        }

        children.extend(self.unknown_children.iter().cloned());
        xml::write_ordered(writer, "w:rPr", children, RPR_ORDER)
    }
}

/// Child order of w:rPr
const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath",
];

fn toggle(name: &str, on: bool) -> RawXmlElement {
    if on {
        RawXmlElement::new(name).empty()
    } else {
        RawXmlElement::val(name, "0")
    }
}
