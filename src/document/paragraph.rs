//! Paragraph element (w:p)

use crate::document::format::{inches_to_twips, twips_to_inches};
use crate::document::node::NodeId;
use crate::document::numbering::{NumberingKind, NumberingRef, MAX_LEVEL};
use crate::document::{Alignment, Border, BorderWidth, Color, Indentation, Run};
use crate::error::Result;
use crate::xml::{self, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Style a paragraph without an explicit `w:pStyle` uses
pub const DEFAULT_STYLE: &str = "Normal";

/// Child order of w:pPr
const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

const BORDER_SIDES: [&str; 4] = ["top", "left", "bottom", "right"];

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    pub(crate) node: Option<NodeId>,
    /// Paragraph properties
    pub properties: ParagraphProperties,
    /// Paragraph content (runs, hyperlinks, etc.)
    pub content: Vec<ParagraphContent>,
    /// Unknown attributes (preserved for round-trip)
    pub unknown_attrs: Vec<(String, String)>,
}

/// Content within a paragraph
#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphContent {
    /// Text run
    Run(Run),
    /// Hyperlink
    Hyperlink(Hyperlink),
    /// Bookmarks, fields, anything else (preserved)
    Unknown(RawXmlNode),
}

/// Hyperlink element (w:hyperlink)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hyperlink {
    /// Attributes (r:id, w:anchor, w:history, ...)
    pub attributes: Vec<(String, String)>,
    /// Content runs
    pub content: Vec<ParagraphContent>,
}

/// Paragraph properties (w:pPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphProperties {
    /// Style ID
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    pub indentation: Option<Indentation>,
    /// Border on all four sides; never holds a zero-size border
    pub border: Option<Border>,
    pub numbering: Option<NumberingRef>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl PartialEq for Paragraph {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.content == other.content
            && self.unknown_attrs == other.unknown_attrs
    }
}

impl Paragraph {
    /// Create an empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding one run of `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().with_run(Run::new(text))
    }

    /// Parse paragraph from reader (after w:p start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut para = Self::from_empty(start);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"pPr" => para.properties = ParagraphProperties::from_reader(reader)?,
                    _ => para.content.push(ParagraphContent::from_start(reader, &e)?),
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"pPr" => {}
                    _ => para.content.push(ParagraphContent::from_empty(&e)),
                },
                Event::End(e) if e.local_name().as_ref() == b"p" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }

    /// Create from an empty (or not yet read) w:p tag
    pub fn from_empty(start: &BytesStart) -> Self {
        Paragraph {
            unknown_attrs: RawXmlElement::from_empty(start).attributes,
            ..Default::default()
        }
    }

    /// Concatenated text of all runs, hyperlinks included
    pub fn text(&self) -> String {
        self.content.iter().map(ParagraphContent::text).collect()
    }

    /// Replace all runs with a single run of `text`
    ///
    /// The new run takes the formatting of the first run. Bookmarks and
    /// other non-run content are kept.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let properties = self
            .runs()
            .next()
            .map(|r| r.properties.clone())
            .unwrap_or_default();
        self.content
            .retain(|c| matches!(c, ParagraphContent::Unknown(_)));
        let mut run = Run::new(text);
        run.properties = properties;
        self.add_run(run);
    }

    /// Direct child runs
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| match c {
            ParagraphContent::Run(r) => Some(r),
            _ => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|c| match c {
            ParagraphContent::Run(r) => Some(r),
            _ => None,
        })
    }

    /// Append a run after the existing content
    pub fn add_run(&mut self, run: Run) {
        self.content.push(ParagraphContent::Run(run));
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.add_run(run);
        self
    }

    /// Whether a run of this paragraph holds a drawing
    pub fn has_drawing(&self) -> bool {
        self.runs().any(Run::has_drawing)
    }

    /// Style ID, `"Normal"` when none is set
    pub fn style(&self) -> &str {
        self.properties.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.properties.style = Some(style.into());
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.set_style(style);
        self
    }

    pub fn alignment(&self) -> Alignment {
        self.properties.alignment.unwrap_or_default()
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.properties.alignment = Some(alignment);
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.set_alignment(alignment);
        self
    }

    /// Indentation in inches; all zero when none is set
    pub fn indentation(&self) -> Indentation {
        self.properties.indentation.unwrap_or_default()
    }

    pub fn set_indentation(&mut self, indentation: Indentation) {
        self.properties.indentation = Some(indentation);
    }

    pub fn with_indentation(mut self, indentation: Indentation) -> Self {
        self.set_indentation(indentation);
        self
    }

    /// Border, `None` when absent
    pub fn border(&self) -> Option<Border> {
        self.properties.border
    }

    /// Set the border; a zero size removes it
    pub fn set_border(&mut self, border: Border) {
        self.properties.border = border.is_visible().then_some(border);
    }

    pub fn clear_border(&mut self) {
        self.properties.border = None;
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.set_border(border);
        self
    }

    pub fn numbering(&self) -> Option<NumberingRef> {
        self.properties.numbering
    }

    /// Make this paragraph a list item
    pub fn set_numbering(&mut self, numbering: NumberingRef) {
        self.properties.numbering = Some(numbering);
    }

    pub fn clear_numbering(&mut self) {
        self.properties.numbering = None;
    }

    pub fn with_numbering(mut self, numbering: NumberingRef) -> Self {
        self.set_numbering(numbering);
        self
    }

    pub fn numbering_id(&self) -> Option<u32> {
        self.properties.numbering.map(|n| n.id)
    }

    /// 1-based list level
    pub fn numbering_level(&self) -> Option<u8> {
        self.properties.numbering.map(|n| n.level)
    }

    /// Whether this paragraph belongs to any list
    pub fn is_list_item(&self) -> bool {
        self.properties.numbering.is_some()
    }

    /// Whether this is a plain numbered (1, 2, 3) list item
    pub fn is_numbered(&self) -> bool {
        self.has_kind(NumberingKind::Numeric)
    }

    pub fn is_alphabetic(&self) -> bool {
        self.has_kind(NumberingKind::Alphabetic)
    }

    pub fn is_roman(&self) -> bool {
        self.has_kind(NumberingKind::Roman)
    }

    fn has_kind(&self, kind: NumberingKind) -> bool {
        self.properties.numbering.is_some_and(|n| n.kind == kind)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:p");
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
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}

impl ParagraphContent {
    fn from_start<R: BufRead>(reader: &mut Reader<R>, e: &BytesStart) -> Result<Self> {
        Ok(match e.local_name().as_ref() {
            b"r" => ParagraphContent::Run(Run::from_reader(reader, e)?),
            b"hyperlink" => ParagraphContent::Hyperlink(Hyperlink::from_reader(reader, e)?),
            _ => ParagraphContent::Unknown(RawXmlNode::Element(RawXmlElement::from_reader(
                reader, e,
            )?)),
        })
    }

    fn from_empty(e: &BytesStart) -> Self {
        match e.local_name().as_ref() {
            b"r" => ParagraphContent::Run(Run::from_empty(e)),
            b"hyperlink" => ParagraphContent::Hyperlink(Hyperlink {
                attributes: RawXmlElement::from_empty(e).attributes,
                content: Vec::new(),
            }),
            _ => ParagraphContent::Unknown(RawXmlNode::Element(RawXmlElement::from_empty(e))),
        }
    }

    /// Text contributed by this item
    pub fn text(&self) -> String {
        match self {
            ParagraphContent::Run(run) => run.text(),
            ParagraphContent::Hyperlink(link) => link.text(),
            ParagraphContent::Unknown(_) => String::new(),
        }
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            ParagraphContent::Run(run) => run.write_to(writer),
            ParagraphContent::Hyperlink(link) => link.write_to(writer),
            ParagraphContent::Unknown(node) => node.write_to(writer),
        }
    }
}

impl Hyperlink {
    /// Parse from reader (after w:hyperlink start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut link = Hyperlink {
            attributes: RawXmlElement::from_empty(start).attributes,
            content: Vec::new(),
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => link.content.push(ParagraphContent::from_start(reader, &e)?),
                Event::Empty(e) => link.content.push(ParagraphContent::from_empty(&e)),
                Event::End(e) if e.local_name().as_ref() == b"hyperlink" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(link)
    }

    /// Relationship id of an external target
    pub fn r_id(&self) -> Option<&str> {
        self.attr("r:id")
    }

    /// Bookmark name of an internal target
    pub fn anchor(&self) -> Option<&str> {
        self.attr("w:anchor")
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        self.content.iter().map(ParagraphContent::text).collect()
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:hyperlink");
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for content in &self.content {
                content.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:hyperlink")))?;
        }

        Ok(())
    }
}

impl ParagraphProperties {
    /// Parse from reader (after w:pPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = ParagraphProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => props.absorb(RawXmlElement::from_reader(reader, &e)?),
                Event::Empty(e) => props.absorb(RawXmlElement::from_empty(&e)),
                Event::End(e) if e.local_name().as_ref() == b"pPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Take a known property out of `raw`, or keep it as unknown
    fn absorb(&mut self, raw: RawXmlElement) {
        let known = match raw.local_name() {
            "pStyle" => w_val(&raw)
                .map(|v| self.style = Some(v.to_string()))
                .is_some(),
            "jc" => w_val(&raw)
                .and_then(Alignment::from_jc)
                .map(|a| self.alignment = Some(a))
                .is_some(),
            "ind" => parse_indentation(&raw)
                .map(|i| self.indentation = Some(i))
                .is_some(),
            "pBdr" => parse_border(&raw)
                .map(|b| self.border = Some(b))
                .is_some(),
            "numPr" => parse_numbering(&raw)
                .map(|n| self.numbering = Some(n))
                .is_some(),
            _ => false,
        };
        if !known {
            self.unknown_children.push(RawXmlNode::Element(raw));
        }
    }

    /// Whether nothing would be written
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.alignment.is_none()
            && self.indentation.is_none()
            && self.border.is_none()
            && self.numbering.is_none()
            && self.unknown_children.is_empty()
    }

    /// Write to XML writer, children in schema order
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let mut children = Vec::new();
        if let Some(style) = &self.style {
            children.push(RawXmlElement::val("w:pStyle", style.as_str()));
        }
        if let Some(numbering) = &self.numbering {
            children.push(
                RawXmlElement::new("w:numPr")
                    .with_child(RawXmlElement::val("w:ilvl", numbering.ilvl().to_string()))
                    .with_child(RawXmlElement::val("w:numId", numbering.id.to_string())),
            );
        }
        if let Some(border) = self.border.filter(Border::is_visible) {
            children.push(border_element(&border));
        }
        if let Some(ind) = &self.indentation {
            children.push(indentation_element(ind));
        }
        if let Some(alignment) = self.alignment {
            children.push(RawXmlElement::val("w:jc", alignment.as_str()));
        }

        let mut children: Vec<RawXmlNode> =
            children.into_iter().map(RawXmlNode::Element).collect();
        children.extend(self.unknown_children.iter().cloned());
        xml::write_ordered(writer, "w:pPr", children, PPR_ORDER)
    }
}

fn w_val(raw: &RawXmlElement) -> Option<&str> {
    raw.attr("w:val").or_else(|| raw.attr("val"))
}

fn indentation_element(ind: &Indentation) -> RawXmlElement {
    let mut elem = RawXmlElement::new("w:ind")
        .with_attr("w:left", inches_to_twips(ind.left).to_string())
        .with_attr("w:right", inches_to_twips(ind.right).to_string());
    if ind.first_line != 0.0 {
        elem = elem.with_attr("w:firstLine", inches_to_twips(ind.first_line).to_string());
    }
    if ind.hanging != 0.0 {
        elem = elem.with_attr("w:hanging", inches_to_twips(ind.hanging).to_string());
    }
    elem.empty()
}

/// Indentation from `w:ind`; `None` when it carries attributes this model
/// cannot hold (character units, mirrored offsets)
fn parse_indentation(raw: &RawXmlElement) -> Option<Indentation> {
    let mut ind = Indentation::default();
    for (key, value) in &raw.attributes {
        let inches = twips_to_inches(value.parse().ok()?);
        match key.trim_start_matches("w:") {
            "left" | "start" => ind.left = inches,
            "right" | "end" => ind.right = inches,
            "firstLine" => ind.first_line = inches,
            "hanging" => ind.hanging = inches,
            _ => return None,
        }
    }
    Some(ind)
}

fn border_element(border: &Border) -> RawXmlElement {
    let mut bdr = RawXmlElement::new("w:pBdr");
    for side in BORDER_SIDES {
        bdr = bdr.with_child(
            RawXmlElement::new(format!("w:{}", side))
                .with_attr("w:val", border.width.as_str())
                .with_attr("w:sz", border.size.to_string())
                .with_attr("w:space", "0")
                .with_attr("w:color", border.color.to_hex())
                .empty(),
        );
    }
    bdr
}

/// Border from `w:pBdr` when all four sides share one visible style and
/// writing it back reproduces the element exactly; spacing, shadows, theme
/// and automatic colors keep the element raw
fn parse_border(raw: &RawXmlElement) -> Option<Border> {
    let side = raw.child("top")?;
    let width = side.attr("w:val")?.parse::<BorderWidth>().ok()?;
    let size = side.attr("w:sz")?.parse::<u32>().ok()?;
    let color = Color::from_hex(side.attr("w:color")?)?;
    let border = Border::new(width, color, size);

    (border.is_visible() && border_element(&border) == *raw).then_some(border)
}

/// List reference from `w:numPr`; numId 0 (list removed) stays raw
fn parse_numbering(raw: &RawXmlElement) -> Option<NumberingRef> {
    let mut ilvl = 0u8;
    let mut id = None;
    for child in raw.elements() {
        match child.local_name() {
            "ilvl" => ilvl = w_val(child)?.parse().ok()?,
            "numId" => id = Some(w_val(child)?.parse::<u32>().ok()?),
            _ => return None,
        }
    }

    let id = id.filter(|&id| id != 0)?;
    if ilvl >= MAX_LEVEL {
        return None;
    }
    Some(NumberingRef {
        id,
        level: ilvl + 1,
        kind: NumberingKind::Numeric,
    })
}
