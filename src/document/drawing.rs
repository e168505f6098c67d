//! Shared plumbing for paragraphs that hold a single DrawingML object

use crate::document::{Paragraph, ParagraphContent, Run, RunContent};
use crate::xml::{RawXmlElement, RawXmlNode};

/// EMUs per layout unit (one pixel at 96 dpi)
pub const EMU_PER_UNIT: i64 = 9525;

pub(crate) fn to_emu(units: i64) -> i64 {
    units * EMU_PER_UNIT
}

/// Layout units from an EMU attribute value, rounded to nearest
pub(crate) fn from_emu(value: &str) -> Option<i64> {
    let emu: i64 = value.trim().parse().ok()?;
    Some((emu + emu.signum() * EMU_PER_UNIT / 2) / EMU_PER_UNIT)
}

/// The only `w:drawing` of a paragraph that holds nothing else visible
pub(crate) fn sole_drawing(para: &Paragraph) -> Option<&RawXmlElement> {
    if para
        .content
        .iter()
        .any(|c| matches!(c, ParagraphContent::Hyperlink(_)))
        || !para.text().is_empty()
    {
        return None;
    }

    let mut drawings = para
        .runs()
        .flat_map(|r| r.content.iter())
        .filter_map(|c| match c {
            RunContent::Unknown(RawXmlNode::Element(e)) if e.local_name() == "drawing" => Some(e),
            _ => None,
        });
    let first = drawings.next()?;
    drawings.next().is_none().then_some(first)
}

/// `wp:inline` or `wp:anchor` of a drawing
pub(crate) fn placement(drawing: &RawXmlElement) -> Option<&RawXmlElement> {
    drawing
        .child("inline")
        .or_else(|| drawing.child("anchor"))
}

/// Extent (cx, cy) of a placement in layout units
pub(crate) fn extent(placement: &RawXmlElement) -> Option<(i64, i64)> {
    let ext = placement.child("extent")?;
    Some((from_emu(ext.attr("cx")?)?, from_emu(ext.attr("cy")?)?))
}

/// Paragraph holding `drawing` in one run
///
/// Properties and attributes of `template` carry over, so a redrawn object
/// keeps the paragraph formatting it was loaded with.
pub(crate) fn wrap(drawing: RawXmlElement, template: Option<&Paragraph>) -> Paragraph {
    let mut para = Paragraph::new();
    if let Some(template) = template {
        para.properties = template.properties.clone();
        para.unknown_attrs = template.unknown_attrs.clone();
    }
    let mut run = Run::default();
    run.content
        .push(RunContent::Unknown(RawXmlNode::Element(drawing)));
    para.add_run(run);
    para
}

/// Highest `wp:docPr/@id` in the drawings of a paragraph
pub(crate) fn max_doc_pr_id(para: &Paragraph) -> u32 {
    para.runs()
        .flat_map(|r| r.content.iter())
        .filter_map(|c| match c {
            RunContent::Unknown(RawXmlNode::Element(e)) => max_doc_pr_id_in(e),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Highest `wp:docPr/@id` at or below `element`
pub(crate) fn max_doc_pr_id_in(element: &RawXmlElement) -> Option<u32> {
    let own = (element.local_name() == "docPr")
        .then(|| element.attr("id").and_then(|v| v.parse().ok()))
        .flatten();
    element
        .elements()
        .filter_map(max_doc_pr_id_in)
        .chain(own)
        .max()
}

/// `wp:docPr` for a generated drawing
pub(crate) fn doc_pr(id: u32, name: &str) -> RawXmlElement {
    RawXmlElement::new("wp:docPr")
        .with_attr("id", id.to_string())
        .with_attr("name", format!("{} {}", name, id))
        .empty()
}

/// `wp:extent` and the matching zero `wp:effectExtent`
pub(crate) fn extent_elements(width: i64, height: i64) -> [RawXmlElement; 2] {
    [
        RawXmlElement::new("wp:extent")
            .with_attr("cx", to_emu(width).to_string())
            .with_attr("cy", to_emu(height).to_string())
            .empty(),
        RawXmlElement::new("wp:effectExtent")
            .with_attr("l", "0")
            .with_attr("t", "0")
            .with_attr("r", "0")
            .with_attr("b", "0")
            .empty(),
    ]
}

/// `a:xfrm` at `(x, y)` with the given size, all in layout units
pub(crate) fn xfrm(x: i64, y: i64, width: i64, height: i64) -> RawXmlElement {
    RawXmlElement::new("a:xfrm")
        .with_child(
            RawXmlElement::new("a:off")
                .with_attr("x", to_emu(x).to_string())
                .with_attr("y", to_emu(y).to_string())
                .empty(),
        )
        .with_child(
            RawXmlElement::new("a:ext")
                .with_attr("cx", to_emu(width).to_string())
                .with_attr("cy", to_emu(height).to_string())
                .empty(),
        )
}

/// `a:prstGeom` with an empty adjust value list
pub(crate) fn preset_geometry(preset: &str) -> RawXmlElement {
    RawXmlElement::new("a:prstGeom")
        .with_attr("prst", preset)
        .with_child(RawXmlElement::new("a:avLst").empty())
}
