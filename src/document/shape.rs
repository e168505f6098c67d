//! Preset vector shapes (wps:wsp)
//!
//! A shape is a body paragraph whose only content is a `w:drawing` anchored
//! to that paragraph, holding a `wps:wsp` with a preset geometry and no text
//! box.

use crate::document::drawing;
use crate::document::node::NodeId;
use crate::document::Paragraph;
use crate::error::Result;
use crate::xml::{self, RawXmlElement};
use quick_xml::Writer;

/// Preset geometry of a shape (`a:prstGeom/@prst`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    RoundRectangle,
    Ellipse,
    Triangle,
    Diamond,
    Pentagon,
    Hexagon,
    Octagon,
    Star5,
}

impl ShapeKind {
    pub fn preset(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rect",
            ShapeKind::RoundRectangle => "roundRect",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Octagon => "octagon",
            ShapeKind::Star5 => "star5",
        }
    }

    pub fn from_preset(preset: &str) -> Option<Self> {
        match preset {
            "rect" => Some(ShapeKind::Rectangle),
            "roundRect" => Some(ShapeKind::RoundRectangle),
            "ellipse" => Some(ShapeKind::Ellipse),
            "triangle" => Some(ShapeKind::Triangle),
            "diamond" => Some(ShapeKind::Diamond),
            "pentagon" => Some(ShapeKind::Pentagon),
            "hexagon" => Some(ShapeKind::Hexagon),
            "octagon" => Some(ShapeKind::Octagon),
            "star5" => Some(ShapeKind::Star5),
            _ => None,
        }
    }
}

/// A vector shape positioned relative to its paragraph
///
/// Position and size are layout units (pixels at 96 dpi).
#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub(crate) node: Option<NodeId>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub kind: ShapeKind,
    source: Option<Box<Source>>,
}

/// Markup a shape was loaded from, with the geometry it held
#[derive(Clone, Debug)]
struct Source {
    paragraph: Paragraph,
    geometry: (i32, i32, u32, u32, ShapeKind),
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.geometry() == other.geometry()
    }
}

impl Shape {
    pub fn new(x: i32, y: i32, width: u32, height: u32, kind: ShapeKind) -> Self {
        Shape {
            x,
            y,
            width,
            height,
            kind,
            ..Default::default()
        }
    }

    /// Recognise a shape paragraph
    pub(crate) fn from_paragraph(para: &Paragraph) -> Option<Self> {
        let drawing = drawing::sole_drawing(para)?;
        let placement = drawing::placement(drawing)?;
        let wsp = placement.find("graphicData")?.child("wsp")?;
        if wsp.find("txbx").is_some() {
            return None;
        }
        let kind = ShapeKind::from_preset(wsp.find("prstGeom")?.attr("prst")?)?;
        let (cx, cy) = drawing::extent(placement)?;

        let mut shape = Shape::new(
            offset(placement, "positionH")?,
            offset(placement, "positionV")?,
            u32::try_from(cx).ok()?,
            u32::try_from(cy).ok()?,
            kind,
        );
        shape.source = Some(Box::new(Source {
            paragraph: para.clone(),
            geometry: shape.geometry(),
        }));
        Some(shape)
    }

    fn geometry(&self) -> (i32, i32, u32, u32, ShapeKind) {
        (self.x, self.y, self.width, self.height, self.kind)
    }

    /// Write as a shape paragraph; `drawing_id` is used when the markup has
    /// to be generated
    pub(crate) fn write_to<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        drawing_id: u32,
    ) -> Result<()> {
        if let Some(paragraph) = self.pristine_markup() {
            return paragraph.write_to(writer);
        }
        let template = self.source.as_deref().map(|s| &s.paragraph);
        drawing::wrap(self.drawing(drawing_id), template).write_to(writer)
    }

    /// The loaded paragraph, while the geometry is unchanged
    pub(crate) fn pristine_markup(&self) -> Option<&Paragraph> {
        self.source
            .as_deref()
            .filter(|s| s.geometry == self.geometry())
            .map(|s| &s.paragraph)
    }

    fn drawing(&self, drawing_id: u32) -> RawXmlElement {
        let (width, height) = (i64::from(self.width), i64::from(self.height));

        let wsp = RawXmlElement::new("wps:wsp")
            .with_attr("xmlns:wps", xml::WPS)
            .with_child(RawXmlElement::new("wps:cNvSpPr").empty())
            .with_child(
                RawXmlElement::new("wps:spPr")
                    .with_child(drawing::xfrm(0, 0, width, height))
                    .with_child(drawing::preset_geometry(self.kind.preset()))
                    .with_child(solid_fill("FFFFFF"))
                    .with_child(RawXmlElement::new("a:ln").with_child(solid_fill("000000"))),
            )
            .with_child(
                RawXmlElement::new("wps:bodyPr")
                    .with_attr("anchor", "ctr")
                    .empty(),
            );

        let [extent, effect_extent] = drawing::extent_elements(width, height);
        let anchor = RawXmlElement::new("wp:anchor")
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_attr("simplePos", "0")
            .with_attr("relativeHeight", drawing_id.to_string())
            .with_attr("behindDoc", "0")
            .with_attr("locked", "0")
            .with_attr("layoutInCell", "1")
            .with_attr("allowOverlap", "1")
            .with_child(
                RawXmlElement::new("wp:simplePos")
                    .with_attr("x", "0")
                    .with_attr("y", "0")
                    .empty(),
            )
            .with_child(position("wp:positionH", "column", self.x))
            .with_child(position("wp:positionV", "paragraph", self.y))
            .with_child(extent)
            .with_child(effect_extent)
            .with_child(RawXmlElement::new("wp:wrapNone").empty())
            .with_child(drawing::doc_pr(drawing_id, "Shape"))
            .with_child(RawXmlElement::new("wp:cNvGraphicFramePr").empty())
            .with_child(
                RawXmlElement::new("a:graphic")
                    .with_attr("xmlns:a", xml::A)
                    .with_child(
                        RawXmlElement::new("a:graphicData")
                            .with_attr("uri", xml::GRAPHIC_SHAPE)
                            .with_child(wsp),
                    ),
            );

        RawXmlElement::new("w:drawing").with_child(anchor)
    }
}

fn position(name: &str, relative_from: &str, units: i32) -> RawXmlElement {
    RawXmlElement::new(name)
        .with_attr("relativeFrom", relative_from)
        .with_child(
            RawXmlElement::new("wp:posOffset")
                .with_text(drawing::to_emu(i64::from(units)).to_string()),
        )
}

fn solid_fill(rgb: &str) -> RawXmlElement {
    RawXmlElement::new("a:solidFill").with_child(
        RawXmlElement::new("a:srgbClr")
            .with_attr("val", rgb)
            .empty(),
    )
}

/// Offset along one axis; inline drawings and aligned anchors sit at 0
fn offset(placement: &RawXmlElement, axis: &str) -> Option<i32> {
    match placement.child(axis).and_then(|p| p.child("posOffset")) {
        Some(pos) => i32::try_from(drawing::from_emu(&pos.text())?).ok(),
        None => Some(0),
    }
}
