//! Document body and block-level content

use crate::document::drawing;
use crate::document::node::NodeId;
use crate::document::{Image, Paragraph, Shape, Table};
use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Block-level content in a document body
#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Paragraph(Paragraph),
    Table(Table),
    /// Paragraph holding a single inline picture
    Image(Image),
    /// Paragraph holding a single preset shape
    Shape(Shape),
    /// Unknown element (preserved for round-trip)
    Unknown(RawXmlNode),
}

/// Document body (w:body)
#[derive(Clone, Debug, Default)]
pub struct Body {
    /// Block-level content in document order
    pub content: Vec<BlockContent>,
    /// Section properties (last sectPr in body)
    pub section_properties: Option<RawXmlNode>,
}

impl Body {
    /// Parse body from XML reader (after w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"p" => {
                        let para = Paragraph::from_reader(reader, &e)?;
                        body.content.push(BlockContent::from_paragraph(para));
                    }
                    b"tbl" => {
                        let table = Table::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Table(table));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"p" => {
                        let para = Paragraph::from_empty(&e);
                        body.content.push(BlockContent::Paragraph(para));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_empty(&e);
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"body" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    /// Write body to XML writer
    ///
    /// Drawings generated on the way get `wp:docPr` ids above every id
    /// already present in the body.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        let mut next_drawing_id = self.max_drawing_id() + 1;
        for content in &self.content {
            let redrawn = match content {
                BlockContent::Image(image) => image.pristine_markup().is_none(),
                BlockContent::Shape(shape) => shape.pristine_markup().is_none(),
                _ => false,
            };
            match content {
                BlockContent::Image(image) => image.write_to(writer, next_drawing_id)?,
                BlockContent::Shape(shape) => shape.write_to(writer, next_drawing_id)?,
                other => other.write_to(writer)?,
            }
            if redrawn {
                next_drawing_id += 1;
            }
        }

        if let Some(sect_pr) = &self.section_properties {
            sect_pr.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }

    /// Position of the block carrying `id`
    pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
        self.content.iter().position(|c| c.node_id() == Some(id))
    }

    fn max_drawing_id(&self) -> u32 {
        self.content
            .iter()
            .map(|block| match block {
                BlockContent::Paragraph(p) => drawing::max_doc_pr_id(p),
                BlockContent::Table(t) => t
                    .rows()
                    .flat_map(|r| r.cells())
                    .flat_map(|c| c.paragraphs())
                    .map(drawing::max_doc_pr_id)
                    .max()
                    .unwrap_or(0),
                BlockContent::Image(i) => i.pristine_markup().map_or(0, drawing::max_doc_pr_id),
                BlockContent::Shape(s) => s.pristine_markup().map_or(0, drawing::max_doc_pr_id),
                BlockContent::Unknown(RawXmlNode::Element(e)) => {
                    drawing::max_doc_pr_id_in(e).unwrap_or(0)
                }
                BlockContent::Unknown(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

impl BlockContent {
    /// Classify a body paragraph as picture, shape, or plain paragraph
    pub(crate) fn from_paragraph(para: Paragraph) -> Self {
        if let Some(image) = Image::from_paragraph(&para) {
            BlockContent::Image(image)
        } else if let Some(shape) = Shape::from_paragraph(&para) {
            BlockContent::Shape(shape)
        } else {
            BlockContent::Paragraph(para)
        }
    }

    /// Identity of the element, if it is one the document hands out
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            BlockContent::Paragraph(p) => p.node,
            BlockContent::Table(t) => t.node,
            BlockContent::Image(i) => i.node,
            BlockContent::Shape(s) => s.node,
            BlockContent::Unknown(_) => None,
        }
    }

    pub(crate) fn set_node_id(&mut self, id: NodeId) {
        match self {
            BlockContent::Paragraph(p) => p.node = Some(id),
            BlockContent::Table(t) => t.node = Some(id),
            BlockContent::Image(i) => i.node = Some(id),
            BlockContent::Shape(s) => s.node = Some(id),
            BlockContent::Unknown(_) => {}
        }
    }

    /// Write to XML writer
    ///
    /// Images and shapes written on their own get drawing id 1; the body
    /// writer hands out unique ids instead.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BlockContent::Paragraph(para) => para.write_to(writer),
            BlockContent::Table(table) => table.write_to(writer),
            BlockContent::Image(image) => image.write_to(writer, 1),
            BlockContent::Shape(shape) => shape.write_to(writer, 1),
            BlockContent::Unknown(node) => node.write_to(writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ShapeKind;
    use pretty_assertions::assert_eq;

    fn parse(markup: &str) -> Body {
        let mut reader = crate::xml::part_reader(markup);
        let mut buf = Vec::new();
        loop {
            if let Event::Start(_) = reader.read_event_into(&mut buf).unwrap() {
                return Body::from_reader(&mut reader).unwrap();
            }
            buf.clear();
        }
    }

    fn write(body: &Body) -> String {
        let mut writer = Writer::new(Vec::new());
        body.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_blocks_keep_order_and_section() {
        let markup = r#"<w:body><w:p><w:r><w:t>one</w:t></w:r></w:p><w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/></w:tblPr><w:tblGrid><w:gridCol w:w="100"/></w:tblGrid><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl><w:bookmarkEnd w:id="0"/><w:p/><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body>"#;
        let body = parse(markup);

        assert_eq!(body.content.len(), 4);
        assert!(matches!(body.content[0], BlockContent::Paragraph(_)));
        assert!(matches!(body.content[1], BlockContent::Table(_)));
        assert!(matches!(body.content[2], BlockContent::Unknown(_)));
        assert!(body.section_properties.is_some());
        assert_eq!(write(&body), markup);
    }

    #[test]
    fn test_generated_drawings_get_fresh_ids() {
        let mut body = Body::default();
        body.content.push(BlockContent::Shape(Shape::new(0, 0, 5, 5, ShapeKind::Star5)));
        body.content.push(BlockContent::Shape(Shape::new(0, 0, 5, 5, ShapeKind::Octagon)));

        let first = write(&body);
        assert!(first.contains(r#"<wp:docPr id="1" name="Shape 1"/>"#));
        assert!(first.contains(r#"<wp:docPr id="2" name="Shape 2"/>"#));

        let mut reread = parse(&first);
        assert!(matches!(reread.content[0], BlockContent::Shape(_)));
        reread.content.push(BlockContent::Shape(Shape::new(1, 1, 5, 5, ShapeKind::Ellipse)));
        assert!(write(&reread).contains(r#"<wp:docPr id="3" name="Shape 3"/>"#));
    }
}
