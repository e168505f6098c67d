//! Inline pictures
//!
//! An image is a body paragraph whose only content is a `w:drawing` with a
//! `pic:pic`. The picture bytes live in their own package part, reached
//! through the relationship id in `a:blip/@r:embed`.

use crate::document::drawing;
use crate::document::node::NodeId;
use crate::document::Paragraph;
use crate::error::{Error, Result};
use crate::opc::content_types;
use crate::xml::{self, RawXmlElement};
use quick_xml::Writer;

/// Encoded raster format, sniffed from the leading bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from a file signature
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }

    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        content_types::image_content_type(self.extension())
    }
}

/// An inline picture with its encoded bytes and display size
///
/// Height and width are layout units (pixels at 96 dpi); the bytes are
/// never decoded.
#[derive(Clone, Debug, Default)]
pub struct Image {
    pub(crate) node: Option<NodeId>,
    data: Vec<u8>,
    height: u32,
    width: u32,
    /// Relationship to the media part; cleared when the bytes change
    pub(crate) rel_id: Option<String>,
    source: Option<Box<Source>>,
}

/// Markup an image was loaded from, with the values it held
#[derive(Clone, Debug)]
struct Source {
    paragraph: Paragraph,
    height: u32,
    width: u32,
    rel_id: String,
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.height == other.height && self.width == other.width
    }
}

impl Image {
    /// Create an image from encoded bytes and a display size
    pub fn new(data: Vec<u8>, height: u32, width: u32) -> Self {
        Image {
            data,
            height,
            width,
            ..Default::default()
        }
    }

    /// Recognise a picture paragraph
    ///
    /// The bytes are not available here; the document fills them in from
    /// the part [`Image::embed_id`] points at.
    pub(crate) fn from_paragraph(para: &Paragraph) -> Option<Self> {
        let drawing = drawing::sole_drawing(para)?;
        let placement = drawing::placement(drawing)?;
        let pic = placement.find("graphicData")?.child("pic")?;
        let rel_id = pic.find("blip")?.attr("r:embed")?.to_string();
        let (cx, cy) = drawing::extent(placement)?;
        let width = u32::try_from(cx).ok()?;
        let height = u32::try_from(cy).ok()?;

        Some(Image {
            node: None,
            data: Vec::new(),
            height,
            width,
            rel_id: Some(rel_id.clone()),
            source: Some(Box::new(Source {
                paragraph: para.clone(),
                height,
                width,
                rel_id,
            })),
        })
    }

    /// Encoded image bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the bytes; the next save stores them in a new media part
    pub fn set_data(&mut self, data: Vec<u8>) {
        if data != self.data {
            self.data = data;
            self.rel_id = None;
        }
    }

    pub(crate) fn load_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    /// Format sniffed from the bytes, `None` if unrecognised
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::detect(&self.data)
    }

    /// Relationship id of the media part, once the image has one
    pub fn embed_id(&self) -> Option<&str> {
        self.rel_id.as_deref()
    }

    /// Forget the media part, e.g. when the image moves to another document
    pub(crate) fn detach(&mut self) {
        self.rel_id = None;
        self.source = None;
    }

    /// The loaded paragraph, while nothing it encodes has changed
    pub(crate) fn pristine_markup(&self) -> Option<&Paragraph> {
        self.source
            .as_deref()
            .filter(|s| {
                s.height == self.height
                    && s.width == self.width
                    && self.rel_id.as_deref() == Some(s.rel_id.as_str())
            })
            .map(|s| &s.paragraph)
    }

    /// Write as a picture paragraph; `drawing_id` is used when the markup
    /// has to be generated
    pub(crate) fn write_to<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        drawing_id: u32,
    ) -> Result<()> {
        let rel_id = self
            .rel_id
            .as_deref()
            .ok_or_else(|| Error::InvalidElement("image has no media part".into()))?;

        if let Some(paragraph) = self.pristine_markup() {
            return paragraph.write_to(writer);
        }

        let template = self.source.as_deref().map(|s| &s.paragraph);
        drawing::wrap(self.drawing(rel_id, drawing_id), template).write_to(writer)
    }

    fn drawing(&self, rel_id: &str, drawing_id: u32) -> RawXmlElement {
        let (width, height) = (i64::from(self.width), i64::from(self.height));
        let name = format!(
            "image{}.{}",
            drawing_id,
            self.format().map_or("bin", |f| f.extension())
        );

        let pic = RawXmlElement::new("pic:pic")
            .with_attr("xmlns:pic", xml::PIC)
            .with_child(
                RawXmlElement::new("pic:nvPicPr")
                    .with_child(
                        RawXmlElement::new("pic:cNvPr")
                            .with_attr("id", "0")
                            .with_attr("name", name)
                            .empty(),
                    )
                    .with_child(RawXmlElement::new("pic:cNvPicPr").empty()),
            )
            .with_child(
                RawXmlElement::new("pic:blipFill")
                    .with_child(
                        RawXmlElement::new("a:blip")
                            .with_attr("r:embed", rel_id)
                            .empty(),
                    )
                    .with_child(
                        RawXmlElement::new("a:stretch")
                            .with_child(RawXmlElement::new("a:fillRect").empty()),
                    ),
            )
            .with_child(
                RawXmlElement::new("pic:spPr")
                    .with_child(drawing::xfrm(0, 0, width, height))
                    .with_child(drawing::preset_geometry("rect")),
            );

        let [extent, effect_extent] = drawing::extent_elements(width, height);
        let inline = RawXmlElement::new("wp:inline")
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_child(extent)
            .with_child(effect_extent)
            .with_child(drawing::doc_pr(drawing_id, "Picture"))
            .with_child(
                RawXmlElement::new("wp:cNvGraphicFramePr").with_child(
                    RawXmlElement::new("a:graphicFrameLocks")
                        .with_attr("xmlns:a", xml::A)
                        .with_attr("noChangeAspect", "1")
                        .empty(),
                ),
            )
            .with_child(
                RawXmlElement::new("a:graphic")
                    .with_attr("xmlns:a", xml::A)
                    .with_child(
                        RawXmlElement::new("a:graphicData")
                            .with_attr("uri", xml::GRAPHIC_PICTURE)
                            .with_child(pic),
                    ),
            );

        RawXmlElement::new("w:drawing").with_child(inline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quick_xml::events::Event;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    fn write(image: &Image) -> String {
        let mut writer = Writer::new(Vec::new());
        image.write_to(&mut writer, 3).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn parse_paragraph(xml: &str) -> Paragraph {
        let mut reader = crate::xml::part_reader(xml);
        let mut buf = Vec::new();
        loop {
            if let Event::Start(e) = reader.read_event_into(&mut buf).unwrap() {
                return Paragraph::from_reader(&mut reader, &e.into_owned()).unwrap();
            }
            buf.clear();
        }
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(PNG), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"BM\0\0"), Some(ImageFormat::Bmp));
        assert_eq!(
            ImageFormat::detect(&[0x4D, 0x4D, 0x00, 0x2A]),
            Some(ImageFormat::Tiff)
        );
        assert_eq!(ImageFormat::detect(b"plain text"), None);
        assert_eq!(ImageFormat::Jpeg.content_type(), "image/jpeg");
    }

    #[test]
    fn test_write_without_media_part_fails() {
        let image = Image::new(PNG.to_vec(), 10, 20);
        let mut writer = Writer::new(Vec::new());
        let err = image.write_to(&mut writer, 1).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_generated_markup_reads_back() {
        let mut image = Image::new(PNG.to_vec(), 300, 350);
        image.rel_id = Some("rId9".into());

        let xml = write(&image);
        assert!(xml.contains(r#"<wp:extent cx="3333750" cy="2857500"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId9"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="3" name="Picture 3"/>"#));

        let read = Image::from_paragraph(&parse_paragraph(&xml)).unwrap();
        assert_eq!(read.height(), 300);
        assert_eq!(read.width(), 350);
        assert_eq!(read.embed_id(), Some("rId9"));
    }

    #[test]
    fn test_untouched_image_keeps_markup() {
        let xml = r#"<w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing><wp:anchor><wp:extent cx="952500" cy="1905000"/><wp:docPr id="42" name="Logo" descr="company logo"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="rId4"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:anchor></w:drawing></w:r></w:p>"#;
        let image = Image::from_paragraph(&parse_paragraph(xml)).unwrap();
        assert_eq!((image.height(), image.width()), (200, 100));
        assert_eq!(write(&image), xml);

        let mut resized = image.clone();
        resized.set_height(50);
        let redrawn = write(&resized);
        assert!(redrawn.starts_with(r#"<w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/></w:pPr>"#));
        assert!(redrawn.contains(r#"cy="476250""#));
    }

    #[test]
    fn test_set_data_drops_media_part() {
        let mut image = Image::new(PNG.to_vec(), 1, 1);
        image.rel_id = Some("rId1".into());

        image.set_data(PNG.to_vec());
        assert_eq!(image.embed_id(), Some("rId1"));

        image.set_data(vec![0xFF, 0xD8, 0xFF, 0xDB]);
        assert_eq!(image.embed_id(), None);
        assert_eq!(image.format(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_text_paragraph_is_not_an_image() {
        assert!(Image::from_paragraph(&Paragraph::with_text("hello")).is_none());
    }
}
