//! XML namespaces used in OOXML

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Drawing namespace
pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main namespace
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Pictures namespace
pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Word 2010 shapes namespace
pub const WPS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";
/// Markup compatibility namespace
pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
/// Word 2010 drawing extensions namespace
pub const WP14: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing";
/// Content Types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package Relationships namespace
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
/// Core Properties namespace (Dublin Core)
pub const CP: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
/// Dublin Core namespace
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
/// Dublin Core Terms namespace
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
/// Extended properties namespace
pub const EP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

/// Graphic data URI for pictures
pub const GRAPHIC_PICTURE: &str = PIC;
/// Graphic data URI for Word shapes
pub const GRAPHIC_SHAPE: &str = WPS;

/// Standard namespace declarations for document.xml
pub fn document_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![
        ("xmlns:mc", MC),
        ("xmlns:w", W),
        ("xmlns:r", R),
        ("xmlns:wp", WP),
        ("xmlns:wp14", WP14),
        ("xmlns:a", A),
        ("xmlns:pic", PIC),
        ("xmlns:wps", WPS),
        ("mc:Ignorable", "wp14"),
    ]
}
