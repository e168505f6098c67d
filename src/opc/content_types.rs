//! Content Types handling for OPC packages
//!
//! Parses and generates `[Content_Types].xml`

use crate::error::{Error, Result};
use crate::opc::PartUri;
use crate::xml::CT;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Content types definition for an OPC package
///
/// Entries keep the order in which they were read or added. When nothing
/// changed since parsing, the original bytes are written back unchanged.
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    /// Default extension mappings (extension -> content type)
    defaults: Vec<(String, String)>,
    /// Override mappings (part URI -> content type)
    overrides: Vec<(PartUri, String)>,
    /// Source text, dropped on first mutation
    source: Option<String>,
}

impl ContentTypes {
    /// Create a new ContentTypes with the defaults a word document needs
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", RELATIONSHIPS);
        ct.add_default("xml", XML);
        ct
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut ct = Self::default();
        let mut buf = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"Types" => saw_root = true,
                    b"Default" => {
                        let ext = required_attr(&e, "Extension")?;
                        let content_type = required_attr(&e, "ContentType")?;
                        ct.defaults.push((ext.to_ascii_lowercase(), content_type));
                    }
                    b"Override" => {
                        let part_name = required_attr(&e, "PartName")?;
                        let content_type = required_attr(&e, "ContentType")?;
                        ct.overrides.push((PartUri::new(&part_name)?, content_type));
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(Error::UnsupportedSchema(
                "[Content_Types].xml has no Types element".into(),
            ));
        }

        ct.source = Some(xml.to_string());
        Ok(ct)
    }

    /// Serialize to XML bytes
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        if let Some(source) = &self.source {
            writer.write_all(source.as_bytes())?;
            return Ok(());
        }

        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut types = BytesStart::new("Types");
        types.push_attribute(("xmlns", CT));
        xml.write_event(Event::Start(types))?;

        for (ext, content_type) in &self.defaults {
            let mut default = BytesStart::new("Default");
            default.push_attribute(("Extension", ext.as_str()));
            default.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(default))?;
        }

        for (uri, content_type) in &self.overrides {
            let mut override_elem = BytesStart::new("Override");
            override_elem.push_attribute(("PartName", uri.as_str()));
            override_elem.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(override_elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Types")))?;
        Ok(())
    }

    /// Add (or replace) a default extension mapping
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.to_ascii_lowercase();
        match self.defaults.iter_mut().find(|(e, _)| *e == extension) {
            Some((_, ct)) if ct == content_type => return,
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self.defaults.push((extension, content_type.to_string())),
        }
        self.source = None;
    }

    /// Add (or replace) an override for a specific part
    pub fn add_override(&mut self, uri: &PartUri, content_type: &str) {
        match self.overrides.iter_mut().find(|(u, _)| u == uri) {
            Some((_, ct)) if ct == content_type => return,
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self.overrides.push((uri.clone(), content_type.to_string())),
        }
        self.source = None;
    }

    /// Register `content_type` for `uri`, preferring an extension default
    /// when the extension is not already mapped to something else
    pub fn register(&mut self, uri: &PartUri, content_type: &str) {
        if let Some(ext) = uri.extension() {
            match self.default_for(&ext) {
                Some(existing) if existing == content_type => return,
                None if content_type.starts_with("image/") => {
                    self.add_default(&ext, content_type);
                    return;
                }
                _ => {}
            }
        }
        self.add_override(uri, content_type);
    }

    /// Get the content type for a part
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        if let Some((_, ct)) = self.overrides.iter().find(|(u, _)| u == uri) {
            return Some(ct);
        }
        uri.extension().and_then(|ext| self.default_for(&ext))
    }

    fn default_for(&self, ext: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(e, _)| e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Remove an override
    pub fn remove_override(&mut self, uri: &PartUri) -> Option<String> {
        let pos = self.overrides.iter().position(|(u, _)| u == uri)?;
        self.source = None;
        Some(self.overrides.remove(pos).1)
    }
}

fn required_attr(element: &BytesStart, name: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.to_string());
        }
    }
    Err(Error::MissingAttribute {
        element: String::from_utf8_lossy(element.name().as_ref()).to_string(),
        attr: name.to_string(),
    })
}

/// Content type for an image file extension
pub fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

// Well-known content types
pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const XML: &str = "application/xml";
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
pub const FONT_TABLE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.fontTable+xml";
pub const SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub const EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";
