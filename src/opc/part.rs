//! Part representation for OPC packages

use crate::opc::{PartUri, Relationships};

/// A part within an OPC package
#[derive(Clone, Debug)]
pub struct Part {
    uri: PartUri,
    content_type: String,
    data: Vec<u8>,
    relationships: Option<Relationships>,
    modified: bool,
}

impl Part {
    /// Create a new part
    pub fn new(uri: PartUri, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            uri,
            content_type: content_type.into(),
            data,
            relationships: None,
            modified: false,
        }
    }

    /// Get the part URI
    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    /// Get the content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Get the raw data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get data as UTF-8 string
    pub fn data_as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// XML content of the part, without a leading byte order mark
    pub fn xml_text(&self) -> crate::Result<&str> {
        Ok(self.data_as_str()?.trim_start_matches('\u{feff}'))
    }

    /// Replace the data; a no-op when the bytes are identical
    pub fn set_data(&mut self, data: Vec<u8>) {
        if self.data != data {
            self.data = data;
            self.modified = true;
        }
    }

    /// Get relationships
    pub fn relationships(&self) -> Option<&Relationships> {
        self.relationships.as_ref()
    }

    /// Set relationships
    pub fn set_relationships(&mut self, rels: Relationships) {
        self.relationships = Some(rels);
    }

    /// Relationships of this part, created empty if absent
    pub fn ensure_relationships(&mut self) -> &mut Relationships {
        self.relationships.get_or_insert_with(Relationships::new)
    }

    /// Whether the data changed since the part was loaded
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_part(data: &[u8]) -> Part {
        Part::new(
            PartUri::new("/word/styles.xml").unwrap(),
            "application/xml",
            data.to_vec(),
        )
    }

    #[test]
    fn test_set_identical_data_is_not_a_change() {
        let mut part = xml_part(b"<w:styles/>");
        part.set_data(b"<w:styles/>".to_vec());
        assert!(!part.is_modified());

        part.set_data(b"<w:styles></w:styles>".to_vec());
        assert!(part.is_modified());
    }

    #[test]
    fn test_xml_text_strips_bom() {
        let part = xml_part("\u{feff}<w:styles/>".as_bytes());
        assert_eq!(part.xml_text().unwrap(), "<w:styles/>");

        let err = xml_part(&[0xFF, 0xFE, 0x00]).xml_text().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptArchive);
    }

    #[test]
    fn test_ensure_relationships() {
        let mut part = xml_part(b"<w:document/>");
        assert!(part.relationships().is_none());
        let id = part.ensure_relationships().add("urn:test", "media/image1.png");
        assert_eq!(part.relationships().and_then(|r| r.get(&id)).map(|r| r.target.as_str()), Some("media/image1.png"));
    }
}
