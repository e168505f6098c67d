//! OPC Package implementation
//!
//! Handles reading and writing DOCX files as ZIP packages

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{ContentTypes, Part, PartUri, Relationships};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const PACKAGE_RELS_ENTRY: &str = "_rels/.rels";

/// Compression applied to every entry when a package is written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// Deflate (what word processors write)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// An OPC package (ZIP-based container for DOCX)
///
/// Parts are kept in archive order; parts added later are appended.
#[derive(Debug, Default)]
pub struct Package {
    parts: Vec<Part>,
    index: HashMap<PartUri, usize>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Create a new empty package
    pub fn new() -> Self {
        Self {
            content_types: ContentTypes::new(),
            ..Default::default()
        }
    }

    /// Create the default word-processing package
    pub fn create_default() -> Self {
        super::template::default_package()
    }

    /// Open a package from a file path
    ///
    /// The file handle is released before this returns, on success or failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        debug!("opening package {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let content_types = ContentTypes::from_xml(&read_entry_string(
            &mut archive,
            CONTENT_TYPES_ENTRY,
        )?
        .ok_or_else(|| Error::MissingPart(CONTENT_TYPES_ENTRY.into()))?)?;

        let relationships = match read_entry_string(&mut archive, PACKAGE_RELS_ENTRY)? {
            Some(xml) => Relationships::from_xml(&xml)?,
            None => Relationships::new(),
        };

        let mut package = Self {
            parts: Vec::new(),
            index: HashMap::new(),
            relationships,
            content_types,
        };

        package.read_parts(&mut archive)?;
        package.read_part_relationships(&mut archive)?;

        debug!(
            "loaded package with {} parts and {} package relationships",
            package.parts.len(),
            package.relationships.len()
        );
        Ok(package)
    }

    /// Save the package to a file
    ///
    /// The archive is first written to a uniquely named temporary file next
    /// to `path`, which then replaces `path`. If anything fails the temporary
    /// file is removed and `path` is left as it was.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_with(path, Compression::default())
    }

    /// Save the package to a file with explicit compression
    pub fn save_with<P: AsRef<Path>>(&self, path: P, compression: Compression) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            self.write_to(&mut writer, compression)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        debug!("saved package to {}", path.display());
        Ok(())
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(Compression::default())
    }

    /// Save the package to bytes with explicit compression
    pub fn to_bytes_with(&self, compression: Compression) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor, compression)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W, compression: Compression) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(compression.method());

        zip.start_file(CONTENT_TYPES_ENTRY, options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(PACKAGE_RELS_ENTRY, options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for part in &self.parts {
            trace!(
                "writing part {} ({} bytes{})",
                part.uri(),
                part.data().len(),
                if part.is_modified() { ", modified" } else { "" }
            );
            zip.start_file(part.uri().zip_name(), options)?;
            zip.write_all(part.data())?;

            if let Some(rels) = part.relationships().filter(|r| !r.is_empty()) {
                zip.start_file(part.uri().relationships_uri().zip_name(), options)?;
                rels.write_to(&mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.index.get(uri).map(|&i| &self.parts[i])
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        let i = *self.index.get(uri)?;
        self.parts.get_mut(i)
    }

    /// Add a part, replacing the data of an existing part with the same URI
    ///
    /// A replaced part keeps its position and relationships.
    pub fn add_part(&mut self, part: Part) {
        let uri = part.uri().clone();
        self.content_types.register(&uri, part.content_type());

        match self.index.get(&uri) {
            Some(&i) => {
                let existing = &mut self.parts[i];
                existing.set_data(part.data().to_vec());
                if let Some(rels) = part.relationships() {
                    existing.set_relationships(rels.clone());
                }
            }
            None => {
                self.index.insert(uri, self.parts.len());
                self.parts.push(part);
            }
        }
    }

    /// Remove a part from the package
    pub fn remove_part(&mut self, uri: &PartUri) -> Option<Part> {
        let i = self.index.remove(uri)?;
        self.content_types.remove_override(uri);
        let part = self.parts.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(part)
    }

    /// Get all parts in archive order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get mutable package-level relationships
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Get a part by relationship type from package relationships
    pub fn part_by_rel_type(&self, rel_type: &str) -> Option<&Part> {
        let rel = self.relationships.by_type(rel_type)?;
        let uri = PartUri::new(&rel.target).ok()?;
        self.part(&uri)
    }

    /// URI of the main document part
    pub fn main_document_uri(&self) -> Option<PartUri> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        PartUri::new(&rel.target).ok()
    }

    /// Get the main document part
    pub fn main_document_part(&self) -> Option<&Part> {
        self.part_by_rel_type(rel_types::OFFICE_DOCUMENT)
    }

    /// Get a part related to the main document by relationship type
    pub fn document_part_by_rel_type(&self, rel_type: &str) -> Option<&Part> {
        let main = self.main_document_part()?;
        let rel = main.relationships()?.by_type(rel_type)?;
        match main.uri().resolve(&rel.target) {
            Ok(uri) => self.part(&uri),
            Err(e) => {
                warn!("unresolvable relationship target '{}': {}", rel.target, e);
                None
            }
        }
    }

    /// First unused `/word/media/imageN.ext` URI
    pub fn next_media_uri(&self, ext: &str) -> PartUri {
        let mut n = 1;
        loop {
            let uri = super::well_known::media(n, ext);
            if !self.index.contains_key(&uri) {
                return uri;
            }
            n += 1;
        }
    }

    /// Whether any internal relationship in the package targets `uri`
    pub fn is_targeted(&self, uri: &PartUri) -> bool {
        let from_root = self
            .relationships
            .iter()
            .filter_map(|r| PartUri::new(&r.target).ok())
            .any(|t| &t == uri);
        from_root
            || self.parts.iter().any(|part| {
                part.relationships().is_some_and(|rels| {
                    rels.iter()
                        .filter(|r| r.target_mode == crate::opc::TargetMode::Internal)
                        .filter_map(|r| part.uri().resolve(&r.target).ok())
                        .any(|t| &t == uri)
                })
            })
    }

    // === Private methods ===

    fn read_parts<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if file.is_dir() || name == CONTENT_TYPES_ENTRY {
                continue;
            }

            let uri = PartUri::new(&name)?;
            if uri.is_relationships() {
                continue;
            }

            let content_type = match self.content_types.get(&uri) {
                Some(ct) => ct.to_string(),
                None => {
                    warn!("part {} has no content type", uri);
                    "application/octet-stream".to_string()
                }
            };

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            trace!("read part {} ({} bytes)", uri, data.len());

            self.index.insert(uri.clone(), self.parts.len());
            self.parts.push(Part::new(uri, content_type, data));
        }

        Ok(())
    }

    fn read_part_relationships<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
    ) -> Result<()> {
        for part in &mut self.parts {
            let rels_uri = part.uri().relationships_uri();
            if let Some(xml) = read_entry_string(archive, rels_uri.zip_name())? {
                trace!("read relationships for {}", part.uri());
                part.set_relationships(Relationships::from_xml(&xml)?);
            }
        }
        Ok(())
    }
}

/// Read a zip entry as UTF-8 text, `None` if the entry does not exist
fn read_entry_string<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let text = std::str::from_utf8(&bytes)?;
    Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::well_known;
    use std::fs;

    #[test]
    fn test_new_package() {
        let pkg = Package::new();
        assert_eq!(pkg.parts().count(), 0);
        assert!(pkg.relationships().is_empty());
    }

    #[test]
    fn test_add_part_replaces_in_place() {
        let mut pkg = Package::new();
        let a = PartUri::new("/word/a.xml").unwrap();
        let b = PartUri::new("/word/b.xml").unwrap();
        pkg.add_part(Part::new(a.clone(), "application/xml", b"<a/>".to_vec()));
        pkg.add_part(Part::new(b.clone(), "application/xml", b"<b/>".to_vec()));
        pkg.add_part(Part::new(a.clone(), "application/xml", b"<a2/>".to_vec()));

        let order: Vec<&str> = pkg.parts().map(|p| p.uri().as_str()).collect();
        assert_eq!(order, vec!["/word/a.xml", "/word/b.xml"]);
        assert_eq!(pkg.part(&a).unwrap().data(), b"<a2/>");
        assert!(pkg.part(&a).unwrap().is_modified());
    }

    #[test]
    fn test_remove_part_keeps_index_consistent() {
        let mut pkg = Package::create_default();
        assert!(pkg.remove_part(&well_known::styles()).is_some());
        assert!(pkg.part(&well_known::styles()).is_none());
        assert!(pkg.part(&well_known::numbering()).is_some());
        assert!(pkg.part(&well_known::app_props()).is_some());
    }

    #[test]
    fn test_roundtrip_preserves_order_and_bytes() {
        let pkg = Package::create_default();
        let bytes = pkg.to_bytes().unwrap();
        let reloaded = Package::from_bytes(&bytes).unwrap();

        let before: Vec<(&str, &[u8])> = pkg.parts().map(|p| (p.uri().as_str(), p.data())).collect();
        let after: Vec<(&str, &[u8])> = reloaded
            .parts()
            .map(|p| (p.uri().as_str(), p.data()))
            .collect();
        assert_eq!(before, after);
        assert!(reloaded.main_document_part().is_some());
    }

    #[test]
    fn test_stored_compression_roundtrip() {
        let pkg = Package::create_default();
        let stored = pkg.to_bytes_with(Compression::Stored).unwrap();
        let deflated = pkg.to_bytes().unwrap();
        assert!(stored.len() > deflated.len());
        assert!(Package::from_bytes(&stored).is_ok());
    }

    #[test]
    fn test_missing_content_types() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            zip.start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<w:document/>").unwrap();
            zip.finish().unwrap();
        }
        let err = Package::from_bytes(cursor.get_ref()).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
        assert_eq!(err.kind(), crate::ErrorKind::CorruptArchive);
    }

    #[test]
    fn test_not_a_zip() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptArchive);
    }

    #[test]
    fn test_open_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Package::open(dir.path().join("absent.docx")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[test]
    fn test_save_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let pkg = Package::create_default();

        pkg.save(&path).unwrap();
        pkg.save(&path).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.docx")]);
        assert!(Package::open(&path).is_ok());
    }

    #[test]
    fn test_concurrent_saves_to_one_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.docx");
        let first = Package::create_default();
        let mut second = Package::create_default();
        let uri = second.next_media_uri("png");
        second.add_part(Part::new(uri, "image/png", vec![0x89, b'P', b'N', b'G']));

        std::thread::scope(|scope| {
            for pkg in [&first, &second] {
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..20 {
                        pkg.save(path).unwrap();
                    }
                });
            }
        });

        let saved = Package::open(&path).unwrap().parts().count();
        assert!(saved == first.parts().count() || saved == second.parts().count());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_save_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.docx");
        let pkg = Package::create_default();

        assert!(pkg.save(&path).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_next_media_uri_skips_existing() {
        let mut pkg = Package::create_default();
        let first = pkg.next_media_uri("png");
        assert_eq!(first.as_str(), "/word/media/image1.png");

        pkg.add_part(Part::new(first, "image/png", vec![1, 2, 3]));
        assert_eq!(pkg.next_media_uri("png").as_str(), "/word/media/image2.png");
        assert_eq!(pkg.next_media_uri("jpeg").as_str(), "/word/media/image1.jpeg");
    }

    #[test]
    fn test_is_targeted() {
        let pkg = Package::create_default();
        assert!(pkg.is_targeted(&well_known::styles()));
        assert!(pkg.is_targeted(&well_known::document()));
        assert!(!pkg.is_targeted(&well_known::media(1, "png")));
    }
}
