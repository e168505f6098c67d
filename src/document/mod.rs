//! Document model - high-level API for DOCX documents
//!
//! A [`Document`] parses the main document part into an ordered body of
//! paragraphs, tables, images and shapes. Read accessors hand out detached
//! copies; a copy that was changed is written back with
//! [`Document::update`], which finds the original by its [`NodeId`].

mod body;
mod drawing;
mod format;
mod image;
mod node;
pub mod numbering;
mod paragraph;
mod run;
mod shape;
pub mod styles;
mod table;

pub use body::{BlockContent, Body};
pub use drawing::EMU_PER_UNIT;
pub use format::{
    inches_to_twips, twips_to_inches, Alignment, Border, BorderWidth, Color, Indentation,
    TWIPS_PER_INCH,
};
pub use image::{Image, ImageFormat};
pub use node::{Element, ElementKind, NodeId};
pub use numbering::{Numbering, NumberingKind, NumberingRef};
pub use paragraph::{
    Hyperlink, Paragraph, ParagraphContent, ParagraphProperties, DEFAULT_STYLE,
};
pub use run::{BreakType, Run, RunContent, RunProperties};
pub use shape::{Shape, ShapeKind};
pub use styles::{Style, StyleCatalog, StyleType};
pub use table::{GridColumn, Table, TableCell, TableCellProperties, TableProperties, TableRow};

use crate::error::{Error, Result};
use crate::opc::content_types as ct;
use crate::opc::{rel_types, well_known, Compression, Package, Part, PartUri};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use log::{debug, trace, warn};
use node::NodeAllocator;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::path::Path;

/// How a document is written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Compression of every package entry
    pub compression: Compression,
}

/// A DOCX document
#[derive(Debug)]
pub struct Document {
    /// Underlying OPC package
    package: Package,
    /// URI of the main document part
    main_uri: PartUri,
    /// `w:document` with its attributes and any children besides the body
    root: RawXmlElement,
    /// Parsed document body
    body: Body,
    styles: StyleCatalog,
    numbering: Numbering,
    nodes: NodeAllocator,
    /// Set by mutations, cleared by a save
    modified: bool,
}

impl Document {
    /// Create a new document from the default template
    pub fn new() -> Self {
        match Self::from_package(Package::create_default()) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("default template did not load ({}), starting empty", e);
                Self::with_body(Package::create_default(), default_root(), Body::default())
            }
        }
    }

    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = Package::open(path)?;
        Self::from_package(package)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        Self::from_package(package)
    }

    /// Create document from an OPC package
    ///
    /// Every part the model needs is parsed here, so nothing is half loaded
    /// when this fails.
    fn from_package(package: Package) -> Result<Self> {
        let main_uri = package
            .main_document_uri()
            .ok_or_else(|| Error::MissingPart("main document relationship".into()))?;
        let main = package
            .part(&main_uri)
            .ok_or_else(|| Error::MissingPart(main_uri.to_string()))?;
        let (root, body) = parse_document_xml(main.xml_text()?)?;

        let related = |rel_type| {
            package
                .document_part_by_rel_type(rel_type)
                .map(Part::xml_text)
                .transpose()
        };
        let styles = StyleCatalog::from_parts(
            related(rel_types::STYLES)?,
            related(rel_types::FONT_TABLE)?,
            related(rel_types::THEME)?,
        )?;
        let numbering = match related(rel_types::NUMBERING)? {
            Some(content) => Numbering::from_xml(content)?,
            None => Numbering::new(),
        };

        let mut doc = Self::with_body(package, root, body);
        doc.main_uri = main_uri;
        doc.numbering = numbering;
        doc.styles = styles;
        doc.resolve_numbering_kinds();
        doc.load_image_data();

        debug!(
            "loaded document: {} blocks ({} paragraphs, {} tables, {} images, {} shapes), {} numbering definitions",
            doc.body.content.len(),
            doc.paragraph_count(),
            doc.table_count(),
            doc.image_count(),
            doc.shape_count(),
            doc.numbering.definition_count()
        );
        Ok(doc)
    }

    fn with_body(package: Package, root: RawXmlElement, mut body: Body) -> Self {
        let mut nodes = NodeAllocator::new();
        for block in &mut body.content {
            if !matches!(block, BlockContent::Unknown(_)) {
                block.set_node_id(nodes.allocate());
            }
        }
        Document {
            package,
            main_uri: well_known::document(),
            root,
            body,
            styles: StyleCatalog::default(),
            numbering: Numbering::new(),
            nodes,
            modified: false,
        }
    }

    /// Give list paragraphs the kind their numbering definition renders
    fn resolve_numbering_kinds(&mut self) {
        let numbering = &self.numbering;
        for_each_paragraph_mut(&mut self.body, |para| {
            if let Some(mut reference) = para.numbering() {
                reference.kind = numbering
                    .kind_of(reference.id, reference.level)
                    .unwrap_or_default();
                para.set_numbering(reference);
            }
        });
    }

    /// Fill image bytes from the parts their relationships point at
    fn load_image_data(&mut self) {
        let Some(main) = self.package.part(&self.main_uri) else {
            return;
        };
        for block in &mut self.body.content {
            let BlockContent::Image(image) = block else {
                continue;
            };
            let Some(rel_id) = image.embed_id() else {
                continue;
            };
            let target = main
                .relationships()
                .and_then(|rels| rels.get(rel_id))
                .and_then(|rel| main.uri().resolve(&rel.target).ok())
                .and_then(|uri| self.package.part(&uri));
            match target {
                Some(part) => {
                    trace!("image {} -> {}", rel_id, part.uri());
                    image.load_data(part.data().to_vec());
                }
                None => warn!("image relationship {} does not resolve to a part", rel_id),
            }
        }
    }

    // === Reading ===

    /// Detached copies of all body elements in document order
    pub fn elements(&self) -> Vec<BlockContent> {
        self.body.content.clone()
    }

    /// Detached copy of the element with `id`
    pub fn get<E: Element>(&self, id: NodeId) -> Option<E> {
        let index = self.body.position(id)?;
        E::from_block(&self.body.content[index]).cloned()
    }

    /// Detached copies of all top-level paragraphs
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.collect()
    }

    pub fn paragraph(&self, index: usize) -> Option<Paragraph> {
        self.nth(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.count::<Paragraph>()
    }

    /// Detached copies of all tables
    pub fn tables(&self) -> Vec<Table> {
        self.collect()
    }

    pub fn table(&self, index: usize) -> Option<Table> {
        self.nth(index)
    }

    pub fn table_count(&self) -> usize {
        self.count::<Table>()
    }

    /// Detached copies of all images
    pub fn images(&self) -> Vec<Image> {
        self.collect()
    }

    pub fn image(&self, index: usize) -> Option<Image> {
        self.nth(index)
    }

    pub fn image_count(&self) -> usize {
        self.count::<Image>()
    }

    /// Detached copies of all shapes
    pub fn shapes(&self) -> Vec<Shape> {
        self.collect()
    }

    pub fn shape(&self, index: usize) -> Option<Shape> {
        self.nth(index)
    }

    pub fn shape_count(&self) -> usize {
        self.count::<Shape>()
    }

    fn blocks<E: Element>(&self) -> impl Iterator<Item = &E> {
        self.body.content.iter().filter_map(E::from_block)
    }

    fn collect<E: Element>(&self) -> Vec<E> {
        self.blocks().cloned().collect()
    }

    fn nth<E: Element>(&self, index: usize) -> Option<E> {
        self.blocks().nth(index).cloned()
    }

    fn count<E: Element>(&self) -> usize {
        self.blocks::<E>().count()
    }

    /// Text of paragraphs and tables, one block per line
    pub fn text(&self) -> String {
        self.body
            .content
            .iter()
            .filter_map(|block| match block {
                BlockContent::Paragraph(p) => Some(p.text()),
                BlockContent::Table(t) => Some(t.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Styles, table fonts and theme fonts available to this document
    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Numbering definitions
    pub fn numbering(&self) -> &Numbering {
        &self.numbering
    }

    /// Get the underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Whether the document changed since it was loaded or last saved
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    // === Mutation ===

    /// Append an element at the end of the body
    ///
    /// The element gets a fresh identity, so appending the same copy twice
    /// adds two independent elements. Returns the identity to fetch or
    /// update it by.
    pub fn append<E: Element>(&mut self, element: E) -> Result<NodeId> {
        let foreign = element.node_id().is_some_and(|id| !self.nodes.owns(id));
        let mut block = element.into_block();
        if let (true, BlockContent::Image(image)) = (foreign, &mut block) {
            image.detach();
        }
        self.register_numbering(&block)?;

        let id = self.nodes.allocate();
        block.set_node_id(id);
        trace!("append {} {:?}", E::KIND, id);
        self.body.content.push(block);
        self.modified = true;
        Ok(id)
    }

    /// Write a changed copy back over the element it was read from
    ///
    /// Fails with [`Error::UnknownElement`] when the element was not read
    /// from this document, is no longer in it, or is of another kind.
    /// Updating with an unchanged copy does nothing.
    pub fn update<E: Element>(&mut self, element: &E) -> Result<()> {
        let id = element
            .node_id()
            .filter(|id| self.nodes.owns(*id))
            .ok_or_else(|| {
                Error::UnknownElement(format!("{} was not obtained from this document", E::KIND))
            })?;
        let index = self.body.position(id).ok_or_else(|| {
            Error::UnknownElement(format!("{} {:?} is no longer in the document", E::KIND, id))
        })?;
        if E::from_block(&self.body.content[index]).is_none() {
            return Err(Error::UnknownElement(format!(
                "{:?} does not refer to a {}",
                id,
                E::KIND
            )));
        }

        let block = element.clone().into_block();
        if self.body.content[index] == block {
            return Ok(());
        }
        self.register_numbering(&block)?;
        trace!("update {} {:?}", E::KIND, id);
        self.body.content[index] = block;
        self.modified = true;
        Ok(())
    }

    /// Define the numbering levels a block refers to; latest kind wins
    fn register_numbering(&mut self, block: &BlockContent) -> Result<()> {
        for reference in numbering_refs(block) {
            self.numbering
                .define(reference.id, reference.level, reference.kind)?;
        }
        Ok(())
    }

    // === Saving ===

    /// Save the document to a file
    ///
    /// The destination is replaced only once the whole package was written.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.save_with(path, &SaveOptions::default())
    }

    pub fn save_with<P: AsRef<Path>>(&mut self, path: P, options: &SaveOptions) -> Result<()> {
        self.flush()?;
        self.package.save_with(path, options.compression)?;
        self.modified = false;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.to_bytes_with(&SaveOptions::default())
    }

    pub fn to_bytes_with(&mut self, options: &SaveOptions) -> Result<Vec<u8>> {
        self.flush()?;
        let bytes = self.package.to_bytes_with(options.compression)?;
        self.modified = false;
        Ok(bytes)
    }

    /// Bring the package parts in line with the model
    fn flush(&mut self) -> Result<()> {
        self.register_unresolved_numbering()?;
        self.store_new_images()?;

        let content = serialize_document_xml(&self.root, &self.body)?;
        self.prune_image_relationships(&content);

        let main = self
            .package
            .part_mut(&self.main_uri)
            .ok_or_else(|| Error::MissingPart(self.main_uri.to_string()))?;
        main.set_data(content);
        debug!(
            "serialized {} with {} blocks",
            self.main_uri,
            self.body.content.len()
        );

        self.write_numbering()
    }

    /// Register list levels that paragraphs use but no definition covers
    fn register_unresolved_numbering(&mut self) -> Result<()> {
        let mut missing = Vec::new();
        for block in &self.body.content {
            for reference in numbering_refs(block) {
                if self
                    .numbering
                    .kind_of(reference.id, reference.level)
                    .is_none()
                {
                    missing.push(reference);
                }
            }
        }
        for reference in missing {
            self.numbering
                .define(reference.id, reference.level, reference.kind)?;
        }
        Ok(())
    }

    /// Give every image without a media part a new part and relationship
    fn store_new_images(&mut self) -> Result<()> {
        let known: HashSet<String> = self
            .package
            .part(&self.main_uri)
            .and_then(Part::relationships)
            .map(|rels| rels.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default();

        for block in &mut self.body.content {
            let BlockContent::Image(image) = block else {
                continue;
            };
            if image.embed_id().is_some_and(|id| known.contains(id)) {
                continue;
            }

            let ext = image.format().map_or("bin", |f| f.extension());
            let uri = self.package.next_media_uri(ext);
            let target = self.main_uri.relative_target(&uri);
            self.package.add_part(Part::new(
                uri.clone(),
                ct::image_content_type(ext),
                image.data().to_vec(),
            ));

            let main = self
                .package
                .part_mut(&self.main_uri)
                .ok_or_else(|| Error::MissingPart(self.main_uri.to_string()))?;
            let rel_id = main.ensure_relationships().add(rel_types::IMAGE, &target);
            debug!("stored image as {} ({})", uri, rel_id);
            image.rel_id = Some(rel_id);
        }
        Ok(())
    }

    /// Drop image relationships the document no longer mentions, and their
    /// parts when nothing else points at them
    fn prune_image_relationships(&mut self, content: &[u8]) {
        let content = String::from_utf8_lossy(content);
        let Some(main) = self.package.part_mut(&self.main_uri) else {
            return;
        };
        let main_uri = main.uri().clone();
        let Some(rels) = main.relationships().cloned() else {
            return;
        };

        let mut orphans = Vec::new();
        for rel in rels.all_by_type(rel_types::IMAGE) {
            if content.contains(&format!("\"{}\"", rel.id)) {
                continue;
            }
            main.ensure_relationships().remove(&rel.id);
            if let Ok(uri) = main_uri.resolve(&rel.target) {
                orphans.push(uri);
            }
        }

        for uri in orphans {
            if !self.package.is_targeted(&uri) {
                debug!("removing unreferenced image part {}", uri);
                self.package.remove_part(&uri);
            }
        }
    }

    /// Rewrite numbering.xml when a definition changed
    fn write_numbering(&mut self) -> Result<()> {
        if !self.numbering.is_dirty() {
            return Ok(());
        }
        let content = self.numbering.to_xml()?;

        let existing = self
            .package
            .part(&self.main_uri)
            .and_then(|main| {
                let rel = main.relationships()?.by_type(rel_types::NUMBERING)?;
                main.uri().resolve(&rel.target).ok()
            })
            .filter(|uri| self.package.part(uri).is_some());

        match existing {
            Some(uri) => {
                if let Some(part) = self.package.part_mut(&uri) {
                    part.set_data(content);
                }
            }
            None => {
                let uri = well_known::numbering();
                let target = self.main_uri.relative_target(&uri);
                self.package
                    .add_part(Part::new(uri.clone(), ct::NUMBERING, content));
                let main = self
                    .package
                    .part_mut(&self.main_uri)
                    .ok_or_else(|| Error::MissingPart(self.main_uri.to_string()))?;
                main.ensure_relationships()
                    .add(rel_types::NUMBERING, &target);
                debug!("created numbering part {}", uri);
            }
        }

        self.numbering.mark_clean();
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn default_root() -> RawXmlElement {
    let mut root = RawXmlElement::new("w:document");
    for (name, value) in xml::document_namespaces() {
        root.attributes.push((name.to_string(), value.to_string()));
    }
    root
}

/// Numbering references of a block's paragraphs, table cells included
fn numbering_refs(block: &BlockContent) -> Vec<NumberingRef> {
    match block {
        BlockContent::Paragraph(p) => p.numbering().into_iter().collect(),
        BlockContent::Table(t) => t
            .rows()
            .flat_map(|r| r.cells())
            .flat_map(|c| c.paragraphs())
            .filter_map(Paragraph::numbering)
            .collect(),
        _ => Vec::new(),
    }
}

fn for_each_paragraph_mut(body: &mut Body, mut f: impl FnMut(&mut Paragraph)) {
    for block in &mut body.content {
        match block {
            BlockContent::Paragraph(p) => f(p),
            BlockContent::Table(t) => {
                for row in 0..t.row_count() {
                    let Some(row) = t.row_mut(row) else { continue };
                    for cell in row.cells_mut() {
                        cell.paragraphs_mut().for_each(&mut f);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parse document.xml into its root element and body
fn parse_document_xml(content: &str) -> Result<(RawXmlElement, Body)> {
    let mut reader = xml::part_reader(content);
    let mut root: Option<RawXmlElement> = None;
    let mut body = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match root.as_mut() {
                None if e.local_name().as_ref() == b"document" => {
                    root = Some(RawXmlElement {
                        self_closing: false,
                        ..RawXmlElement::from_empty(&e)
                    });
                }
                None => {
                    return Err(Error::UnsupportedSchema(format!(
                        "main document root is <{}>, expected w:document",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                }
                Some(_) if e.local_name().as_ref() == b"body" => {
                    body = Some(Body::from_reader(&mut reader)?);
                }
                Some(root) => {
                    let raw = RawXmlElement::from_reader(&mut reader, &e)?;
                    root.children.push(RawXmlNode::Element(raw));
                }
            },
            Event::Empty(e) => match root.as_mut() {
                Some(_) if e.local_name().as_ref() == b"body" => body = Some(Body::default()),
                Some(root) => root
                    .children
                    .push(RawXmlNode::Element(RawXmlElement::from_empty(&e))),
                None => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match (root, body) {
        (Some(root), Some(body)) => Ok((root, body)),
        (None, _) => Err(Error::UnsupportedSchema(
            "main document has no w:document root".into(),
        )),
        (Some(_), None) => Err(Error::UnsupportedSchema(
            "main document has no w:body".into(),
        )),
    }
}

/// Serialize root and body to document.xml content
///
/// Namespaces needed by generated drawings are declared on the root when
/// the loaded root lacks them.
fn serialize_document_xml(root: &RawXmlElement, body: &Body) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )))?;

    let mut start = BytesStart::new(root.name.as_str());
    for (key, value) in &root.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    for (key, value) in xml::document_namespaces() {
        if key.starts_with("xmlns:") && root.attr(key).is_none() {
            start.push_attribute((key, value));
        }
    }
    writer.write_event(Event::Start(start))?;

    for child in &root.children {
        child.write_to(&mut writer)?;
    }
    body.write_to(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new(root.name.as_str())))?;
    Ok(writer.into_inner())
}
