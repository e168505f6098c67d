//! # docx-words
//!
//! A word-processing document model persisted as OOXML (`.docx`) packages.
//!
//! ## Features
//!
//! - Paragraphs, runs, tables, inline images and preset shapes
//! - Multilevel numbering shared between paragraphs by id
//! - Style, font and theme catalogs read from the template
//! - Round-trip preservation (unknown elements and untouched parts are kept
//!   intact)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx_words::{Document, Indentation, Paragraph};
//!
//! # fn main() -> docx_words::Result<()> {
//! let mut doc = Document::new();
//! let id = doc.append(Paragraph::with_text("Hello World!"))?;
//!
//! // Reads return detached copies; write changes back with update
//! let mut para: Paragraph = doc.get(id).expect("just appended");
//! para.set_indentation(Indentation::left(2.0));
//! doc.update(&para)?;
//!
//! doc.save("output.docx")?;
//!
//! let doc = Document::open("output.docx")?;
//! for para in doc.paragraphs() {
//!     println!("{}", para.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod opc;
pub mod xml;

pub use document::{
    Alignment, BlockContent, Border, BorderWidth, Color, Document, Element, ElementKind, Image,
    ImageFormat, Indentation, NodeId, NumberingKind, NumberingRef, Paragraph, Run, SaveOptions,
    Shape, ShapeKind, Table, TableCell, TableRow,
};
pub use error::{Error, ErrorKind, Result};
pub use opc::{Compression, Package, Part, PartUri};
