//! Error types for docx-words

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid value '{value}' for attribute '{attr}' on element '{element}'")]
    InvalidAttribute {
        element: String,
        attr: String,
        value: String,
    },

    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("Element is not part of this document: {0}")]
    UnknownElement(String),

    #[error("Invalid element: {0}")]
    InvalidElement(String),
}

/// Coarse classification of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path to open does not exist
    NotFound,
    /// The zip container or one of its XML parts is malformed
    CorruptArchive,
    /// A part is present but its content is not a recognised shape
    UnsupportedSchema,
    /// An update target does not belong to the document
    UnknownElement,
    /// A constructor or setter received a value it cannot represent
    InvalidArgument,
    /// Reading or writing the file system failed
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Zip(zip::result::ZipError::Io(_)) => ErrorKind::Io,
            Error::Zip(_)
            | Error::Xml(_)
            | Error::XmlEncoding(_)
            | Error::XmlAttr(_)
            | Error::Utf8(_)
            | Error::MissingPart(_)
            | Error::InvalidPartUri(_)
            | Error::MissingAttribute { .. }
            | Error::InvalidAttribute { .. } => ErrorKind::CorruptArchive,
            Error::UnsupportedSchema(_) => ErrorKind::UnsupportedSchema,
            Error::UnknownElement(_) => ErrorKind::UnknownElement,
            Error::InvalidElement(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
