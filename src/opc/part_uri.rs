//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Represents a URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'. Part names are
/// compared ASCII case-insensitively, but the original spelling is kept for
/// writing back to the archive.
/// Example: `/word/document.xml`
#[derive(Clone, Debug)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri from a string.
    ///
    /// The path will be normalized (leading '/' ensured, no trailing '/').
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() || path == "/" {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }
        if normalized.split('/').any(|s| s == "." || s == "..") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains relative segments",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    pub(crate) fn from_static(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Name of the matching zip entry (no leading '/')
    pub fn zip_name(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Get the file extension, lower-cased
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_ascii_lowercase())
        }
    }

    /// Directory containing this part, without trailing '/' ("" for the root)
    fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[..pos],
            None => "",
        }
    }

    /// Get the relationships URI for this part.
    ///
    /// For `/word/document.xml`, returns `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        PartUri {
            path: format!("{}/_rels/{}.rels", self.directory(), self.file_name()),
        }
    }

    /// Resolve a relationship target against this part.
    ///
    /// For `/word/document.xml` and `media/image1.png`, returns `/word/media/image1.png`
    pub fn resolve(&self, relative: &str) -> Result<PartUri> {
        if relative.starts_with('/') {
            return PartUri::new(relative);
        }

        let mut segments: Vec<&str> = self
            .directory()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        for segment in relative.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Error::InvalidPartUri(format!(
                            "target '{}' escapes the package root",
                            relative
                        )));
                    }
                }
                s => segments.push(s),
            }
        }

        PartUri::new(&segments.join("/"))
    }

    /// Express `target` as a relationship target relative to this part
    ///
    /// For `/word/document.xml` and `/word/media/image1.png`, returns `media/image1.png`
    pub fn relative_target(&self, target: &PartUri) -> String {
        let base: Vec<&str> = self
            .directory()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let to: Vec<&str> = target.path.split('/').filter(|s| !s.is_empty()).collect();

        let common = base
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();

        let mut out: Vec<&str> = std::iter::repeat("..").take(base.len() - common).collect();
        out.extend_from_slice(&to[common..]);
        out.join("/")
    }

    /// Check if this URI points to a relationships file
    pub fn is_relationships(&self) -> bool {
        let lower = self.path.to_ascii_lowercase();
        lower.contains("/_rels/") && lower.ends_with(".rels")
    }
}

impl PartialEq for PartUri {
    fn eq(&self, other: &Self) -> bool {
        self.path.eq_ignore_ascii_case(&other.path)
    }
}

impl Eq for PartUri {}

impl Hash for PartUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.path.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl std::str::FromStr for PartUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartUri::new(s)
    }
}

/// Well-known part URIs of a word-processing package
pub mod well_known {
    use super::PartUri;

    pub fn document() -> PartUri {
        PartUri::from_static("/word/document.xml")
    }

    pub fn styles() -> PartUri {
        PartUri::from_static("/word/styles.xml")
    }

    pub fn numbering() -> PartUri {
        PartUri::from_static("/word/numbering.xml")
    }

    pub fn font_table() -> PartUri {
        PartUri::from_static("/word/fontTable.xml")
    }

    pub fn settings() -> PartUri {
        PartUri::from_static("/word/settings.xml")
    }

    pub fn theme() -> PartUri {
        PartUri::from_static("/word/theme/theme1.xml")
    }

    pub fn core_props() -> PartUri {
        PartUri::from_static("/docProps/core.xml")
    }

    pub fn app_props() -> PartUri {
        PartUri::from_static("/docProps/app.xml")
    }

    /// `/word/media/image{n}.{ext}`
    pub fn media(n: usize, ext: &str) -> PartUri {
        PartUri {
            path: format!("/word/media/image{}.{}", n, ext),
        }
    }
}
