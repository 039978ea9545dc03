//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// Represents a URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'.
/// Example: `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
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

        Ok(Self { path: normalized })
    }

    pub(crate) fn from_static(path: &'static str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Entry name inside the zip archive (no leading '/')
    pub fn zip_name(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// File name without its extension
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Directory holding this part, without a trailing '/' ("" at the root)
    pub fn directory(&self) -> &str {
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

    /// Resolve a relationship target against this part's directory.
    ///
    /// `styles.xml` from `/word/document.xml` is `/word/styles.xml`;
    /// `../media/a.png` is `/media/a.png`; `/word/x.xml` is taken as-is.
    pub fn resolve(&self, target: &str) -> Result<PartUri> {
        let base_dir = if target.starts_with('/') {
            ""
        } else {
            self.directory()
        };
        resolve_segments(base_dir, target)
    }

    /// Resolve a target of a package-level (root) relationship
    pub fn from_root_target(target: &str) -> Result<PartUri> {
        resolve_segments("", target)
    }

    /// Check if this URI points to a relationships file
    pub fn is_relationships(&self) -> bool {
        self.path.contains("/_rels/") && self.path.ends_with(".rels")
    }
}

fn resolve_segments(base_dir: &str, target: &str) -> Result<PartUri> {
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in target.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    PartUri::new(&format!("/{}", parts.join("/")))
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

/// Well-known part URIs
pub mod well_known {
    use super::PartUri;

    pub fn document() -> PartUri {
        PartUri::from_static("/word/document.xml")
    }

    pub fn styles() -> PartUri {
        PartUri::from_static("/word/styles.xml")
    }

    pub fn settings() -> PartUri {
        PartUri::from_static("/word/settings.xml")
    }

    pub fn numbering() -> PartUri {
        PartUri::from_static("/word/numbering.xml")
    }
}
