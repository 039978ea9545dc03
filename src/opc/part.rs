//! Part representation for OPC packages

use crate::opc::{PartUri, Relationships};

/// A part within an OPC package
#[derive(Clone, Debug)]
pub struct Part {
    /// Part URI
    uri: PartUri,
    /// Content type
    content_type: String,
    /// Part data
    data: Vec<u8>,
    /// Outgoing relationships of this part
    relationships: Relationships,
}

impl Part {
    /// Create a new part
    pub fn new(uri: PartUri, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            uri,
            content_type: content_type.into(),
            data,
            relationships: Relationships::new(),
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

    pub(crate) fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Get the raw data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get data as UTF-8 string
    pub fn data_as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// Replace the data
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Get relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get mutable relationships
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Set relationships
    pub fn set_relationships(&mut self, rels: Relationships) {
        self.relationships = rels;
    }
}
