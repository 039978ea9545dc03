//! # docx-package
//!
//! An OOXML word-processing package container with a round-trip body codec.
//!
//! ## Features
//!
//! - Zip-backed package of parts, relationships and content types
//! - Streaming parser from body XML into paragraphs, runs, tables and sections
//! - Deterministic serializer that regenerates the XML from the tree
//! - Headers, footers, hyperlinks and inline pictures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_package::Document;
//!
//! // Open a document
//! let doc = Document::open("example.docx")?;
//!
//! // Read paragraphs
//! for para in doc.paragraphs() {
//!     println!("{}", para.text());
//! }
//!
//! // Create a new document
//! let mut doc = Document::new();
//! doc.add_paragraph("Hello World!");
//! doc.add_table(2, 3)?.set_cell_text(0, 0, "A1")?;
//! doc.save("output.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod opc;
mod templates;
pub mod xml;

pub use document::{Document, Paragraph, Picture, Run, Section, Table};
pub use error::{Error, Result};
pub use opc::{Package, Part, PartUri, Relationships, TargetMode};
