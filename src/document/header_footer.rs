//! Header and footer parts (w:hdr / w:ftr)

use crate::document::reader::{parse_header_footer, ReadContext};
use crate::document::writer::write_header_footer;
use crate::document::{Body, Paragraph, Table};
use crate::error::{Error, Result};
use crate::opc::{content_types, Package, PartUri, Relationships};

/// Which of the two part kinds a [`HeaderFooter`] is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderFooterKind {
    Header,
    Footer,
}

impl HeaderFooterKind {
    /// Root element of the part
    pub fn root(&self) -> &'static str {
        match self {
            HeaderFooterKind::Header => "w:hdr",
            HeaderFooterKind::Footer => "w:ftr",
        }
    }

    /// File name prefix (`header` / `footer`)
    pub fn prefix(&self) -> &'static str {
        match self {
            HeaderFooterKind::Header => "header",
            HeaderFooterKind::Footer => "footer",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            HeaderFooterKind::Header => content_types::HEADER,
            HeaderFooterKind::Footer => content_types::FOOTER,
        }
    }
}

/// Content of one header or footer part
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderFooter {
    uri: PartUri,
    kind: HeaderFooterKind,
    body: Body,
}

impl HeaderFooter {
    /// Empty header or footer bound to `uri`
    pub(crate) fn new(uri: PartUri, kind: HeaderFooterKind) -> Self {
        HeaderFooter {
            uri,
            kind,
            body: Body::default(),
        }
    }

    /// Parse an existing part from the package
    pub(crate) fn load(package: &Package, uri: &PartUri, kind: HeaderFooterKind) -> Result<Self> {
        let part = package
            .part(uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))?;
        let mut ctx = ReadContext::new(uri, part.relationships());
        let body = parse_header_footer(part.data(), &mut ctx)?;
        log::debug!(
            "loaded {} {} with {} elements",
            kind.prefix(),
            uri,
            body.elements.len()
        );
        Ok(HeaderFooter {
            uri: uri.clone(),
            kind,
            body,
        })
    }

    /// Serialize the part, allocating hyperlink relationships in `rels`
    pub(crate) fn to_xml(&self, rels: &mut Relationships) -> Result<Vec<u8>> {
        write_header_footer(self.kind.root(), &self.body, rels)
    }

    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    pub fn kind(&self) -> HeaderFooterKind {
        self.kind
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.tables()
    }

    /// Append a paragraph with text
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::new(text))
    }

    /// Append a table; zero rows or columns are rejected
    pub fn add_table(&mut self, rows: usize, cols: usize) -> Result<&mut Table> {
        if rows == 0 || cols == 0 {
            return Err(Error::validation(format!(
                "table needs at least one row and column, got {}x{}",
                rows, cols
            )));
        }
        Ok(self.body.add_table(Table::new(rows, cols)))
    }

    /// Text of all paragraphs, one line each
    pub fn text(&self) -> String {
        self.body.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_header_serializes_empty_root() {
        let header = HeaderFooter::new(
            PartUri::new("/word/header1.xml").unwrap(),
            HeaderFooterKind::Header,
        );
        let xml = String::from_utf8(header.to_xml(&mut Relationships::new()).unwrap()).unwrap();
        assert!(xml.contains("<w:hdr "));
        assert!(xml.ends_with("></w:hdr>"));
    }

    #[test]
    fn test_footer_round_trip_through_package() {
        let uri = PartUri::new("/word/footer1.xml").unwrap();
        let mut footer = HeaderFooter::new(uri.clone(), HeaderFooterKind::Footer);
        footer.add_paragraph("Page footer");
        footer.add_table(1, 2).unwrap().set_cell_text(0, 1, "right").unwrap();

        let mut package = Package::new();
        let mut rels = Relationships::new();
        let xml = footer.to_xml(&mut rels).unwrap();
        package.set_part(uri.clone(), HeaderFooterKind::Footer.content_type(), xml);

        let loaded = HeaderFooter::load(&package, &uri, HeaderFooterKind::Footer).unwrap();
        assert_eq!(loaded, footer);
        assert_eq!(loaded.text(), "Page footer");
        assert_eq!(package.content_type_of(&uri), content_types::FOOTER);
    }

    #[test]
    fn test_zero_sized_table_rejected() {
        let mut header = HeaderFooter::new(
            PartUri::new("/word/header1.xml").unwrap(),
            HeaderFooterKind::Header,
        );
        assert!(matches!(header.add_table(0, 3), Err(Error::Validation(_))));
        assert!(header.body().elements.is_empty());
    }
}
