//! Document model - high-level API for DOCX documents

mod body;
mod formatting;
mod header_footer;
mod paragraph;
mod picture;
mod reader;
mod run;
mod section;
mod table;
mod writer;

pub use body::{Body, BodyElement};
pub use formatting::{Border, Shading};
pub use header_footer::{HeaderFooter, HeaderFooterKind};
pub use paragraph::{
    Alignment, Indent, LineRule, NumberingRef, Paragraph, ParagraphBorderSide, Spacing,
    TabAlignment, TabLeader, TabStop,
};
pub use picture::{
    decode_dimensions, emu_from_cm, emu_from_inches, emu_from_pixels, emu_from_points,
    image_content_type, resolve_extent, Picture, EMUS_PER_CM, EMUS_PER_INCH, EMUS_PER_PIXEL,
    EMUS_PER_POINT,
};
pub use run::{BreakType, Hyperlink, Run, DEFAULT_FONT, DEFAULT_SIZE};
pub use section::{
    HeaderFooterRef, HeaderFooterType, Orientation, PageMargins, Section, SectionStart,
    DEFAULT_MARGIN, DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH,
};
pub use table::{
    CellMargins, Table, TableAlignment, TableBorderSide, TableCell, TableLayout, TableLook,
    TableRow, TableWidth, VMerge, VerticalAlignment, DEFAULT_CELL_WIDTH,
};
pub use writer::WriteContext;

use crate::error::{Error, Result};
use crate::opc::{rel_types, Package, PartUri, TargetMode};
use crate::templates;
use reader::{parse_document, ReadContext};
use std::collections::BTreeMap;
use std::path::Path;

/// A DOCX document: the package plus the parsed main body and any
/// header/footer parts touched so far
#[derive(Debug)]
pub struct Document {
    /// Underlying OPC package
    package: Package,
    /// Main document part
    uri: PartUri,
    /// Parsed document body
    body: Body,
    /// Header and footer parts parsed or created so far
    headers_footers: BTreeMap<PartUri, HeaderFooter>,
    /// Next `wp:docPr` id for pictures in the main part
    next_drawing_id: u32,
}

impl Document {
    /// Create a document backed by a freshly seeded package
    pub fn new() -> Self {
        Self {
            package: Package::create_empty(),
            uri: crate::opc::well_known::document(),
            body: Body {
                elements: vec![BodyElement::Section(Section::default())],
            },
            headers_footers: BTreeMap::new(),
            next_drawing_id: 1,
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
    pub fn from_package(package: Package) -> Result<Self> {
        let uri = package
            .main_document_uri()
            .ok_or_else(|| Error::MissingPart("main document relationship".into()))?;
        let part = package
            .part(&uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))?;

        let mut ctx = ReadContext::new(&uri, part.relationships());
        let body = parse_document(part.data(), &mut ctx)?;
        let next_drawing_id = ctx.max_drawing_id + 1;

        log::debug!(
            "parsed {}: {} paragraphs, {} tables, {} sections",
            uri,
            body.paragraph_count(),
            body.table_count(),
            body.section_count()
        );

        Ok(Self {
            package,
            uri,
            body,
            headers_footers: BTreeMap::new(),
            next_drawing_id,
        })
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.update_package()?;
        self.package.save(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.update_package()?;
        self.package.to_bytes()
    }

    /// Release the document and its package without saving
    pub fn close(self) {
        self.package.close();
    }

    /// Current serialization of the main document part
    pub fn document_xml(&mut self) -> Result<String> {
        self.update_main_part()?;
        let part = self
            .package
            .part(&self.uri)
            .ok_or_else(|| Error::MissingPart(self.uri.to_string()))?;
        Ok(part.data_as_str()?.to_string())
    }

    /// Regenerate every part backed by a parsed tree
    fn update_package(&mut self) -> Result<()> {
        self.update_main_part()?;
        for (uri, header_footer) in &self.headers_footers {
            let part = self
                .package
                .part_mut(uri)
                .ok_or_else(|| Error::MissingPart(uri.to_string()))?;
            let xml = header_footer.to_xml(part.relationships_mut())?;
            part.set_data(xml);
        }
        Ok(())
    }

    fn update_main_part(&mut self) -> Result<()> {
        let part = self
            .package
            .part_mut(&self.uri)
            .ok_or_else(|| Error::MissingPart(self.uri.to_string()))?;
        let xml = writer::write_document(&self.body, part.relationships_mut())?;
        part.set_data(xml);
        Ok(())
    }

    // === Access ===

    /// Get the underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Get the underlying package mutably
    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    pub fn paragraph_count(&self) -> usize {
        self.body.paragraph_count()
    }

    /// Get paragraph by index
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.body.paragraphs().nth(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.body.paragraphs_mut().nth(index)
    }

    /// Get all tables
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.tables()
    }

    pub fn table_count(&self) -> usize {
        self.body.table_count()
    }

    /// Get table by index
    pub fn table(&self, index: usize) -> Option<&Table> {
        self.body.tables().nth(index)
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.body.tables_mut().nth(index)
    }

    /// Get body-level sections
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.body.sections()
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.body.sections().nth(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.body.sections_mut().nth(index)
    }

    /// Get all text in the document
    pub fn text(&self) -> String {
        self.body.text()
    }

    // === Structure ===

    /// Add a paragraph with text
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::new(text))
    }

    /// Add a table of empty one-inch cells
    pub fn add_table(&mut self, rows: usize, cols: usize) -> Result<&mut Table> {
        check_table_size(rows, cols)?;
        Ok(self.body.add_table(Table::new(rows, cols)))
    }

    /// Append a body-level section break
    pub fn add_section(&mut self, start: SectionStart) -> &mut Section {
        self.body
            .elements
            .push(BodyElement::Section(Section::new(start)));
        let at = self.body.elements.len() - 1;
        match &mut self.body.elements[at] {
            BodyElement::Section(s) => s,
            _ => unreachable!("element {} was just pushed as a section", at),
        }
    }

    /// Insert a table directly after the `paragraph_index`-th paragraph
    pub fn insert_table_after_paragraph(
        &mut self,
        paragraph_index: usize,
        rows: usize,
        cols: usize,
    ) -> Result<&mut Table> {
        check_table_size(rows, cols)?;
        let at = self
            .body
            .position_of(paragraph_index, |e| matches!(e, BodyElement::Paragraph(_)))
            .ok_or_else(|| out_of_range("paragraph", paragraph_index, self.paragraph_count()))?;
        Ok(self.body.insert_table(at + 1, Table::new(rows, cols)))
    }

    /// Remove and return the `index`-th paragraph
    pub fn remove_paragraph(&mut self, index: usize) -> Result<Paragraph> {
        let at = self
            .body
            .position_of(index, |e| matches!(e, BodyElement::Paragraph(_)))
            .ok_or_else(|| out_of_range("paragraph", index, self.paragraph_count()))?;
        match self.body.elements.remove(at) {
            BodyElement::Paragraph(p) => Ok(p),
            _ => unreachable!("element {} matched as a paragraph", at),
        }
    }

    /// Remove and return the `index`-th table
    pub fn remove_table(&mut self, index: usize) -> Result<Table> {
        let at = self
            .body
            .position_of(index, |e| matches!(e, BodyElement::Table(_)))
            .ok_or_else(|| out_of_range("table", index, self.table_count()))?;
        match self.body.elements.remove(at) {
            BodyElement::Table(t) => Ok(t),
            _ => unreachable!("element {} matched as a table", at),
        }
    }

    /// Remove and return the `index`-th body-level section
    pub fn remove_section(&mut self, index: usize) -> Result<Section> {
        let at = self
            .body
            .position_of(index, |e| matches!(e, BodyElement::Section(_)))
            .ok_or_else(|| out_of_range("section", index, self.body.section_count()))?;
        match self.body.elements.remove(at) {
            BodyElement::Section(s) => Ok(s),
            _ => unreachable!("element {} matched as a section", at),
        }
    }

    // === Convenience ===

    /// Add a heading: level 0 is the title, 1 to 9 use `Heading1`..`Heading9`
    pub fn add_heading(&mut self, text: impl Into<String>, level: u32) -> Result<&mut Paragraph> {
        let style = match level {
            0 => "Title".to_string(),
            1..=9 => format!("Heading{}", level),
            _ => {
                return Err(Error::validation(format!(
                    "heading level must be 0-9, got {}",
                    level
                )))
            }
        };
        let para = self.add_paragraph(text);
        para.set_style(style);
        Ok(para)
    }

    /// Add a paragraph holding a single page break
    pub fn add_page_break(&mut self) -> &mut Paragraph {
        let mut run = Run::default();
        run.set_break(Some(BreakType::Page));
        let mut para = Paragraph::default();
        para.add_run(run);
        self.body.add_paragraph(para)
    }

    /// Add an item of the default decimal list
    pub fn add_numbered_paragraph(&mut self, text: impl Into<String>, level: i32) -> &mut Paragraph {
        let para = self.add_paragraph(text);
        para.set_numbering(templates::DECIMAL_LIST, level);
        para
    }

    /// Add an item of the default bullet list
    pub fn add_bulleted_paragraph(&mut self, text: impl Into<String>, level: i32) -> &mut Paragraph {
        let para = self.add_paragraph(text);
        para.set_numbering(templates::BULLET_LIST, level);
        para
    }

    /// Add a paragraph holding an inline picture read from `path`.
    ///
    /// Sizes are in EMU; a non-positive dimension is derived from the image
    /// (see [`resolve_extent`]).
    pub fn add_picture<P: AsRef<Path>>(
        &mut self,
        path: P,
        width_emu: i64,
        height_emu: i64,
    ) -> Result<&mut Paragraph> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = image_content_type(&ext)
            .ok_or_else(|| Error::UnsupportedImage(path.display().to_string()))?;

        let bytes = std::fs::read(path)?;
        let (width_emu, height_emu) = resolve_extent(&bytes, width_emu, height_emu)?;

        let (image_uri, file_name) = self.next_media_name(&ext)?;
        if self.package.content_types().default_for(&ext).is_none() {
            self.package.content_types_mut().add_default(&ext, content_type);
        }
        self.package.set_part(image_uri.clone(), "", bytes);
        let rel_id = self.package.ensure_relationship(
            Some(&self.uri),
            rel_types::IMAGE,
            &format!("media/{}", file_name),
            TargetMode::Internal,
        )?;

        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let picture = Picture {
            rel_id,
            target: Some(image_uri),
            width_emu,
            height_emu,
            id,
            name: format!("Picture {}", id),
            description: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        log::debug!("added picture {} ({})", picture.name, file_name);

        let mut para = Paragraph::default();
        para.add_run(Run {
            picture: Some(picture),
            ..Default::default()
        });
        Ok(self.body.add_paragraph(para))
    }

    /// Smallest unused `/word/media/image{N}.{ext}`
    fn next_media_name(&self, ext: &str) -> Result<(PartUri, String)> {
        let mut n = 1;
        loop {
            let file_name = format!("image{}.{}", n, ext);
            let uri = PartUri::new(&format!("/word/media/{}", file_name))?;
            if !self.package.contains(&uri) {
                return Ok((uri, file_name));
            }
            n += 1;
        }
    }

    // === Headers and footers ===

    /// Header of the given type for the first section, created if missing
    pub fn header(&mut self, kind: HeaderFooterType) -> Result<&mut HeaderFooter> {
        self.header_footer(HeaderFooterKind::Header, kind)
    }

    /// Footer of the given type for the first section, created if missing
    pub fn footer(&mut self, kind: HeaderFooterType) -> Result<&mut HeaderFooter> {
        self.header_footer(HeaderFooterKind::Footer, kind)
    }

    fn header_footer(
        &mut self,
        part_kind: HeaderFooterKind,
        kind: HeaderFooterType,
    ) -> Result<&mut HeaderFooter> {
        if self.body.section_count() == 0 {
            self.add_section(SectionStart::Continuous);
        }

        let existing = self.body.sections().next().and_then(|section| {
            let refs = match part_kind {
                HeaderFooterKind::Header => &section.headers,
                HeaderFooterKind::Footer => &section.footers,
            };
            refs.get(&kind).map(|r| r.part.clone())
        });

        let uri = match existing {
            Some(uri) => {
                if !self.headers_footers.contains_key(&uri) {
                    let loaded = HeaderFooter::load(&self.package, &uri, part_kind)?;
                    self.headers_footers.insert(uri.clone(), loaded);
                }
                uri
            }
            None => self.create_header_footer(part_kind, kind)?,
        };

        self.headers_footers
            .get_mut(&uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))
    }

    /// Create a header/footer part and reference it from the first section
    fn create_header_footer(
        &mut self,
        part_kind: HeaderFooterKind,
        kind: HeaderFooterType,
    ) -> Result<PartUri> {
        let mut n = 1;
        let (uri, file_name) = loop {
            let file_name = format!("{}{}.xml", part_kind.prefix(), n);
            let uri = PartUri::new(&format!("/word/{}", file_name))?;
            if !self.package.contains(&uri) && !self.headers_footers.contains_key(&uri) {
                break (uri, file_name);
            }
            n += 1;
        };

        let header_footer = HeaderFooter::new(uri.clone(), part_kind);
        let mut rels = crate::opc::Relationships::new();
        let xml = header_footer.to_xml(&mut rels)?;
        self.package
            .set_part(uri.clone(), part_kind.content_type(), xml);

        let rel_type = match part_kind {
            HeaderFooterKind::Header => rel_types::HEADER,
            HeaderFooterKind::Footer => rel_types::FOOTER,
        };
        let rel_id = self.package.ensure_relationship(
            Some(&self.uri),
            rel_type,
            &file_name,
            TargetMode::Internal,
        )?;

        if let Some(section) = self.body.sections_mut().next() {
            let refs = match part_kind {
                HeaderFooterKind::Header => &mut section.headers,
                HeaderFooterKind::Footer => &mut section.footers,
            };
            refs.insert(
                kind,
                HeaderFooterRef {
                    rel_id,
                    part: uri.clone(),
                },
            );
        }

        log::debug!("created {} part {}", part_kind.prefix(), uri);
        self.headers_footers.insert(uri.clone(), header_footer);
        Ok(uri)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn check_table_size(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(Error::validation(format!(
            "table needs at least one row and column, got {}x{}",
            rows, cols
        )));
    }
    Ok(())
}

fn out_of_range(what: &str, index: usize, len: usize) -> Error {
    Error::validation(format!(
        "{} index {} out of range ({} present)",
        what, index, len
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r>
        <w:t>Hello, World!</w:t>
      </w:r>
    </w:p>
    <w:p>
      <w:pPr>
        <w:pStyle w:val="Heading1"/>
      </w:pPr>
      <w:r>
        <w:rPr>
          <w:b/>
        </w:rPr>
        <w:t>This is a heading</w:t>
      </w:r>
    </w:p>
  </w:body>
</w:document>"#;

    fn document_with_body(xml: &str) -> Document {
        let mut package = Package::create_empty();
        package.set_part(
            crate::opc::well_known::document(),
            "",
            xml.as_bytes().to_vec(),
        );
        Document::from_package(package).unwrap()
    }

    #[test]
    fn test_parse_simple_document() {
        let doc = document_with_body(SIMPLE_DOC);

        let paras: Vec<_> = doc.paragraphs().collect();
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].text(), "Hello, World!");
        assert_eq!(paras[1].text(), "This is a heading");
        assert_eq!(paras[1].style.as_deref(), Some("Heading1"));
        assert!(paras[1].runs()[0].bold);
        // whitespace between elements is not text
        assert_eq!(paras[0].runs().len(), 1);
    }

    #[test]
    fn test_new_document_has_one_section() {
        let doc = Document::new();
        assert_eq!(doc.sections().count(), 1);
        assert_eq!(doc.paragraph_count(), 0);
    }

    #[test]
    fn test_content_goes_before_final_section() {
        let mut doc = Document::new();
        doc.add_paragraph("first");
        doc.add_table(1, 1).unwrap();

        assert!(matches!(doc.body().elements[0], BodyElement::Paragraph(_)));
        assert!(matches!(doc.body().elements[1], BodyElement::Table(_)));
        assert!(matches!(doc.body().elements[2], BodyElement::Section(_)));
    }

    #[test]
    fn test_structural_validation_leaves_body_untouched() {
        let mut doc = Document::new();
        doc.add_paragraph("only");
        let before = doc.body().clone();

        assert!(matches!(doc.add_table(0, 2), Err(Error::Validation(_))));
        assert!(matches!(
            doc.insert_table_after_paragraph(3, 1, 1),
            Err(Error::Validation(_))
        ));
        assert!(matches!(doc.remove_table(0), Err(Error::Validation(_))));
        assert!(matches!(doc.add_heading("x", 10), Err(Error::Validation(_))));
        assert_eq!(doc.body(), &before);
    }

    #[test]
    fn test_headings_and_lists() {
        let mut doc = Document::new();
        doc.add_heading("Title", 0).unwrap();
        doc.add_heading("Chapter", 2).unwrap();
        doc.add_numbered_paragraph("one", -1);
        doc.add_bulleted_paragraph("dot", 1);

        assert_eq!(doc.paragraph(0).unwrap().style.as_deref(), Some("Title"));
        assert_eq!(doc.paragraph(1).unwrap().style.as_deref(), Some("Heading2"));
        assert_eq!(
            doc.paragraph(2).unwrap().numbering,
            Some(NumberingRef {
                num_id: templates::DECIMAL_LIST,
                level: 0
            })
        );
        assert_eq!(
            doc.paragraph(3).unwrap().numbering,
            Some(NumberingRef {
                num_id: templates::BULLET_LIST,
                level: 1
            })
        );
    }

    #[test]
    fn test_document_xml_reflects_edits() {
        let mut doc = Document::new();
        doc.add_page_break();
        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(r#"<w:br w:type="page"/>"#));
        assert_eq!(xml.matches("<w:sectPr>").count(), 1);
    }

    #[test]
    fn test_header_is_created_once() {
        let mut doc = Document::new();
        doc.header(HeaderFooterType::Default)
            .unwrap()
            .add_paragraph("top");
        let uri = doc.header(HeaderFooterType::Default).unwrap().uri().clone();
        let first = doc.header(HeaderFooterType::First).unwrap().uri().clone();

        assert_eq!(uri.as_str(), "/word/header1.xml");
        assert_eq!(first.as_str(), "/word/header2.xml");
        let section = doc.section(0).unwrap();
        assert_eq!(section.headers.len(), 2);
        assert_eq!(
            doc.header(HeaderFooterType::Default).unwrap().text(),
            "top"
        );
    }
}
