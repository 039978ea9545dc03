//! Integration test: open DOCX files written by other producers

use docx_package::document::{HeaderFooterType, Orientation};
use docx_package::opc::{content_types, rel_types, Package, TargetMode};
use docx_package::{Document, Error, PartUri};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="XML" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/header3.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header3.xml"/>
  <Relationship Id="rId12" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.org/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="custom" Type="urn:vendor:thing" Target="thing.bin"/>
</Relationships>"#;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml">
  <w:body>
    <w:p w14:paraId="1A2B3C4D">
      <w:pPr><w:pStyle w:val="Heading1"/><w:rPr><w:b/></w:rPr></w:pPr>
      <w:r><w:t>Hello, World!</w:t></w:r>
      <w:proofErr w:type="spellStart"/>
      <w:hyperlink r:id="rId12"><w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t>link</w:t></w:r></w:hyperlink>
      <w:hyperlink r:id="rId99"><w:r><w:t xml:space="preserve"> dangling</w:t></w:r></w:hyperlink>
    </w:p>
    <w:sdt>
      <w:sdtPr><w:alias w:val="Block"/></w:sdtPr>
      <w:sdtContent>
        <w:p><w:r><w:rPr><w:b w:val="1"/><w:i w:val="off"/></w:rPr><w:t>bold</w:t></w:r></w:p>
      </w:sdtContent>
    </w:sdt>
    <w:tbl>
      <w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblLook w:firstRow="1" w:lastRow="0" w:noVBand="1"/></w:tblPr>
      <w:tr><w:trPr><w:cantSplit/></w:trPr>
        <w:tc><w:tcPr><w:tcW w:w="4000" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc>
        <w:tc><w:tcPr><w:tcW w:w="2000" w:type="dxa"/></w:tcPr></w:tc>
      </w:tr>
    </w:tbl>
    <w:sectPr>
      <w:headerReference w:type="default" r:id="rId7"/>
      <w:pgSz w:w="15840" w:h="12240" w:orient="landscape"/>
      <w:pgMar w:top="1000" w:right="1000" w:bottom="1000" w:left="1000" w:header="708" w:footer="708" w:gutter="0"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>
  </w:body>
</w:document>"#;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>Running head</w:t></w:r></w:p></w:hdr>"#;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<()> = FileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn foreign_docx() -> Vec<u8> {
    build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", DOCUMENT),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/header3.xml", HEADER),
    ])
}

#[test]
fn test_open_foreign_package() {
    init();
    let pkg = Package::from_bytes(&foreign_docx()).unwrap();

    let doc_uri = PartUri::new("/word/document.xml").unwrap();
    assert_eq!(pkg.main_document_uri(), Some(doc_uri.clone()));
    assert_eq!(pkg.content_type_of(&doc_uri), content_types::MAIN_DOCUMENT);
    assert_eq!(
        pkg.resolve_relationship(Some(&doc_uri), "rId12"),
        Some(("https://example.org/?a=1&b=2".to_string(), TargetMode::External))
    );
    assert_eq!(pkg.resolve_relationship(Some(&doc_uri), "rId5"), None);

    let rels = pkg.relationships_of(Some(&doc_uri)).unwrap();
    assert_eq!(rels.next_id(), "rId13");
}

#[test]
fn test_parse_foreign_body() {
    init();
    let mut doc = Document::from_bytes(&foreign_docx()).unwrap();

    let para = doc.paragraph(0).unwrap();
    assert_eq!(para.style.as_deref(), Some("Heading1"));
    assert_eq!(para.text(), "Hello, World!link dangling");
    assert!(!para.runs()[0].bold);
    assert_eq!(para.runs()[1].hyperlink_url(), Some("https://example.org/?a=1&b=2"));
    assert_eq!(para.runs()[2].hyperlink, None);

    let inside_sdt = doc.paragraph(1).unwrap();
    assert!(inside_sdt.runs()[0].bold);
    assert!(!inside_sdt.runs()[0].italic);

    let table = doc.table(0).unwrap();
    assert_eq!(table.grid, vec![4000, 2000]);
    assert_eq!(table.cell(0, 1).unwrap().paragraphs.len(), 1);
    assert!(table.look.as_ref().unwrap().first_row);

    let section = doc.section(0).unwrap();
    assert_eq!(section.orientation, Some(Orientation::Landscape));
    assert_eq!(section.margins.left, 1000);
    assert_eq!(
        doc.header(HeaderFooterType::Default).unwrap().text(),
        "Running head"
    );
}

#[test]
fn test_foreign_document_survives_resave() {
    init();
    let mut doc = Document::from_bytes(&foreign_docx()).unwrap();
    doc.add_paragraph("appended");
    doc.header(HeaderFooterType::Default)
        .unwrap()
        .add_paragraph("second line");

    let bytes = doc.to_bytes().unwrap();
    let mut reloaded = Document::from_bytes(&bytes).unwrap();

    assert_eq!(reloaded.body(), doc.body());
    assert_eq!(reloaded.paragraph_count(), 3);
    assert_eq!(
        reloaded.header(HeaderFooterType::Default).unwrap().text(),
        "Running head\nsecond line"
    );

    // unrelated relationships and parts survive untouched
    let doc_uri = reloaded.package().main_document_uri().unwrap();
    let rels = reloaded.package().relationships_of(Some(&doc_uri)).unwrap();
    assert_eq!(rels.get("custom").unwrap().target, "thing.bin");
    assert_eq!(rels.by_type(rel_types::HYPERLINK).unwrap().id, "rId12");
}

#[test]
fn test_saved_manifest_is_sorted() {
    let mut doc = Document::new();
    doc.header(HeaderFooterType::Default).unwrap();
    let bytes = doc.to_bytes().unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut manifest = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("[Content_Types].xml").unwrap(),
        &mut manifest,
    )
    .unwrap();

    let rels_at = manifest.find(r#"Extension="rels""#).unwrap();
    let xml_at = manifest.find(r#"Extension="xml""#).unwrap();
    assert!(rels_at < xml_at);

    let overrides: Vec<_> = manifest
        .match_indices("PartName=\"")
        .map(|(i, _)| {
            let rest = &manifest[i + 10..];
            rest[..rest.find('"').unwrap()].to_string()
        })
        .collect();
    let mut sorted = overrides.clone();
    sorted.sort();
    assert_eq!(overrides, sorted);
    assert!(overrides.contains(&"/word/header1.xml".to_string()));

    assert!(archive.by_name("word/_rels/document.xml.rels").is_ok());
    assert!(archive.by_name("_rels/.rels").is_ok());
}

#[test]
fn test_missing_manifest_is_missing_part() {
    let bytes = build_zip(&[("_rels/.rels", ROOT_RELS), ("word/document.xml", DOCUMENT)]);
    assert!(matches!(
        Package::from_bytes(&bytes),
        Err(Error::MissingPart(_))
    ));
}

#[test]
fn test_truncated_body_is_format_error() {
    let truncated = &DOCUMENT[..DOCUMENT.find("<w:tbl>").unwrap()];
    let bytes = build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", truncated),
    ]);
    assert!(matches!(
        Document::from_bytes(&bytes),
        Err(Error::Format(_))
    ));
}

#[test]
fn test_not_a_zip_is_error() {
    assert!(matches!(
        Package::from_bytes(b"plain text"),
        Err(Error::Zip(_))
    ));
}

#[test]
fn test_save_to_disk_and_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");

    let mut doc = Document::new();
    doc.add_paragraph("on disk");
    doc.save(&path).unwrap();
    doc.close();

    let pkg = Package::open(&path).unwrap();
    assert!(pkg.contains(&PartUri::new("/word/styles.xml").unwrap()));
    assert!(pkg.contains(&PartUri::new("/word/numbering.xml").unwrap()));
    pkg.close();

    let doc = Document::open(&path).unwrap();
    assert_eq!(doc.text(), "on disk");
}
