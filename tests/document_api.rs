//! Integration test: Document API round trips

use docx_package::document::{
    Alignment, Border, BreakType, HeaderFooterType, LineRule, Orientation, ParagraphBorderSide,
    SectionStart, Shading, TabAlignment, TabLeader, TabStop, TableBorderSide, TableWidth, VMerge,
};
use docx_package::opc::{rel_types, TargetMode};
use docx_package::{Document, Error, Run};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn reload(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().unwrap();
    Document::from_bytes(&bytes).unwrap()
}

#[test]
fn test_scenario_table_text_survives_save() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.docx");

    let mut doc = Document::new();
    doc.add_table(2, 3)
        .unwrap()
        .set_cell_text(0, 0, "A1")
        .unwrap();
    doc.save(&path).unwrap();

    let doc = Document::open(&path).unwrap();
    let table = doc.table(0).unwrap();
    assert_eq!(table.row_count(), 2);
    for row in table.rows() {
        assert_eq!(row.cell_count(), 3);
    }
    assert_eq!(table.cell(0, 0).unwrap().text(), "A1");
}

#[test]
fn test_scenario_bold_italic_run() {
    init();
    let mut doc = Document::new();
    let run = doc.add_paragraph("").add_text("Hello");
    run.bold = true;
    run.italic = true;

    let doc = reload(&mut doc);
    let run = &doc.paragraph(0).unwrap().runs()[0];
    assert_eq!(run.text, "Hello");
    assert!(run.bold);
    assert!(run.italic);
}

#[test]
fn test_scenario_external_hyperlink() {
    init();
    let mut doc = Document::new();
    let mut run = Run::new("site");
    run.set_hyperlink_url("https://example.com");
    doc.add_paragraph("See ").add_run(run);

    let doc = reload(&mut doc);
    let run = &doc.paragraph(0).unwrap().runs()[1];
    assert_eq!(run.hyperlink_url(), Some("https://example.com"));

    let document_uri = doc.package().main_document_uri().unwrap();
    let rels = doc.package().relationships_of(Some(&document_uri)).unwrap();
    let rel = rels.by_type(rel_types::HYPERLINK).unwrap();
    assert_eq!(
        doc.package().resolve_relationship(Some(&document_uri), &rel.id),
        Some(("https://example.com".to_string(), TargetMode::External))
    );
}

#[test]
fn test_round_trip_and_idempotence() {
    init();
    let mut doc = Document::new();

    let para = doc.add_paragraph("Intro\twith tab");
    para.set_alignment(Alignment::Both);
    para.set_spacing(Some(120), None);
    para.set_line_spacing(276, LineRule::Auto);
    para.set_keep_next(Some(true));
    para.set_widow_control(Some(false));
    para.add_tab_stop(TabStop {
        position: 4320,
        alignment: TabAlignment::Right,
        leader: TabLeader::Dot,
    });
    para.set_border(ParagraphBorderSide::Bottom, Border::new("single", 6, "4472C4"));
    para.set_shading(Some(Shading::new("clear", "F2F2F2", "auto")));
    let run = para.add_text(" styled  ");
    run.underline = "double".into();
    run.set_font_size_pt(14.0);
    run.color = "FF0000".into();
    run.font = "Arial".into();
    run.char_spacing = Some(-10);
    run.set_break(Some(BreakType::Column));

    doc.add_heading("Chapter", 1).unwrap();
    doc.add_numbered_paragraph("first", 0);
    doc.add_page_break();

    let table = doc.add_table(3, 3).unwrap();
    table.set_cell_text(0, 0, "merged").unwrap();
    table.set_cell_text(0, 1, "absorbed").unwrap();
    table.merge_horizontal(0, 0, 1).unwrap();
    table.merge_vertical(1, 1, 2).unwrap();
    table.set_border(TableBorderSide::InsideV, Border::default());
    table.set_width(TableWidth::Pct(5000));
    table.set_cell_margins(0, 108, 0, 108);

    let section = doc.section_mut(0).unwrap();
    section.set_orientation(Orientation::Landscape);
    section.set_margins(720, 720, 720, 720);

    let mut first = reload(&mut doc);
    assert_eq!(first.body(), doc.body());

    let second = reload(&mut first);
    assert_eq!(second.body(), first.body());

    let table = second.table(0).unwrap();
    assert_eq!(table.cell(0, 0).unwrap().grid_span, 2);
    assert_eq!(table.cell(0, 0).unwrap().text(), "merged\nabsorbed");
    assert_eq!(table.cell(0, 0).unwrap().width, 2880);
    assert_eq!(table.cell(1, 1).unwrap().v_merge, Some(VMerge::Restart));
    assert_eq!(table.cell(2, 1).unwrap().v_merge, Some(VMerge::Continue));
    assert_eq!(table.column_widths(), vec![1440, 1440, 1440]);
    assert!(!table.borders.contains_key(&TableBorderSide::InsideV));

    let section = second.section(0).unwrap();
    assert_eq!(section.orientation, Some(Orientation::Landscape));
    assert_eq!(section.page_width, 16838);
    assert_eq!(section.margins.top, 720);
}

#[test]
fn test_default_run_has_no_properties() {
    let mut doc = Document::new();
    doc.add_paragraph("plain");

    let xml = doc.document_xml().unwrap();
    assert!(xml.contains("<w:p><w:r><w:t>plain</w:t></w:r></w:p>"));
    assert!(!xml.contains("<w:rPr>"));

    let doc = reload(&mut doc);
    assert_eq!(doc.paragraph(0).unwrap().runs()[0], Run::new("plain"));
}

#[test]
fn test_inferred_grid_is_stable() {
    let mut doc = Document::new();
    let table = doc.add_table(2, 3).unwrap();
    table.set_column_widths(&[]);
    table.cell_mut(0, 0).unwrap().set_width(2000);
    table.cell_mut(0, 1).unwrap().set_width(3001);
    table.cell_mut(1, 1).unwrap().set_width(9999);

    let expected = vec![2000, 3001, 1440];
    assert_eq!(doc.table(0).unwrap().column_widths(), expected);

    let mut first = reload(&mut doc);
    assert_eq!(first.table(0).unwrap().grid, expected);
    let second = reload(&mut first);
    assert_eq!(second.table(0).unwrap().grid, expected);
}

#[test]
fn test_merge_validation() {
    let mut doc = Document::new();
    let table = doc.add_table(2, 3).unwrap();
    let before = table.clone();

    table.merge_horizontal(0, 1, 1).unwrap();
    assert_eq!(*table, before);

    assert!(matches!(table.merge_horizontal(0, 2, 1), Err(Error::Validation(_))));
    assert!(matches!(table.merge_horizontal(0, 0, 3), Err(Error::Validation(_))));
    assert!(matches!(table.merge_horizontal(5, 0, 1), Err(Error::Validation(_))));
    assert!(matches!(table.merge_vertical(0, 0, 2), Err(Error::Validation(_))));
    assert_eq!(*table, before);

    table.merge_vertical(1, 0, 1).unwrap();
    assert_eq!(table.cell(0, 1).unwrap().v_merge, Some(VMerge::Restart));
    assert_eq!(table.cell(1, 1).unwrap().v_merge, Some(VMerge::Continue));
}

#[test]
fn test_hyperlink_ids_are_reused() {
    let mut doc = Document::new();
    for _ in 0..3 {
        let mut run = Run::new("link");
        run.set_hyperlink_url("https://example.com/a");
        doc.add_paragraph("").add_run(run);
    }
    let mut anchor = Run::new("back");
    anchor.set_hyperlink_anchor("_top");
    doc.add_paragraph("").add_run(anchor);

    doc.to_bytes().unwrap();
    doc.to_bytes().unwrap();

    let uri = doc.package().main_document_uri().unwrap();
    let rels = doc.package().relationships_of(Some(&uri)).unwrap();
    let hyperlinks: Vec<_> = rels
        .iter()
        .filter(|r| r.rel_type == rel_types::HYPERLINK)
        .collect();
    assert_eq!(hyperlinks.len(), 1);

    let mut ids: Vec<_> = rels.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), rels.len());

    let xml = doc.document_xml().unwrap();
    assert!(xml.contains(r#"<w:hyperlink w:anchor="_top">"#));
}

#[test]
fn test_insert_and_remove_elements() {
    let mut doc = Document::new();
    doc.add_paragraph("a");
    doc.add_paragraph("b");
    doc.insert_table_after_paragraph(0, 1, 2).unwrap();
    doc.add_section(SectionStart::NewPage);

    let texts: Vec<_> = doc.paragraphs().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["a", "b"]);
    assert_eq!(doc.table_count(), 1);
    assert_eq!(doc.sections().count(), 2);

    let doc2 = reload(&mut doc);
    assert_eq!(doc2.body(), doc.body());

    let removed = doc.remove_paragraph(1).unwrap();
    assert_eq!(removed.text(), "b");
    doc.remove_table(0).unwrap();
    let section = doc.remove_section(1).unwrap();
    assert_eq!(section.start, SectionStart::NewPage);
    assert!(matches!(doc.remove_paragraph(1), Err(Error::Validation(_))));

    assert_eq!(doc.text(), "a");
    assert_eq!(doc.table_count(), 0);
}

#[test]
fn test_headers_and_footers_persist() {
    init();
    let mut doc = Document::new();
    doc.header(HeaderFooterType::Default)
        .unwrap()
        .add_paragraph("Company");
    doc.footer(HeaderFooterType::Default)
        .unwrap()
        .add_paragraph("Page footer");
    doc.add_paragraph("body");

    let mut reloaded = reload(&mut doc);
    let section = reloaded.section(0).unwrap();
    assert_eq!(
        section.header_ref(HeaderFooterType::Default).unwrap().part.as_str(),
        "/word/header1.xml"
    );
    assert_eq!(
        section.footer_ref(HeaderFooterType::Default).unwrap().part.as_str(),
        "/word/footer1.xml"
    );
    assert_eq!(
        reloaded.header(HeaderFooterType::Default).unwrap().text(),
        "Company"
    );
    assert_eq!(
        reloaded.footer(HeaderFooterType::Default).unwrap().text(),
        "Page footer"
    );

    let even = reloaded.header(HeaderFooterType::Even).unwrap();
    assert_eq!(even.uri().as_str(), "/word/header2.xml");
}

#[test]
fn test_picture_auto_size_and_data() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.png");
    image::RgbImage::new(2, 1).save(&path).unwrap();

    let mut doc = Document::new();
    doc.add_picture(&path, 0, 0).unwrap();
    doc.add_picture(&path, 0, 19050).unwrap();

    let doc = reload(&mut doc);
    let pictures: Vec<_> = doc.paragraphs().flat_map(|p| p.pictures()).collect();
    assert_eq!(pictures.len(), 2);

    let first = pictures[0];
    assert_eq!((first.width_emu, first.height_emu), (19050, 9525));
    assert_eq!(first.name, "Picture 1");
    assert_eq!(first.description, "logo");
    assert_eq!(
        first.target.as_ref().unwrap().as_str(),
        "/word/media/image1.png"
    );
    assert_eq!((pictures[1].width_emu, pictures[1].height_emu), (38100, 19050));
    assert_eq!(pictures[1].id, 2);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(first.image_data(&doc).unwrap(), bytes.as_slice());
    assert_eq!(
        doc.package().content_types().default_for("png"),
        Some("image/png")
    );
}

#[test]
fn test_picture_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not an image").unwrap();

    let mut doc = Document::new();
    assert!(matches!(
        doc.add_picture(&path, 100, 100),
        Err(Error::UnsupportedImage(_))
    ));
    assert!(matches!(
        doc.add_picture(dir.path().join("missing.png"), 100, 100),
        Err(Error::Io(_))
    ));

    let detached = docx_package::Picture::default();
    assert!(matches!(detached.image_data(&doc), Err(Error::Detached(_))));
    assert_eq!(doc.paragraph_count(), 0);
}
