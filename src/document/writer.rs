//! Body serializer: regenerates a part's XML from its tree

use crate::document::{Body, BodyElement, Section};
use crate::error::Result;
use crate::opc::{rel_types, Relationships, TargetMode};
use crate::xml::body_namespaces;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Relationships of the part being written.
///
/// Hyperlinks allocate their relationship IDs here, so writing the same
/// tree twice reuses the same IDs.
pub struct WriteContext<'a> {
    rels: &'a mut Relationships,
}

impl<'a> WriteContext<'a> {
    pub fn new(rels: &'a mut Relationships) -> Self {
        WriteContext { rels }
    }

    /// Relationship ID for an external hyperlink target
    pub fn hyperlink_id(&mut self, url: &str) -> String {
        self.rels
            .ensure(rel_types::HYPERLINK, url, TargetMode::External)
    }
}

/// Serialize the main document part (`w:document`)
///
/// A body without any section element gets a default one at the end.
pub(crate) fn write_document(body: &Body, rels: &mut Relationships) -> Result<Vec<u8>> {
    write_part("w:document", rels, |writer, ctx| {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;
        body.write_elements(writer, ctx)?;
        if !body.elements.iter().any(|e| matches!(e, BodyElement::Section(_))) {
            Section::default().write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    })
}

/// Serialize a header (`w:hdr`) or footer (`w:ftr`) part
pub(crate) fn write_header_footer(
    root: &str,
    body: &Body,
    rels: &mut Relationships,
) -> Result<Vec<u8>> {
    write_part(root, rels, |writer, ctx| body.write_elements(writer, ctx))
}

fn write_part<F>(root: &str, rels: &mut Relationships, content: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Writer<Cursor<Vec<u8>>>, &mut WriteContext) -> Result<()>,
{
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )))?;

    let mut start = BytesStart::new(root);
    for (attr, value) in body_namespaces() {
        start.push_attribute((attr, value));
    }
    writer.write_event(Event::Start(start))?;

    let mut ctx = WriteContext::new(rels);
    content(&mut writer, &mut ctx)?;

    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, SectionStart};
    use pretty_assertions::assert_eq;

    fn body_of(xml: &[u8]) -> String {
        let xml = std::str::from_utf8(xml).unwrap();
        let start = xml.find("<w:body>").unwrap();
        let end = xml.find("</w:body>").unwrap();
        xml[start + 8..end].to_string()
    }

    #[test]
    fn test_document_gets_default_section() {
        let mut body = Body::default();
        body.push_content(BodyElement::Paragraph(Paragraph::new("x")));

        let xml = write_document(&body, &mut Relationships::new()).unwrap();
        assert!(xml.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert_eq!(
            body_of(&xml),
            concat!(
                "<w:p><w:r><w:t>x</w:t></w:r></w:p><w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>",
                "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\"/>",
                "</w:sectPr>"
            )
        );
    }

    #[test]
    fn test_existing_section_is_not_duplicated() {
        let mut body = Body::default();
        body.elements
            .push(BodyElement::Section(Section::new(SectionStart::OddPage)));

        let xml = write_document(&body, &mut Relationships::new()).unwrap();
        assert_eq!(body_of(&xml).matches("<w:sectPr>").count(), 1);
        assert!(body_of(&xml).contains("<w:type w:val=\"oddPage\"/>"));
    }

    #[test]
    fn test_header_root_and_namespaces() {
        let body = Body {
            elements: vec![BodyElement::Paragraph(Paragraph::new("Header"))],
        };
        let xml = write_header_footer("w:hdr", &body, &mut Relationships::new()).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<w:hdr xmlns:w="));
        assert!(xml.contains("xmlns:pic="));
        assert!(xml.ends_with("<w:p><w:r><w:t>Header</w:t></w:r></w:p></w:hdr>"));
        assert!(!xml.contains("sectPr"));
    }
}
