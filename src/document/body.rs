//! Document body and block-level content

use crate::document::writer::WriteContext;
use crate::document::{Paragraph, Section, Table};
use crate::error::Result;
use quick_xml::Writer;
use std::io::Write;

/// Block-level content in a document body, in visual order
#[derive(Clone, Debug, PartialEq)]
pub enum BodyElement {
    /// Paragraph
    Paragraph(Paragraph),
    /// Table
    Table(Table),
    /// Body-level section break (w:body/w:sectPr)
    Section(Section),
}

/// Document body (w:body), also used for header and footer content
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    /// Block-level content
    pub elements: Vec<BodyElement>,
}

impl Body {
    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|c| {
            if let BodyElement::Paragraph(p) = c {
                Some(p)
            } else {
                None
            }
        })
    }

    /// Get all paragraphs mutably
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.elements.iter_mut().filter_map(|c| {
            if let BodyElement::Paragraph(p) = c {
                Some(p)
            } else {
                None
            }
        })
    }

    /// Get all tables
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.elements.iter().filter_map(|c| {
            if let BodyElement::Table(t) = c {
                Some(t)
            } else {
                None
            }
        })
    }

    /// Get all tables mutably
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.elements.iter_mut().filter_map(|c| {
            if let BodyElement::Table(t) = c {
                Some(t)
            } else {
                None
            }
        })
    }

    /// Get body-level sections
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.elements.iter().filter_map(|c| {
            if let BodyElement::Section(s) = c {
                Some(s)
            } else {
                None
            }
        })
    }

    /// Get body-level sections mutably
    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.elements.iter_mut().filter_map(|c| {
            if let BodyElement::Section(s) = c {
                Some(s)
            } else {
                None
            }
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    pub fn section_count(&self) -> usize {
        self.sections().count()
    }

    /// Position of the `index`-th element matching `pred` in `elements`
    pub(crate) fn position_of(
        &self,
        index: usize,
        pred: impl Fn(&BodyElement) -> bool,
    ) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(e))
            .nth(index)
            .map(|(i, _)| i)
    }

    /// Where new content goes: before the run of sections closing the body
    pub(crate) fn content_insert_position(&self) -> usize {
        let trailing = self
            .elements
            .iter()
            .rev()
            .take_while(|e| matches!(e, BodyElement::Section(_)))
            .count();
        self.elements.len() - trailing
    }

    /// Add content before the closing sections and return its element index
    pub(crate) fn push_content(&mut self, element: BodyElement) -> usize {
        let at = self.content_insert_position();
        self.elements.insert(at, element);
        at
    }

    /// Add a paragraph before the closing sections
    pub fn add_paragraph(&mut self, para: Paragraph) -> &mut Paragraph {
        let at = self.push_content(BodyElement::Paragraph(para));
        match &mut self.elements[at] {
            BodyElement::Paragraph(p) => p,
            _ => unreachable!("element {} was just inserted as a paragraph", at),
        }
    }

    /// Add a table before the closing sections
    pub fn add_table(&mut self, table: Table) -> &mut Table {
        let at = self.content_insert_position();
        self.insert_table(at, table)
    }

    /// Insert a table at element index `at`
    pub(crate) fn insert_table(&mut self, at: usize, table: Table) -> &mut Table {
        self.elements.insert(at, BodyElement::Table(table));
        match &mut self.elements[at] {
            BodyElement::Table(t) => t,
            _ => unreachable!("element {} was just inserted as a table", at),
        }
    }

    /// Concatenated paragraph text, one line per paragraph
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the elements (without the `w:body` wrapper)
    pub(crate) fn write_elements<W: Write>(
        &self,
        writer: &mut Writer<W>,
        ctx: &mut WriteContext,
    ) -> Result<()> {
        for element in &self.elements {
            match element {
                BodyElement::Paragraph(p) => p.write_to(writer, ctx)?,
                BodyElement::Table(t) => t.write_to(writer, ctx)?,
                BodyElement::Section(s) => s.write_to(writer)?,
            }
        }
        Ok(())
    }
}
