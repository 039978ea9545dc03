//! Table cell elements (w:tc, w:tcPr)

use crate::document::formatting::{Border, Shading};
use crate::document::writer::WriteContext;
use crate::document::Paragraph;
use crate::error::Result;
use crate::xml::{write_empty, write_val};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

use super::types::{TableBorderSide, VMerge, VerticalAlignment};

/// Cell width in twips when none is given (one inch)
pub const DEFAULT_CELL_WIDTH: i32 = 1440;

/// Largest grid span a cell may claim (the format allows 63 columns)
pub const MAX_GRID_SPAN: usize = 63;

/// Table cell (w:tc)
#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    /// Cell content; holds at least one paragraph once parsed or created
    pub paragraphs: Vec<Paragraph>,
    /// Cell width in twips
    pub width: i32,
    /// Number of grid columns covered, at least 1
    pub grid_span: usize,
    pub v_merge: Option<VMerge>,
    pub v_align: VerticalAlignment,
    pub borders: BTreeMap<TableBorderSide, Border>,
    pub shading: Option<Shading>,
}

impl Default for TableCell {
    fn default() -> Self {
        TableCell {
            paragraphs: vec![Paragraph::default()],
            width: DEFAULT_CELL_WIDTH,
            grid_span: 1,
            v_merge: None,
            v_align: VerticalAlignment::Top,
            borders: BTreeMap::new(),
            shading: None,
        }
    }
}

impl TableCell {
    /// Create a new cell with text
    pub fn new(text: impl Into<String>) -> Self {
        let mut cell = TableCell::default();
        cell.set_text(text);
        cell
    }

    /// Empty cell of the given width
    pub fn with_width(width: i32) -> Self {
        TableCell {
            width,
            ..Default::default()
        }
    }

    /// Set the cell text (replaces all paragraphs with a single one)
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.paragraphs.clear();
        self.paragraphs.push(Paragraph::new(text));
    }

    /// Add a paragraph to the cell
    pub fn add_paragraph(&mut self, para: Paragraph) -> &mut Paragraph {
        self.paragraphs.push(para);
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Get cell text (paragraphs joined by newlines)
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs.iter()
    }

    /// Get mutable paragraphs iterator
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.paragraphs.iter_mut()
    }

    /// Set cell width (in twips)
    pub fn set_width(&mut self, width: i32) {
        self.width = width;
    }

    /// Set horizontal merge (grid span), clamped to `1..=MAX_GRID_SPAN`
    pub fn set_grid_span(&mut self, span: usize) {
        self.grid_span = span.clamp(1, MAX_GRID_SPAN);
    }

    pub fn set_v_merge(&mut self, v_merge: Option<VMerge>) {
        self.v_merge = v_merge;
    }

    pub fn set_vertical_alignment(&mut self, align: VerticalAlignment) {
        self.v_align = align;
    }

    /// Set a border side; an empty style removes the side
    pub fn set_border(&mut self, side: TableBorderSide, border: Border) {
        if border.style.is_empty() {
            self.borders.remove(&side);
        } else {
            self.borders.insert(side, border);
        }
    }

    pub fn set_shading(&mut self, shading: Option<Shading>) {
        self.shading = shading;
    }

    /// Check if this cell is the start of a vertical merge
    pub fn is_v_merge_start(&self) -> bool {
        matches!(self.v_merge, Some(VMerge::Restart))
    }

    /// Check if this cell continues a vertical merge
    pub fn is_v_merge_continue(&self) -> bool {
        matches!(self.v_merge, Some(VMerge::Continue))
    }

    /// Clear cell content
    pub fn clear(&mut self) {
        self.paragraphs.clear();
        self.paragraphs.push(Paragraph::default());
    }

    /// Write to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>, ctx: &mut WriteContext) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tc")))?;

        self.write_properties(writer)?;

        // A cell must hold at least one paragraph
        if self.paragraphs.is_empty() {
            Paragraph::default().write_to(writer, ctx)?;
        } else {
            for para in &self.paragraphs {
                para.write_to(writer, ctx)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
        Ok(())
    }

    fn write_properties<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;

        let width = self.width.to_string();
        write_empty(writer, "w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;

        if self.grid_span > 1 {
            write_val(writer, "w:gridSpan", &self.grid_span.to_string())?;
        }
        if let Some(v_merge) = self.v_merge {
            write_val(writer, "w:vMerge", v_merge.as_str())?;
        }
        if self.v_align != VerticalAlignment::Top {
            write_val(writer, "w:vAlign", self.v_align.as_str())?;
        }
        if !self.borders.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tcBorders")))?;
            for (side, border) in &self.borders {
                border.write_table_form(writer, side.tag())?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:tcBorders")))?;
        }
        if let Some(shading) = &self.shading {
            shading.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;
        Ok(())
    }
}
