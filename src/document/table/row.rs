//! Table row elements (w:tr)

use crate::document::writer::WriteContext;
use crate::error::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

use super::cell::TableCell;

/// Table row (w:tr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    /// Cells
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with empty cells of the given widths
    pub fn with_widths(widths: &[i32]) -> Self {
        TableRow {
            cells: widths.iter().map(|&w| TableCell::with_width(w)).collect(),
        }
    }

    /// Get cell count
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of grid columns this row covers
    pub fn grid_columns(&self) -> usize {
        self.cells.iter().map(|c| c.grid_span.max(1)).sum()
    }

    /// Get cell by index
    pub fn cell(&self, index: usize) -> Option<&TableCell> {
        self.cells.get(index)
    }

    /// Get mutable cell by index
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut TableCell> {
        self.cells.get_mut(index)
    }

    /// Iterate over cells
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter()
    }

    /// Write to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>, ctx: &mut WriteContext) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tr")))?;

        for cell in &self.cells {
            cell.write_to(writer, ctx)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
        Ok(())
    }
}
