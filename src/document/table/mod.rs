//! Table elements (w:tbl, w:tr, w:tc)

mod cell;
mod row;
mod types;

pub use cell::{TableCell, DEFAULT_CELL_WIDTH, MAX_GRID_SPAN};
pub use row::TableRow;
pub use types::{
    CellMargins, TableAlignment, TableBorderSide, TableLayout, TableLook, TableWidth, VMerge,
    VerticalAlignment,
};

use crate::document::formatting::{Border, Shading};
use crate::document::writer::WriteContext;
use crate::error::{Error, Result};
use crate::xml::{write_empty, write_val};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

/// Table element (w:tbl)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
    /// Explicit column widths in twips; empty means infer from the cells
    pub grid: Vec<i32>,
    /// Table style ID
    pub style: Option<String>,
    pub width: TableWidth,
    pub indent: Option<TableWidth>,
    pub alignment: Option<TableAlignment>,
    pub borders: BTreeMap<TableBorderSide, Border>,
    pub layout: Option<TableLayout>,
    pub look: Option<TableLook>,
    pub shading: Option<Shading>,
    pub cell_margins: CellMargins,
}

impl Table {
    /// Create a new table with the specified number of rows and columns.
    ///
    /// Every cell is one inch wide and all six border sides are single lines.
    pub fn new(rows: usize, cols: usize) -> Self {
        let grid = vec![DEFAULT_CELL_WIDTH; cols];
        let rows = (0..rows).map(|_| TableRow::with_widths(&grid)).collect();

        let mut table = Table {
            grid,
            rows,
            ..Default::default()
        };
        for side in TableBorderSide::ALL {
            table.set_border(side, Border::new("single", 4, "auto"));
        }
        table
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns: the explicit grid or the widest row, counting spans
    pub fn column_count(&self) -> usize {
        let widest = self.rows.iter().map(TableRow::grid_columns).max().unwrap_or(0);
        widest.max(self.grid.len())
    }

    /// Get cell at position
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(col)
    }

    /// Get mutable cell at position
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row)?.cells.get_mut(col)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    /// Get row by index
    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    /// Get mutable row
    pub fn row_mut(&mut self, index: usize) -> Option<&mut TableRow> {
        self.rows.get_mut(index)
    }

    /// Append an empty row whose cells follow the current column widths
    pub fn add_row(&mut self) -> &mut TableRow {
        let index = self.rows.len();
        self.insert_row_at(index)
    }

    /// Insert an empty row; the index is clamped to `0..=row_count`
    pub fn insert_row_at(&mut self, index: usize) -> &mut TableRow {
        let mut widths = self.column_widths();
        if widths.is_empty() {
            widths.push(DEFAULT_CELL_WIDTH);
        }
        let index = index.min(self.rows.len());
        self.rows.insert(index, TableRow::with_widths(&widths));
        &mut self.rows[index]
    }

    /// Remove a row at the specified index
    pub fn remove_row(&mut self, index: usize) -> Option<TableRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Set cell text at position
    pub fn set_cell_text(&mut self, row: usize, col: usize, text: impl Into<String>) -> Result<()> {
        let cell = self
            .cell_mut(row, col)
            .ok_or_else(|| Error::validation(format!("cell ({row}, {col}) out of range")))?;
        cell.set_text(text);
        Ok(())
    }

    /// Replace the grid and resize every cell to the columns it spans.
    ///
    /// An empty slice clears the grid so widths are inferred again.
    pub fn set_column_widths(&mut self, widths: &[i32]) {
        self.grid = widths.to_vec();
        if widths.is_empty() {
            return;
        }
        for row in &mut self.rows {
            let mut col = 0;
            for cell in &mut row.cells {
                if col >= widths.len() {
                    break;
                }
                let span = cell.grid_span.max(1);
                let end = (col + span).min(widths.len());
                let total: i32 = widths[col..end].iter().sum();
                if total > 0 {
                    cell.width = total;
                }
                col += span;
            }
        }
    }

    /// Column widths in twips: the explicit grid, or widths inferred from cells.
    ///
    /// Inference walks rows top to bottom and splits each cell's width across
    /// the columns it spans, giving the remainder to the leading columns. The
    /// first row to supply a column's width wins. Columns nobody fills get one
    /// inch.
    pub fn column_widths(&self) -> Vec<i32> {
        if !self.grid.is_empty() {
            return self.grid.clone();
        }

        let cols = self.column_count();
        let mut widths = vec![0; cols];
        let mut filled = vec![false; cols];

        for row in &self.rows {
            let mut col = 0;
            for cell in &row.cells {
                let span = cell.grid_span.max(1);
                if cell.width <= 0 {
                    col += span;
                    continue;
                }
                let per = cell.width / span as i32;
                let mut remainder = cell.width % span as i32;
                for _ in 0..span {
                    if col >= cols {
                        break;
                    }
                    let mut w = per;
                    if remainder > 0 {
                        w += 1;
                        remainder -= 1;
                    }
                    if !filled[col] && w > 0 {
                        widths[col] = w;
                        filled[col] = true;
                    }
                    col += 1;
                }
            }
            if filled.iter().all(|f| *f) {
                break;
            }
        }

        for w in &mut widths {
            if *w == 0 {
                *w = DEFAULT_CELL_WIDTH;
            }
        }
        widths
    }

    /// Merge cells `start..=end` of a row into the first one.
    ///
    /// The merged cell takes the summed width and span, and paragraphs with
    /// text from the absorbed cells move into it. `start == end` is a no-op.
    pub fn merge_horizontal(&mut self, row: usize, start: usize, end: usize) -> Result<()> {
        let row_count = self.rows.len();
        let cells = &mut self
            .rows
            .get_mut(row)
            .ok_or_else(|| {
                Error::validation(format!("row index {row} out of range ({row_count} rows)"))
            })?
            .cells;
        if end < start {
            return Err(Error::validation(format!(
                "merge end {end} is before start {start}"
            )));
        }
        if end >= cells.len() {
            return Err(Error::validation(format!(
                "cell index {end} out of range ({} cells)",
                cells.len()
            )));
        }
        if start == end {
            return Ok(());
        }

        let absorbed: Vec<TableCell> = cells.drain(start + 1..=end).collect();
        let first = &mut cells[start];
        let mut moved = Vec::new();
        for cell in absorbed {
            first.width += cell.width;
            first.grid_span = first.grid_span.max(1) + cell.grid_span.max(1);
            moved.extend(cell.paragraphs.into_iter().filter(|p| !p.text().is_empty()));
        }
        if !moved.is_empty() {
            if first.text().is_empty() {
                first.paragraphs = moved;
            } else {
                first.paragraphs.extend(moved);
            }
        }
        Ok(())
    }

    /// Merge a column over rows `start_row..=end_row`.
    ///
    /// The first cell restarts the merge and the rest continue it. Every row
    /// is checked before any cell changes.
    pub fn merge_vertical(&mut self, col: usize, start_row: usize, end_row: usize) -> Result<()> {
        if end_row < start_row || end_row >= self.rows.len() {
            return Err(Error::validation(format!(
                "invalid row range {start_row}..={end_row} for vertical merge ({} rows)",
                self.rows.len()
            )));
        }
        for (index, row) in self.rows[start_row..=end_row].iter().enumerate() {
            if col >= row.cells.len() {
                return Err(Error::validation(format!(
                    "column index {col} out of range for row {}",
                    start_row + index
                )));
            }
        }

        for (index, row) in self.rows[start_row..=end_row].iter_mut().enumerate() {
            row.cells[col].v_merge = Some(if index == 0 {
                VMerge::Restart
            } else {
                VMerge::Continue
            });
        }
        Ok(())
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        let style = style.into();
        self.style = (!style.is_empty()).then_some(style);
    }

    /// Set the preferred width
    pub fn set_width(&mut self, width: TableWidth) {
        self.width = width;
    }

    pub fn set_indent(&mut self, indent: Option<TableWidth>) {
        self.indent = indent;
    }

    pub fn set_alignment(&mut self, alignment: Option<TableAlignment>) {
        self.alignment = alignment;
    }

    /// Set a border side; an empty style removes the side
    pub fn set_border(&mut self, side: TableBorderSide, border: Border) {
        if border.style.is_empty() {
            self.borders.remove(&side);
        } else {
            self.borders.insert(side, border);
        }
    }

    pub fn clear_borders(&mut self) {
        self.borders.clear();
    }

    pub fn set_layout(&mut self, layout: Option<TableLayout>) {
        self.layout = layout;
    }

    pub fn set_look(&mut self, look: Option<TableLook>) {
        self.look = look;
    }

    pub fn set_shading(&mut self, shading: Option<Shading>) {
        self.shading = shading;
    }

    /// Set default cell margins in twips
    pub fn set_cell_margins(&mut self, top: i32, left: i32, bottom: i32, right: i32) {
        self.cell_margins = CellMargins {
            top: Some(top),
            left: Some(left),
            bottom: Some(bottom),
            right: Some(right),
        };
    }

    /// Write to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>, ctx: &mut WriteContext) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;

        self.write_properties(writer)?;

        let widths = self.column_widths();
        if !widths.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
            for width in widths {
                let width = width.max(0).to_string();
                write_empty(writer, "w:gridCol", &[("w:w", width.as_str())])?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;
        }

        for row in &self.rows {
            row.write_to(writer, ctx)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
        Ok(())
    }

    fn write_properties<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tblPr")))?;

        if let Some(style) = &self.style {
            write_val(writer, "w:tblStyle", style)?;
        }
        write_width(writer, "w:tblW", self.width)?;
        if let Some(indent) = self.indent {
            write_width(writer, "w:tblInd", indent)?;
        }
        if let Some(alignment) = self.alignment {
            write_val(writer, "w:jc", alignment.as_str())?;
        }
        if !self.borders.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tblBorders")))?;
            for (side, border) in &self.borders {
                border.write_table_form(writer, side.tag())?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:tblBorders")))?;
        }
        if let Some(layout) = self.layout {
            write_empty(writer, "w:tblLayout", &[("w:type", layout.as_str())])?;
        }
        if let Some(look) = &self.look {
            let flag = |on: bool| if on { "1" } else { "0" };
            write_empty(
                writer,
                "w:tblLook",
                &[
                    ("w:val", look.val.as_str()),
                    ("w:firstRow", flag(look.first_row)),
                    ("w:lastRow", flag(look.last_row)),
                    ("w:firstColumn", flag(look.first_column)),
                    ("w:lastColumn", flag(look.last_column)),
                    ("w:noHBand", flag(look.no_h_band)),
                    ("w:noVBand", flag(look.no_v_band)),
                ],
            )?;
        }
        if let Some(shading) = &self.shading {
            shading.write_to(writer)?;
        }
        if !self.cell_margins.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tblCellMar")))?;
            let sides = [
                ("w:top", self.cell_margins.top),
                ("w:left", self.cell_margins.left),
                ("w:bottom", self.cell_margins.bottom),
                ("w:right", self.cell_margins.right),
            ];
            for (tag, margin) in sides {
                if let Some(margin) = margin {
                    write_width(writer, tag, TableWidth::Dxa(margin))?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new("w:tblCellMar")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tblPr")))?;
        Ok(())
    }
}

fn write_width<W: Write>(writer: &mut Writer<W>, tag: &str, width: TableWidth) -> Result<()> {
    let value = width.value().to_string();
    write_empty(writer, tag, &[("w:w", value.as_str()), ("w:type", width.kind())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn widths_only(rows: &[&[(i32, usize)]]) -> Table {
        Table {
            rows: rows
                .iter()
                .map(|cells| TableRow {
                    cells: cells
                        .iter()
                        .map(|&(width, span)| TableCell {
                            width,
                            grid_span: span,
                            ..Default::default()
                        })
                        .collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_table_defaults() {
        let table = Table::new(2, 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.grid, vec![1440, 1440, 1440]);
        assert_eq!(table.borders.len(), 6);
        assert_eq!(table.cell(1, 2).unwrap().paragraphs.len(), 1);
    }

    #[test]
    fn test_inference_splits_spans_with_leading_remainder() {
        let table = widths_only(&[&[(1001, 2), (500, 1)]]);
        assert_eq!(table.column_widths(), vec![501, 500, 500]);
    }

    #[test]
    fn test_inference_first_row_wins() {
        let table = widths_only(&[&[(1000, 1), (0, 1)], &[(3000, 1), (2000, 1)]]);
        assert_eq!(table.column_widths(), vec![1000, 2000]);
    }

    #[test]
    fn test_inference_defaults_unfilled_columns() {
        let table = widths_only(&[&[(800, 1)], &[(0, 1), (-5, 1), (0, 1)]]);
        assert_eq!(table.column_widths(), vec![800, 1440, 1440]);
    }

    #[test]
    fn test_set_column_widths_resizes_cells() {
        let mut table = Table::new(1, 3);
        table.merge_horizontal(0, 1, 2).unwrap();
        table.set_column_widths(&[1000, 2000, 3000]);
        assert_eq!(table.cell(0, 0).unwrap().width, 1000);
        assert_eq!(table.cell(0, 1).unwrap().width, 5000);
    }

    #[test]
    fn test_merge_horizontal() {
        let mut table = Table::new(1, 3);
        table.set_cell_text(0, 2, "tail").unwrap();
        table.merge_horizontal(0, 0, 2).unwrap();

        let row = table.row(0).unwrap();
        assert_eq!(row.cell_count(), 1);
        assert_eq!(row.cells[0].grid_span, 3);
        assert_eq!(row.cells[0].width, 4320);
        assert_eq!(row.cells[0].text(), "tail");
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_merge_horizontal_validation() {
        let mut table = Table::new(2, 3);
        let before = table.clone();

        table.merge_horizontal(0, 1, 1).unwrap();
        assert!(matches!(table.merge_horizontal(0, 2, 1), Err(Error::Validation(_))));
        assert!(matches!(table.merge_horizontal(0, 0, 3), Err(Error::Validation(_))));
        assert!(matches!(table.merge_horizontal(5, 0, 1), Err(Error::Validation(_))));
        assert_eq!(table, before);
    }

    #[test]
    fn test_merge_vertical() {
        let mut table = Table::new(3, 2);
        table.merge_vertical(1, 0, 2).unwrap();
        assert_eq!(table.cell(0, 1).unwrap().v_merge, Some(VMerge::Restart));
        assert_eq!(table.cell(1, 1).unwrap().v_merge, Some(VMerge::Continue));
        assert_eq!(table.cell(2, 1).unwrap().v_merge, Some(VMerge::Continue));
        assert_eq!(table.cell(0, 0).unwrap().v_merge, None);
    }

    #[test]
    fn test_merge_vertical_validates_before_mutating() {
        let mut table = Table::new(3, 2);
        table.merge_horizontal(2, 0, 1).unwrap();
        let before = table.clone();

        assert!(matches!(table.merge_vertical(1, 0, 2), Err(Error::Validation(_))));
        assert!(matches!(table.merge_vertical(0, 1, 3), Err(Error::Validation(_))));
        assert!(matches!(table.merge_vertical(0, 2, 1), Err(Error::Validation(_))));
        assert_eq!(table, before);
    }

    #[test]
    fn test_insert_row_clamps_and_uses_widths() {
        let mut table = Table::new(1, 2);
        table.set_column_widths(&[1000, 3000]);
        table.insert_row_at(99).cells[0].set_text("last");
        table.insert_row_at(0);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(2, 0).unwrap().text(), "last");
        assert_eq!(table.cell(0, 1).unwrap().width, 3000);
    }

    #[test]
    fn test_table_properties_order() {
        let mut table = Table::new(1, 1);
        table.clear_borders();
        table.set_style("TableGrid");
        table.set_width(TableWidth::Pct(5000));
        table.set_alignment(Some(TableAlignment::Center));
        table.set_layout(Some(TableLayout::Fixed));
        table.set_cell_margins(0, 108, 0, 108);

        let mut rels = crate::opc::Relationships::new();
        let mut writer = Writer::new(Vec::new());
        table
            .write_to(&mut writer, &mut WriteContext::new(&mut rels))
            .unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();

        assert!(xml.starts_with(concat!(
            "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/>",
            "<w:tblW w:w=\"5000\" w:type=\"pct\"/><w:jc w:val=\"center\"/>",
            "<w:tblLayout w:type=\"fixed\"/><w:tblCellMar>",
            "<w:top w:w=\"0\" w:type=\"dxa\"/><w:left w:w=\"108\" w:type=\"dxa\"/>",
        )));
        assert!(xml.contains("<w:tblGrid><w:gridCol w:w=\"1440\"/></w:tblGrid>"));
    }
}
