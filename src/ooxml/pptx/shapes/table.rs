/// Table shapes for PowerPoint slides.
///
/// Tables are DrawingML tables (`a:tbl`) inside graphic frames. Each cell
/// owns an `a:txBody`.
use crate::common::error::{Error, Result};
use crate::ooxml::pptx::shapes::base::Geometry;
use crate::ooxml::pptx::shapes::textframe::TextBody;

/// A cell of a table (`a:tc`).
#[derive(Debug, Clone)]
pub struct TableCell {
    /// Text body of the cell
    pub body: TextBody,
    /// `gridSpan`, 1 when absent
    pub grid_span: u32,
    /// `rowSpan`, 1 when absent
    pub row_span: u32,
    /// `hMerge="1"`: covered by a cell to the left
    pub h_merge: bool,
    /// `vMerge="1"`: covered by a cell above
    pub v_merge: bool,
}

impl TableCell {
    /// Detached cell holding `text`, mostly useful for building trees by hand.
    pub fn with_text(text: &str) -> Self {
        let mut body = TextBody::new("a:txBody");
        body.set_single_run(text, Default::default());
        Self {
            body,
            grid_span: 1,
            row_span: 1,
            h_merge: false,
            v_merge: false,
        }
    }

    /// Text of the cell.
    pub fn text(&self) -> String {
        self.body.text()
    }

    /// Whether the cell is hidden under a merged neighbour.
    #[inline]
    pub fn is_spanned(&self) -> bool {
        self.h_merge || self.v_merge
    }
}

/// A table row (`a:tr`).
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Row height in EMUs (`h`)
    pub height: i64,
    /// Cells in column order
    pub cells: Vec<TableCell>,
}

/// A DrawingML table.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column widths in EMUs (`a:gridCol w`)
    pub columns: Vec<i64>,
    /// Rows in document order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell at zero-based `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Mutable cell at zero-based `(row, col)`.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Check that every row has exactly one cell per grid column.
    pub fn validate(&self) -> Result<()> {
        for (idx, row) in self.rows.iter().enumerate() {
            if row.cells.len() != self.columns.len() {
                return Err(Error::Structural(format!(
                    "table row {} has {} cells but the grid defines {} columns",
                    idx + 1,
                    row.cells.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Geometry of the cell at zero-based `(row, col)` relative to `frame`.
    ///
    /// Offsets accumulate grid column widths and row heights; spans widen
    /// the cell accordingly.
    pub fn cell_geometry(&self, frame: Geometry, row: usize, col: usize) -> Option<Geometry> {
        let cell = self.cell(row, col)?;
        let x: i64 = self.columns.iter().take(col).sum();
        let y: i64 = self.rows.iter().take(row).map(|r| r.height).sum();
        let span_cols = cell.grid_span.max(1) as usize;
        let span_rows = cell.row_span.max(1) as usize;
        let cx: i64 = self.columns.iter().skip(col).take(span_cols).sum();
        let cy: i64 = self
            .rows
            .iter()
            .skip(row)
            .take(span_rows)
            .map(|r| r.height)
            .sum();
        Some(Geometry::new(frame.x + x, frame.y + y, cx, cy))
    }
}

/// A graphic frame holding a table.
#[derive(Debug, Clone)]
pub struct TableShape {
    /// `cNvPr id`
    pub id: u32,
    /// `cNvPr name`
    pub name: String,
    /// Frame geometry in slide EMUs
    pub geometry: Option<Geometry>,
    /// The table itself
    pub table: Table,
}
