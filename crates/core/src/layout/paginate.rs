//! Table pagination.
//!
//! Every page starts the table at the same y and repeats the two header rows
//! (the super-header with the table title, and the column labels). How many
//! body rows a page takes depends on the [`PageCapacity`]: a fixed count
//! derived from the body font and the page height, or the measured height
//! of each row. In measured mode a row that does not fit in what is left of
//! the page starts a new page, and a row taller than a whole page gets a
//! page of its own.

use super::measure::{HeuristicMeasure, RowMeasure};
use super::model::{Cell, Element, FrameId, Paragraph, PhysicalSlide, Table, TableRow, TextStyle};
use crate::text::sanitized_lines;
use crate::theme::{self, table, Align, VAlign, COLUMNS};
use crate::types::ReportRow;
use std::ops::Range;

/// Tolerance for floating point height comparisons.
const EPSILON: f64 = 1e-9;

/// Number of rows repeated at the top of every page.
pub const HEADER_ROWS: usize = 2;

/// The header block repeated on every page of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Text of the super-header row spanning all columns.
    pub title: String,
}

impl HeaderBlock {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

/// How a page's share of body rows is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageCapacity {
    /// A fixed number of rows per page: as many single-line body rows as
    /// fit below the header, or the configured row cap. Row content is not
    /// measured, so PowerPoint grows tall rows past the nominal height.
    #[default]
    Nominal,
    /// Each row's wrapped text is measured against what is left of the page.
    Measured,
}

/// Splits table rows across pages.
#[derive(Debug, Clone)]
pub struct Paginator<M = HeuristicMeasure> {
    measure: M,
    capacity: PageCapacity,
    max_rows_per_page: Option<usize>,
    top: f64,
    bottom: f64,
}

impl Default for Paginator<HeuristicMeasure> {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator<HeuristicMeasure> {
    /// A paginator using the theme's page bounds and the heuristic measure.
    pub fn new() -> Self {
        Self {
            measure: HeuristicMeasure::default(),
            capacity: PageCapacity::default(),
            max_rows_per_page: None,
            top: table::START_Y,
            bottom: table::bottom_limit(),
        }
    }
}

impl<M: RowMeasure> Paginator<M> {
    /// Replace the text measure.
    pub fn with_measure<N: RowMeasure>(self, measure: N) -> Paginator<N> {
        Paginator {
            measure,
            capacity: self.capacity,
            max_rows_per_page: self.max_rows_per_page,
            top: self.top,
            bottom: self.bottom,
        }
    }

    pub fn with_capacity(mut self, capacity: PageCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Body rows on a single page. With [`PageCapacity::Nominal`] this is
    /// the page's row count; with [`PageCapacity::Measured`] it caps the
    /// rows that fit by height.
    pub fn with_max_rows_per_page(mut self, max: Option<usize>) -> Self {
        self.max_rows_per_page = max.map(|m| m.max(1));
        self
    }

    /// Override the vertical span available to the table.
    pub fn with_page_bounds(mut self, top: f64, bottom: f64) -> Self {
        self.top = top;
        self.bottom = bottom;
        self
    }

    /// Height left for body rows once the header is placed.
    pub fn body_budget(&self, header_height: f64) -> f64 {
        (self.bottom - self.top - header_height).max(0.0)
    }

    /// Height of a body row whose cells all hold a single line.
    pub fn nominal_row_height(&self) -> f64 {
        self.body_row(0, &ReportRow::default()).height
    }

    /// Single-line body rows that fit in `budget`, at least one.
    pub fn nominal_rows(&self, budget: f64) -> usize {
        let row = self.nominal_row_height();
        if row <= 0.0 {
            return usize::MAX;
        }
        (((budget + EPSILON) / row).floor() as usize).max(1)
    }

    /// Decide page breaks for body rows of the given heights.
    ///
    /// Returns the row ranges of each page, in order. The ranges cover
    /// `0..heights.len()` exactly; there is always at least one page, which is
    /// empty when there are no rows. Heights only matter in measured mode.
    pub fn plan(&self, heights: &[f64], header_height: f64) -> Vec<Range<usize>> {
        let budget = self.body_budget(header_height);
        let measured = self.capacity == PageCapacity::Measured;
        let cap = match (self.capacity, self.max_rows_per_page) {
            (_, Some(max)) => max,
            (PageCapacity::Measured, None) => usize::MAX,
            (PageCapacity::Nominal, None) => self.nominal_rows(budget),
        };

        let mut pages = Vec::new();
        let mut start = 0;
        let mut used = 0.0;

        for (i, &height) in heights.iter().enumerate() {
            let count = i - start;
            if count > 0 && (count >= cap || (measured && used + height > budget + EPSILON)) {
                pages.push(start..i);
                start = i;
                used = 0.0;
            }
            used += height;
        }
        pages.push(start..heights.len());

        pages
    }

    /// Lay out `rows` as one or more table pages drawn on `frame`.
    pub fn paginate(
        &self,
        rows: &[ReportRow],
        header: &HeaderBlock,
        frame: FrameId,
    ) -> Vec<PhysicalSlide> {
        let header_rows = self.header_rows(header);
        let header_height: f64 = header_rows.iter().map(|r| r.height).sum();
        let budget = self.body_budget(header_height);

        let body: Vec<TableRow> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.body_row(i, row))
            .collect();

        let oversized = body
            .iter()
            .filter(|r| self.capacity == PageCapacity::Measured && r.height > budget + EPSILON);
        for row in oversized {
            log::warn!(
                "Row {} is taller than a page ({:.2}in > {:.2}in); placing it on its own page",
                row.source_index.unwrap_or_default() + 1,
                row.height,
                budget
            );
        }

        let heights: Vec<f64> = body.iter().map(|r| r.height).collect();
        let plan = self.plan(&heights, header_height);
        log::debug!("Table '{}' with {} rows spans {} page(s)", header.title, rows.len(), plan.len());
        for (number, range) in plan.iter().enumerate() {
            let used: f64 = heights[range.clone()].iter().sum();
            if used > budget + EPSILON {
                log::debug!(
                    "Page {} of '{}' is estimated at {:.2}in of body rows for {:.2}in",
                    number + 1,
                    header.title,
                    used,
                    budget
                );
            }
        }

        plan.into_iter()
            .map(|range| {
                let mut page_rows = header_rows.clone();
                page_rows.extend_from_slice(&body[range]);
                PhysicalSlide {
                    frame,
                    elements: vec![Element::Table(table_page(page_rows))],
                }
            })
            .collect()
    }

    /// The super-header and column-header rows.
    pub fn header_rows(&self, header: &HeaderBlock) -> Vec<TableRow> {
        let title_cell = Cell {
            paragraphs: vec![Paragraph::plain(sanitized_lines(&header.title))],
            style: TextStyle {
                font_size: table::HEADER_SIZE,
                bold: true,
                color: theme::TEXT,
                align: Align::Center,
                valign: VAlign::Middle,
            },
            fill: theme::SUPER_HEADER_BG,
            col_span: COLUMNS.len(),
        };
        let full_width: f64 = COLUMNS.iter().map(|c| c.width).sum();
        let title_row = TableRow {
            height: self.cell_height(&title_cell, full_width),
            cells: vec![title_cell],
            source_index: None,
        };

        let label_cells: Vec<Cell> = COLUMNS
            .iter()
            .map(|column| Cell {
                paragraphs: vec![Paragraph::plain(vec![column.label.to_string()])],
                style: TextStyle {
                    font_size: column.header_size,
                    bold: true,
                    color: theme::HEADER_TEXT,
                    align: Align::Center,
                    valign: VAlign::Middle,
                },
                fill: theme::HEADER_BG,
                col_span: 1,
            })
            .collect();
        let label_row = TableRow {
            height: self.row_height(&label_cells),
            cells: label_cells,
            source_index: None,
        };

        vec![title_row, label_row]
    }

    /// The body row for report row `index`, striped by `index` parity.
    pub fn body_row(&self, index: usize, row: &ReportRow) -> TableRow {
        let fill = theme::row_fill(index);
        let link = Some(row.link.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let summary: Vec<Paragraph> = row
            .summary_points()
            .into_iter()
            .map(|point| Paragraph::bulleted(sanitized_lines(point)))
            .collect();

        let contents = [
            vec![Paragraph::plain(sanitized_lines(&row.date))],
            vec![Paragraph::plain(sanitized_lines(&row.publication))],
            vec![Paragraph::plain(sanitized_lines(&row.title)).linked(link)],
            summary,
            vec![Paragraph::plain(sanitized_lines(&row.sentiment))],
            vec![Paragraph::plain(sanitized_lines(&row.remarks))],
        ];

        let cells: Vec<Cell> = contents
            .into_iter()
            .zip(COLUMNS.iter())
            .map(|(paragraphs, column)| Cell {
                paragraphs,
                style: TextStyle {
                    font_size: column.body_size,
                    bold: false,
                    color: theme::TEXT,
                    align: column.align,
                    valign: column.valign,
                },
                fill,
                col_span: 1,
            })
            .collect();

        TableRow {
            height: self.row_height(&cells),
            cells,
            source_index: Some(index),
        }
    }

    fn row_height(&self, cells: &[Cell]) -> f64 {
        cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, column)| self.cell_height(cell, column.width))
            .fold(0.0, f64::max)
    }

    fn cell_height(&self, cell: &Cell, width: f64) -> f64 {
        let inner = (width - 2.0 * table::CELL_MARGIN_X).max(0.0);
        self.measure
            .text_height(&cell.paragraphs, cell.style.font_size, inner)
            + 2.0 * table::CELL_MARGIN_Y
    }
}

fn table_page(rows: Vec<TableRow>) -> Table {
    Table {
        x: table::X,
        y: table::START_Y,
        col_widths: COLUMNS.iter().map(|c| c.width).collect(),
        rows,
        header_rows: HEADER_ROWS,
        border: theme::BORDER,
        border_pt: table::BORDER_PT,
    }
}
