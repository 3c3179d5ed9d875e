//! Rendering instructions produced by the composer.
//!
//! These are backend-neutral: positions in inches, sizes in points, colors
//! from the theme. A rendering backend turns them into document parts.

use crate::asset::LogoImage;
use crate::theme::{Align, Color, Rect, VAlign};

/// A paragraph made of lines. Lines after the first are soft breaks inside
/// the same paragraph (and under the same bullet).
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub lines: Vec<String>,
    pub bullet: bool,
    pub hyperlink: Option<String>,
}

impl Paragraph {
    /// A plain paragraph from already-sanitized lines.
    pub fn plain(lines: Vec<String>) -> Self {
        Self { lines, bullet: false, hyperlink: None }
    }

    /// A bulleted paragraph from already-sanitized lines.
    pub fn bulleted(lines: Vec<String>) -> Self {
        Self { lines, bullet: true, hyperlink: None }
    }

    /// Link the whole paragraph to `url`.
    pub fn linked(mut self, url: Option<String>) -> Self {
        self.hyperlink = url;
        self
    }

    /// The paragraph text with breaks as `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Character formatting and alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub bold: bool,
    pub color: Color,
    pub align: Align,
    pub valign: VAlign,
}

/// A positioned text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub paragraphs: Vec<Paragraph>,
    pub style: TextStyle,
}

impl TextBox {
    /// All text of the box, paragraphs separated by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// How a picture is fitted into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Scale to fit inside the box keeping the aspect ratio, centered.
    Contain,
    Stretch,
}

/// A positioned picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub rect: Rect,
    pub image: LogoImage,
    pub sizing: Sizing,
    pub description: String,
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    pub style: TextStyle,
    pub fill: Color,
    /// Number of grid columns this cell spans (1 for a normal cell).
    pub col_span: usize,
}

impl Cell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One table row with its measured height.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    /// Height in inches as measured for pagination.
    pub height: f64,
    /// Index of the report row this body row came from; `None` for header
    /// rows.
    pub source_index: Option<usize>,
}

impl TableRow {
    pub fn is_header(&self) -> bool {
        self.source_index.is_none()
    }
}

/// One page worth of a table: the repeated header rows followed by a slice
/// of body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub x: f64,
    pub y: f64,
    pub col_widths: Vec<f64>,
    pub rows: Vec<TableRow>,
    pub header_rows: usize,
    pub border: Color,
    pub border_pt: f64,
}

impl Table {
    /// Header rows of this page.
    pub fn header(&self) -> &[TableRow] {
        &self.rows[..self.header_rows.min(self.rows.len())]
    }

    /// Body rows of this page.
    pub fn body(&self) -> &[TableRow] {
        &self.rows[self.header_rows.min(self.rows.len())..]
    }

    /// Total height of all rows.
    pub fn height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }

    pub fn width(&self) -> f64 {
        self.col_widths.iter().sum()
    }
}

/// Anything placed on a frame or a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextBox),
    Picture(Picture),
    Table(Table),
}

/// Identifies the frame a page is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

/// The repeating scaffold (titles, footer, logo) of one logical slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    pub name: String,
    pub background: Color,
    pub elements: Vec<Element>,
}

impl Frame {
    /// Texts of the frame's text boxes, in drawing order.
    pub fn texts(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text(t) => Some(t.text()),
                _ => None,
            })
            .collect()
    }

    pub fn has_picture(&self) -> bool {
        self.elements.iter().any(|e| matches!(e, Element::Picture(_)))
    }
}

/// One output slide.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalSlide {
    pub frame: FrameId,
    pub elements: Vec<Element>,
}

impl PhysicalSlide {
    /// The table on this page, if it is a table page.
    pub fn table(&self) -> Option<&Table> {
        self.elements.iter().find_map(|e| match e {
            Element::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Text boxes on this page.
    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Composition result: one frame per logical slide and the physical pages
/// in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedDeck {
    pub title: String,
    pub frames: Vec<Frame>,
    pub slides: Vec<PhysicalSlide>,
}

impl ComposedDeck {
    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Physical pages drawn on `id`, in order.
    pub fn pages_of(&self, id: FrameId) -> impl Iterator<Item = &PhysicalSlide> {
        self.slides.iter().filter(move |s| s.frame == id)
    }
}
