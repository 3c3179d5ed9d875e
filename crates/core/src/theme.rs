//! Fixed palette and geometry shared by every layout decision.
//!
//! All lengths are in inches on a 16:9 slide; font sizes are in points.

use std::fmt;

/// An sRGB color, rendered as six hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0 & 0xFF_FFFF)
    }
}

pub const HEADER_BG: Color = Color(0x002060);
pub const HEADER_TEXT: Color = Color(0xFFFFFF);
pub const ROW_FILL_EVEN_INDEX: Color = Color(0xFFFFFF);
pub const ROW_FILL_ODD_INDEX: Color = Color(0xDDEBF7);
pub const BORDER: Color = Color(0x002060);
pub const TEXT: Color = Color(0x000000);
pub const SUPER_HEADER_BG: Color = Color(0xD9D9D9);
pub const ACCENT_RED: Color = Color(0xC0504D);
pub const BACKGROUND: Color = Color(0xFFFFFF);

pub const SLIDE_WIDTH: f64 = 10.0;
pub const SLIDE_HEIGHT: f64 = 5.625;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert inches to EMU.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Convert points to inches.
pub fn pt_to_in(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

/// Where a block of text sits on the slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

pub mod frame {
    use super::*;

    pub const FOOTER_TITLE: Rect = Rect::new(0.5, 5.3, SLIDE_WIDTH * 0.9, 0.16);
    pub const FOOTER_TITLE_SIZE: f64 = 9.0;
    pub const FOOTER_ADDRESS: Rect = Rect::new(0.5, 5.45, SLIDE_WIDTH * 0.9, 0.16);
    pub const FOOTER_ADDRESS_SIZE: f64 = 8.0;

    pub const LOGO: Rect = Rect::new(0.3, 0.15, 1.5, 1.0);

    pub const MAIN_TITLE: Rect = Rect::new(0.0, 0.4, SLIDE_WIDTH, 0.4);
    pub const MAIN_TITLE_SIZE: f64 = 16.0;
    pub const SECTION_TITLE: Rect = Rect::new(0.0, 0.9, SLIDE_WIDTH, 0.35);
    pub const SECTION_TITLE_SIZE: f64 = 14.0;
}

pub mod table {
    use super::*;

    pub const X: f64 = 0.25;
    /// Table top on the first page and on every continuation page.
    pub const START_Y: f64 = 1.3;
    pub const WIDTH: f64 = 9.5;
    /// Space kept free below the table on every page.
    pub const BOTTOM_MARGIN: f64 = 1.75;
    pub const BORDER_PT: f64 = 1.0;

    /// Cell margins: left/right and top/bottom.
    pub const CELL_MARGIN_X: f64 = 0.1;
    pub const CELL_MARGIN_Y: f64 = 0.05;
    /// Hanging indent of a bulleted paragraph.
    pub const BULLET_INDENT: f64 = 0.1875;

    pub const HEADER_SIZE: f64 = 12.0;
    pub const BODY_SIZE: f64 = 10.0;
    pub const SMALL_SIZE: f64 = 9.0;

    /// Lowest y a table row may reach.
    pub fn bottom_limit() -> f64 {
        SLIDE_HEIGHT - BOTTOM_MARGIN
    }
}

pub mod text_slide {
    use super::*;

    pub const TITLE: Rect = Rect::new(0.5, 1.4, 9.0, 0.4);
    pub const TITLE_SIZE: f64 = 12.0;
    /// Body top when a title is present.
    pub const BODY_Y_WITH_TITLE: f64 = 1.8;
    pub const BODY_WIDTH: f64 = 9.0;
    pub const BODY_HEIGHT: f64 = 3.5;
    pub const BODY_SIZE: f64 = 11.0;
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justify,
}

/// Vertical anchoring inside a cell or box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
}

/// One column of the news table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub label: &'static str,
    pub width: f64,
    pub header_size: f64,
    pub body_size: f64,
    pub align: Align,
    pub valign: VAlign,
}

const fn column(
    label: &'static str,
    width: f64,
    header_size: f64,
    body_size: f64,
    align: Align,
    valign: VAlign,
) -> Column {
    Column { label, width, header_size, body_size, align, valign }
}

/// The six columns of the news table, in order.
pub const COLUMNS: [Column; 6] = [
    column("Date", 0.8, table::HEADER_SIZE, table::BODY_SIZE, Align::Center, VAlign::Middle),
    column("Publication", 1.0, table::HEADER_SIZE, table::BODY_SIZE, Align::Center, VAlign::Middle),
    column("Title and Link", 1.8, table::HEADER_SIZE, table::BODY_SIZE, Align::Left, VAlign::Top),
    column("Summary / Key Points", 3.4, table::HEADER_SIZE, table::BODY_SIZE, Align::Left, VAlign::Top),
    column("Sentiment", 0.8, table::SMALL_SIZE, table::SMALL_SIZE, Align::Center, VAlign::Middle),
    column("Remarks", 1.6, table::HEADER_SIZE, table::BODY_SIZE, Align::Center, VAlign::Middle),
];

/// Row fill for the row at `index` of the unpaginated table.
pub fn row_fill(index: usize) -> Color {
    if index % 2 == 0 {
        ROW_FILL_EVEN_INDEX
    } else {
        ROW_FILL_ODD_INDEX
    }
}
