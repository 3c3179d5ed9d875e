//! Text height estimation used to decide where table pages break.

use super::model::Paragraph;
use crate::theme::{pt_to_in, table};

/// Measures how tall a block of text renders.
pub trait RowMeasure {
    /// Height in inches of `paragraphs` set at `font_size` points inside a
    /// text area `width` inches wide.
    fn text_height(&self, paragraphs: &[Paragraph], font_size: f64, width: f64) -> f64;
}

/// Estimates wrapped line counts from an average glyph width.
///
/// `char_weight` is the average advance of a narrow glyph as a fraction of
/// the font size; wide (CJK, full-width) glyphs count double. `line_weight`
/// is the line pitch as a multiple of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicMeasure {
    pub char_weight: f64,
    pub line_weight: f64,
}

impl Default for HeuristicMeasure {
    fn default() -> Self {
        Self {
            char_weight: 0.5,
            line_weight: 1.2,
        }
    }
}

impl HeuristicMeasure {
    pub fn new(char_weight: f64, line_weight: f64) -> Self {
        Self { char_weight, line_weight }
    }

    /// Narrow-glyph slots that fit in `width` inches at `font_size`.
    fn slots_per_line(&self, width: f64, font_size: f64) -> usize {
        let glyph = pt_to_in(font_size) * self.char_weight;
        if glyph <= 0.0 {
            return usize::MAX;
        }
        ((width / glyph).floor() as usize).max(1)
    }
}

impl RowMeasure for HeuristicMeasure {
    fn text_height(&self, paragraphs: &[Paragraph], font_size: f64, width: f64) -> f64 {
        let lines: usize = paragraphs
            .iter()
            .map(|p| {
                let available = if p.bullet {
                    width - table::BULLET_INDENT
                } else {
                    width
                };
                let slots = self.slots_per_line(available, font_size);
                p.lines
                    .iter()
                    .map(|line| wrapped_line_count(line, slots))
                    .sum::<usize>()
            })
            .sum();

        lines.max(1) as f64 * pt_to_in(font_size) * self.line_weight
    }
}

/// Slots a glyph takes: 2 for East Asian wide characters, 1 otherwise.
fn glyph_slots(c: char) -> usize {
    match c {
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}' => 2,
        _ => 1,
    }
}

fn word_slots(word: &str) -> usize {
    word.chars().map(glyph_slots).sum()
}

/// Lines needed to greedily word-wrap `text` into lines of `slots` slots.
/// Words longer than a line are broken across lines. Empty text still takes
/// one line.
pub fn wrapped_line_count(text: &str, slots: usize) -> usize {
    let slots = slots.max(1);
    let mut lines = 1;
    let mut used = 0;

    for word in text.split_whitespace() {
        let width = word_slots(word);
        let needed = if used == 0 { width } else { used + 1 + width };
        if needed <= slots {
            used = needed;
            continue;
        }
        if used > 0 {
            lines += 1;
        }
        if width > slots {
            let extra = (width - 1) / slots;
            lines += extra;
            used = width - extra * slots;
        } else {
            used = width;
        }
    }

    lines
}
