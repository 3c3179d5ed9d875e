//! PPTX (Office Open XML) backend for report decks.
//!
//! Turns a [`deck_core::ComposedDeck`] into a .pptx package and reads
//! generated packages back for inspection.

pub mod generate;
pub mod package;
pub mod reader;
pub mod rels;
pub mod shapes;
pub mod writer;

pub use generate::{GeneratorOptions, ReportGenerator};
pub use reader::{DeckReader, DeckSummary, SlideSummary};
pub use writer::DeckWriter;
