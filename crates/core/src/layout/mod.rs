//! Slide composition: frames, physical pages and table pagination.

pub mod compose;
pub mod measure;
pub mod model;
pub mod paginate;

pub use compose::{build_frame, Composer, UnknownSlidePolicy};
pub use measure::{HeuristicMeasure, RowMeasure};
pub use model::{
    Cell, ComposedDeck, Element, Frame, FrameId, Paragraph, PhysicalSlide, Picture, Sizing, Table,
    TableRow, TextBox, TextStyle,
};
pub use paginate::{HeaderBlock, PageCapacity, Paginator, HEADER_ROWS};
