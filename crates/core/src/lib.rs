//! Core domain types, logo resolution, slide composition and table
//! pagination for media-monitoring report decks.

pub mod asset;
pub mod error;
pub mod layout;
pub mod media;
pub mod request;
pub mod text;
pub mod theme;
pub mod types;

pub use asset::{resolve_logo, Fetch, HttpFetcher, LocalFiles, LogoImage};
pub use error::{Error, Result};
pub use media::ImageFormat;
pub use layout::{ComposedDeck, Composer, PageCapacity, Paginator, UnknownSlidePolicy};
pub use request::{normalize_request, normalize_request_str};
pub use types::{ReportMeta, ReportPayload, ReportRow, SlideSpec, Summary, TableSlide, TextSlide};
