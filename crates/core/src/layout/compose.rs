//! Slide composition: turns a report payload into frames and physical pages.

use super::measure::{HeuristicMeasure, RowMeasure};
use super::model::{
    ComposedDeck, Element, Frame, FrameId, Paragraph, PhysicalSlide, Picture, Sizing, TextBox,
    TextStyle,
};
use super::paginate::{HeaderBlock, Paginator};
use crate::asset::LogoImage;
use crate::error::{Error, Result};
use crate::text::sanitized_lines;
use crate::theme::{self, frame, text_slide, Align, Rect, VAlign};
use crate::types::{ReportPayload, SlideSpec, TextSlide};

/// What to do with a slide whose `type` has no layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownSlidePolicy {
    /// Leave it out of the deck and log a warning.
    #[default]
    Skip,
    /// Fail the whole render with [`Error::UnsupportedSlide`].
    Reject,
}

/// Builds the deck layout from a report payload.
#[derive(Debug, Clone)]
pub struct Composer<M = HeuristicMeasure> {
    paginator: Paginator<M>,
    unknown_slides: UnknownSlidePolicy,
}

impl Default for Composer<HeuristicMeasure> {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer<HeuristicMeasure> {
    pub fn new() -> Self {
        Self {
            paginator: Paginator::new(),
            unknown_slides: UnknownSlidePolicy::default(),
        }
    }
}

impl<M: RowMeasure> Composer<M> {
    /// Use a differently configured paginator for table slides.
    pub fn with_paginator<N: RowMeasure>(self, paginator: Paginator<N>) -> Composer<N> {
        Composer {
            paginator,
            unknown_slides: self.unknown_slides,
        }
    }

    pub fn with_unknown_slides(mut self, policy: UnknownSlidePolicy) -> Self {
        self.unknown_slides = policy;
        self
    }

    /// Compose every slide of `payload`, in order.
    ///
    /// Each logical slide gets its own frame; a table slide may produce
    /// several pages, all drawn on that frame.
    pub fn compose(&self, payload: &ReportPayload, logo: Option<&LogoImage>) -> Result<ComposedDeck> {
        let mut deck = ComposedDeck {
            title: payload.title().to_string(),
            ..Default::default()
        };

        for (index, slide) in payload.slides.iter().enumerate() {
            let id = FrameId(index);
            let pages = match slide {
                SlideSpec::Table(table) => {
                    let header = HeaderBlock::new(table.table_title.as_deref().unwrap_or(""));
                    self.paginator.paginate(&table.rows, &header, id)
                }
                SlideSpec::Text(text) => vec![text_page(text, id)],
                SlideSpec::Unsupported { kind } => match self.unknown_slides {
                    UnknownSlidePolicy::Skip => {
                        log::warn!("Skipping slide {} with unsupported type '{}'", index, kind);
                        continue;
                    }
                    UnknownSlidePolicy::Reject => {
                        return Err(Error::UnsupportedSlide {
                            index,
                            kind: kind.clone(),
                        })
                    }
                },
            };

            log::debug!("Slide {} ({}) -> {} page(s)", index, slide.kind(), pages.len());
            deck.frames.push(build_frame(id, payload, slide.section_title(), logo));
            deck.slides.extend(pages);
        }

        Ok(deck)
    }
}

fn style(font_size: f64, bold: bool, color: theme::Color, align: Align) -> TextStyle {
    TextStyle {
        font_size,
        bold,
        color,
        align,
        valign: VAlign::Top,
    }
}

fn text_box(rect: Rect, text: &str, style: TextStyle) -> Element {
    Element::Text(TextBox {
        rect,
        paragraphs: vec![Paragraph::plain(sanitized_lines(text))],
        style,
    })
}

/// The scaffold shared by every page of logical slide `id`.
pub fn build_frame(
    id: FrameId,
    payload: &ReportPayload,
    section_title: Option<&str>,
    logo: Option<&LogoImage>,
) -> Frame {
    let mut elements = vec![
        text_box(
            frame::FOOTER_TITLE,
            payload.footer_title(),
            style(frame::FOOTER_TITLE_SIZE, true, theme::BORDER, Align::Left),
        ),
        text_box(
            frame::FOOTER_ADDRESS,
            payload.footer_address(),
            style(frame::FOOTER_ADDRESS_SIZE, false, theme::BORDER, Align::Left),
        ),
    ];

    if let Some(image) = logo {
        elements.push(Element::Picture(Picture {
            rect: frame::LOGO,
            image: image.clone(),
            sizing: Sizing::Contain,
            description: "Logo".to_string(),
        }));
    }

    elements.push(text_box(
        frame::MAIN_TITLE,
        payload.title(),
        style(frame::MAIN_TITLE_SIZE, true, theme::TEXT, Align::Center),
    ));

    if let Some(section) = section_title {
        elements.push(text_box(
            frame::SECTION_TITLE,
            section,
            style(frame::SECTION_TITLE_SIZE, true, theme::TEXT, Align::Center),
        ));
    }

    Frame {
        id,
        name: format!("MASTER_SECTION_{}", id.0),
        background: theme::BACKGROUND,
        elements,
    }
}

/// A text slide: optional title, then the body. Without a title the body
/// moves up to the title's position.
fn text_page(slide: &TextSlide, id: FrameId) -> PhysicalSlide {
    let title = slide.title.as_deref().filter(|t| !t.is_empty());
    let mut elements = Vec::with_capacity(2);

    if let Some(title) = title {
        elements.push(text_box(
            text_slide::TITLE,
            title,
            style(text_slide::TITLE_SIZE, true, theme::HEADER_BG, Align::Left),
        ));
    }

    let body_y = if title.is_some() {
        text_slide::BODY_Y_WITH_TITLE
    } else {
        text_slide::TITLE.y
    };
    elements.push(Element::Text(TextBox {
        rect: Rect::new(
            text_slide::TITLE.x,
            body_y,
            text_slide::BODY_WIDTH,
            text_slide::BODY_HEIGHT,
        ),
        paragraphs: sanitized_lines(&slide.content)
            .into_iter()
            .map(|line| Paragraph::plain(vec![line]))
            .collect(),
        style: style(text_slide::BODY_SIZE, false, theme::TEXT, Align::Justify),
    }));

    PhysicalSlide {
        frame: id,
        elements,
    }
}
