//! End-to-end report generation: resolve the logo, compose, assemble.

use crate::writer::DeckWriter;
use deck_core::asset::{resolve_logo, Fetch, HttpFetcher, LocalFiles};
use deck_core::layout::{ComposedDeck, Composer, PageCapacity, Paginator, UnknownSlidePolicy};
use deck_core::{ReportPayload, Result};
use std::time::Duration;

/// Knobs for a [`ReportGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Bound on the remote logo download.
    pub logo_timeout: Duration,
    /// How table pages are filled.
    pub page_capacity: PageCapacity,
    /// Body rows per table page; see [`Paginator::with_max_rows_per_page`].
    pub max_rows_per_page: Option<usize>,
    pub unknown_slides: UnknownSlidePolicy,
    /// Local files a logo reference may name.
    pub local_logos: LocalFiles,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            logo_timeout: HttpFetcher::DEFAULT_TIMEOUT,
            page_capacity: PageCapacity::default(),
            max_rows_per_page: None,
            unknown_slides: UnknownSlidePolicy::default(),
            local_logos: LocalFiles::default(),
        }
    }
}

/// Turns report payloads into .pptx bytes.
///
/// Each call to [`ReportGenerator::generate`] is independent; the logo is
/// resolved once per call and shared by every slide.
pub struct ReportGenerator<F = HttpFetcher> {
    fetcher: F,
    local_logos: LocalFiles,
    composer: Composer,
    writer: DeckWriter,
}

impl ReportGenerator<HttpFetcher> {
    /// A generator that downloads remote logos over HTTP.
    pub fn new(options: &GeneratorOptions) -> Result<Self> {
        let fetcher = HttpFetcher::new(options.logo_timeout)?;
        Ok(Self::with_fetcher(fetcher, options))
    }
}

impl<F: Fetch> ReportGenerator<F> {
    /// A generator that downloads remote logos with `fetcher`.
    pub fn with_fetcher(fetcher: F, options: &GeneratorOptions) -> Self {
        let paginator = Paginator::new()
            .with_capacity(options.page_capacity)
            .with_max_rows_per_page(options.max_rows_per_page);
        let composer = Composer::new()
            .with_paginator(paginator)
            .with_unknown_slides(options.unknown_slides);
        Self {
            fetcher,
            local_logos: options.local_logos.clone(),
            composer,
            writer: DeckWriter::new(),
        }
    }

    /// Resolve the logo and compose `payload` without writing it.
    pub async fn compose(&self, payload: &ReportPayload) -> Result<ComposedDeck> {
        let logo = resolve_logo(payload.logo(), &self.fetcher, &self.local_logos).await;
        self.composer.compose(payload, logo.as_ref())
    }

    /// Render `payload` into .pptx bytes.
    pub async fn generate(&self, payload: &ReportPayload) -> Result<Vec<u8>> {
        let deck = self.compose(payload).await?;
        log::info!(
            "Rendering '{}': {} logical slide(s), {} row(s), {} page(s)",
            deck.title,
            payload.slides.len(),
            payload.row_count(),
            deck.slides.len()
        );
        self.writer.write(&deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DeckReader;
    use deck_core::{normalize_request, Error};
    use image::{ImageBuffer, ImageFormat, Rgb};
    use serde_json::json;
    use std::cell::Cell;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Counts downloads and always serves a small PNG.
    struct CountingFetcher {
        calls: Cell<usize>,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Fetch for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(png(64, 32))
        }
    }

    /// Always fails, like an unreachable host.
    struct FailingFetcher;

    impl Fetch for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(Error::FetchError(format!("cannot reach {}", url)))
        }
    }

    fn rows(count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| {
                json!({
                    "date": format!("2024-01-{:02}", i % 28 + 1),
                    "publication": "Daily News",
                    "title": format!("Article {}", i),
                    "link": format!("https://news.example.com/{}", i),
                    "summary": ["First point", "Second point"],
                    "sentiment": "Positive",
                    "remarks": "-"
                })
            })
            .collect()
    }

    fn payload(body: serde_json::Value) -> ReportPayload {
        normalize_request(body).unwrap()
    }

    #[tokio::test]
    async fn test_three_row_table_fits_one_page() {
        let generator = ReportGenerator::with_fetcher(CountingFetcher::new(), &GeneratorOptions::default());
        let payload = payload(json!({
            "meta": { "title": "Weekly Media Report", "footerTitle": "ACME Corp", "footerAddress": "1 Main St" },
            "slides": [{ "type": "table", "sectionTitle": "Coverage", "tableTitle": "Print Media", "rows": rows(3) }]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();

        assert_eq!(deck.title.as_deref(), Some("Weekly Media Report"));
        assert_eq!(deck.slide_count(), 1);
        let slide = &deck.slides[0];
        assert_eq!(slide.layout.as_deref(), Some("MASTER_SECTION_0"));
        assert!(slide.layout_texts.contains(&"Weekly Media Report".to_string()));
        assert!(slide.layout_texts.contains(&"Coverage".to_string()));
        assert!(slide.layout_texts.contains(&"ACME Corp".to_string()));

        let table = slide.table().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0], vec!["Print Media".to_string()]);
        assert_eq!(table[1][0], "Date");
        assert_eq!(table[2][2], "Article 0");
        assert_eq!(table[2][3], "First point\nSecond point");
        assert_eq!(slide.hyperlinks.len(), 3);
    }

    #[tokio::test]
    async fn test_long_table_repeats_header_and_keeps_order() {
        let options = GeneratorOptions {
            max_rows_per_page: Some(20),
            ..Default::default()
        };
        let generator = ReportGenerator::with_fetcher(CountingFetcher::new(), &options);
        let payload = payload(json!({
            "slides": [{ "type": "table", "tableTitle": "Online", "rows": rows(50) }]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        let counts: Vec<usize> = deck.slides.iter().map(|s| s.table().unwrap().len() - 2).collect();
        assert_eq!(counts, vec![20, 20, 10]);

        let mut titles = Vec::new();
        for slide in &deck.slides {
            assert_eq!(slide.layout.as_deref(), Some("MASTER_SECTION_0"));
            let table = slide.table().unwrap();
            assert_eq!(table[0], vec!["Online".to_string()]);
            assert_eq!(table[1][1], "Publication");
            assert!(table.len() - 2 <= 20);
            titles.extend(table[2..].iter().map(|row| row[2].clone()));
        }
        let expected: Vec<String> = (0..50).map(|i| format!("Article {}", i)).collect();
        assert_eq!(titles, expected);
    }

    /// The weekly-report sample rows, with their long summaries and remarks.
    fn sample_rows() -> serde_json::Value {
        json!([
            {
                "date": "5 Jan 2026",
                "publication": "Nanyang Siang Pau",
                "title": "5 major positive support for the Malaysian industry to sing well this year | e South Seas",
                "link": "https://example.com/article1",
                "summary": "This year will be a key delivery year for major infrastructure projects, which is expected to further consolidate the position of urban development as an economic priority and support the industrial market.\nThese projects include: the Shah Alam Light Rapid Transit Line (LRT3), which is expected to be completed in the second quarter of this year",
                "sentiment": "Neutral",
                "remarks": "By stating Q2 2026 as the targeted completion date, a public expectation is established. Any delays beyond this timeline may invite increased public and media scrutiny."
            },
            {
                "date": "5 Jan 2026",
                "publication": "New Straits Times",
                "title": "INDUSTRY EXPERTS POSITIVE ABOUT PROPERTY MARKET",
                "link": "https://example.com/article2",
                "summary": "2026 will be a critical delivery year for major infrastructure projects. These include the Light Rail Transit Shah Alam Line (LRT3), expected to be completed by the second quarter of 2026",
                "sentiment": "Neutral",
                "remarks": "Any delays beyond this timeline may invite increased public and media scrutiny."
            },
            {
                "date": "5 Jan 2026",
                "publication": "Star Property News",
                "title": "Savills Malaysia’s top predictions for 2026",
                "link": "https://example.com/article3",
                "summary": "Urban development remains at the forefront of economic strategy, with 2026 serving as a critical delivery year for major transport projects:\nLRT Shah Alam Line (LRT3): Connecting Bandar Utama to Klang is expected to be completed by Q2 2026.",
                "sentiment": "Neutral",
                "remarks": ""
            }
        ])
    }

    #[tokio::test]
    async fn test_weekly_sample_renders_on_one_slide() {
        let generator = ReportGenerator::new(&GeneratorOptions::default()).unwrap();
        let payload = payload(json!({
            "meta": { "title": "Weekly Report" },
            "slides": [{ "type": "table", "tableTitle": "News", "rows": sample_rows() }]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(deck.slide_count(), 1);

        let table = deck.slides[0].table().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0], vec!["News".to_string()]);
        assert_eq!(table[1].len(), 6);
        let titles: Vec<&str> = table[2..].iter().map(|row| row[2].as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "5 major positive support for the Malaysian industry to sing well this year | e South Seas",
                "INDUSTRY EXPERTS POSITIVE ABOUT PROPERTY MARKET",
                "Savills Malaysia’s top predictions for 2026",
            ]
        );

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(&bytes)).unwrap();
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("ppt/slides/slide1.xml").unwrap(), &mut xml).unwrap();
        for index in 0..3 {
            let fill = format!(r#"<a:srgbClr val="{}"/>"#, deck_core::theme::row_fill(index));
            assert!(xml.contains(&fill), "missing stripe for row {}", index);
        }
    }

    #[tokio::test]
    async fn test_measured_capacity_spreads_sample_rows() {
        let options = GeneratorOptions {
            page_capacity: PageCapacity::Measured,
            ..Default::default()
        };
        let generator = ReportGenerator::with_fetcher(FailingFetcher, &options);
        let payload = payload(json!({
            "slides": [{ "type": "table", "tableTitle": "News", "rows": sample_rows() }]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        assert!(deck.slide_count() > 1);
        let body_rows: usize = deck.slides.iter().map(|s| s.table().unwrap().len() - 2).sum();
        assert_eq!(body_rows, 3);
    }

    #[tokio::test]
    async fn test_local_logo_outside_allowed_dir_is_dropped() {
        let public = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let inside = public.path().join("logo.png");
        let outside = elsewhere.path().join("logo.png");
        std::fs::write(&inside, png(16, 16)).unwrap();
        std::fs::write(&outside, png(16, 16)).unwrap();

        let options = GeneratorOptions {
            local_logos: LocalFiles::Within(public.path().to_path_buf()),
            ..Default::default()
        };
        let generator = ReportGenerator::with_fetcher(FailingFetcher, &options);
        let render = |logo: &std::path::Path| {
            payload(json!({
                "meta": { "logo": logo.to_str().unwrap() },
                "slides": [{ "type": "text", "content": "Body" }]
            }))
        };

        let deck = generator.generate(&render(&inside)).await.unwrap();
        assert!(DeckReader::new().read_bytes(&deck).unwrap().slides[0].layout_has_picture);

        let deck = generator.generate(&render(&outside)).await.unwrap();
        assert!(!DeckReader::new().read_bytes(&deck).unwrap().slides[0].layout_has_picture);
    }

    #[tokio::test]
    async fn test_logo_fetched_once_per_render() {
        let fetcher = CountingFetcher::new();
        let generator = ReportGenerator::with_fetcher(fetcher, &GeneratorOptions::default());
        let payload = payload(json!({
            "meta": { "logo": "https://cdn.example.com/logo.png" },
            "slides": [
                { "type": "table", "rows": rows(2) },
                { "type": "text", "title": "Notes", "content": "Line one\nLine two" },
                { "type": "table", "rows": rows(1) }
            ]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        assert_eq!(generator.fetcher.calls.get(), 1);

        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(deck.slide_count(), 3);
        assert!(deck.slides.iter().all(|s| s.layout_has_picture));
        assert_eq!(deck.slides[1].texts, vec!["Notes".to_string(), "Line one\nLine two".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_logo_still_renders() {
        let generator = ReportGenerator::with_fetcher(FailingFetcher, &GeneratorOptions::default());
        let payload = payload(json!({
            "meta": { "title": "T", "logo": "https://unreachable.invalid/logo.png" },
            "slides": [{ "type": "text", "content": "Body" }]
        }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(deck.slide_count(), 1);
        assert!(!deck.slides[0].layout_has_picture);
    }

    #[tokio::test]
    async fn test_legacy_rows_render_as_one_table() {
        let generator = ReportGenerator::with_fetcher(FailingFetcher, &GeneratorOptions::default());
        let payload = payload(json!({ "title": "Legacy", "rows": rows(4) }));

        let bytes = generator.generate(&payload).await.unwrap();
        let deck = DeckReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.slides[0].table().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_slides_follow_policy() {
        let body = json!({
            "slides": [
                { "type": "chart", "data": [] },
                { "type": "text", "content": "Kept" }
            ]
        });

        let lenient = ReportGenerator::with_fetcher(FailingFetcher, &GeneratorOptions::default());
        let deck = DeckReader::new()
            .read_bytes(&lenient.generate(&payload(body.clone())).await.unwrap())
            .unwrap();
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.slides[0].texts, vec!["Kept".to_string()]);

        let strict = ReportGenerator::with_fetcher(
            FailingFetcher,
            &GeneratorOptions {
                unknown_slides: UnknownSlidePolicy::Reject,
                ..Default::default()
            },
        );
        let err = strict.generate(&payload(body)).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSlide { index: 0, .. }));
        assert!(err.is_client_error());
    }
}
