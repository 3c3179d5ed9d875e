//! Domain types for the report payload accepted by the generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root input: report metadata plus the slides to render, in order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportPayload {
    /// Title, footer and logo shared by every slide.
    #[serde(default)]
    pub meta: Option<ReportMeta>,

    /// Logical slides in presentation order.
    pub slides: Vec<SlideSpec>,
}

impl ReportPayload {
    /// Create a payload with the given slides and no metadata.
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self { meta: None, slides }
    }

    /// Attach report metadata.
    pub fn with_meta(mut self, meta: ReportMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The report's main title, or empty text when absent.
    pub fn title(&self) -> &str {
        self.meta_str(|m| m.title.as_deref())
    }

    /// Footer title text, or empty text when absent.
    pub fn footer_title(&self) -> &str {
        self.meta_str(|m| m.footer_title.as_deref())
    }

    /// Footer address text, or empty text when absent.
    pub fn footer_address(&self) -> &str {
        self.meta_str(|m| m.footer_address.as_deref())
    }

    /// The raw logo reference, if one was given and is non-empty.
    pub fn logo(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.logo.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// Total number of table rows across all table slides.
    pub fn row_count(&self) -> usize {
        self.slides
            .iter()
            .map(|s| match s {
                SlideSpec::Table(t) => t.rows.len(),
                _ => 0,
            })
            .sum()
    }

    fn meta_str<'a>(&'a self, f: impl Fn(&'a ReportMeta) -> Option<&'a str>) -> &'a str {
        self.meta.as_ref().and_then(f).unwrap_or("")
    }
}

/// Report-wide metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub title: Option<String>,
    pub footer_title: Option<String>,
    pub footer_address: Option<String>,
    /// HTTP(S) URL, `data:` URI or local file path.
    pub logo: Option<String>,
}

/// One logical slide. Tagged by the JSON `type` field.
#[derive(Debug, Clone)]
pub enum SlideSpec {
    Table(TableSlide),
    Text(TextSlide),
    /// A `type` this renderer has no layout for.
    Unsupported { kind: String },
}

impl SlideSpec {
    /// The JSON `type` tag of this slide.
    pub fn kind(&self) -> &str {
        match self {
            SlideSpec::Table(_) => "table",
            SlideSpec::Text(_) => "text",
            SlideSpec::Unsupported { kind } => kind,
        }
    }

    /// Section title shown in the slide frame, if any.
    pub fn section_title(&self) -> Option<&str> {
        match self {
            SlideSpec::Table(t) => t.section_title.as_deref(),
            SlideSpec::Text(t) => t.section_title.as_deref(),
            SlideSpec::Unsupported { .. } => None,
        }
        .filter(|s| !s.is_empty())
    }
}

impl<'de> Deserialize<'de> for SlideSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();

        match kind.as_str() {
            "table" => TableSlide::deserialize(value)
                .map(SlideSpec::Table)
                .map_err(D::Error::custom),
            "text" => TextSlide::deserialize(value)
                .map(SlideSpec::Text)
                .map_err(D::Error::custom),
            _ => Ok(SlideSpec::Unsupported { kind }),
        }
    }
}

/// A slide holding the news table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSlide {
    pub section_title: Option<String>,
    pub table_title: Option<String>,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

/// A slide holding a free text block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSlide {
    pub section_title: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "body")]
    pub content: String,
}

/// One news/report entry. All fields are display text; `link` also becomes
/// the hyperlink target of the title cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRow {
    #[serde(deserialize_with = "display_text")]
    pub date: String,
    #[serde(deserialize_with = "display_text")]
    pub publication: String,
    #[serde(deserialize_with = "display_text")]
    pub title: String,
    #[serde(deserialize_with = "display_text")]
    pub link: String,
    pub summary: Option<Summary>,
    #[serde(deserialize_with = "display_text")]
    pub sentiment: String,
    #[serde(deserialize_with = "display_text")]
    pub remarks: String,
}

/// `null` reads as empty text; numbers and booleans as their JSON text.
fn display_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {}", other))),
    }
}

impl ReportRow {
    /// Summary lines to render, one bullet each. Never empty: a missing or
    /// empty summary yields a single empty bullet.
    pub fn summary_points(&self) -> Vec<&str> {
        let points: Vec<&str> = match &self.summary {
            Some(Summary::Points(points)) => points.iter().map(String::as_str).collect(),
            Some(Summary::Text(text)) => vec![text.as_str()],
            None => Vec::new(),
        };
        if points.is_empty() {
            vec![""]
        } else {
            points
        }
    }
}

/// Summary cell content: plain text or a list of key points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Points(Vec<String>),
    Text(String),
}

impl From<&str> for Summary {
    fn from(text: &str) -> Self {
        Summary::Text(text.to_string())
    }
}

impl From<Vec<&str>> for Summary {
    fn from(points: Vec<&str>) -> Self {
        Summary::Points(points.into_iter().map(str::to_string).collect())
    }
}
