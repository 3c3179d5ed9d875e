//! Logo resolution.
//!
//! A logo reference is either an HTTP(S) URL, a `data:` URI or a local file
//! path. Resolution is best-effort: whatever goes wrong, the report renders
//! without a logo and a warning is logged.

use crate::error::{Error, Result};
use crate::media::ImageFormat;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// `data:[<mime>][;params],<payload>`
static DATA_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^data:([^;,]*)((?:;[^;,]*)*),(.*)$").unwrap());

/// The three shapes a logo reference can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoReference<'a> {
    Remote(&'a str),
    DataUri(&'a str),
    Path(&'a str),
}

impl<'a> LogoReference<'a> {
    /// Classify a raw reference. Empty input means "no logo".
    pub fn parse(reference: &'a str) -> Option<Self> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(Self::Remote(trimmed))
        } else if lower.starts_with("data:") {
            Some(Self::DataUri(trimmed))
        } else {
            Some(Self::Path(trimmed))
        }
    }
}

/// Which local files a logo reference may name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocalFiles {
    /// Any file the process can read.
    #[default]
    Any,
    /// Only files inside this directory.
    Within(PathBuf),
}

/// A decoded logo ready to be placed on a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

impl LogoImage {
    /// Build an image from raw bytes, sniffing the format.
    pub fn from_bytes(data: Vec<u8>, mime_hint: Option<&str>) -> Result<Self> {
        let format = ImageFormat::from_magic(&data)
            .or_else(|| mime_hint.and_then(ImageFormat::from_mime))
            .ok_or_else(|| Error::InvalidImage("unrecognized image data".to_string()))?;
        Ok(Self { data, format })
    }
}

/// Read a local logo file without blocking the async runtime.
pub async fn read_local(path: &Path, access: &LocalFiles) -> Result<LogoImage> {
    let path = match access {
        LocalFiles::Any => path.to_path_buf(),
        LocalFiles::Within(root) => {
            // relative references are taken from the root
            let root = tokio::fs::canonicalize(root).await?;
            let resolved = tokio::fs::canonicalize(root.join(path)).await?;
            if !resolved.starts_with(&root) {
                return Err(Error::InvalidImage(format!(
                    "{} is outside {}",
                    path.display(),
                    root.display()
                )));
            }
            resolved
        }
    };

    let data = tokio::fs::read(&path).await?;
    let format = ImageFormat::from_magic(&data).ok_or_else(|| {
        Error::InvalidImage(format!("unrecognized image file {}", path.display()))
    })?;
    Ok(LogoImage { data, format })
}

/// Decode a `data:` URI into an image.
pub fn decode_data_uri(uri: &str) -> Result<LogoImage> {
    let caps = DATA_URI_REGEX
        .captures(uri)
        .ok_or_else(|| Error::InvalidImage("malformed data URI".to_string()))?;
    let mime = caps.get(1).map(|m| m.as_str()).filter(|m| !m.is_empty());
    let is_base64 = caps
        .get(2)
        .is_some_and(|p| p.as_str().split(';').any(|param| param.eq_ignore_ascii_case("base64")));
    if !is_base64 {
        return Err(Error::InvalidImage("data URI is not base64-encoded".to_string()));
    }

    let payload: String = caps[3].chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| Error::InvalidImage(format!("bad base64 payload: {}", e)))?;
    LogoImage::from_bytes(data, mime)
}

/// Something that can download a remote asset.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Download `url`, failing on network errors and non-success statuses.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetch`] over HTTP with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Default bound on a single logo download.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::FetchError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchError(format!("server returned {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FetchError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Resolve a logo reference into an image.
///
/// Performs at most one fetch. Local paths are read subject to `local`.
/// Never fails: any problem is logged and reported as `None` so the report
/// renders without a logo.
pub async fn resolve_logo<F: Fetch>(
    reference: Option<&str>,
    fetcher: &F,
    local: &LocalFiles,
) -> Option<LogoImage> {
    let reference = LogoReference::parse(reference?)?;

    let resolved = match reference {
        LogoReference::Remote(url) => {
            log::debug!("Fetching remote logo from {}", url);
            match fetcher.fetch(url).await {
                Ok(data) => LogoImage::from_bytes(data, None),
                Err(e) => Err(e),
            }
        }
        LogoReference::DataUri(uri) => decode_data_uri(uri),
        LogoReference::Path(path) => {
            log::debug!("Reading local logo {}", path);
            read_local(Path::new(path), local).await
        }
    };

    match resolved {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Failed to load logo, rendering without it: {}", e);
            None
        }
    }
}
