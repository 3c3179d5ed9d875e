//! Server settings from environment variables (a `.env` file is honored).

use deck_core::{LocalFiles, PageCapacity, UnknownSlidePolicy};
use deck_pptx::GeneratorOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Public base URL for download links. Derived from each request when
    /// unset.
    pub base_url: Option<String>,
    /// Where generated decks are saved and served from.
    pub public_dir: PathBuf,
    pub logo_timeout: Duration,
    pub max_rows_per_page: Option<usize>,
    /// Fill table pages by measured row height instead of a fixed row count.
    pub measure_rows: bool,
    pub strict_slides: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            base_url: None,
            public_dir: PathBuf::from("public"),
            logo_timeout: Duration::from_secs(10),
            max_rows_per_page: None,
            measure_rows: false,
            strict_slides: false,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which returns the value of a variable.
    /// Unset or empty variables keep their defaults; unparsable ones are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse(&get, "PORT").unwrap_or(defaults.port),
            base_url: get("BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            public_dir: get("PUBLIC_DIR").map(PathBuf::from).unwrap_or(defaults.public_dir),
            logo_timeout: parse(&get, "LOGO_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.logo_timeout),
            max_rows_per_page: parse(&get, "MAX_ROWS_PER_PAGE").filter(|&n: &usize| n > 0),
            measure_rows: flag(&get, "MEASURE_ROWS").unwrap_or(defaults.measure_rows),
            strict_slides: flag(&get, "STRICT_SLIDES").unwrap_or(defaults.strict_slides),
        }
    }

    /// Uploaded logos are kept under this directory.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }

    /// Generator settings. Path logos are only read from inside the public
    /// directory.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            logo_timeout: self.logo_timeout,
            page_capacity: if self.measure_rows {
                PageCapacity::Measured
            } else {
                PageCapacity::Nominal
            },
            max_rows_per_page: self.max_rows_per_page,
            unknown_slides: if self.strict_slides {
                UnknownSlidePolicy::Reject
            } else {
                UnknownSlidePolicy::Skip
            },
            local_logos: LocalFiles::Within(self.public_dir.clone()),
        }
    }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    get(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.base_url, None);
        assert_eq!(config.logo_timeout, Duration::from_secs(10));
        let options = config.generator_options();
        assert_eq!(options.unknown_slides, UnknownSlidePolicy::Skip);
        assert_eq!(options.page_capacity, PageCapacity::Nominal);
        assert_eq!(options.local_logos, LocalFiles::Within(PathBuf::from("public")));
        assert_eq!(config.uploads_dir(), PathBuf::from("public").join("uploads"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("BASE_URL", "https://reports.example.com/"),
            ("PUBLIC_DIR", "/srv/decks"),
            ("LOGO_FETCH_TIMEOUT_SECS", "3"),
            ("MAX_ROWS_PER_PAGE", "20"),
            ("STRICT_SLIDES", "true"),
            ("MEASURE_ROWS", "yes"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url.as_deref(), Some("https://reports.example.com"));
        assert_eq!(config.public_dir, PathBuf::from("/srv/decks"));

        let options = config.generator_options();
        assert_eq!(options.logo_timeout, Duration::from_secs(3));
        assert_eq!(options.max_rows_per_page, Some(20));
        assert_eq!(options.unknown_slides, UnknownSlidePolicy::Reject);
        assert_eq!(options.page_capacity, PageCapacity::Measured);
        assert_eq!(options.local_logos, LocalFiles::Within(PathBuf::from("/srv/decks")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config(&[("PORT", "eighty"), ("MAX_ROWS_PER_PAGE", "0"), ("BASE_URL", "  ")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_rows_per_page, None);
        assert_eq!(config.base_url, None);
    }
}
