use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{ScrapeError, geojson::CoordinateFormat, index_scraper::ExceptionRule};

pub const DEFAULT_INDEX_URL: &str =
    "https://www.herrenberg.de/de/Stadtleben/Erlebnis-Herrenberg/Service/Parkplaetze";
pub const DEFAULT_OUTPUT_PATH: &str = "parking_lots.geojson";
// Position of the odd detail page among the filtered index links.
pub const DEFAULT_EXCEPTION_INDEX: usize = 13;

/// The env vars that tune a scraping run. Every one of them is optional.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    parking_index_url: Option<String>,
    output_path: Option<String>,
    exception_link_marker: Option<String>,
    exception_link_index: Option<usize>,
    coordinate_format: Option<String>,
    pretty_output: Option<bool>,
    max_concurrent_requests: Option<usize>,
    requests_per_second: Option<u32>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub index_url: Url,
    pub output_path: PathBuf,
    pub exception_rule: ExceptionRule,
    pub coordinate_format: CoordinateFormat,
    pub pretty_output: bool,
    pub max_concurrent_requests: NonZeroUsize,
    pub requests_per_second: NonZeroU32,
    pub request_timeout: Duration,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            index_url: Url::parse(DEFAULT_INDEX_URL).expect("default index url is valid"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            exception_rule: ExceptionRule::Position(DEFAULT_EXCEPTION_INDEX),
            coordinate_format: CoordinateFormat::Text,
            pretty_output: false,
            max_concurrent_requests: nonzero_ext::nonzero!(4usize),
            requests_per_second: nonzero_ext::nonzero!(4u32),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        let config = Self::from_env(scraping_env)?;
        Ok(config)
    }

    pub fn from_env(env: ScrapingEnv) -> Result<Self, ScrapeError> {
        let defaults = Self::default();

        let index_url = match env.parking_index_url {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ScrapeError::Config(format!("PARKING_INDEX_URL `{raw}` is not a valid URL: {e}"))
            })?,
            None => defaults.index_url,
        };

        // A marker always wins over a position: matching by content survives
        // reordering of the index page.
        let exception_rule = match (env.exception_link_marker, env.exception_link_index) {
            (Some(marker), _) if marker.trim().is_empty() => {
                return Err(ScrapeError::Config(
                    "EXCEPTION_LINK_MARKER must not be empty".to_string(),
                ));
            }
            (Some(marker), _) => ExceptionRule::UrlContains(marker),
            (None, Some(index)) => ExceptionRule::Position(index),
            (None, None) => defaults.exception_rule,
        };

        let coordinate_format = match env.coordinate_format {
            Some(raw) => raw.parse()?,
            None => defaults.coordinate_format,
        };

        let max_concurrent_requests = match env.max_concurrent_requests {
            Some(n) => NonZeroUsize::new(n).ok_or_else(|| {
                ScrapeError::Config("MAX_CONCURRENT_REQUESTS must be at least 1".to_string())
            })?,
            None => defaults.max_concurrent_requests,
        };

        let requests_per_second = match env.requests_per_second {
            Some(n) => NonZeroU32::new(n).ok_or_else(|| {
                ScrapeError::Config("REQUESTS_PER_SECOND must be at least 1".to_string())
            })?,
            None => defaults.requests_per_second,
        };

        let request_timeout = match env.request_timeout_secs {
            Some(0) => {
                return Err(ScrapeError::Config(
                    "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        Ok(Self {
            index_url,
            output_path: env
                .output_path
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            exception_rule,
            coordinate_format,
            pretty_output: env.pretty_output.unwrap_or(defaults.pretty_output),
            max_concurrent_requests,
            requests_per_second,
            request_timeout,
        })
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
