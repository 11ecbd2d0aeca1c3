use std::fmt;

use thiserror::Error;

/// The step of a scraping run that was in progress when something failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchIndex,
    ExtractLinks,
    FetchDetail,
    ParseDetail,
    ParseException,
    Assemble,
    WriteOutput,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Stage::FetchIndex => "fetching index page",
            Stage::ExtractLinks => "extracting detail links",
            Stage::FetchDetail => "fetching detail page",
            Stage::ParseDetail => "parsing detail page",
            Stage::ParseException => "parsing exception page",
            Stage::Assemble => "assembling features",
            Stage::WriteOutput => "writing output",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("{url}: expected element `{element}` is missing")]
    Structure { url: String, element: &'static str },

    #[error("{url}: could not extract {field}: {reason}")]
    Extraction {
        url: String,
        field: &'static str,
        reason: String,
    },

    #[error("site structure assumption violated: {0}")]
    Assumption(String),

    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize feature collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{stage} failed for {url}: {source}")]
    Stage {
        stage: Stage,
        url: String,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    pub(crate) fn extraction(url: &str, field: &'static str, reason: impl Into<String>) -> Self {
        ScrapeError::Extraction {
            url: url.to_string(),
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(url: &str, element: &'static str) -> Self {
        ScrapeError::Structure {
            url: url.to_string(),
            element,
        }
    }

    /// Returns a closure that tags an error with the stage and URL it happened at.
    pub fn at(stage: Stage, url: &str) -> impl FnOnce(ScrapeError) -> ScrapeError + use<> {
        let url = url.to_string();
        move |source| ScrapeError::Stage {
            stage,
            url,
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping any stage context.
    pub fn root(&self) -> &ScrapeError {
        match self {
            ScrapeError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
