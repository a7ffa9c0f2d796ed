// ABOUTME: Error types for the extraction pipeline and its stages.
// ABOUTME: Stage errors are recoverable per attempt; ConfigError and FetchError cross the boundary.

use thiserror::Error;

/// Errors raised while compiling a configuration into strategy instances.
///
/// These are programmer/configuration mistakes and fail fast, before any
/// network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("css body parser requires at least one css selector")]
    MissingCssSelectors,

    #[error("css body parser requires at least one html parser back-end")]
    MissingHtmlBackends,

    #[error("xml body parser requires xpath or css selectors")]
    MissingXmlSelectors,

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// The download stage retrieved nothing usable.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("nothing downloaded from {url}")]
    Empty { url: String },
}

/// The metadata stage could not produce a draft article.
#[derive(Debug, Error)]
pub enum ParseMetadataError {
    #[error("no parseable document for {url}")]
    EmptyDocument { url: String },
}

/// The body stage found no usable body candidate.
#[derive(Debug, Error)]
pub enum ParseBodyError {
    #[error("no body candidate matched for {url}")]
    NoMatch { url: String },

    #[error("extracted body is empty for {url}")]
    Empty { url: String },

    #[error("document is not well-formed XML for {url}: {message}")]
    InvalidXml { url: String, message: String },
}

/// Terminal pipeline error: either the configuration list could not be
/// compiled, or every configuration was attempted and none fully succeeded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid extraction configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("all {attempts} fetch configurations failed for {url}")]
    Exhausted { url: String, attempts: usize },
}

impl FetchError {
    /// Stable kind tag for the published failure record.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Config(_) => "config_error",
            FetchError::Exhausted { .. } => "fetch_exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_error_names_url_and_attempts() {
        let err = FetchError::Exhausted {
            url: "https://example.com/a".to_string(),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("3"), "message should name attempts: {}", msg);
        assert!(
            msg.contains("https://example.com/a"),
            "message should name url: {}",
            msg
        );
        assert_eq!(err.kind(), "fetch_exhausted");
    }

    #[test]
    fn config_error_converts_into_fetch_error() {
        let err: FetchError = ConfigError::MissingCssSelectors.into();
        assert_eq!(err.kind(), "config_error");
    }
}
