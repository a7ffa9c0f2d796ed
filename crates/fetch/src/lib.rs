// ABOUTME: Main library entry point for the clippings extraction pipeline.
// ABOUTME: Re-exports configuration, strategies, the fallback pipeline, and the normalizer.

//! Extraction pipeline for clippings: turn a web page URL into a clean,
//! structured article by trying an ordered list of extraction configurations,
//! stage by stage, until one fully succeeds.
//!
//! # Example
//!
//! ```no_run
//! use clippings_fetch::{configs_for_url, fetch};
//!
//! fn main() -> Result<(), clippings_fetch::FetchError> {
//!     let url = "https://example.com/article";
//!     let configs = configs_for_url(url);
//!     let article = fetch(url, &configs)?;
//!     println!("{}", article.title);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod strategy;

pub use crate::config::{
    configs_for_url, site_and_domain, BodySpec, Config, ConfigRegistry, CssSelectorOptions,
    DownloaderSpec, HtmlBackend, MetadataSpec, ReaderFetchOptions, XmlSelectorOptions,
};
pub use crate::draft::{DraftArticle, RawPage};
pub use crate::error::{
    ConfigError, DownloadError, FetchError, ParseBodyError, ParseMetadataError,
};
pub use crate::normalize::{normalize_body, Normalized};
pub use crate::pipeline::{fetch, fetch_with_pause, DEFAULT_ATTEMPT_PAUSE};
pub use crate::strategy::{build_strategies, BodyParser, Downloader, MetadataParser, StrategySet};
