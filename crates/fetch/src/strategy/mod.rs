// ABOUTME: Capability contracts for extraction strategies and the config-to-strategy dispatch.
// ABOUTME: Downloader, MetadataParser, and BodyParser traits plus build_strategies().

pub mod css;
pub mod reader;
pub mod xml;

use crate::config::{BodySpec, Config, DownloaderSpec, MetadataSpec};
use crate::draft::{DraftArticle, RawPage};
use crate::error::{ConfigError, DownloadError, ParseBodyError, ParseMetadataError};

/// Retrieves the raw page for a URL.
pub trait Downloader {
    fn download(&self, url: &str) -> Result<RawPage, DownloadError>;

    /// Strategy name for log context.
    fn name(&self) -> &'static str;
}

/// Extracts article metadata from a downloaded page. Body fields of the
/// draft stay empty.
pub trait MetadataParser {
    fn parse_metadata(&self, url: &str, page: &RawPage) -> Result<DraftArticle, ParseMetadataError>;

    fn name(&self) -> &'static str;
}

/// Extracts the main body HTML fragment from a downloaded page.
pub trait BodyParser {
    fn parse_body(
        &self,
        url: &str,
        page: &RawPage,
        draft: &DraftArticle,
    ) -> Result<String, ParseBodyError>;

    fn name(&self) -> &'static str;
}

/// The compiled strategy triple for one configuration.
pub struct StrategySet {
    pub downloader: Box<dyn Downloader>,
    pub metadata_parser: Box<dyn MetadataParser>,
    pub body_parser: Box<dyn BodyParser>,
}

impl std::fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategySet")
            .field("downloader", &self.downloader.name())
            .field("metadata_parser", &self.metadata_parser.name())
            .field("body_parser", &self.body_parser.name())
            .finish()
    }
}

/// Compile a configuration into concrete strategy instances.
///
/// This is the single dispatch point from config enums to implementations, and
/// the place where missing or invalid options fail fast, before any network
/// activity.
pub fn build_strategies(config: &Config) -> Result<StrategySet, ConfigError> {
    let downloader: Box<dyn Downloader> = match &config.downloader {
        DownloaderSpec::Reader(opts) => Box::new(reader::ReaderDownloader::new(opts)?),
    };

    let metadata_parser: Box<dyn MetadataParser> = match config.metadata_parser {
        MetadataSpec::Reader => Box::new(reader::ReaderMetadataParser::new()),
    };

    let body_parser: Box<dyn BodyParser> = match &config.body_parser {
        BodySpec::Reader => Box::new(reader::ReaderBodyParser::new()),
        BodySpec::Css(opts) => Box::new(css::CssBodyParser::new(opts)?),
        BodySpec::Xml(opts) => Box::new(xml::XmlBodyParser::new(opts)?),
    };

    Ok(StrategySet {
        downloader,
        metadata_parser,
        body_parser,
    })
}
