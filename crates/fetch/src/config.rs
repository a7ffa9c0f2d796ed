// ABOUTME: Extraction configurations and the per-domain configuration resolver.
// ABOUTME: Maps a canonicalized domain to an ordered list of strategy configurations.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

/// Options for the reader download strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReaderFetchOptions {
    /// Present as a known web crawler (Googlebot UA plus a google.com
    /// Referer) to get past basic bot blocking.
    #[serde(default)]
    pub as_crawler: bool,
    /// Follow one `<meta http-equiv="refresh">` redirect after download.
    #[serde(default)]
    pub follow_meta_refresh: bool,
}

/// HTML parser back-ends available to the CSS-selector scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtmlBackend {
    Scraper,
    DomQuery,
}

/// Options for the CSS-selector body scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSelectorOptions {
    /// Parser back-ends to try, in order.
    #[serde(default = "default_html_backends")]
    pub html_parsers: Vec<HtmlBackend>,
    /// CSS selectors to try, in order, per back-end.
    pub css_selectors: Vec<String>,
}

fn default_html_backends() -> Vec<HtmlBackend> {
    vec![HtmlBackend::Scraper]
}

/// Options for the XML scanner. XPath selectors are tried before CSS
/// selectors. Only use this against pages known to be well-formed XML; the
/// strategy does not validate that assumption beyond failing the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct XmlSelectorOptions {
    #[serde(default)]
    pub xpath_selectors: Vec<String>,
    #[serde(default)]
    pub css_selectors: Vec<String>,
}

/// Download strategy choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloaderSpec {
    Reader(ReaderFetchOptions),
}

impl Default for DownloaderSpec {
    fn default() -> Self {
        DownloaderSpec::Reader(ReaderFetchOptions::default())
    }
}

/// Metadata parse strategy choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataSpec {
    #[default]
    Reader,
}

/// Body parse strategy choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodySpec {
    Reader,
    Css(CssSelectorOptions),
    Xml(XmlSelectorOptions),
}

impl Default for BodySpec {
    fn default() -> Self {
        BodySpec::Reader
    }
}

/// One complete extraction technique: a downloader, a metadata parser, and a
/// body parser, each with options. Immutable value; multiple configurations
/// are tried in a fixed priority order per domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub downloader: DownloaderSpec,
    #[serde(default)]
    pub metadata_parser: MetadataSpec,
    #[serde(default)]
    pub body_parser: BodySpec,
}

impl Config {
    /// Short human-readable summary of the strategy kinds, for log context.
    pub fn summary(&self) -> String {
        let downloader = match &self.downloader {
            DownloaderSpec::Reader(opts) if opts.as_crawler => "reader(as_crawler)",
            DownloaderSpec::Reader(_) => "reader",
        };
        let body = match &self.body_parser {
            BodySpec::Reader => "reader",
            BodySpec::Css(_) => "css",
            BodySpec::Xml(_) => "xml",
        };
        format!("{}+reader+{}", downloader, body)
    }
}

/// Registry of per-domain configuration overrides.
///
/// Resolution is pure: look up the canonical domain, fall back to a single
/// default configuration when no override is registered.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    map: HashMap<String, Vec<Config>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ordered override list for a canonical domain
    /// (last two DNS labels, lowercase).
    pub fn register(&mut self, domain: impl Into<String>, configs: Vec<Config>) {
        self.map.insert(domain.into().to_lowercase(), configs);
    }

    /// Ordered configurations for a URL: the domain override when present,
    /// otherwise a single default configuration.
    pub fn configs_for(&self, url: &str) -> Vec<Config> {
        let (_, domain) = site_and_domain(url);
        match self.map.get(&domain) {
            Some(configs) => configs.clone(),
            None => vec![Config::default()],
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Built-in per-domain overrides.
static BUILTIN_REGISTRY: Lazy<ConfigRegistry> = Lazy::new(|| {
    let mut registry = ConfigRegistry::new();
    registry.register(
        "nytimes.com",
        vec![Config {
            body_parser: BodySpec::Css(CssSelectorOptions {
                html_parsers: vec![HtmlBackend::Scraper, HtmlBackend::DomQuery],
                css_selectors: vec!["article .meteredContent".to_string()],
            }),
            ..Default::default()
        }],
    );
    registry
});

/// Resolve the ordered configuration list for a URL against the built-in
/// registry.
pub fn configs_for_url(url: &str) -> Vec<Config> {
    BUILTIN_REGISTRY.configs_for(url)
}

/// Split a URL into (host, canonical domain). The canonical domain is the
/// last two DNS labels, lowercased. Unparseable URLs yield empty strings.
pub fn site_and_domain(url: &str) -> (String, String) {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default();
    let labels: Vec<&str> = host.split('.').collect();
    let domain = if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.clone()
    };
    (host, domain)
}
