// ABOUTME: CSS-selector body scanner over multiple HTML parser back-ends.
// ABOUTME: Tries every (back-end, selector) pair in order; first non-empty match wins.

use tracing::warn;

use crate::config::{CssSelectorOptions, HtmlBackend};
use crate::draft::{DraftArticle, RawPage};
use crate::error::{ConfigError, ParseBodyError};
use crate::strategy::BodyParser;

/// Body parser driven by an ordered list of HTML back-ends and an ordered
/// list of CSS selectors. A failed pair (invalid selector for that back-end,
/// or no match) is logged and skipped; only exhausting every pair fails the
/// stage.
pub struct CssBodyParser {
    backends: Vec<HtmlBackend>,
    selectors: Vec<String>,
}

impl CssBodyParser {
    pub fn new(opts: &CssSelectorOptions) -> Result<Self, ConfigError> {
        if opts.html_parsers.is_empty() {
            return Err(ConfigError::MissingHtmlBackends);
        }
        if opts.css_selectors.is_empty() {
            return Err(ConfigError::MissingCssSelectors);
        }
        Ok(Self {
            backends: opts.html_parsers.clone(),
            selectors: opts.css_selectors.clone(),
        })
    }
}

impl BodyParser for CssBodyParser {
    fn parse_body(
        &self,
        url: &str,
        page: &RawPage,
        _draft: &DraftArticle,
    ) -> Result<String, ParseBodyError> {
        for backend in &self.backends {
            for css in &self.selectors {
                match select_first(*backend, &page.html, css) {
                    Ok(Some(fragment)) => return Ok(fragment),
                    Ok(None) => continue,
                    Err(message) => {
                        warn!(
                            url,
                            backend = backend_name(*backend),
                            selector = css.as_str(),
                            message,
                            "body selector pair failed, skipping"
                        );
                        continue;
                    }
                }
            }
        }

        Err(ParseBodyError::NoMatch {
            url: url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "css"
    }
}

fn backend_name(backend: HtmlBackend) -> &'static str {
    match backend {
        HtmlBackend::Scraper => "scraper",
        HtmlBackend::DomQuery => "dom_query",
    }
}

/// Outer HTML of the first element matching `css` under the given back-end.
/// Ok(None) when the selector matched nothing; Err carries a back-end parse
/// failure message.
fn select_first(backend: HtmlBackend, html: &str, css: &str) -> Result<Option<String>, String> {
    match backend {
        HtmlBackend::Scraper => {
            let selector = scraper::Selector::parse(css).map_err(|e| e.to_string())?;
            let doc = scraper::Html::parse_document(html);
            Ok(doc.select(&selector).next().map(|el| el.html()))
        }
        HtmlBackend::DomQuery => {
            let matcher = dom_query::Matcher::new(css).map_err(|e| format!("{:?}", e))?;
            let doc = dom_query::Document::from(html);
            let selection = doc.select_matcher(&matcher);
            Ok(selection
                .iter()
                .next()
                .map(|node| node.html().to_string()))
        }
    }
}
