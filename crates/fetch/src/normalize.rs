// ABOUTME: Normalizes an extracted body fragment into markdown text and re-rendered HTML.
// ABOUTME: HTML goes through htmd to markdown, then pulldown-cmark back to HTML.

use htmd::HtmlToMarkdown;
use pulldown_cmark::{html, Parser};
use tracing::warn;

/// The two representations every published article body carries: `text` is
/// markdown, `html` is that markdown re-rendered. Running extracted HTML
/// through both passes strips scripts, styles, and inline attributes so that
/// structurally different extractions of the same content converge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub html: String,
}

/// Normalize an extracted HTML body fragment.
///
/// If the markdown conversion fails the raw fragment is used as the text,
/// which keeps the pipeline moving at the cost of a noisier body.
pub fn normalize_body(body_html: &str) -> Normalized {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let text = match converter.convert(body_html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "markdown conversion failed, keeping raw body");
            body_html.trim().to_string()
        }
    };

    let mut rendered = String::new();
    html::push_html(&mut rendered, Parser::new(&text));

    Normalized {
        text,
        html: rendered.trim().to_string(),
    }
}
