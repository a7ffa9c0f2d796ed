// ABOUTME: Quality validation over a completed article.
// ABOUTME: Runs a fixed sequence of checks and returns the detected issues in order.

use crate::issue::Issue;
use crate::model::Article;

/// Minimum canonical body HTML length, in characters, below which the article
/// is flagged as suspiciously short.
pub const MIN_BODY_HTML_CHARS: usize = 1500;

/// Inspect a completed article for quality problems.
///
/// Checks run in a fixed order and every check always runs; issues are
/// returned in check order. An empty result means the article looks clean.
pub fn validate(article: &Article) -> Vec<Issue> {
    let mut issues = Vec::new();
    check_body_length(article, &mut issues);
    check_publish_date(article, &mut issues);
    issues
}

fn check_body_length(article: &Article, issues: &mut Vec<Issue>) {
    let size = article.html.chars().count();
    if size < MIN_BODY_HTML_CHARS {
        issues.push(Issue::ShortBody { size });
    }
}

fn check_publish_date(article: &Article, issues: &mut Vec<Issue>) {
    if article.publish_date.is_none() {
        issues.push(Issue::MissingField {
            field: "publish date".to_string(),
        });
    }
}
