// ABOUTME: Article data model holding extracted metadata and body content.
// ABOUTME: Includes the ArticleIssues carrier pairing an article with detected quality issues.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::issue::Issue;

/// A fully extracted article: metadata plus the normalized body.
///
/// `text` holds the Markdown rendition of the body and `html` the canonical
/// HTML re-rendered from that Markdown. `raw_html` is the body fragment as it
/// came out of extraction, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Article {
    pub title: String,
    pub authors: Vec<String>,
    pub encoding: String,
    pub raw_html: String,
    pub text: String,
    pub html: String,
    #[serde(default)]
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

impl Article {
    /// Returns the first listed author, if any.
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

/// An article together with the quality issues detected for it.
///
/// Extraction succeeded; the issues describe why the result looks suspect.
/// The convention is to publish the article with issues attached rather than
/// discard it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleIssues {
    pub article: Article,
    pub issues: Vec<Issue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_author_returns_none_when_empty() {
        let article = Article::default();
        assert_eq!(article.first_author(), None);
    }

    #[test]
    fn first_author_returns_first() {
        let article = Article {
            authors: vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()],
            ..Default::default()
        };
        assert_eq!(article.first_author(), Some("Ada Lovelace"));
    }

    #[test]
    fn serde_roundtrip_preserves_optional_fields() {
        let article = Article {
            title: "Title".to_string(),
            authors: vec!["Author".to_string()],
            encoding: "utf-8".to_string(),
            raw_html: "<p>raw</p>".to_string(),
            text: "body".to_string(),
            html: "<p>body</p>".to_string(),
            publish_date: NaiveDate::from_ymd_opt(2024, 6, 15),
            summary: Some("summary".to_string()),
            site_name: None,
        };

        let json = serde_json::to_string(&article).unwrap();
        let parsed: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, article);
    }

    #[test]
    fn deserialize_tolerates_missing_optionals() {
        let json = r#"{
            "title": "T",
            "authors": [],
            "encoding": "utf-8",
            "raw_html": "",
            "text": "",
            "html": ""
        }"#;
        let parsed: Article = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.publish_date, None);
        assert_eq!(parsed.summary, None);
        assert_eq!(parsed.site_name, None);
    }
}
