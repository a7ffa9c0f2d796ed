// ABOUTME: Per-attempt page and draft article accumulators used between pipeline stages.
// ABOUTME: RawPage is the decoded download; DraftArticle collects metadata before the body lands.

use chrono::NaiveDate;

use clippings_article::Article;

/// The downloaded page for one pipeline attempt: decoded HTML text plus the
/// encoding it was decoded from. Owned by the attempt and discarded after
/// extraction.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub html: String,
    pub encoding: String,
}

impl RawPage {
    pub fn new(html: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            encoding: encoding.into(),
        }
    }
}

/// Mutable extraction accumulator: metadata populated by the metadata stage,
/// body fields empty until the body stage and normalizer complete it.
#[derive(Debug, Clone, Default)]
pub struct DraftArticle {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: Option<String>,
    pub site_name: Option<String>,
    pub encoding: String,
    pub raw_html: String,
    pub publish_date: Option<NaiveDate>,
    /// Body fragment already isolated during metadata parsing, when the
    /// strategy extracts both in one pass.
    pub body_html: Option<String>,
}

impl DraftArticle {
    /// Complete the draft into an immutable article with the normalized body.
    pub fn into_article(self, text: String, html: String) -> Article {
        Article {
            title: self.title,
            authors: self.authors,
            encoding: self.encoding,
            raw_html: self.raw_html,
            text,
            html,
            publish_date: self.publish_date,
            summary: self.summary,
            site_name: self.site_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_article_carries_metadata_and_body() {
        let draft = DraftArticle {
            title: "T".to_string(),
            authors: vec!["A".to_string()],
            summary: Some("S".to_string()),
            site_name: Some("Site".to_string()),
            encoding: "utf-8".to_string(),
            raw_html: "<div>raw</div>".to_string(),
            publish_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            body_html: Some("<div>raw</div>".to_string()),
        };

        let article = draft.into_article("body md".to_string(), "<p>body md</p>".to_string());
        assert_eq!(article.title, "T");
        assert_eq!(article.text, "body md");
        assert_eq!(article.html, "<p>body md</p>");
        assert_eq!(article.raw_html, "<div>raw</div>");
        assert_eq!(article.publish_date, NaiveDate::from_ymd_opt(2024, 3, 4));
    }
}
