// ABOUTME: Full-article "reader" strategy: HTTP download, metadata heuristics, readability body.
// ABOUTME: Implements all three capability contracts with general-purpose heuristics.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::ReaderFetchOptions;
use crate::draft::{DraftArticle, RawPage};
use crate::error::{ConfigError, DownloadError, ParseBodyError, ParseMetadataError};
use crate::strategy::{BodyParser, Downloader, MetadataParser};

const DEFAULT_USER_AGENT: &str = "clippings/0.1";
const CRAWLER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
const CRAWLER_REFERER: &str = "https://www.google.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum candidate text length accepted by the readability heuristic.
const MIN_CANDIDATE_TEXT_CHARS: usize = 80;

static UNLIKELY_CANDIDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)comment|combx|disqus|foot|header|menu|nav|rss|shoutbox|sidebar|sponsor|social|teaser|widget|promo|related|share|byline|breadcrumb",
    )
    .unwrap()
});

/// Downloader half of the reader strategy: a blocking HTTP client that can
/// optionally present as a known crawler and follow one meta-refresh
/// redirect.
pub struct ReaderDownloader {
    client: reqwest::blocking::Client,
    referer: Option<String>,
    follow_meta_refresh: bool,
}

impl ReaderDownloader {
    pub fn new(opts: &ReaderFetchOptions) -> Result<Self, ConfigError> {
        let user_agent = if opts.as_crawler {
            CRAWLER_USER_AGENT
        } else {
            DEFAULT_USER_AGENT
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            referer: opts.as_crawler.then(|| CRAWLER_REFERER.to_string()),
            follow_meta_refresh: opts.follow_meta_refresh,
        })
    }

    fn get(&self, url: &str) -> Result<RawPage, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(ref referer) = self.referer {
            request = request.header("Referer", referer.as_str());
        }

        let response = request.send().map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;
        if body.is_empty() {
            return Err(DownloadError::Empty {
                url: url.to_string(),
            });
        }

        let (html, encoding) = decode_page(&body, content_type.as_deref());
        if html.trim().is_empty() {
            return Err(DownloadError::Empty {
                url: url.to_string(),
            });
        }
        Ok(RawPage::new(html, encoding))
    }
}

impl Downloader for ReaderDownloader {
    fn download(&self, url: &str) -> Result<RawPage, DownloadError> {
        let page = self.get(url)?;

        if self.follow_meta_refresh {
            if let Some(target) = meta_refresh_target(&page.html, url) {
                if target != url {
                    debug!(url, target, "following meta-refresh redirect");
                    return self.get(&target);
                }
            }
        }

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "reader"
    }
}

/// Metadata half of the reader strategy: meta-tag and element heuristics for
/// title, authors, summary, site name, and publish date.
#[derive(Debug, Default)]
pub struct ReaderMetadataParser;

impl ReaderMetadataParser {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataParser for ReaderMetadataParser {
    fn parse_metadata(&self, url: &str, page: &RawPage) -> Result<DraftArticle, ParseMetadataError> {
        if page.html.trim().is_empty() {
            return Err(ParseMetadataError::EmptyDocument {
                url: url.to_string(),
            });
        }

        let doc = Html::parse_document(&page.html);
        Ok(DraftArticle {
            title: extract_title(&doc).unwrap_or_default(),
            authors: extract_authors(&doc),
            summary: extract_summary(&doc),
            site_name: extract_site_name(&doc),
            encoding: page.encoding.clone(),
            raw_html: page.html.clone(),
            publish_date: extract_publish_date(&doc),
            body_html: None,
        })
    }

    fn name(&self) -> &'static str {
        "reader"
    }
}

/// Body half of the reader strategy: readability-style candidate scoring by
/// text length and link density.
#[derive(Debug, Default)]
pub struct ReaderBodyParser;

impl ReaderBodyParser {
    pub fn new() -> Self {
        Self
    }
}

impl BodyParser for ReaderBodyParser {
    fn parse_body(
        &self,
        url: &str,
        page: &RawPage,
        draft: &DraftArticle,
    ) -> Result<String, ParseBodyError> {
        // The metadata pass may already have isolated a body fragment.
        if let Some(ref body) = draft.body_html {
            if !body.trim().is_empty() {
                return Ok(body.clone());
            }
        }

        let doc = Html::parse_document(&page.html);
        let body = score_body_candidate(&doc).ok_or_else(|| ParseBodyError::NoMatch {
            url: url.to_string(),
        })?;
        if body.trim().is_empty() {
            return Err(ParseBodyError::Empty {
                url: url.to_string(),
            });
        }
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "reader"
    }
}

/// Decode downloaded bytes, using a charset hint from the Content-Type
/// header when present, then a UTF-8 fast path, then byte sniffing.
/// Returns (text, encoding name).
fn decode_page(body: &[u8], content_type: Option<&str>) -> (String, String) {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return (decoded.into_owned(), encoding.name().to_lowercase());
            }
        }
    }

    if let Ok(text) = std::str::from_utf8(body) {
        return (text.to_string(), "utf-8".to_string());
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    (decoded.into_owned(), encoding.name().to_lowercase())
}

/// Extract charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    for part in content_type.to_lowercase().split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            return Some(charset.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}

/// Target URL of a `<meta http-equiv="refresh">` tag, resolved against the
/// page URL. None when the page has no refresh tag or the tag is malformed.
fn meta_refresh_target(html: &str, base_url: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("meta[http-equiv]").ok()?;
    for el in doc.select(&selector) {
        let equiv = el.value().attr("http-equiv")?;
        if !equiv.eq_ignore_ascii_case("refresh") {
            continue;
        }
        let content = el.value().attr("content")?;
        for part in content.split(';') {
            let trimmed = part.trim();
            let is_url = trimmed
                .get(..4)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("url="));
            if is_url {
                let raw = trimmed[4..].trim().trim_matches('\'').trim_matches('"');
                let base = Url::parse(base_url).ok()?;
                return base.join(raw).ok().map(|u| u.to_string());
            }
        }
    }
    None
}

fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for css in selectors {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = doc.select(&selector).next() {
            let text: String = el.text().collect::<Vec<_>>().join(" ");
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !normalized.is_empty() {
                return Some(normalized);
            }
        }
    }
    None
}

fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for css in selectors {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(_) => continue,
        };
        for el in doc.select(&selector) {
            if let Some(value) = el.value().attr(attr) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

fn extract_title(doc: &Html) -> Option<String> {
    first_attr(
        doc,
        &["meta[property='og:title']", "meta[name='title']"],
        "content",
    )
    .or_else(|| first_text(doc, &["title"]))
    .or_else(|| first_text(doc, &["h1", "h2"]))
}

fn extract_authors(doc: &Html) -> Vec<String> {
    if let Some(author) = first_attr(
        doc,
        &["meta[name='author']", "meta[property='article:author']"],
        "content",
    ) {
        return vec![author];
    }
    if let Some(author) = first_text(doc, &[".byline", ".author", "[itemprop='author']"]) {
        return vec![author];
    }
    Vec::new()
}

fn extract_summary(doc: &Html) -> Option<String> {
    first_attr(
        doc,
        &[
            "meta[property='og:description']",
            "meta[name='description']",
        ],
        "content",
    )
}

fn extract_site_name(doc: &Html) -> Option<String> {
    first_attr(
        doc,
        &[
            "meta[property='og:site_name']",
            "meta[name='shareaholic:site_name']",
            "meta[name='application-name']",
        ],
        "content",
    )
}

fn extract_publish_date(doc: &Html) -> Option<NaiveDate> {
    let raw = first_attr(
        doc,
        &[
            "meta[property='article:published_time']",
            "meta[name='date']",
        ],
        "content",
    )
    .or_else(|| first_attr(doc, &["time[datetime]"], "datetime"))
    .or_else(|| first_text(doc, &["time"]))?;

    parse_date(&raw)
}

/// Parse a date string: RFC3339 fast path, then common loose date-only
/// patterns, then the dateparser fallback for natural formats.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    const LOOSE_PATTERNS: &[&str] = &[
        "%Y-%m-%d",
        "%b %e, %Y",
        "%e %b %Y",
        "%b %d, %Y",
        "%d %b %Y",
        "%B %e, %Y",
        "%e %B %Y",
        "%B %d, %Y",
        "%d %B %Y",
    ];
    for pattern in LOOSE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return Some(date);
        }
    }

    dateparser::parse(raw).ok().map(|dt| dt.date_naive())
}

/// Pick the best body candidate: the element with the most text after a link
/// density penalty, skipping navigation-like containers. Falls back to the
/// whole <body> when no candidate has enough text.
fn score_body_candidate(doc: &Html) -> Option<String> {
    let candidates = Selector::parse("article, main, section, div").ok()?;
    let anchors = Selector::parse("a").ok()?;

    let mut best: Option<(f64, ElementRef)> = None;
    for el in doc.select(&candidates) {
        if is_unlikely_candidate(&el) {
            continue;
        }

        let text_len = element_text_chars(&el);
        if text_len < MIN_CANDIDATE_TEXT_CHARS {
            continue;
        }

        let link_len: usize = el.select(&anchors).map(|a| element_text_chars(&a)).sum();
        let density = link_len as f64 / text_len as f64;
        let score = text_len as f64 * (1.0 - density);

        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, el));
        }
    }

    if let Some((_, el)) = best {
        return Some(el.html());
    }

    // Fall back to the whole body when nothing scored.
    let body = Selector::parse("body").ok()?;
    let el = doc.select(&body).next()?;
    if element_text_chars(&el) >= MIN_CANDIDATE_TEXT_CHARS {
        Some(el.inner_html())
    } else {
        None
    }
}

fn element_text_chars(el: &ElementRef) -> usize {
    el.text().map(|t| t.chars().count()).sum()
}

fn is_unlikely_candidate(el: &ElementRef) -> bool {
    let tag = el.value().name();
    if tag.eq_ignore_ascii_case("article") || tag.eq_ignore_ascii_case("main") {
        return false;
    }
    let mut hints = String::new();
    if let Some(class) = el.value().attr("class") {
        hints.push_str(class);
        hints.push(' ');
    }
    if let Some(id) = el.value().attr("id") {
        hints.push_str(id);
    }
    UNLIKELY_CANDIDATE_RE.is_match(&hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Sample Story</title>
            <meta property="og:site_name" content="The Sample Times">
            <meta property="og:description" content="A short look at samples.">
            <meta name="author" content="Jane Writer">
            <meta property="article:published_time" content="2024-06-15T10:30:00+00:00">
        </head>
        <body>
            <nav class="nav"><a href="/">Home</a><a href="/about">About</a></nav>
            <article>
                <p>Paragraph one of the story with enough words to count as real body text
                for the candidate scorer to pick it over navigation chrome.</p>
                <p>Paragraph two keeps going with even more plain prose and no links at all,
                which keeps the link density of this candidate at zero.</p>
            </article>
            <div class="sidebar related"><a href="/a">One</a><a href="/b">Two</a></div>
        </body>
        </html>
    "#;

    fn page(html: &str) -> RawPage {
        RawPage::new(html, "utf-8")
    }

    #[test]
    fn metadata_parser_extracts_fields() {
        let parser = ReaderMetadataParser::new();
        let draft = parser
            .parse_metadata("https://sample.example/story", &page(SAMPLE_HTML))
            .unwrap();

        assert_eq!(draft.title, "Sample Story");
        assert_eq!(draft.authors, vec!["Jane Writer"]);
        assert_eq!(draft.summary.as_deref(), Some("A short look at samples."));
        assert_eq!(draft.site_name.as_deref(), Some("The Sample Times"));
        assert_eq!(draft.publish_date, NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(draft.encoding, "utf-8");
        assert!(draft.body_html.is_none());
    }

    #[test]
    fn og_title_outranks_the_title_element() {
        let html = r#"<html><head>
            <title>Site Name - The Story | Section</title>
            <meta property="og:title" content="The Story">
        </head><body><p>text</p></body></html>"#;
        let parser = ReaderMetadataParser::new();
        let draft = parser
            .parse_metadata("https://sample.example/story", &page(html))
            .unwrap();
        assert_eq!(draft.title, "The Story");
    }

    #[test]
    fn metadata_parser_rejects_empty_document() {
        let parser = ReaderMetadataParser::new();
        let err = parser
            .parse_metadata("https://sample.example/story", &page("   "))
            .unwrap_err();
        assert!(matches!(err, ParseMetadataError::EmptyDocument { .. }));
    }

    #[test]
    fn body_parser_picks_article_over_chrome() {
        let parser = ReaderBodyParser::new();
        let body = parser
            .parse_body(
                "https://sample.example/story",
                &page(SAMPLE_HTML),
                &DraftArticle::default(),
            )
            .unwrap();

        assert!(body.contains("Paragraph one"), "got: {}", body);
        assert!(!body.contains("sidebar"), "got: {}", body);
    }

    #[test]
    fn body_parser_prefers_draft_body_when_present() {
        let parser = ReaderBodyParser::new();
        let draft = DraftArticle {
            body_html: Some("<div>already extracted</div>".to_string()),
            ..Default::default()
        };
        let body = parser
            .parse_body("https://sample.example/story", &page(SAMPLE_HTML), &draft)
            .unwrap();
        assert_eq!(body, "<div>already extracted</div>");
    }

    #[test]
    fn body_parser_fails_on_contentless_page() {
        let parser = ReaderBodyParser::new();
        let err = parser
            .parse_body(
                "https://sample.example/story",
                &page("<html><body><p>hi</p></body></html>"),
                &DraftArticle::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ParseBodyError::NoMatch { .. }));
    }

    #[test]
    fn parse_date_accepts_rfc3339_and_loose_formats() {
        assert_eq!(
            parse_date("2024-06-15T10:30:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
        assert_eq!(
            parse_date("Jan 5, 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn decode_page_honors_charset_header() {
        // "café" in ISO-8859-1
        let bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        let (text, encoding) = decode_page(bytes, Some("text/html; charset=iso-8859-1"));
        assert_eq!(text, "café");
        assert_eq!(encoding, "windows-1252");
    }

    #[test]
    fn decode_page_defaults_to_utf8() {
        let (text, encoding) = decode_page("plain ascii".as_bytes(), None);
        assert_eq!(text, "plain ascii");
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn meta_refresh_target_resolves_relative_urls() {
        let html = r#"<html><head>
            <meta http-equiv="Refresh" content="0; url=/landing">
        </head></html>"#;
        assert_eq!(
            meta_refresh_target(html, "https://example.com/a"),
            Some("https://example.com/landing".to_string())
        );
        assert_eq!(meta_refresh_target("<html></html>", "https://example.com/a"), None);
    }

    #[test]
    fn meta_refresh_tolerates_multibyte_content_parts() {
        let html = r#"<html><head>
            <meta http-equiv="refresh" content="0; abcé=x; url=/landing">
        </head></html>"#;
        assert_eq!(
            meta_refresh_target(html, "https://example.com/a"),
            Some("https://example.com/landing".to_string())
        );
    }

    #[test]
    fn downloader_fetches_and_decodes() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>hello</body></html>");
        });

        let downloader = ReaderDownloader::new(&ReaderFetchOptions::default()).unwrap();
        let page = downloader.download(&server.url("/story")).unwrap();
        mock.assert();

        assert!(page.html.contains("hello"));
        assert_eq!(page.encoding, "utf-8");
    }

    #[test]
    fn downloader_rejects_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404).body("not found");
        });

        let downloader = ReaderDownloader::new(&ReaderFetchOptions::default()).unwrap();
        let err = downloader.download(&server.url("/gone")).unwrap_err();
        assert!(matches!(err, DownloadError::Status { status: 404, .. }));
    }

    #[test]
    fn downloader_rejects_empty_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/empty");
            then.status(200).body("");
        });

        let downloader = ReaderDownloader::new(&ReaderFetchOptions::default()).unwrap();
        let err = downloader.download(&server.url("/empty")).unwrap_err();
        assert!(matches!(err, DownloadError::Empty { .. }));
    }

    #[test]
    fn crawler_identity_sends_googlebot_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/bot")
                .header("referer", CRAWLER_REFERER)
                .header("user-agent", CRAWLER_USER_AGENT);
            then.status(200).body("<html><body>ok</body></html>");
        });

        let downloader = ReaderDownloader::new(&ReaderFetchOptions {
            as_crawler: true,
            follow_meta_refresh: false,
        })
        .unwrap();
        downloader.download(&server.url("/bot")).unwrap();
        mock.assert();
    }

    #[test]
    fn downloader_follows_meta_refresh_once() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path("/start");
            then.status(200).body(format!(
                r#"<html><head><meta http-equiv="refresh" content="0; url={}"></head></html>"#,
                server.url("/final")
            ));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/final");
            then.status(200).body("<html><body>landed</body></html>");
        });

        let downloader = ReaderDownloader::new(&ReaderFetchOptions {
            as_crawler: false,
            follow_meta_refresh: true,
        })
        .unwrap();
        let page = downloader.download(&server.url("/start")).unwrap();

        first.assert();
        second.assert();
        assert!(page.html.contains("landed"));
    }
}
