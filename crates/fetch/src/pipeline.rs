// ABOUTME: The sequential fallback pipeline: try each configuration in order until one succeeds.
// ABOUTME: Builds all strategy sets up front, pauses between attempts, normalizes the winner.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use clippings_article::Article;

use crate::config::{site_and_domain, Config};
use crate::error::FetchError;
use crate::normalize::normalize_body;
use crate::strategy::{build_strategies, StrategySet};

/// Pause between consecutive extraction attempts, a courtesy to the origin
/// server when the first configuration fails.
pub const DEFAULT_ATTEMPT_PAUSE: Duration = Duration::from_secs(2);

/// Fetch and extract an article, trying configurations in order with the
/// default inter-attempt pause. The first fully successful configuration
/// wins; later ones are never tried.
pub fn fetch(url: &str, configs: &[Config]) -> Result<Article, FetchError> {
    fetch_with_pause(url, configs, DEFAULT_ATTEMPT_PAUSE)
}

/// [`fetch`] with an explicit pause between attempts. Tests pass
/// `Duration::ZERO`.
///
/// Every configuration is compiled before the first network request, so a
/// misconfigured entry anywhere in the list fails the whole call eagerly
/// rather than surfacing as one more exhausted attempt.
pub fn fetch_with_pause(
    url: &str,
    configs: &[Config],
    pause: Duration,
) -> Result<Article, FetchError> {
    let sets = configs
        .iter()
        .map(build_strategies)
        .collect::<Result<Vec<StrategySet>, _>>()?;

    let (site, domain) = site_and_domain(url);
    let attempts = sets.len();
    let started = Instant::now();

    for (index, (config, set)) in configs.iter().zip(&sets).enumerate() {
        if index > 0 {
            thread::sleep(pause);
        }
        let attempt = index + 1;
        debug!(
            url,
            site,
            domain,
            attempt,
            attempts,
            config = %config.summary(),
            "starting extraction attempt"
        );

        match run_attempt(url, set) {
            Ok(article) => {
                info!(
                    url,
                    site,
                    domain,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "article extracted"
                );
                return Ok(article);
            }
            Err(outcome) => {
                warn!(
                    url,
                    site,
                    domain,
                    attempt,
                    stage = outcome.stage,
                    strategy = outcome.strategy,
                    error = %outcome.message,
                    "extraction attempt failed"
                );
            }
        }
    }

    info!(
        url,
        site,
        domain,
        attempts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "all extraction attempts failed"
    );
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
    })
}

/// Why one attempt stopped: which stage, which strategy, and the stage error.
struct AttemptFailure {
    stage: &'static str,
    strategy: &'static str,
    message: String,
}

/// One attempt: download, parse metadata, parse body, normalize. Any stage
/// error ends the attempt; only a fully successful attempt yields an article.
fn run_attempt(url: &str, set: &StrategySet) -> Result<Article, AttemptFailure> {
    let page = set.downloader.download(url).map_err(|e| AttemptFailure {
        stage: "download",
        strategy: set.downloader.name(),
        message: e.to_string(),
    })?;

    let draft = set
        .metadata_parser
        .parse_metadata(url, &page)
        .map_err(|e| AttemptFailure {
            stage: "metadata",
            strategy: set.metadata_parser.name(),
            message: e.to_string(),
        })?;

    let body_html = set
        .body_parser
        .parse_body(url, &page, &draft)
        .map_err(|e| AttemptFailure {
            stage: "body",
            strategy: set.body_parser.name(),
            message: e.to_string(),
        })?;

    let normalized = normalize_body(&body_html);
    Ok(draft.into_article(normalized.text, normalized.html))
}
