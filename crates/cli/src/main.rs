// ABOUTME: CLI for extracting articles with the clippings pipeline.
// ABOUTME: Fetches each URL, validates the result, and prints fetch events as JSON.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use clippings_article::{validate, FetchEvent, FetchFailure};
use clippings_fetch::{configs_for_url, fetch_with_pause, DEFAULT_ATTEMPT_PAUSE};

/// Extract one or more articles and output JSON fetch events.
#[derive(Parser, Debug)]
#[command(name = "clippings-cli")]
#[command(about = "Extract articles with the clippings pipeline and print JSON", long_about = None)]
struct Args {
    /// Article URL(s) to fetch (http/https).
    #[arg(required = true)]
    urls: Vec<String>,

    /// Seconds to pause between fallback attempts.
    #[arg(long, default_value_t = DEFAULT_ATTEMPT_PAUSE.as_secs())]
    pause: u64,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let pause = Duration::from_secs(args.pause);

    let mut events = Vec::new();
    let mut succeeded = 0usize;

    for url in &args.urls {
        let configs = configs_for_url(url);
        let event = match fetch_with_pause(url, &configs, pause) {
            Ok(article) => {
                succeeded += 1;
                let issues = validate(&article);
                FetchEvent::succeeded(url.clone(), url.clone(), article, issues)
            }
            Err(err) => FetchEvent::failed(
                url.clone(),
                url.clone(),
                FetchFailure::new(err.kind(), err.to_string()),
            ),
        };
        events.push(event);
    }

    // Single URL => emit the event itself; otherwise an envelope with counts.
    let output = if events.len() == 1 {
        serde_json::to_value(&events[0])?
    } else {
        json!({
            "events": events,
            "total": events.len(),
            "succeeded": succeeded,
            "failed": events.len() - succeeded,
        })
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if succeeded == args.urls.len() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
