// ABOUTME: Outbound fetch outcome events handed to an external publisher.
// ABOUTME: Serializable records for success, success-with-issues, and terminal failure.

use serde::{Deserialize, Serialize};

use crate::issue::Issue;
use crate::model::Article;

/// Structured error record published when the whole pipeline fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub kind: String,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one fetch invocation, as handed to the outbound publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FetchEvent {
    FetchSucceeded {
        id: String,
        url: String,
        article: Article,
    },
    FetchSucceededWithIssues {
        id: String,
        url: String,
        article: Article,
        issues: Vec<Issue>,
    },
    FetchFailed {
        id: String,
        url: String,
        error: FetchFailure,
    },
}

impl FetchEvent {
    /// Build the success event, attaching issues when any were detected.
    pub fn succeeded(
        id: impl Into<String>,
        url: impl Into<String>,
        article: Article,
        issues: Vec<Issue>,
    ) -> Self {
        let id = id.into();
        let url = url.into();
        if issues.is_empty() {
            FetchEvent::FetchSucceeded { id, url, article }
        } else {
            FetchEvent::FetchSucceededWithIssues {
                id,
                url,
                article,
                issues,
            }
        }
    }

    pub fn failed(id: impl Into<String>, url: impl Into<String>, error: FetchFailure) -> Self {
        FetchEvent::FetchFailed {
            id: id.into(),
            url: url.into(),
            error,
        }
    }
}

/// Outbound collaborator that receives fetch outcome events.
pub trait Publisher {
    fn publish(&mut self, event: &FetchEvent) -> anyhow::Result<()>;
}
