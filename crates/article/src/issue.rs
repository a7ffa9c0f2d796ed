// ABOUTME: Quality issue model with explicit variant tags used as storage identity.
// ABOUTME: Defines Issue (the detected problem) and IssueKind (its stable identity key).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity tag for an issue variant.
///
/// Persisted issues are keyed by (article id, kind), so at most one issue per
/// variant exists per article. The tag is an explicit enum with a fixed
/// storage string, never derived from a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ShortBody,
    MissingField,
}

impl IssueKind {
    /// The storage key fragment for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ShortBody => "short_body",
            IssueKind::MissingField => "missing_field",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected quality problem with an extracted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The canonical body HTML is shorter than the minimum size threshold.
    ShortBody { size: usize },
    /// An expected field was not extracted.
    MissingField { field: String },
}

impl Issue {
    /// Identity tag for this issue. Depends only on the variant, not its
    /// parameters.
    pub fn kind(&self) -> IssueKind {
        match self {
            Issue::ShortBody { .. } => IssueKind::ShortBody,
            Issue::MissingField { .. } => IssueKind::MissingField,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::ShortBody { size } => write!(f, "article body is short ({} chars)", size),
            Issue::MissingField { field } => write!(f, "article is missing {}", field),
        }
    }
}
