// ABOUTME: Main library entry point for the clippings article domain.
// ABOUTME: Re-exports the article model, quality validation, issue store, and reconciliation.

//! Article domain for clippings: the extracted-article data model, quality
//! validation, and reconciliation of detected quality issues against a
//! persistent issue store.
//!
//! # Example
//!
//! ```
//! use clippings_article::{validate, Article, MemoryIssueStore};
//!
//! let article = Article {
//!     title: "Hello".to_string(),
//!     html: "<p>short</p>".to_string(),
//!     ..Default::default()
//! };
//! let issues = validate(&article);
//! assert!(!issues.is_empty());
//!
//! let mut store = MemoryIssueStore::new();
//! let written = clippings_article::reconcile(&mut store, "article-1", &issues).unwrap();
//! assert_eq!(written.len(), issues.len());
//! ```

pub mod event;
pub mod issue;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod validate;

pub use crate::event::{FetchEvent, FetchFailure, Publisher};
pub use crate::issue::{Issue, IssueKind};
pub use crate::model::{Article, ArticleIssues};
pub use crate::reconcile::reconcile;
pub use crate::store::{IssueKey, IssueRecord, IssueStore, MemoryIssueStore};
pub use crate::validate::{validate, MIN_BODY_HTML_CHARS};
