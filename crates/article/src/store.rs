// ABOUTME: Persistent issue store interface keyed by (article id, issue variant).
// ABOUTME: Provides the IssueStore trait and an in-memory implementation for tests and tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueKind};

/// Storage key for a persisted issue: one slot per variant per article.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueKey {
    pub article_id: String,
    pub kind: IssueKind,
}

impl IssueKey {
    pub fn new(article_id: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            article_id: article_id.into(),
            kind,
        }
    }
}

/// A persisted issue record.
///
/// `ignored` is set by an external reviewer and is never written by automated
/// reconciliation; reconciliation only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub issue: Issue,
    pub ignored: bool,
}

impl IssueRecord {
    /// A freshly detected, not-ignored record.
    pub fn detected(issue: Issue) -> Self {
        Self {
            issue,
            ignored: false,
        }
    }
}

/// Key-value interface over the persisted issue set.
///
/// The reconciler is the sole automated writer of this contract. Failures are
/// infrastructure errors and bubble up unmodified.
pub trait IssueStore {
    /// All persisted issues for one article.
    fn select(&self, article_id: &str) -> anyhow::Result<Vec<(IssueKey, IssueRecord)>>;

    /// Remove one persisted issue.
    fn delete(&mut self, key: &IssueKey) -> anyhow::Result<()>;

    /// Write or overwrite one persisted issue.
    fn put(&mut self, key: &IssueKey, record: IssueRecord) -> anyhow::Result<()>;
}

/// In-memory issue store backed by a BTreeMap.
#[derive(Debug, Clone, Default)]
pub struct MemoryIssueStore {
    records: BTreeMap<IssueKey, IssueRecord>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all articles.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fetch one record, if present.
    pub fn get(&self, key: &IssueKey) -> Option<&IssueRecord> {
        self.records.get(key)
    }

    /// Flip the ignored flag on an existing record, as an external reviewer
    /// would. Returns false when no record exists for the key.
    pub fn mark_ignored(&mut self, key: &IssueKey, ignored: bool) -> bool {
        match self.records.get_mut(key) {
            Some(record) => {
                record.ignored = ignored;
                true
            }
            None => false,
        }
    }
}

impl IssueStore for MemoryIssueStore {
    fn select(&self, article_id: &str) -> anyhow::Result<Vec<(IssueKey, IssueRecord)>> {
        Ok(self
            .records
            .iter()
            .filter(|(key, _)| key.article_id == article_id)
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    fn delete(&mut self, key: &IssueKey) -> anyhow::Result<()> {
        self.records.remove(key);
        Ok(())
    }

    fn put(&mut self, key: &IssueKey, record: IssueRecord) -> anyhow::Result<()> {
        self.records.insert(key.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_is_scoped_to_article() {
        let mut store = MemoryIssueStore::new();
        store
            .put(
                &IssueKey::new("a1", IssueKind::ShortBody),
                IssueRecord::detected(Issue::ShortBody { size: 10 }),
            )
            .unwrap();
        store
            .put(
                &IssueKey::new("a2", IssueKind::ShortBody),
                IssueRecord::detected(Issue::ShortBody { size: 20 }),
            )
            .unwrap();

        let rows = store.select("a1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.article_id, "a1");
    }

    #[test]
    fn put_overwrites_same_key() {
        let mut store = MemoryIssueStore::new();
        let key = IssueKey::new("a1", IssueKind::ShortBody);
        store
            .put(&key, IssueRecord::detected(Issue::ShortBody { size: 10 }))
            .unwrap();
        store
            .put(&key, IssueRecord::detected(Issue::ShortBody { size: 99 }))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&key).unwrap().issue,
            Issue::ShortBody { size: 99 }
        );
    }

    #[test]
    fn mark_ignored_requires_existing_record() {
        let mut store = MemoryIssueStore::new();
        let key = IssueKey::new("a1", IssueKind::MissingField);
        assert!(!store.mark_ignored(&key, true));

        store
            .put(
                &key,
                IssueRecord::detected(Issue::MissingField {
                    field: "publish date".to_string(),
                }),
            )
            .unwrap();
        assert!(store.mark_ignored(&key, true));
        assert!(store.get(&key).unwrap().ignored);
    }
}
