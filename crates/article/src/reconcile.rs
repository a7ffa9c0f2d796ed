// ABOUTME: Reconciliation of freshly detected issues against persisted issue state.
// ABOUTME: Preserves reviewer-ignored issues and replaces or removes the rest.

use std::collections::BTreeSet;

use tracing::debug;

use crate::issue::{Issue, IssueKind};
use crate::store::{IssueKey, IssueRecord, IssueStore};

/// Merge freshly detected issues into the persisted issue set for one article.
///
/// Every persisted non-ignored issue is deleted, then each new issue is
/// written as a fresh not-ignored record unless a persisted issue with the
/// same variant is flagged ignored, in which case the ignored record is left
/// untouched. Returns the variants actually written.
///
/// An ignored issue therefore disappears only once validation stops detecting
/// its variant, and a fixed-then-regressed issue reappears as not-ignored.
/// The exclusive store borrow holds for the whole read-delete-write sequence,
/// so two reconciliations for the same article cannot interleave through one
/// store handle.
pub fn reconcile(
    store: &mut dyn IssueStore,
    article_id: &str,
    new_issues: &[Issue],
) -> anyhow::Result<Vec<IssueKind>> {
    let persisted = store.select(article_id)?;

    let mut ignored: BTreeSet<IssueKind> = BTreeSet::new();
    for (key, record) in &persisted {
        if record.ignored {
            ignored.insert(key.kind);
        } else {
            store.delete(key)?;
        }
    }

    let mut written = Vec::new();
    let mut seen: BTreeSet<IssueKind> = BTreeSet::new();
    for issue in new_issues {
        let kind = issue.kind();
        // One slot per variant: the first occurrence wins.
        if !seen.insert(kind) {
            continue;
        }
        if ignored.contains(&kind) {
            debug!(article_id, kind = %kind, "skipping reviewer-ignored issue");
            continue;
        }
        let key = IssueKey::new(article_id, kind);
        store.put(&key, IssueRecord::detected(issue.clone()))?;
        written.push(kind);
    }

    debug!(
        article_id,
        detected = new_issues.len(),
        written = written.len(),
        "reconciled article issues"
    );
    Ok(written)
}
