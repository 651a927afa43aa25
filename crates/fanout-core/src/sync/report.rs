use std::collections::BTreeMap;

use serde::Serialize;

/// Outcome of reconciling one client.
///
/// Paths are relative to the shared tree (and therefore to the mirror root),
/// with forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Files written into the mirror
    pub copied: Vec<String>,
    /// Files deleted from the mirror
    pub removed: Vec<String>,
    /// Entries left alone because their shared source is missing
    pub skipped: Vec<String>,
    /// Entries that failed for any other reason
    pub errors: Vec<String>,
}

impl ReconcileReport {
    /// True when the pass wrote nothing to the mirror.
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty() && self.removed.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn error(&mut self, path: &str, err: impl std::fmt::Display) {
        tracing::warn!(path, error = %err, "reconcile failed for entry");
        self.errors.push(format!("{path}: {err}"));
    }
}

/// Per-client reports for a pass over every client in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyncSummary {
    pub clients: BTreeMap<String, ReconcileReport>,
}

impl SyncSummary {
    pub fn client(&self, name: &str) -> Option<&ReconcileReport> {
        self.clients.get(name)
    }

    pub fn copied(&self) -> usize {
        self.clients.values().map(|r| r.copied.len()).sum()
    }

    pub fn removed(&self) -> usize {
        self.clients.values().map(|r| r.removed.len()).sum()
    }

    pub fn is_noop(&self) -> bool {
        self.clients.values().all(ReconcileReport::is_noop)
    }

    pub fn is_success(&self) -> bool {
        self.clients.values().all(ReconcileReport::is_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_noop() {
        let report = ReconcileReport::default();
        assert!(report.is_noop());
        assert!(report.is_success());
    }

    #[test]
    fn skipped_entries_do_not_count_as_writes() {
        let report = ReconcileReport {
            skipped: vec!["lib/gone.ts".to_string()],
            ..Default::default()
        };
        assert!(report.is_noop());
    }

    #[test]
    fn summary_totals_span_clients() {
        let mut summary = SyncSummary::default();
        summary.clients.insert(
            "app".to_string(),
            ReconcileReport {
                copied: vec!["a.ts".to_string(), "b.ts".to_string()],
                ..Default::default()
            },
        );
        summary.clients.insert(
            "web".to_string(),
            ReconcileReport {
                removed: vec!["c.ts".to_string()],
                errors: vec!["d.ts: permission denied".to_string()],
                ..Default::default()
            },
        );

        assert_eq!(summary.copied(), 2);
        assert_eq!(summary.removed(), 1);
        assert!(!summary.is_noop());
        assert!(!summary.is_success());
    }
}
