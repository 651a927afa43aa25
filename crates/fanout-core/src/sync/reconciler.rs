//! Mirror reconciliation by recursive modification-time comparison

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use fanout_fs::{NormalizedPath, tree};

use super::{ReconcileReport, SyncSummary};
use crate::config::Layout;
use crate::log::{ClientRecord, SubscriptionLog};

/// Brings client mirrors in line with the shared tree.
///
/// Reconciliation is a read-compare-copy cycle with no locking: concurrent
/// passes over the same client converge to the same mirror contents, and a
/// pass over an unchanged tree writes nothing.
#[derive(Debug, Clone)]
pub struct Reconciler {
    layout: Layout,
}

impl Reconciler {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Reconcile one client. A client absent from the log is a no-op.
    #[tracing::instrument(skip(self, log))]
    pub fn reconcile(&self, log: &SubscriptionLog, client: &str) -> ReconcileReport {
        let Some(record) = log.client(client) else {
            tracing::debug!("client has no subscriptions");
            return ReconcileReport::default();
        };
        self.reconcile_record(record)
    }

    /// Reconcile every client in the log, sequentially.
    pub fn reconcile_all(&self, log: &SubscriptionLog) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for (client, _) in log.clients() {
            let report = self.reconcile(log, client);
            if !report.is_noop() {
                tracing::info!(
                    client,
                    copied = report.copied.len(),
                    removed = report.removed.len(),
                    "mirror updated"
                );
            }
            summary.clients.insert(client.to_string(), report);
        }
        summary
    }

    fn reconcile_record(&self, record: &ClientRecord) -> ReconcileReport {
        let mirror_root = self.layout.resolve_record(&record.path);
        let mut report = ReconcileReport::default();

        for module in record.modules() {
            self.reconcile_module(module, &mirror_root, &mut report);
        }
        for file in record.files() {
            self.reconcile_file(file, &mirror_root, &mut report);
        }
        report
    }

    /// Orphans are removed before comparing so a stale mirror file cannot
    /// mask a newer shared-side change.
    fn reconcile_module(&self, module: &str, mirror_root: &NormalizedPath, report: &mut ReconcileReport) {
        let reserved = self.layout.reserved_artifacts();
        let shared = self.layout.shared_path(module).to_native();
        let mirror = mirror_root.join(module).to_native();

        if !shared.is_dir() {
            tracing::debug!(module, "module missing from shared tree");
            report.skipped.push(module.to_string());
        }

        if mirror.is_dir() {
            match tree::remove_orphans(&mirror, &shared) {
                Ok(removed) => report
                    .removed
                    .extend(removed.iter().map(|rel| prefixed(module, rel))),
                Err(e) => report.error(module, e),
            }
        }

        let Some(shared_time) = tree::latest_mtime(&shared, &reserved) else {
            return;
        };
        let mirror_time = tree::latest_mtime(&mirror, &reserved).unwrap_or(SystemTime::UNIX_EPOCH);
        if shared_time <= mirror_time {
            tracing::debug!(module, "module up to date");
            return;
        }

        tracing::debug!(module, "module changed, copying");
        match tree::copy_tree(&shared, &mirror, &reserved) {
            Ok(copy) => {
                report
                    .copied
                    .extend(copy.copied.iter().map(|rel| prefixed(module, rel)));
                report
                    .skipped
                    .extend(copy.vanished.iter().map(|rel| prefixed(module, rel)));
                for (rel, message) in copy.failed {
                    report.error(&prefixed(module, &rel), message);
                }
            }
            Err(e) => report.error(module, e),
        }
    }

    /// Missing shared files are skipped, never propagated as deletions.
    fn reconcile_file(&self, file: &str, mirror_root: &NormalizedPath, report: &mut ReconcileReport) {
        let shared = self.layout.shared_path(file).to_native();
        let mirror = mirror_root.join(file).to_native();

        let Some(shared_time) = tree::file_mtime(&shared).filter(|_| shared.is_file()) else {
            tracing::debug!(file, "shared file missing");
            report.skipped.push(file.to_string());
            return;
        };

        if let Some(parent) = mirror.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            report.error(file, fanout_fs::Error::io(parent, e));
            return;
        }

        let mirror_time = tree::file_mtime(&mirror).unwrap_or(SystemTime::UNIX_EPOCH);
        if shared_time <= mirror_time {
            return;
        }

        match tree::copy_file(&shared, &mirror) {
            Ok(()) => {
                tracing::debug!(file, "copied");
                report.copied.push(file.to_string());
            }
            Err(e) if e.is_vanished() && !shared.exists() => {
                tracing::debug!(file, "shared file vanished during copy");
                report.skipped.push(file.to_string());
            }
            Err(e) => report.error(file, e),
        }
    }
}

fn prefixed(module: &str, rel: &Path) -> String {
    let rel = rel.to_string_lossy().replace('\\', "/");
    format!("{}/{}", module.trim_end_matches('/'), rel)
}
