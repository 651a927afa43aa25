//! Subscription normalizer
//!
//! Validates share requests and keeps every client record minimal: a path
//! already covered by a module is rejected, and a new module absorbs the
//! narrower files and modules beneath it.

use std::fmt;

use fanout_fs::{SharePath, validate_segment};
use serde::Serialize;

use crate::config::Layout;
use crate::log::{ClientRecord, LogStore};
use crate::sync::{Reconciler, SyncSummary};
use crate::{Error, Result};

/// Whether a subscription covers a whole directory or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    Module,
    File,
}

impl ShareKind {
    /// `Module` if `raw` names a directory in the shared tree, else `File`.
    pub fn resolve(layout: &Layout, raw: &str) -> Self {
        if layout.shared_path(raw).is_dir() {
            Self::Module
        } else {
            Self::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ShareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriptions removed because a new module covers them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pruned {
    pub files: Vec<String>,
    pub modules: Vec<String>,
}

/// Result of a successful subscribe.
#[derive(Debug, Clone, Serialize)]
pub struct ShareOutcome {
    pub client: String,
    pub path: String,
    pub kind: ShareKind,
    pub pruned: Pruned,
    /// The reconciliation pass triggered by the new subscription
    pub summary: SyncSummary,
}

/// Apply a new subscription to one client's record.
///
/// Checks run in order: coverage by an existing module, then exact
/// duplicate. On success the path is appended, and for modules every file
/// and narrower module beneath it is removed.
pub fn normalize(record: &mut ClientRecord, path: &SharePath, client: &str) -> Result<Pruned> {
    if let Some(module) = record.covering_module(path.as_str()) {
        return Err(Error::AlreadyShared {
            path: path.to_string(),
            client: client.to_string(),
            covered_by: Some(module.to_string()),
        });
    }

    let set = if path.is_module() {
        &mut record.module
    } else {
        &mut record.file
    };
    if set.iter().any(|existing| existing == path.as_str()) {
        return Err(Error::AlreadyShared {
            path: path.to_string(),
            client: client.to_string(),
            covered_by: None,
        });
    }
    set.push(path.to_string());

    let mut pruned = Pruned::default();
    if path.is_module() {
        record.file.retain(|file| {
            let covered = path.covers(file);
            if covered {
                pruned.files.push(file.clone());
            }
            !covered
        });
        record.module.retain(|module| {
            let covered = module != path.as_str() && path.covers(module);
            if covered {
                pruned.modules.push(module.clone());
            }
            !covered
        });
    }
    Ok(pruned)
}

/// Validates, records, and immediately mirrors share requests.
#[derive(Debug, Clone)]
pub struct Subscriber {
    layout: Layout,
    store: LogStore,
    reconciler: Reconciler,
}

impl Subscriber {
    pub fn new(layout: Layout, store: LogStore, reconciler: Reconciler) -> Self {
        Self {
            layout,
            store,
            reconciler,
        }
    }

    /// Subscribe `client` to `target` (relative to the shared tree).
    ///
    /// On success the log is saved and a full reconciliation pass has run
    /// before this returns.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the target is not in the shared tree
    /// - [`Error::UnknownClient`] if the client has no directory
    /// - [`Error::AlreadyShared`] if the target is already covered
    /// - [`Error::ReservedPath`] if the target is the log or one of its
    ///   companion files at the shared root
    ///
    /// None of these mutate the log.
    #[tracing::instrument(skip(self), fields(kind = %kind))]
    pub fn subscribe(&self, target: &str, client: &str, kind: ShareKind) -> Result<ShareOutcome> {
        validate_segment(client)?;
        let path = match kind {
            ShareKind::Module => SharePath::module(target)?,
            ShareKind::File => SharePath::file(target)?,
        };

        if self.layout.reserved().is_reserved_rel(path.as_str()) {
            return Err(Error::ReservedPath {
                path: path.into_string(),
            });
        }

        let shared = self.layout.shared_path(path.as_str());
        let present = match kind {
            ShareKind::Module => shared.is_dir(),
            ShareKind::File => shared.is_file(),
        };
        if !present {
            return Err(Error::NotFound {
                path: path.into_string(),
            });
        }

        if !self.layout.is_known_client(client) {
            return Err(Error::UnknownClient {
                client: client.to_string(),
            });
        }

        let guard = self.store.lock()?;
        let mut log = guard.load()?;
        let mut record = log
            .client(client)
            .cloned()
            .unwrap_or_else(|| ClientRecord::new(self.layout.mirror_record(client)));

        let pruned = normalize(&mut record, &path, client)?;
        log.insert(client, record);
        guard.save(&log)?;
        drop(guard);

        tracing::info!(path = %path, client, "shared");
        if !pruned.files.is_empty() {
            tracing::info!(
                count = pruned.files.len(),
                module = %path,
                client,
                "removed file subscriptions included within module"
            );
        }
        if !pruned.modules.is_empty() {
            tracing::info!(
                count = pruned.modules.len(),
                module = %path,
                client,
                "removed submodule subscriptions included within module"
            );
        }

        let summary = self.reconciler.reconcile_all(&log);

        Ok(ShareOutcome {
            client: client.to_string(),
            path: path.into_string(),
            kind,
            pruned,
            summary,
        })
    }
}
