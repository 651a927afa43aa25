//! Workspace facade wiring layout, log store, normalizer and reconciler

use fanout_fs::NormalizedPath;

use crate::Result;
use crate::config::{FanoutConfig, Layout};
use crate::log::{LogStore, SubscriptionLog};
use crate::scheduler::{ActiveClients, Scheduler};
use crate::share::{ShareKind, ShareOutcome, Subscriber};
use crate::sync::{ReconcileReport, Reconciler, SyncSummary};

/// A fanout workspace: one shared tree and its client mirrors.
#[derive(Debug, Clone)]
pub struct Workspace {
    layout: Layout,
    store: LogStore,
}

impl Workspace {
    /// Open the workspace at `root`, reading `fanout.toml` if present.
    pub fn open(root: impl Into<NormalizedPath>) -> Result<Self> {
        let root = root.into();
        let config = FanoutConfig::load(&root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<NormalizedPath>, config: FanoutConfig) -> Self {
        let layout = Layout::new(root.into(), config);
        let store = LogStore::new(&layout);
        Self { layout, store }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn load_log(&self) -> Result<SubscriptionLog> {
        self.store.load()
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.layout.clone())
    }

    pub fn subscriber(&self) -> Subscriber {
        Subscriber::new(self.layout.clone(), self.store.clone(), self.reconciler())
    }

    /// Share `target` with `client`, choosing the kind from the shared tree.
    pub fn share(&self, target: &str, client: &str) -> Result<ShareOutcome> {
        let kind = ShareKind::resolve(&self.layout, target);
        self.subscriber().subscribe(target, client, kind)
    }

    /// One reconciliation pass over every client in the log.
    pub fn sync_all(&self) -> Result<SyncSummary> {
        let log = self.store.load()?;
        Ok(self.reconciler().reconcile_all(&log))
    }

    /// One reconciliation pass over a single client.
    pub fn sync_client(&self, client: &str) -> Result<ReconcileReport> {
        let log = self.store.load()?;
        Ok(self.reconciler().reconcile(&log, client))
    }

    /// A scheduler polling at the configured interval.
    pub fn scheduler<A: ActiveClients>(&self, active: A) -> Scheduler<A> {
        Scheduler::new(self.reconciler(), active, self.layout.config().poll_interval())
            .with_store(self.store.clone())
    }
}
