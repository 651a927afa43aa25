use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::ActiveClients;
use crate::Result;
use crate::log::LogStore;
use crate::sync::{Reconciler, SyncSummary};

/// Polling loop that reconciles every client while any session is live.
///
/// The log is reloaded on every pass, so subscriptions added while the loop
/// runs are picked up without a restart.
#[derive(Debug)]
pub struct Scheduler<A> {
    reconciler: Reconciler,
    store: LogStore,
    active: A,
    interval: Duration,
}

impl<A: ActiveClients> Scheduler<A> {
    pub fn new(reconciler: Reconciler, active: A, interval: Duration) -> Self {
        let store = LogStore::new(reconciler.layout());
        Self {
            reconciler,
            store,
            active,
            interval,
        }
    }

    /// Replace the store the log is reloaded from.
    pub fn with_store(mut self, store: LogStore) -> Self {
        self.store = store;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until no client is active. Returns the number of passes made.
    ///
    /// # Errors
    ///
    /// A log that cannot be loaded ends the loop.
    pub fn run(&self) -> Result<u64> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), calling `on_pass` after every pass.
    pub fn run_with(&self, mut on_pass: impl FnMut(&SyncSummary)) -> Result<u64> {
        let mut passes = 0;
        loop {
            let active = self.active.active_clients();
            if active.is_empty() {
                break;
            }
            tracing::trace!(?active, pass = passes, "sync pass");

            let log = self.store.load().inspect_err(|e| {
                tracing::error!(error = %e, "failed to load subscription log, stopping sync");
            })?;
            let summary = self.reconciler.reconcile_all(&log);
            passes += 1;
            on_pass(&summary);

            thread::sleep(self.interval);
        }
        tracing::debug!(passes, "no active clients, sync stopped");
        Ok(passes)
    }
}

impl<A: ActiveClients + 'static> Scheduler<A> {
    /// Run the loop on a background thread named `fanout-sync`.
    pub fn spawn(self) -> Result<JoinHandle<Result<u64>>> {
        let handle = thread::Builder::new()
            .name("fanout-sync".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }
}
