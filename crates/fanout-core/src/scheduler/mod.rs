//! Live mirroring while client sessions are running
//!
//! The [`Scheduler`] polls the shared tree as long as any client reported
//! by an [`ActiveClients`] source is live. [`SessionRegistry`] is the
//! in-process source: a client process registers a session when it starts
//! and the loop winds down once the last session ends.

mod poller;
mod session;

use std::collections::BTreeSet;

pub use poller::Scheduler;
pub use session::{Session, SessionRegistry};

/// Reports which client sessions are currently live.
pub trait ActiveClients: Send + Sync {
    fn active_clients(&self) -> BTreeSet<String>;
}

impl<T: ActiveClients + ?Sized> ActiveClients for std::sync::Arc<T> {
    fn active_clients(&self) -> BTreeSet<String> {
        (**self).active_clients()
    }
}
