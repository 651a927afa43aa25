//! Core of fanout: a one-to-many file-sharing synchronizer
//!
//! A canonical shared tree is mirrored into independent client trees
//! according to a subscription log. This crate implements:
//!
//! - **Subscription log**: per-client module and file subscriptions,
//!   persisted as JSON inside the shared tree
//! - **Normalizer**: validation, duplicate rejection and module subsumption
//!   on every new subscription
//! - **Reconciler**: recursive modification-time comparison, copying and
//!   deletion propagation for each client mirror
//! - **Scheduler**: a polling loop that keeps mirrors live while client
//!   sessions are active
//!
//! # Architecture
//!
//! ```text
//!                 fanout-cli
//!                     |
//!                fanout-core
//!      +--------+-----+-----+-----------+
//!      |        |           |           |
//!     log     share       sync      scheduler
//!                     |
//!                 fanout-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fanout_core::{Result, Workspace};
//!
//! fn example() -> Result<()> {
//!     let workspace = Workspace::open("/path/to/project")?;
//!     let outcome = workspace.share("library/server", "app")?;
//!     println!("shared {} with {}", outcome.path, outcome.client);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod scheduler;
pub mod share;
pub mod sync;
pub mod workspace;

pub use config::{FanoutConfig, Layout};
pub use error::{Error, Result};
pub use log::{ClientRecord, LogGuard, LogStore, SubscriptionLog};
pub use scheduler::{ActiveClients, Scheduler, Session, SessionRegistry};
pub use share::{Pruned, ShareKind, ShareOutcome, Subscriber, normalize};
pub use sync::{ReconcileReport, Reconciler, SyncSummary};
pub use workspace::Workspace;
