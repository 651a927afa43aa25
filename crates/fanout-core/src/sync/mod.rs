//! Reconciliation of client mirrors against the shared tree
//!
//! This module provides:
//! - **reconciler**: per-client module and file passes driven by recursive
//!   modification-time comparison
//! - **report**: what a pass copied, removed, skipped, and failed on

mod reconciler;
mod report;

pub use reconciler::Reconciler;
pub use report::{ReconcileReport, SyncSummary};
