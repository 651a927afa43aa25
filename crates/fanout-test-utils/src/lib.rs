//! Shared test utilities for the fanout workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each rebuild a shared tree and client directories by hand. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`] builder with mtime control

pub mod workspace;

pub use workspace::{TestWorkspace, TreeSnapshot};
