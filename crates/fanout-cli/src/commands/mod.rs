//! Command implementations for fanout-cli

pub mod clients;
pub mod share;
pub mod status;
pub mod sync;
pub mod watch;

pub use clients::run_clients;
pub use share::run_share;
pub use status::run_status;
pub use sync::run_sync;
pub use watch::run_watch;
