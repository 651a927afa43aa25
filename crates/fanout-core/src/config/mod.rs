//! Workspace configuration and layout
//!
//! A fanout workspace is a directory holding a shared tree and one
//! directory per client. Locations default to the conventional layout:
//!
//! ```text
//! <root>/
//!   fanout.toml            optional overrides
//!   clients/
//!     shared/              the shared tree
//!       .log               subscription log
//!     app/
//!       src/shared/        app's mirror root
//! ```

mod layout;
mod manifest;

pub use layout::Layout;
pub use manifest::FanoutConfig;
