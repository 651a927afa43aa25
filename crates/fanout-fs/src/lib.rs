//! Filesystem primitives for fanout
//!
//! Provides normalized path handling, locked atomic writes, and the
//! recursive walk/copy/prune operations the reconciler is built from.

pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod tree;

pub use constants::{LayoutPath, ReservedArtifacts, ReservedNames};
pub use error::{Error, Result};
pub use io::{LockGuard, RobustnessConfig};
pub use path::{NormalizedPath, SharePath, validate_segment};
pub use tree::TreeCopy;
