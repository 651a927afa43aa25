//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fanout - Mirror a shared source tree into client trees
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, env = "FANOUT_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Share a file or directory from the shared tree with a client
    ///
    /// Directories are shared as modules: everything beneath them is
    /// mirrored, including files added later.
    ///
    /// Examples:
    ///   fanout share library/server app           # Share a module
    ///   fanout share library/server/address.ts app  # Share a single file
    Share {
        /// Path relative to the shared tree
        target: String,

        /// Name of the client directory
        client: String,
    },

    /// Run one reconciliation pass
    Sync {
        /// Only reconcile this client
        client: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Keep client mirrors live until interrupted
    ///
    /// Registers a session for every named client and polls the shared
    /// tree until Ctrl+C.
    Watch {
        /// Clients to keep in sync
        #[arg(required = true)]
        clients: Vec<String>,
    },

    /// Show every client's subscriptions
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List client directories
    Clients,
}
