//! fanout CLI
//!
//! Shares files and directories from a canonical shared tree with client
//! trees and keeps the copies up to date.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use fanout_core::Workspace;
use fanout_fs::NormalizedPath;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} file-sharing synchronizer", "fanout".green().bold());
        println!();
        println!("Run {} for available commands.", "fanout --help".cyan());
        return Ok(());
    };

    let workspace = open_workspace(cli.root)?;
    execute_command(&workspace, command)
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact();

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!("verbose mode enabled");
    }
}

fn open_workspace(root: Option<PathBuf>) -> Result<Workspace> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = NormalizedPath::canonical(&root)?;
    tracing::debug!(root = %root, "opening workspace");
    Ok(Workspace::open(root)?)
}

fn execute_command(workspace: &Workspace, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Share { target, client } => commands::run_share(workspace, &target, &client),
        Commands::Sync { client, json } => commands::run_sync(workspace, client.as_deref(), json),
        Commands::Watch { clients } => commands::run_watch(workspace, &clients),
        Commands::Status { json } => commands::run_status(workspace, json),
        Commands::Clients => commands::run_clients(workspace),
    }
}
