//! Watch command implementation

use std::sync::{Arc, Mutex};

use colored::Colorize;
use fanout_core::{SessionRegistry, SyncSummary, Workspace};

use crate::error::{CliError, Result};

/// Run the watch command
///
/// Holds one session per client until Ctrl+C ends them all, which lets the
/// scheduler loop run out on its own.
pub fn run_watch(workspace: &Workspace, clients: &[String]) -> Result<()> {
    for client in clients {
        if !workspace.layout().is_known_client(client) {
            return Err(CliError::user(format!("'{client}' client does not exist")));
        }
    }

    let registry = SessionRegistry::new();
    let sessions: Vec<_> = clients.iter().map(|c| registry.start(c.as_str())).collect();
    let sessions = Arc::new(Mutex::new(sessions));

    let handler_sessions = sessions.clone();
    ctrlc::set_handler(move || {
        if let Ok(mut sessions) = handler_sessions.lock() {
            sessions.clear();
        }
    })?;

    let scheduler = workspace.scheduler(registry);
    println!(
        "{} Watching for {} (every {}ms, Ctrl+C to stop)",
        "=>".blue().bold(),
        clients.join(", ").cyan(),
        scheduler.interval().as_millis()
    );

    let passes = scheduler.run_with(|summary| {
        for change in watched_changes(summary, clients) {
            let sign = match change.kind {
                ChangeKind::Copied => "+".green(),
                ChangeKind::Removed => "-".red(),
            };
            println!("   {} {} {}", sign, change.client.dimmed(), change.path);
        }
    })?;

    println!("{} Stopped after {} passes", "OK".green().bold(), passes);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Copied,
    Removed,
}

#[derive(Debug, PartialEq, Eq)]
struct Change<'a> {
    kind: ChangeKind,
    client: &'a str,
    path: &'a str,
}

/// Mirror writes from a pass, limited to the clients this command watches.
///
/// A pass covers every client in the log, including ones another watcher
/// or nobody asked for.
fn watched_changes<'a>(summary: &'a SyncSummary, clients: &[String]) -> Vec<Change<'a>> {
    summary
        .clients
        .iter()
        .filter(|(client, _)| clients.iter().any(|c| c == *client))
        .flat_map(|(client, report)| {
            let copied = report.copied.iter().map(move |path| Change {
                kind: ChangeKind::Copied,
                client,
                path,
            });
            let removed = report.removed.iter().map(move |path| Change {
                kind: ChangeKind::Removed,
                client,
                path,
            });
            copied.chain(removed)
        })
        .collect()
}
