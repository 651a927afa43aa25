//! Sync command implementation
//!
//! Runs one reconciliation pass and reports what changed per client.

use colored::Colorize;
use fanout_core::{ReconcileReport, Workspace};

use super::share::plural;
use crate::error::{CliError, Result};

/// Run the sync command
pub fn run_sync(workspace: &Workspace, client: Option<&str>, json: bool) -> Result<()> {
    let reports = match client {
        Some(client) => {
            let log = workspace.load_log()?;
            if log.client(client).is_none() {
                return Err(CliError::user(format!("'{client}' has no subscriptions")));
            }
            let report = workspace.reconciler().reconcile(&log, client);
            vec![(client.to_string(), report)]
        }
        None => workspace.sync_all()?.clients.into_iter().collect(),
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .map(|(name, report)| serde_json::to_value(report).map(|value| (name.clone(), value)))
            .collect::<serde_json::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{} Nothing is shared yet.", "=>".blue().bold());
        return Ok(());
    }
    for (name, report) in &reports {
        print_report(name, report);
    }

    let failed = reports.iter().any(|(_, report)| !report.is_success());
    if failed {
        return Err(CliError::user("Some entries failed to sync"));
    }
    Ok(())
}

fn print_report(client: &str, report: &ReconcileReport) {
    if report.is_noop() && report.is_success() {
        println!("{} {} is up to date", "OK".green().bold(), client.cyan());
    } else {
        println!(
            "{} {}: {} {} copied, {} removed",
            "=>".blue().bold(),
            client.cyan(),
            report.copied.len(),
            plural(report.copied.len(), "file", "files"),
            report.removed.len()
        );
    }
    for path in &report.skipped {
        println!("   {} {} (missing from shared tree)", "-".yellow(), path.dimmed());
    }
    for error in &report.errors {
        println!("   {} {}", "!".red(), error);
    }
}
