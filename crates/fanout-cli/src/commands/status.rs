//! Status command implementation

use colored::Colorize;
use fanout_core::Workspace;

use crate::error::Result;

/// Run the status command
pub fn run_status(workspace: &Workspace, json: bool) -> Result<()> {
    let log = workspace.load_log()?;

    if json {
        println!("{}", log.to_json()?);
        return Ok(());
    }

    let layout = workspace.layout();
    println!("{}", "Subscriptions".bold());
    println!();
    println!("{}:   {}", "Shared".dimmed(), layout.shared_root());
    println!("{}:      {}", "Log".dimmed(), layout.log_path());
    println!();

    if log.is_empty() {
        println!(
            "  {} (use {} to add)",
            "None".dimmed(),
            "fanout share <path> <client>".cyan()
        );
        return Ok(());
    }

    for (client, record) in log.clients() {
        println!("{} {}", client.cyan().bold(), format!("-> {}", record.path).dimmed());
        for module in record.modules() {
            println!("  {} {}", "module".green(), module);
        }
        for file in record.files() {
            println!("  {} {}", "file".blue(), file);
        }
        if record.is_empty() {
            println!("  {}", "(no subscriptions)".dimmed());
        }
    }
    Ok(())
}
