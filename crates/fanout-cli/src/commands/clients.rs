//! Clients command implementation

use colored::Colorize;
use fanout_core::Workspace;

use crate::error::Result;

/// Run the clients command
pub fn run_clients(workspace: &Workspace) -> Result<()> {
    let layout = workspace.layout();
    let clients = layout.list_clients()?;
    let log = workspace.load_log()?;

    if clients.is_empty() {
        println!(
            "No clients found under {}",
            layout.clients_root().to_string().cyan()
        );
        return Ok(());
    }

    for client in &clients {
        let status = match log.client(client) {
            Some(record) => format!(
                "{} modules, {} files",
                record.modules().len(),
                record.files().len()
            )
            .green(),
            None => "not subscribed".dimmed(),
        };
        println!("  {} {} ({})", "+".green(), client.cyan(), status);
    }
    Ok(())
}
