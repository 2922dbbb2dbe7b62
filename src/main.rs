use anyhow::{Context, Result};
use clap::Parser;
use core_async::sync::CancellationToken;
use core_service::bootstrap_desktop;
use docsync::cli::{Cli, Command};
use docsync::render;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    core_runtime::logging::init_logging(cli.log.to_logging_config())?;

    let config = cli.sync.to_config().context("Invalid configuration")?;
    info!(?config, "Starting docsync");

    let core = bootstrap_desktop(config).await?;
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match cli.command {
        Command::Sync { json } => {
            let report = core.sync(&cancel).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::sync_summary(&report));
            }
        }
        Command::List { json } => {
            let documents = core.list_documents(&cancel).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                print!("{}", render::document_table(&documents));
            }
        }
        Command::Status => {
            print!("{}", render::status_table(&core.status().await));
        }
        Command::RenameDataset { new_name } => {
            let dataset_id = core.rename_dataset(&new_name).await?;
            println!("renamed dataset {} to {}", dataset_id, new_name);
        }
    }

    Ok(())
}

/// First Ctrl-C cancels cooperatively; the batch stops at its next checkpoint.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping after in-flight requests");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "Cannot listen for interrupts"),
        }
    });
}
