//! Command execution handlers

use anyhow::Result;
use clap::CommandFactory;
use pdu_core::on_off;

use crate::client::PduClient;
use crate::format::{format_outlets, format_success, OutputFormat};

use super::commands::*;

/// Handle the set command
pub async fn handle_set(client: &PduClient, outlet: &str, state: SwitchState) -> Result<()> {
    let index = client.resolve_outlet(outlet).await?;
    client.set_state(index, state.as_bool()).await?;

    println!(
        "{}",
        format_success(&format!(
            "Outlet {index} switched {}",
            on_off(state.as_bool())
        ))
    );

    Ok(())
}

/// Handle the cycle command
pub async fn handle_cycle(client: &PduClient, outlet: &str) -> Result<()> {
    let index = client.resolve_outlet(outlet).await?;
    client.cycle(index).await?;

    println!("{}", format_success(&format!("Outlet {index} cycling")));

    Ok(())
}

/// Handle get subcommands
pub async fn handle_get(
    client: &PduClient,
    command: GetCommands,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        GetCommands::Configured { outlet } => {
            let index = client.resolve_outlet(&outlet).await?;
            let state = client.configured_state(index).await?;
            print_state(index, state, format)?;
        }
        GetCommands::Physical { outlet } => {
            let index = client.resolve_outlet(&outlet).await?;
            let state = client.physical_state(index).await?;
            print_state(index, state, format)?;
        }
    }

    Ok(())
}

fn print_state(index: usize, state: bool, format: &OutputFormat) -> Result<()> {
    match format {
        // The raw JSON boolean, as the device reported it
        OutputFormat::Table => println!("{state}"),
        OutputFormat::Json => {
            let value = serde_json::json!({ "outlet": index, "state": state });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Handle the outlets command
pub async fn handle_outlets(client: &PduClient, format: &OutputFormat) -> Result<()> {
    let outlets = client.list_outlets().await?;
    println!("{}", format_outlets(&outlets, format)?);

    Ok(())
}

/// Generate shell completion scripts on stdout
pub fn generate_completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pductl", &mut std::io::stdout());
}
