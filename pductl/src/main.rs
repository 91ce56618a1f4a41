//! pductl
//!
//! Command-line client for networked PDU relay outlets.

use anyhow::Result;
use clap::Parser;
use pductl::cli::{
    generate_completion, handle_cycle, handle_get, handle_outlets, handle_set, Cli, Commands,
};
use pductl::client::PduClient;
use pductl::config::Profiles;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Completion needs neither configuration nor a device
    if let Commands::Completion { shell } = &cli.command {
        generate_completion(*shell);
        return Ok(());
    }

    let profiles = match Profiles::load(cli.config.as_deref()) {
        Ok(profiles) => profiles,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let profile = match profiles.profile(&cli.profile) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let client = match PduClient::new(&profile.host, &profile.username, &profile.password) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Set { ref outlet, state } => handle_set(&client, outlet, state).await,
        Commands::Cycle { ref outlet } => handle_cycle(&client, outlet).await,
        Commands::Get { command } => handle_get(&client, command, &cli.format).await,
        Commands::Outlets => handle_outlets(&client, &cli.format).await,
        Commands::Completion { .. } => unreachable!("handled before profile resolution"),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if cli.verbose {
            eprintln!("Error details: {e:?}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
