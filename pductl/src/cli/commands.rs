//! CLI command and subcommand definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::format::OutputFormat;

/// PDU relay outlet CLI
#[derive(Parser, Debug)]
#[command(name = "pductl")]
#[command(version, about = "Control networked PDU relay outlets", long_about = None)]
pub struct Cli {
    /// PDU profile name from the configuration file
    pub profile: String,

    /// Config file path (default: ~/.config/pductl/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set an outlet's state
    Set {
        /// Outlet index or name
        outlet: String,

        /// Desired state
        #[arg(value_enum)]
        state: SwitchState,
    },

    /// Power-cycle an outlet
    Cycle {
        /// Outlet index or name
        outlet: String,
    },

    /// Query the state of outlets
    Get {
        #[command(subcommand)]
        command: GetCommands,
    },

    /// List outlets known to the PDU, and their states
    Outlets,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// The configured state of an outlet (the setpoint)
    Configured {
        /// Outlet index or name
        outlet: String,
    },

    /// The physical state of an outlet
    Physical {
        /// Outlet index or name
        outlet: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SwitchState {
    Off,
    On,
}

impl SwitchState {
    /// The boolean the device expects in a state write.
    pub fn as_bool(self) -> bool {
        matches!(self, SwitchState::On)
    }
}
