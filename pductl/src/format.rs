//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use pdu_core::{on_off, Outlet};

use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

/// Format the outlet list, one row per outlet in device order.
pub fn format_outlets(outlets: &[Outlet], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outlets)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct OutletRow {
                #[tabled(rename = "Outlet")]
                index: String,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Configured")]
                configured: String,
                #[tabled(rename = "Physical")]
                physical: String,
                #[tabled(rename = "Cycle Delay")]
                cycle_delay: String,
            }

            let rows: Vec<OutletRow> = outlets
                .iter()
                .enumerate()
                .map(|(index, outlet)| OutletRow {
                    index: index.to_string(),
                    name: outlet.name.clone().cyan().to_string(),
                    configured: format_state(outlet.state),
                    physical: format_state(outlet.physical_state),
                    cycle_delay: match outlet.cycle_delay {
                        Some(secs) => format!("{secs}s"),
                        // The device falls back to its own default delay
                        None => "-".dimmed().to_string(),
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Outlets:".bold(), table))
        }
    }
}

/// Render a relay state as a colored on/off label.
pub fn format_state(state: bool) -> String {
    if state {
        on_off(true).green().to_string()
    } else {
        on_off(false).red().to_string()
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
