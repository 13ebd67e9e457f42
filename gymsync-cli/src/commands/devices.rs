//! `gymsync devices` — list devices attached to the bridge.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use gymsync_core::SyncConfig;
use gymsync_sync::{locate, ProcessBridge};

use crate::output::ErrorsOnly;

/// Arguments for `gymsync devices`.
#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Bridge program to run instead of the configured one.
    #[arg(long, value_name = "PATH")]
    pub bridge: Option<std::path::PathBuf>,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "serial")]
    serial: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "configured")]
    configured: String,
}

impl DevicesArgs {
    pub fn run(self, mut config: SyncConfig) -> Result<()> {
        if let Some(bridge) = self.bridge {
            config.bridge = bridge;
        }
        let mut bridge = ProcessBridge::from_config(&config);
        let devices = locate::list_devices(&mut bridge, &mut ErrorsOnly)
            .with_context(|| format!("failed to run {} devices", config.bridge.display()))?;

        if devices.is_empty() {
            println!("No devices attached.");
            return Ok(());
        }

        let rows: Vec<DeviceRow> = devices
            .into_iter()
            .map(|d| DeviceRow {
                configured: if d.serial == config.device_id {
                    "✓".to_string()
                } else {
                    String::new()
                },
                serial: d.serial,
                state: d.state,
            })
            .collect();
        let found = rows.iter().any(|r| !r.configured.is_empty());

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        if !found {
            println!(
                "{}",
                format!("Configured device {} is not attached.", config.device_id).yellow()
            );
        }
        Ok(())
    }
}
