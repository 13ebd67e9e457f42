//! `gymsync sync` — run one device-sync session.
//!
//! The session itself is blocking; it runs on a tokio blocking thread so a
//! Ctrl-C listener can cancel the bridge child that is currently running.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gymsync_core::SyncConfig;
use gymsync_sync::{FsCreationDates, ProcessBridge, SyncReport, SyncSession, SyncState};

use crate::output::{TerminalLog, TerminalProgress};

/// Arguments for `gymsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Device serial to sync from (overrides `device_id`).
    #[arg(long, short = 'd', value_name = "SERIAL")]
    pub device: Option<String>,

    /// Bridge program to run (overrides `bridge`).
    #[arg(long, value_name = "PATH")]
    pub bridge: Option<PathBuf>,

    /// Destination directory (overrides `local_directory`).
    #[arg(long, value_name = "DIR")]
    pub local_dir: Option<PathBuf>,

    /// Per-command timeout in seconds (overrides `command_timeout_secs`).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Serve the destination directory after a successful sync.
    #[arg(long)]
    pub serve: bool,
}

impl SyncArgs {
    pub fn run(self, mut config: SyncConfig) -> Result<()> {
        if let Some(device) = self.device {
            config.device_id = device;
        }
        if let Some(bridge) = self.bridge {
            config.bridge = bridge;
        }
        if let Some(dir) = self.local_dir {
            config.local_directory = dir;
        }
        if let Some(secs) = self.timeout {
            config.command_timeout_secs = Some(secs);
        }
        config.validate().context("invalid configuration")?;

        fs::create_dir_all(&config.local_directory).with_context(|| {
            format!(
                "failed to create local directory {}",
                config.local_directory.display()
            )
        })?;

        let (report, errors) = run_session(config.clone())?;
        print_summary(&report, errors);

        if let Some(reason) = report.failure() {
            bail!("sync failed: {reason}");
        }
        if !report.transferred {
            bail!("sync finished without transferring {}", config.remote_file_name);
        }
        if report.rotation.as_ref().is_some_and(|r| !r.promoted()) {
            bail!(
                "sync finished but {} was not written",
                config.canonical_path().display()
            );
        }

        if self.serve {
            super::serve::serve(config.serve_root(), config.http_port, true)?;
        }
        Ok(())
    }
}

/// Run the session on a blocking thread, cancelling it on Ctrl-C.
fn run_session(config: SyncConfig) -> Result<(SyncReport, usize)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let signal = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("received ctrl-c, cancelling sync");
                    cancel.cancel();
                }
            })
        };

        let session = tokio::task::spawn_blocking(move || {
            let bridge = ProcessBridge::from_config(&config).with_cancel(cancel);
            let mut log = TerminalLog::default();
            info!(device = %config.device_id, bridge = %config.bridge.display(), "starting sync");
            let report =
                SyncSession::new(&config, bridge, FsCreationDates, &mut log, TerminalProgress)
                    .run();
            (report, log.errors())
        });

        let result = session.await.context("sync task panicked");
        signal.abort();
        result
    })
}

fn print_summary(report: &SyncReport, errors: usize) {
    println!();
    match report.state {
        SyncState::Done if report.is_complete() => {
            println!("{} Sync complete.", "✓".green());
        }
        SyncState::Done => {
            println!(
                "{} Sync finished with problems ({errors} error line(s)).",
                "!".yellow()
            );
            if !report.transferred {
                println!("  transfer: {}", "failed".red());
            }
            if let Some(rotation) = &report.rotation {
                if !rotation.promoted() {
                    println!("  promote:  {}", "failed".red());
                }
            }
            if report.transferred && !report.remote_deleted {
                println!("  remote file: {}", "not deleted".yellow());
            }
        }
        SyncState::Failed(reason) => {
            println!("{} Sync failed: {reason}", "✗".red());
        }
        _ => {}
    }
}
