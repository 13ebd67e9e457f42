//! `gymsync config` — print, create, or locate the config file.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use gymsync_core::{store, SyncConfig};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as YAML.
    Show,
    /// Write the default configuration if no config file exists yet.
    Init,
    /// Print the config file location.
    Path,
}

pub fn run(command: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => store::config_path().context("could not determine home directory")?,
    };

    match command {
        ConfigCommand::Show => {
            let config = if path.exists() {
                store::load_from(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?
            } else {
                SyncConfig::default()
            };
            print!(
                "{}",
                serde_yaml::to_string(&config).context("failed to render config YAML")?
            );
        }
        ConfigCommand::Init => {
            if path.exists() {
                println!("config already exists: {}", path.display());
                return Ok(());
            }
            match explicit {
                Some(path) => store::save_to(path, &SyncConfig::default()),
                None => store::init().map(|_| ()),
            }
            .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Wrote default config to {}", path.display());
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}
