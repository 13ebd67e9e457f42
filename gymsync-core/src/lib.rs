//! gymsync core library — sync configuration, config-file persistence, errors.
//!
//! - [`config`] — [`SyncConfig`] with the built-in defaults and validation
//! - [`store`] — load / save / init of `~/.gymsync/config.yaml`
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod store;

pub use config::{SyncConfig, BACKUP_PREFIX};
pub use error::ConfigError;
