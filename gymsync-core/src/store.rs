//! YAML config file persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.gymsync/
//!   config.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::error::{io_err, ConfigError};

pub const CONFIG_DIR: &str = ".gymsync";
pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.gymsync/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate the config file at `path`.
///
/// Keys missing from the file take their default values.
pub fn load_from(path: &Path) -> Result<SyncConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config: SyncConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load `<home>/.gymsync/config.yaml`, or the defaults when it does not exist.
pub fn load_or_default_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    load_from(&path)
}

/// `load_or_default_at` convenience wrapper.
pub fn load_or_default() -> Result<SyncConfig, ConfigError> {
    load_or_default_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: validate → serialize → `.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_to(path: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            set_dir_permissions(parent)?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Write the default config to `<home>/.gymsync/config.yaml`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if path.exists() {
        return load_from(&path);
    }
    let config = SyncConfig::default();
    save_to(&path, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init() -> Result<SyncConfig, ConfigError> {
    init_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = load_or_default_at(home.path()).expect("load");
        assert_eq!(config, SyncConfig::default());
        assert!(!config_path_at(home.path()).exists(), "load must not create files");
    }

    #[test]
    fn init_then_load_returns_same_config() {
        let home = TempDir::new().expect("tempdir");
        let written = init_at(home.path()).expect("init");
        let loaded = load_or_default_at(home.path()).expect("load");
        assert_eq!(written, loaded);
    }

    #[test]
    fn init_is_idempotent_and_keeps_edits() {
        let home = TempDir::new().expect("tempdir");
        init_at(home.path()).expect("init");
        let path = config_path_at(home.path());
        let mut edited = load_from(&path).expect("load");
        edited.device_id = "EMULATOR5554".to_owned();
        save_to(&path, &edited).expect("save");

        let again = init_at(home.path()).expect("second init");
        assert_eq!(again.device_id, "EMULATOR5554");
    }

    #[test]
    fn save_refuses_invalid_config() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        let bad = SyncConfig {
            remote_directory: "/sdcard".to_owned(),
            ..SyncConfig::default()
        };
        assert!(matches!(
            save_to(&path, &bad),
            Err(ConfigError::Invalid { field: "remote_directory", .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    #[cfg(unix)]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let home = TempDir::new().expect("tempdir");
        init_at(home.path()).expect("init");
        let mode = std::fs::metadata(config_path_at(home.path()))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
