//! The sync configuration value.
//!
//! A [`SyncConfig`] is built once at startup (defaults, then the config file,
//! then command-line overrides), validated, and passed by reference into every
//! component. Nothing reads configuration from process-wide state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Literal file-name prefix of dated backups: `gymRecords 2024-03-05.txt`.
pub const BACKUP_PREFIX: &str = "gymRecords";

pub const DEFAULT_DEVICE_ID: &str = "R3CR702TVAH";
pub const DEFAULT_REMOTE_FILE_NAME: &str = "Gym.txt";
pub const DEFAULT_REMOTE_DIRECTORY: &str = "/sdcard/Documents/";
pub const DEFAULT_LOCAL_CANONICAL_NAME: &str = "gymRecords.txt";
pub const DEFAULT_BRIDGE: &str = "adb";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Everything the sync workflow and the graph server need to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Serial of the device as printed by `adb devices`.
    pub device_id: String,
    /// Name of the file to fetch from the device.
    pub remote_file_name: String,
    /// Directory on the device holding the file. Always ends in `/`.
    pub remote_directory: String,
    /// Local directory receiving the pulled file and its backups.
    pub local_directory: PathBuf,
    /// Stable local name that always holds the latest data.
    pub local_canonical_name: String,
    /// Bridge program, looked up on `PATH` when not absolute.
    pub bridge: PathBuf,
    pub http_port: u16,
    /// Root served over HTTP; defaults to `local_directory`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serve_root: Option<PathBuf>,
    /// Kill bridge commands that run longer than this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID.to_owned(),
            remote_file_name: DEFAULT_REMOTE_FILE_NAME.to_owned(),
            remote_directory: DEFAULT_REMOTE_DIRECTORY.to_owned(),
            local_directory: default_local_directory(),
            local_canonical_name: DEFAULT_LOCAL_CANONICAL_NAME.to_owned(),
            bridge: PathBuf::from(DEFAULT_BRIDGE),
            http_port: DEFAULT_HTTP_PORT,
            serve_root: None,
            command_timeout_secs: None,
        }
    }
}

impl SyncConfig {
    /// Check the invariants every component relies on.
    ///
    /// The five workflow fields must be non-empty, the remote directory must
    /// end in `/`, and the two file names must be bare names (no separators).
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("device_id", &self.device_id)?;
        non_empty("remote_file_name", &self.remote_file_name)?;
        non_empty("remote_directory", &self.remote_directory)?;
        non_empty("local_canonical_name", &self.local_canonical_name)?;
        non_empty("bridge", &self.bridge.to_string_lossy())?;
        if self.local_directory.as_os_str().is_empty() {
            return Err(invalid("local_directory", "must not be empty"));
        }
        if !self.remote_directory.ends_with('/') {
            return Err(invalid(
                "remote_directory",
                format!("'{}' must end with '/'", self.remote_directory),
            ));
        }
        bare_name("remote_file_name", &self.remote_file_name)?;
        bare_name("local_canonical_name", &self.local_canonical_name)?;
        if self.remote_file_name == self.local_canonical_name {
            return Err(invalid(
                "local_canonical_name",
                "must differ from remote_file_name",
            ));
        }
        if self.http_port == 0 {
            return Err(invalid("http_port", "must be non-zero"));
        }
        Ok(())
    }

    /// `<remote_directory><remote_file_name>` as the device sees it.
    pub fn remote_path(&self) -> String {
        format!("{}{}", self.remote_directory, self.remote_file_name)
    }

    /// Where `adb pull` drops the file: `<local_directory>/<remote_file_name>`.
    pub fn pulled_path(&self) -> PathBuf {
        self.local_directory.join(&self.remote_file_name)
    }

    /// `<local_directory>/<local_canonical_name>`.
    pub fn canonical_path(&self) -> PathBuf {
        self.local_directory.join(&self.local_canonical_name)
    }

    pub fn serve_root(&self) -> &Path {
        self.serve_root.as_deref().unwrap_or(&self.local_directory)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(windows)]
fn default_local_directory() -> PathBuf {
    PathBuf::from("D:/Projects/gymRecords/")
}

#[cfg(not(windows))]
fn default_local_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("gymRecords"))
        .unwrap_or_else(|| PathBuf::from("gymRecords"))
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn bare_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains('/') || value.contains('\\') {
        return Err(invalid(
            field,
            format!("'{value}' must be a file name, not a path"),
        ));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> SyncConfig {
        SyncConfig {
            local_directory: PathBuf::from("/data/gymRecords"),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn defaults_match_the_built_in_constants() {
        let c = SyncConfig::default();
        assert_eq!(c.device_id, "R3CR702TVAH");
        assert_eq!(c.remote_file_name, "Gym.txt");
        assert_eq!(c.remote_directory, "/sdcard/Documents/");
        assert_eq!(c.local_canonical_name, "gymRecords.txt");
        assert_eq!(c.bridge, PathBuf::from("adb"));
        assert_eq!(c.http_port, 8080);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn derived_paths() {
        let c = config();
        assert_eq!(c.remote_path(), "/sdcard/Documents/Gym.txt");
        assert_eq!(c.pulled_path(), PathBuf::from("/data/gymRecords/Gym.txt"));
        assert_eq!(
            c.canonical_path(),
            PathBuf::from("/data/gymRecords/gymRecords.txt")
        );
        assert_eq!(c.serve_root(), Path::new("/data/gymRecords"));
    }

    #[test]
    fn serve_root_override_wins() {
        let c = SyncConfig {
            serve_root: Some(PathBuf::from("/srv/graph")),
            ..config()
        };
        assert_eq!(c.serve_root(), Path::new("/srv/graph"));
    }

    #[rstest]
    #[case::device(SyncConfig { device_id: String::new(), ..config() }, "device_id")]
    #[case::file(SyncConfig { remote_file_name: " ".into(), ..config() }, "remote_file_name")]
    #[case::dir(SyncConfig { remote_directory: String::new(), ..config() }, "remote_directory")]
    #[case::slash(SyncConfig { remote_directory: "/sdcard/Documents".into(), ..config() }, "remote_directory")]
    #[case::local(SyncConfig { local_directory: PathBuf::new(), ..config() }, "local_directory")]
    #[case::canonical(SyncConfig { local_canonical_name: "a/b.txt".into(), ..config() }, "local_canonical_name")]
    #[case::same_name(SyncConfig { local_canonical_name: "Gym.txt".into(), ..config() }, "local_canonical_name")]
    #[case::port(SyncConfig { http_port: 0, ..config() }, "http_port")]
    fn invalid_configs_name_the_field(#[case] c: SyncConfig, #[case] expected: &str) {
        match c.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected Invalid({expected}), got {other:?}"),
        }
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let c: SyncConfig = serde_yaml::from_str("device_id: ABC123\nhttp_port: 9000\n").unwrap();
        assert_eq!(c.device_id, "ABC123");
        assert_eq!(c.http_port, 9000);
        assert_eq!(c.remote_file_name, "Gym.txt");
        assert!(c.command_timeout().is_none());
    }

    #[test]
    fn timeout_converts_to_duration() {
        let c = SyncConfig {
            command_timeout_secs: Some(30),
            ..config()
        };
        assert_eq!(c.command_timeout(), Some(Duration::from_secs(30)));
    }
}
