//! Device and remote-file locators.
//!
//! Both scan bridge output for a plain substring of the configured value and
//! stop at the first matching line.

use gymsync_core::SyncConfig;

use crate::bridge::{Bridge, CommandResult};
use crate::command;
use crate::error::InvocationError;
use crate::sink::LogSink;

/// Result of looking for a device or a remote file.
///
/// `NotFound` means the bridge ran and answered; `InvocationFailed` means no
/// trustworthy answer was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Found,
    NotFound,
    InvocationFailed,
}

impl Presence {
    pub fn is_found(self) -> bool {
        self == Presence::Found
    }

    /// A match wins over a failing exit code; otherwise a failing exit code
    /// means the listing cannot be trusted.
    fn from_listing(result: Result<CommandResult, InvocationError>, needle: &str) -> Self {
        match result {
            Ok(result) if result.any_line_contains(needle) => Presence::Found,
            Ok(result) if result.success() => Presence::NotFound,
            Ok(_) | Err(_) => Presence::InvocationFailed,
        }
    }
}

/// Look for `config.device_id` in `<bridge> devices`.
pub fn device_presence(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> Presence {
    let result = bridge.run(&command::list_devices(), log);
    if let Err(err) = &result {
        log.error(&format!("Device check failed: {err}"));
    }
    let presence = Presence::from_listing(result, &config.device_id);
    tracing::debug!(device = %config.device_id, ?presence, "device check");
    presence
}

/// Look for `config.remote_file_name` in `<bridge> -s <id> shell ls <dir>`.
pub fn remote_file_presence(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> Presence {
    let result = bridge.run(&command::list_remote_directory(config), log);
    if let Err(err) = &result {
        log.error(&format!("Remote file check failed: {err}"));
    }
    let presence = Presence::from_listing(result, &config.remote_file_name);
    tracing::debug!(file = %config.remote_path(), ?presence, "remote file check");
    presence
}

/// Boolean form of [`device_presence`]: a failed invocation reads as absent.
pub fn device_is_present(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> bool {
    device_presence(config, bridge, log).is_found()
}

/// Boolean form of [`remote_file_presence`]: a failed invocation reads as absent.
pub fn remote_file_exists(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> bool {
    remote_file_presence(config, bridge, log).is_found()
}

/// One row of `adb devices` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedDevice {
    pub serial: String,
    /// `device`, `offline`, `unauthorized`, …
    pub state: String,
}

/// Parse `adb devices` output, skipping the header and daemon chatter.
pub fn parse_device_list(lines: &[String]) -> Vec<AttachedDevice> {
    lines
        .iter()
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(AttachedDevice {
                serial: serial.to_owned(),
                state: state.to_owned(),
            })
        })
        .collect()
}

/// Run `<bridge> devices` and parse the result.
pub fn list_devices(
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> Result<Vec<AttachedDevice>, InvocationError> {
    let result = bridge.run(&command::list_devices(), log)?;
    Ok(parse_device_list(&result.output_lines))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
