//! Remote cleaner.

use gymsync_core::SyncConfig;

use crate::bridge::Bridge;
use crate::command;
use crate::error::RemoteDeleteError;
use crate::sink::LogSink;

/// Delete `<remote_directory><remote_file_name>` from the device.
pub fn delete_remote(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> Result<(), RemoteDeleteError> {
    let result = bridge.run(&command::remove_remote(config), log)?;
    if !result.success() {
        return Err(RemoteDeleteError::ExitStatus(result.exit_code));
    }
    tracing::info!(file = %config.remote_path(), "remote file removed");
    log.info(&format!(
        "+++ Android file removed successfully: {}",
        config.remote_file_name
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBridge;
    use crate::LogLevel;

    #[test]
    fn exit_zero_is_success() {
        let config = SyncConfig::default();
        let mut bridge = ScriptedBridge::new().reply(&[], 0);
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        delete_remote(&config, &mut bridge, &mut log).expect("delete");
        assert_eq!(
            bridge.calls,
            [["-s", "R3CR702TVAH", "shell", "rm", "/sdcard/Documents/Gym.txt"]]
        );
        assert!(log.iter().any(|(_, l)| l.contains("removed successfully: Gym.txt")));
    }

    #[test]
    fn non_zero_exit_is_a_delete_error() {
        let config = SyncConfig::default();
        let mut bridge = ScriptedBridge::new().reply(&["rm: /sdcard/Documents/Gym.txt: No such file or directory"], 1);
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        let err = delete_remote(&config, &mut bridge, &mut log).unwrap_err();
        assert!(matches!(err, RemoteDeleteError::ExitStatus(1)));
        assert!(!log.iter().any(|(_, l)| l.contains("removed successfully")));
    }
}
