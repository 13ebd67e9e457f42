//! File puller.

use gymsync_core::SyncConfig;

use crate::bridge::Bridge;
use crate::command;
use crate::error::PullError;
use crate::sink::LogSink;

/// Copy the remote file into `config.local_directory`.
///
/// Every line `adb pull` prints reaches `log` in order through the bridge.
/// `File transfer complete.` is logged only when the exit code is 0.
pub fn pull(
    config: &SyncConfig,
    bridge: &mut dyn Bridge,
    log: &mut dyn LogSink,
) -> Result<(), PullError> {
    log.info(">>> Initiating file transfer.");
    let result = bridge.run(&command::pull(config), log)?;
    if !result.success() {
        return Err(PullError::ExitStatus(result.exit_code));
    }
    tracing::info!(
        from = %config.remote_path(),
        to = %config.local_directory.display(),
        "file pulled"
    );
    log.info("File transfer complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationError;
    use crate::testing::ScriptedBridge;
    use crate::LogLevel;

    #[test]
    fn streams_output_and_reports_completion() {
        let config = SyncConfig::default();
        let mut bridge = ScriptedBridge::new().reply(
            &["[ 50%] /sdcard/Documents/Gym.txt", "[100%] /sdcard/Documents/Gym.txt", "1 file pulled"],
            0,
        );
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        pull(&config, &mut bridge, &mut log).expect("pull");

        let lines: Vec<&str> = log.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            lines,
            [
                ">>> Initiating file transfer.",
                "[ 50%] /sdcard/Documents/Gym.txt",
                "[100%] /sdcard/Documents/Gym.txt",
                "1 file pulled",
                "File transfer complete.",
            ]
        );
        assert_eq!(bridge.calls[0][2], "pull");
    }

    #[test]
    fn non_zero_exit_fails_without_completion_line() {
        let config = SyncConfig::default();
        let mut bridge = ScriptedBridge::new().reply(&["adb: error: remote object does not exist"], 1);
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        let err = pull(&config, &mut bridge, &mut log).unwrap_err();
        assert!(matches!(err, PullError::ExitStatus(1)));
        assert!(!log.iter().any(|(_, l)| l == "File transfer complete."));
    }

    #[test]
    fn invocation_failure_propagates() {
        let config = SyncConfig::default();
        let mut bridge = ScriptedBridge::new().fail(InvocationError::Interrupted);
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        let err = pull(&config, &mut bridge, &mut log).unwrap_err();
        assert!(matches!(err, PullError::Invocation(InvocationError::Interrupted)));
        assert_eq!(log, [(LogLevel::Info, ">>> Initiating file transfer.".to_owned())]);
    }
}
