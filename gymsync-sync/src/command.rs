//! Argument vectors for the four bridge commands.
//!
//! Arguments are built field by field; nothing is ever split on whitespace.

use gymsync_core::SyncConfig;

/// `devices`
pub fn list_devices() -> Vec<String> {
    vec!["devices".to_owned()]
}

/// `-s <id> shell ls <remote_directory>`
pub fn list_remote_directory(config: &SyncConfig) -> Vec<String> {
    let mut args = on_device(config);
    args.extend(["shell".to_owned(), "ls".to_owned(), config.remote_directory.clone()]);
    args
}

/// `-s <id> pull <remote_directory><remote_file_name> <local_directory>`
pub fn pull(config: &SyncConfig) -> Vec<String> {
    let mut args = on_device(config);
    args.extend([
        "pull".to_owned(),
        config.remote_path(),
        config.local_directory.to_string_lossy().into_owned(),
    ]);
    args
}

/// `-s <id> shell rm <remote_directory><remote_file_name>`
pub fn remove_remote(config: &SyncConfig) -> Vec<String> {
    let mut args = on_device(config);
    args.extend(["shell".to_owned(), "rm".to_owned(), config.remote_path()]);
    args
}

fn on_device(config: &SyncConfig) -> Vec<String> {
    vec!["-s".to_owned(), config.device_id.clone()]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn config() -> SyncConfig {
        SyncConfig {
            local_directory: PathBuf::from("/home/me/gym records"),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn devices_command() {
        assert_eq!(list_devices(), ["devices"]);
    }

    #[test]
    fn listing_command_targets_the_device() {
        assert_eq!(
            list_remote_directory(&config()),
            ["-s", "R3CR702TVAH", "shell", "ls", "/sdcard/Documents/"]
        );
    }

    #[test]
    fn pull_keeps_paths_with_spaces_as_one_argument() {
        assert_eq!(
            pull(&config()),
            [
                "-s",
                "R3CR702TVAH",
                "pull",
                "/sdcard/Documents/Gym.txt",
                "/home/me/gym records"
            ]
        );
    }

    #[test]
    fn remove_command() {
        assert_eq!(
            remove_remote(&config()),
            ["-s", "R3CR702TVAH", "shell", "rm", "/sdcard/Documents/Gym.txt"]
        );
    }
}
