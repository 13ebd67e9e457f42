use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gymsync(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gymsync").expect("gymsync binary");
    cmd.env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_bridge_program_fails_at_device_check() {
    let home = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();

    gymsync(&home)
        .arg("sync")
        .arg("--bridge")
        .arg(home.path().join("no-such-adb"))
        .arg("--local-dir")
        .arg(local.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("0% started"))
        .stderr(predicate::str::contains(
            "bridge failed while looking for the device",
        ));
}

#[test]
fn empty_device_id_is_rejected_before_running_anything() {
    let home = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();

    gymsync(&home)
        .args(["sync", "--device", ""])
        .arg("--local-dir")
        .arg(local.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[cfg(unix)]
mod with_fake_adb {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use super::*;

    /// Mirrors `write_fake_adb` in gymsync-sync/tests/workflow.rs; keep the
    /// two in step. Adds the serial parameter and `FAKE_ADB_PULL_NOTHING`,
    /// which makes `pull` exit 0 without copying anything.
    fn write_fake_adb(dir: &Path, device_dir: &Path, serial: &str) -> PathBuf {
        let script = format!(
            r#"#!/bin/sh
DEVICE_DIR='{device}'
case "$1" in
  devices) printf 'List of devices attached\n{serial}\tdevice\n' ;;
  -s)
    shift 2
    case "$1 $2" in
      "shell ls") ls "$DEVICE_DIR" ;;
      "shell rm") rm "$DEVICE_DIR/$(basename "$3")" ;;
      pull*)
        [ -n "$FAKE_ADB_PULL_NOTHING" ] && exit 0
        cp "$DEVICE_DIR/$(basename "$2")" "$3/" || exit 1
        echo "$2: 1 file pulled, 0 skipped."
        ;;
      *) exit 2 ;;
    esac
    ;;
  *) exit 2 ;;
esac
"#,
            device = device_dir.display(),
        );
        let path = dir.join("fake-adb");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn sync_pulls_promotes_and_cleans_device() {
        let home = TempDir::new().unwrap();
        let device = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(device.path().join("Gym.txt"), "squat 100kg\n").unwrap();
        let adb = write_fake_adb(home.path(), device.path(), "R3CR702TVAH");

        gymsync(&home)
            .arg("sync")
            .arg("--bridge")
            .arg(&adb)
            .arg("--local-dir")
            .arg(local.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(">>> Initiating file transfer."))
            .stdout(predicate::str::contains("100% rotation and cleanup done"))
            .stdout(predicate::str::contains("Sync complete."));

        assert_eq!(
            fs::read_to_string(local.path().join("gymRecords.txt")).unwrap(),
            "squat 100kg\n"
        );
        assert!(!device.path().join("Gym.txt").exists());
    }

    #[test]
    fn sync_with_unlisted_device_reports_device_not_found() {
        let home = TempDir::new().unwrap();
        let device = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(device.path().join("Gym.txt"), "x").unwrap();
        let adb = write_fake_adb(home.path(), device.path(), "SOMEOTHER");

        gymsync(&home)
            .arg("sync")
            .arg("--bridge")
            .arg(&adb)
            .arg("--local-dir")
            .arg(local.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("sync failed: device not found"));

        assert!(device.path().join("Gym.txt").exists());
        assert_eq!(fs::read_dir(local.path()).unwrap().count(), 0);
    }

    #[test]
    fn devices_lists_attached_serials() {
        let home = TempDir::new().unwrap();
        let device = TempDir::new().unwrap();
        let adb = write_fake_adb(home.path(), device.path(), "R3CR702TVAH");

        gymsync(&home)
            .arg("devices")
            .arg("--bridge")
            .arg(&adb)
            .assert()
            .success()
            .stdout(predicate::str::contains("R3CR702TVAH"))
            .stdout(predicate::str::contains("device"));
    }

    #[test]
    fn sync_fails_when_the_pulled_file_never_reaches_the_canonical_name() {
        let home = TempDir::new().unwrap();
        let device = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(device.path().join("Gym.txt"), "x").unwrap();
        let adb = write_fake_adb(home.path(), device.path(), "R3CR702TVAH");

        gymsync(&home)
            .env("FAKE_ADB_PULL_NOTHING", "1")
            .arg("sync")
            .arg("--bridge")
            .arg(&adb)
            .arg("--local-dir")
            .arg(local.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("gymRecords.txt was not written"));

        assert!(!local.path().join("gymRecords.txt").exists());
    }
}
