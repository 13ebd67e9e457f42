//! Backup rotator.
//!
//! ## Two-step rename protocol
//!
//! 1. **Rotate-old** — move `<local>/<canonical>` to
//!    `<local>/gymRecords YYYY-MM-DD.txt`, dated by the file's creation time.
//! 2. **Promote-new** — move `<local>/<remote_file_name>` (the fresh pull) to
//!    `<local>/<canonical>`.
//!
//! Both steps always run; step 2 never looks at step 1's outcome. Both are
//! `std::fs::rename`, which replaces an existing destination on every
//! platform and is atomic within one file system.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use gymsync_core::{SyncConfig, BACKUP_PREFIX};

use crate::error::RenameError;
use crate::sink::LogSink;

/// Source of a file's creation date, as a local calendar date.
pub trait CreationDates {
    fn creation_date(&self, path: &Path) -> io::Result<NaiveDate>;
}

/// Reads file-system timestamps.
///
/// Uses the birth time where the platform records one and falls back to the
/// modification time otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCreationDates;

impl CreationDates for FsCreationDates {
    fn creation_date(&self, path: &Path) -> io::Result<NaiveDate> {
        let meta = fs::metadata(path)?;
        let time = match meta.created() {
            Ok(created) => created,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no birth time; using mtime");
                meta.modified()?
            }
        };
        Ok(DateTime::<Local>::from(time).date_naive())
    }
}

/// A rotated-away canonical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub creation_date: NaiveDate,
}

/// `gymRecords 2024-03-05.txt`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_PREFIX} {}.txt", date.format("%Y-%m-%d"))
}

/// Step 1: move the current canonical file to its dated backup name.
pub fn rotate_old(
    config: &SyncConfig,
    dates: &dyn CreationDates,
) -> Result<BackupFile, RenameError> {
    let canonical = config.canonical_path();
    if !canonical.exists() {
        return Err(RenameError::MissingSource { path: canonical });
    }
    let creation_date = dates
        .creation_date(&canonical)
        .map_err(|source| RenameError::Metadata {
            path: canonical.clone(),
            source,
        })?;
    let backup = config
        .local_directory
        .join(backup_file_name(creation_date));
    move_replacing(&canonical, &backup)?;
    Ok(BackupFile {
        path: backup,
        creation_date,
    })
}

/// Step 2: move the freshly pulled file onto the canonical name.
pub fn promote_new(config: &SyncConfig) -> Result<PathBuf, RenameError> {
    let pulled = config.pulled_path();
    if !pulled.exists() {
        return Err(RenameError::MissingSource { path: pulled });
    }
    let canonical = config.canonical_path();
    move_replacing(&pulled, &canonical)?;
    Ok(canonical)
}

/// Outcome of both rename steps.
#[derive(Debug)]
pub struct RotationOutcome {
    pub old: Result<BackupFile, RenameError>,
    pub new: Result<PathBuf, RenameError>,
}

impl RotationOutcome {
    /// The new file is in place. A missing previous file does not count
    /// against this.
    pub fn promoted(&self) -> bool {
        self.new.is_ok()
    }
}

/// Run rotate-old then promote-new, logging each outcome.
pub fn rotate(
    config: &SyncConfig,
    dates: &dyn CreationDates,
    log: &mut dyn LogSink,
) -> RotationOutcome {
    let old = rotate_old(config, dates);
    match &old {
        Ok(backup) => {
            tracing::info!(backup = %backup.path.display(), "previous file rotated");
            log.info(&format!(
                "+++ Old file renamed successfully: {}",
                display_name(&backup.path)
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "rotating previous file failed");
            log.error(&format!("Error while renaming the old file: {err}"));
        }
    }

    let new = promote_new(config);
    match &new {
        Ok(path) => {
            tracing::info!(path = %path.display(), "new file promoted");
            log.info(&format!(
                "+++ New file renamed successfully: {}",
                config.local_canonical_name
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "promoting new file failed");
            log.error(&format!("Error while renaming the new file: {err}"));
        }
    }

    RotationOutcome { old, new }
}

fn move_replacing(from: &Path, to: &Path) -> Result<(), RenameError> {
    fs::rename(from, to).map_err(|source| RenameError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
