//! Error types for gymsync-sync.
//!
//! None of these escape the orchestrator: each step logs its error and turns
//! it into a status.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The bridge program could not be run to completion.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The program could not be started (missing binary, permission denied).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading output from or waiting on the child failed.
    #[error("I/O error while running bridge command: {0}")]
    Io(#[from] std::io::Error),

    /// The wait was cancelled; the child has been killed.
    #[error("bridge command was interrupted")]
    Interrupted,

    /// The configured timeout elapsed; the child has been killed.
    #[error("bridge command timed out after {after:?}")]
    TimedOut { after: Duration },
}

/// `adb pull` did not complete.
#[derive(Debug, Error)]
pub enum PullError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("file transfer failed with exit code: {0}")]
    ExitStatus(i32),
}

/// `adb shell rm` did not complete.
#[derive(Debug, Error)]
pub enum RemoteDeleteError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("failed to remove remote file with exit code: {0}")]
    ExitStatus(i32),
}

/// A local move-with-overwrite failed.
#[derive(Debug, Error)]
pub enum RenameError {
    /// The file to be moved does not exist.
    #[error("file not found: {path}")]
    MissingSource { path: PathBuf },

    /// The creation timestamp could not be read.
    #[error("cannot read timestamps of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
