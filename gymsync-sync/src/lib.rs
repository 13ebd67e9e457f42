//! # gymsync-sync
//!
//! Device-bridge invoker and the device-sync workflow.
//!
//! Build a [`SyncSession`] from a validated [`gymsync_core::SyncConfig`], a
//! [`Bridge`], and the log/progress sinks, then call [`SyncSession::run`].
//! Each step is also callable on its own:
//! [`locate::device_presence`] → [`locate::remote_file_presence`] →
//! [`pull::pull`] → [`rotate::rotate`] → [`clean::delete_remote`].

pub mod bridge;
pub mod clean;
pub mod command;
pub mod error;
pub mod locate;
pub mod pull;
pub mod rotate;
pub mod session;
pub mod sink;

pub use bridge::{Bridge, CancelToken, CommandResult, ProcessBridge};
pub use error::{InvocationError, PullError, RemoteDeleteError, RenameError};
pub use locate::Presence;
pub use rotate::{BackupFile, CreationDates, FsCreationDates, RotationOutcome};
pub use session::{FailReason, SyncReport, SyncSession, SyncState};
pub use sink::{LogLevel, LogSink, Milestone, ProgressSink};
