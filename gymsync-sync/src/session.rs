//! Sync orchestrator.
//!
//! ```text
//! Idle → CheckingDevice → CheckingFile → Transferring → Rotating → CleaningRemote → Done
//!              │                │
//!              └────────────────┴──→ Failed(reason)
//! ```
//!
//! Only the two gates can fail the session. Once past them every later state
//! is entered in order and the session ends in `Done`; step failures are
//! logged and recorded in the [`SyncReport`]. When the pull fails, the
//! rotate and cleanup actions are skipped so neither the canonical file nor
//! the only remote copy is lost.

use std::fmt;

use gymsync_core::SyncConfig;

use crate::bridge::Bridge;
use crate::clean;
use crate::locate::{self, Presence};
use crate::pull;
use crate::rotate::{self, CreationDates, RotationOutcome};
use crate::sink::{LogSink, Milestone, ProgressSink};

/// Which gate a bridge failure happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Device,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    DeviceNotFound,
    FileNotFound,
    /// The bridge gave no usable answer at a gate.
    BridgeFailed(Check),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::DeviceNotFound => write!(f, "device not found"),
            FailReason::FileNotFound => write!(f, "file not found"),
            FailReason::BridgeFailed(Check::Device) => {
                write!(f, "bridge failed while looking for the device")
            }
            FailReason::BridgeFailed(Check::File) => {
                write!(f, "bridge failed while looking for the file")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    CheckingDevice,
    CheckingFile,
    Transferring,
    Rotating,
    CleaningRemote,
    Done,
    Failed(FailReason),
}

impl SyncState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncState::Done | SyncState::Failed(_))
    }
}

/// What a finished session did.
#[derive(Debug)]
pub struct SyncReport {
    /// `Done` or `Failed(_)`.
    pub state: SyncState,
    pub transferred: bool,
    /// `None` when rotation was not attempted.
    pub rotation: Option<RotationOutcome>,
    pub remote_deleted: bool,
    /// Last milestone sent to the progress sink.
    pub milestone: Option<Milestone>,
}

impl SyncReport {
    fn new() -> Self {
        Self {
            state: SyncState::Idle,
            transferred: false,
            rotation: None,
            remote_deleted: false,
            milestone: None,
        }
    }

    /// Every step succeeded, apart from the possibly absent previous file.
    pub fn is_complete(&self) -> bool {
        self.state == SyncState::Done
            && self.transferred
            && self.rotation.as_ref().is_some_and(RotationOutcome::promoted)
            && self.remote_deleted
    }

    pub fn failure(&self) -> Option<FailReason> {
        match self.state {
            SyncState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// One run of the device-sync workflow.
pub struct SyncSession<'a, B, D, L, P> {
    config: &'a SyncConfig,
    bridge: B,
    dates: D,
    log: L,
    progress: P,
    report: SyncReport,
}

impl<'a, B, D, L, P> SyncSession<'a, B, D, L, P>
where
    B: Bridge,
    D: CreationDates,
    L: LogSink,
    P: ProgressSink,
{
    pub fn new(config: &'a SyncConfig, bridge: B, dates: D, log: L, progress: P) -> Self {
        Self {
            config,
            bridge,
            dates,
            log,
            progress,
            report: SyncReport::new(),
        }
    }

    /// Drive the state machine to a terminal state.
    pub fn run(mut self) -> SyncReport {
        let mut state = SyncState::Idle;
        while !state.is_terminal() {
            let next = self.step(state);
            tracing::debug!(from = ?state, to = ?next, "sync transition");
            state = next;
        }
        if let SyncState::Failed(reason) = state {
            tracing::warn!(%reason, "sync aborted");
        }
        self.report.state = state;
        self.report
    }

    /// Perform the work of `state` and return the state that follows it.
    pub fn step(&mut self, state: SyncState) -> SyncState {
        match state {
            SyncState::Idle => {
                self.log.info(&format!(
                    "Looking for file: {} on source device: {}...",
                    self.config.remote_file_name, self.config.device_id
                ));
                self.milestone(Milestone::Started);
                SyncState::CheckingDevice
            }
            SyncState::CheckingDevice => {
                match locate::device_presence(self.config, &mut self.bridge, &mut self.log) {
                    Presence::Found => {
                        self.log.info("Device has been found...");
                        self.milestone(Milestone::DeviceFound);
                        SyncState::CheckingFile
                    }
                    Presence::NotFound => self.fail(FailReason::DeviceNotFound),
                    Presence::InvocationFailed => self.fail(FailReason::BridgeFailed(Check::Device)),
                }
            }
            SyncState::CheckingFile => {
                match locate::remote_file_presence(self.config, &mut self.bridge, &mut self.log) {
                    Presence::Found => {
                        self.log.info("File has been found...");
                        self.milestone(Milestone::FileFound);
                        SyncState::Transferring
                    }
                    Presence::NotFound => self.fail(FailReason::FileNotFound),
                    Presence::InvocationFailed => self.fail(FailReason::BridgeFailed(Check::File)),
                }
            }
            SyncState::Transferring => {
                match pull::pull(self.config, &mut self.bridge, &mut self.log) {
                    Ok(()) => {
                        self.report.transferred = true;
                        self.milestone(Milestone::Transferred);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "pull failed");
                        self.log.error(&format!("Error: {err}"));
                    }
                }
                SyncState::Rotating
            }
            SyncState::Rotating => {
                if self.report.transferred {
                    let outcome = rotate::rotate(self.config, &self.dates, &mut self.log);
                    self.report.rotation = Some(outcome);
                } else {
                    self.log
                        .error("Skipping backup rotation: the transfer did not complete.");
                }
                SyncState::CleaningRemote
            }
            SyncState::CleaningRemote => {
                if self.report.transferred {
                    match clean::delete_remote(self.config, &mut self.bridge, &mut self.log) {
                        Ok(()) => self.report.remote_deleted = true,
                        Err(err) => {
                            tracing::warn!(error = %err, "remote delete failed");
                            self.log.error(&format!("Error: {err}"));
                        }
                    }
                    self.milestone(Milestone::Finished);
                } else {
                    self.log
                        .error("Keeping the remote file: the transfer did not complete.");
                }
                SyncState::Done
            }
            terminal @ (SyncState::Done | SyncState::Failed(_)) => terminal,
        }
    }

    fn fail(&mut self, reason: FailReason) -> SyncState {
        self.log.error(&format!("Error: {reason}!"));
        SyncState::Failed(reason)
    }

    fn milestone(&mut self, milestone: Milestone) {
        self.progress.accept(milestone);
        self.report.milestone = Some(milestone);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
