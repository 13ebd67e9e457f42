//! External bridge invoker.
//!
//! [`ProcessBridge`] runs `<bridge> <args…>`, forwards every stdout line to
//! the log sink as it arrives, and blocks until the child exits. Two reader
//! threads feed one channel so the sink is only touched from the calling
//! thread, and stdout order is preserved exactly.
//!
//! A non-zero exit is not an error: it is logged and returned in
//! [`CommandResult::exit_code`] for the caller to interpret.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gymsync_core::SyncConfig;

use crate::error::InvocationError;
use crate::sink::{LogLevel, LogSink};

/// Cooperative cancellation signal shared between the caller and the invoker.
///
/// Once cancelled it stays cancelled: every later invocation refuses to start.
pub type CancelToken = tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// Process exit code; `-1` when the child was killed by a signal.
    pub exit_code: i32,
    /// Stdout lines in emission order, without line terminators.
    pub output_lines: Vec<String>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether any output line contains `needle`. Stops at the first match.
    pub fn any_line_contains(&self, needle: &str) -> bool {
        self.output_lines.iter().any(|line| line.contains(needle))
    }
}

/// Runs bridge commands. Implemented by [`ProcessBridge`] and by test doubles.
pub trait Bridge {
    fn run(
        &mut self,
        args: &[String],
        log: &mut dyn LogSink,
    ) -> Result<CommandResult, InvocationError>;
}

impl<T: Bridge + ?Sized> Bridge for &mut T {
    fn run(
        &mut self,
        args: &[String],
        log: &mut dyn LogSink,
    ) -> Result<CommandResult, InvocationError> {
        (**self).run(args, log)
    }
}

/// Spawns the real bridge program.
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    program: PathBuf,
    cancel: CancelToken,
    timeout: Option<Duration>,
}

impl ProcessBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cancel: CancelToken::new(),
            timeout: None,
        }
    }

    /// Bridge program and timeout taken from `config`.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(&config.bridge).with_timeout(config.command_timeout())
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Forward lines until both pipes close.
    fn drain(
        &self,
        rx: &Receiver<StreamLine>,
        started: Instant,
        stdout_lines: &mut Vec<String>,
        log: &mut dyn LogSink,
    ) -> Result<(), InvocationError> {
        loop {
            self.check_interrupt(started)?;
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(StreamLine::Stdout(line)) => {
                    log.accept(LogLevel::Output, &line);
                    stdout_lines.push(line);
                }
                Ok(StreamLine::Stderr(line)) => log.accept(LogLevel::Error, &line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    fn wait(&self, child: &mut Child, started: Instant) -> Result<ExitStatus, InvocationError> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            self.check_interrupt(started)?;
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn check_interrupt(&self, started: Instant) -> Result<(), InvocationError> {
        if self.cancel.is_cancelled() {
            return Err(InvocationError::Interrupted);
        }
        match self.timeout {
            Some(after) if started.elapsed() >= after => Err(InvocationError::TimedOut { after }),
            _ => Ok(()),
        }
    }
}

impl Bridge for ProcessBridge {
    fn run(
        &mut self,
        args: &[String],
        log: &mut dyn LogSink,
    ) -> Result<CommandResult, InvocationError> {
        if self.cancel.is_cancelled() {
            return Err(InvocationError::Interrupted);
        }

        let command_line = self.command_line(args);
        tracing::debug!(command = %command_line, "running bridge command");

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InvocationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, tx.clone(), StreamLine::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, tx.clone(), StreamLine::Stderr));
        }
        drop(tx);

        let started = Instant::now();
        let mut output_lines = Vec::new();
        let status = self
            .drain(&rx, started, &mut output_lines, log)
            .and_then(|()| self.wait(&mut child, started));

        let status = match status {
            Ok(status) => status,
            Err(err) => {
                // Reader threads finish on their own once the pipes close.
                let _ = child.kill();
                let _ = child.wait();
                if matches!(err, InvocationError::Interrupted) {
                    self.cancel.cancel();
                }
                tracing::warn!(command = %command_line, error = %err, "bridge command aborted");
                return Err(err);
            }
        };

        for reader in readers {
            match reader.join() {
                Ok(result) => result?,
                Err(_) => {
                    return Err(InvocationError::Io(std::io::Error::other(
                        "bridge output reader panicked",
                    )))
                }
            }
        }

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            tracing::warn!(command = %command_line, exit_code, "bridge command failed");
            log.error(&format!(
                "Process terminated with non-zero exit code: {exit_code}"
            ));
        } else {
            tracing::debug!(command = %command_line, lines = output_lines.len(), "bridge command finished");
        }

        Ok(CommandResult {
            exit_code,
            output_lines,
        })
    }
}

enum StreamLine {
    Stdout(String),
    Stderr(String),
}

fn spawn_reader<R>(
    stream: R,
    tx: Sender<StreamLine>,
    wrap: fn(String) -> StreamLine,
) -> JoinHandle<std::io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            if tx.send(wrap(line)).is_err() {
                // Receiver gone: the invocation was aborted.
                return Ok(());
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
