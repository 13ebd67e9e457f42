//! Terminal sinks for the sync session.

use colored::Colorize;

use gymsync_sync::{LogLevel, LogSink, Milestone, ProgressSink};

/// Prints log lines: bridge output dimmed, errors red on stderr.
#[derive(Debug, Default)]
pub struct TerminalLog {
    errors: usize,
}

impl TerminalLog {
    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl LogSink for TerminalLog {
    fn accept(&mut self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Output => println!("  {}", line.dimmed()),
            LogLevel::Info => println!("{line}"),
            LogLevel::Error => {
                self.errors += 1;
                eprintln!("{}", line.red());
            }
        }
    }
}

/// Only errors reach the terminal; bridge chatter is dropped.
#[derive(Debug, Default)]
pub struct ErrorsOnly;

impl LogSink for ErrorsOnly {
    fn accept(&mut self, level: LogLevel, line: &str) {
        if level == LogLevel::Error {
            eprintln!("{}", line.red());
        }
    }
}

/// Prints each milestone as `[ 25%] device found`.
#[derive(Debug, Default)]
pub struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn accept(&mut self, milestone: Milestone) {
        println!("{}", format!("[{milestone}]").cyan());
    }
}
