//! Log and progress sinks.
//!
//! Sinks are handed to the components that report through them and are only
//! ever called from the orchestration thread, so they need no locking.

use std::fmt;

/// Channel a log line travels on. Errors are told apart by level, never by text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// A raw stdout line from the bridge program.
    Output,
    Info,
    Error,
}

pub trait LogSink {
    fn accept(&mut self, level: LogLevel, line: &str);

    fn info(&mut self, line: &str) {
        self.accept(LogLevel::Info, line);
    }

    fn error(&mut self, line: &str) {
        self.accept(LogLevel::Error, line);
    }
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    fn accept(&mut self, level: LogLevel, line: &str) {
        (**self).accept(level, line);
    }
}

/// Collects every line in order.
impl LogSink for Vec<(LogLevel, String)> {
    fn accept(&mut self, level: LogLevel, line: &str) {
        self.push((level, line.to_owned()));
    }
}

/// Progress points reported while a sync runs. Values never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Milestone {
    Started,
    DeviceFound,
    FileFound,
    Transferred,
    Finished,
}

impl Milestone {
    pub fn percent(self) -> u8 {
        match self {
            Milestone::Started => 0,
            Milestone::DeviceFound => 25,
            Milestone::FileFound => 50,
            Milestone::Transferred => 75,
            Milestone::Finished => 100,
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Milestone::Started => "started",
            Milestone::DeviceFound => "device found",
            Milestone::FileFound => "file found",
            Milestone::Transferred => "transfer done",
            Milestone::Finished => "rotation and cleanup done",
        };
        write!(f, "{:>3}% {name}", self.percent())
    }
}

pub trait ProgressSink {
    fn accept(&mut self, milestone: Milestone);
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn accept(&mut self, milestone: Milestone) {
        (**self).accept(milestone);
    }
}

impl ProgressSink for Vec<Milestone> {
    fn accept(&mut self, milestone: Milestone) {
        self.push(milestone);
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl LogSink for Discard {
    fn accept(&mut self, _level: LogLevel, _line: &str) {}
}

impl ProgressSink for Discard {
    fn accept(&mut self, _milestone: Milestone) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_are_ordered_by_percent() {
        let all = [
            Milestone::Started,
            Milestone::DeviceFound,
            Milestone::FileFound,
            Milestone::Transferred,
            Milestone::Finished,
        ];
        let percents: Vec<u8> = all.iter().map(|m| m.percent()).collect();
        assert_eq!(percents, vec![0, 25, 50, 75, 100]);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn milestone_display() {
        assert_eq!(Milestone::DeviceFound.to_string(), " 25% device found");
        assert_eq!(Milestone::Finished.to_string(), "100% rotation and cleanup done");
    }

    #[test]
    fn helper_methods_set_the_level() {
        let mut log: Vec<(LogLevel, String)> = Vec::new();
        log.info("hello");
        log.error("boom");
        assert_eq!(
            log,
            vec![
                (LogLevel::Info, "hello".to_owned()),
                (LogLevel::Error, "boom".to_owned())
            ]
        );
    }
}
