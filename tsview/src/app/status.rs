use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// The most recent transient message shown in the status bar.
#[derive(Debug)]
pub struct StatusBar {
    message: Option<(StatusLevel, String, Instant)>,
    timeout: Duration,
}

impl StatusBar {
    pub fn new(timeout: Duration) -> Self {
        Self {
            message: None,
            timeout,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(StatusLevel::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(StatusLevel::Error, text.into());
    }

    fn set(&mut self, level: StatusLevel, text: String) {
        self.message = Some((level, text, Instant::now()));
    }

    pub fn current(&self) -> Option<(StatusLevel, &str)> {
        self.current_at(Instant::now())
    }

    fn current_at(&self, now: Instant) -> Option<(StatusLevel, &str)> {
        self.message
            .as_ref()
            .filter(|(_, _, since)| now.saturating_duration_since(*since) < self.timeout)
            .map(|(level, text, _)| (*level, text.as_str()))
    }
}
