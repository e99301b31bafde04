//! Operator-facing progress reporting

use crate::types::LogLevel;
use std::sync::Mutex;

/// Sink for the steps and messages of a run
pub trait ProgressReporter: Send + Sync {
    /// Report a message at `level`
    fn log(&self, level: LogLevel, message: &str);

    /// Start a new step of the run
    fn step(&self, message: &str) {
        self.log(LogLevel::Info, &format!("== {message}"));
    }

    /// Report progress
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Report a non-fatal problem
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Report a failure
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards every message to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }

    fn step(&self, message: &str) {
        tracing::info!(step = true, "{message}");
    }
}

/// Keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Messages reported at `level`
    pub fn at_level(&self, level: LogLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl ProgressReporter for MemoryReporter {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}
