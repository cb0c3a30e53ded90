// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable log output.
//!
//! [`PrettyLogger`] implements [`log::Log`] and writes one line per record to
//! a [`Write`] destination (default: stderr).

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes `[level target] message` lines to a [`Write`] destination.
pub struct PrettyLogger<W: Write + Send = Box<dyn Write + Send>> {
    writer: Mutex<W>,
    level: LevelFilter,
}

impl<W: Write + Send> std::fmt::Debug for PrettyLogger<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyLogger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl PrettyLogger {
    /// Creates a logger that writes to stderr.
    #[must_use]
    pub fn stderr(level: LevelFilter) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), level)
    }
}

impl<W: Write + Send> PrettyLogger<W> {
    /// Creates a logger that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, level: LevelFilter) -> Self {
        Self {
            writer: Mutex::new(writer),
            level,
        }
    }

    /// Returns the destination, consuming the logger.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send + 'static> PrettyLogger<W> {
    /// Installs this logger as the global `log` backend.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already set.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn level_name(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "error",
        log::Level::Warn => "warn",
        log::Level::Info => "info",
        log::Level::Debug => "debug",
        log::Level::Trace => "trace",
    }
}

impl<W: Write + Send> Log for PrettyLogger<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(
            writer,
            "[{} {}] {}",
            level_name(record.level()),
            record.target(),
            record.args(),
        );
    }

    fn flush(&self) {
        let _ = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }
}
