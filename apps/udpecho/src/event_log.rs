//! # Event Log
//!
//! Append-only file of pretty-printed JSON [`LogEvent`] records, one per
//! server action. Each record is flushed as soon as it is written.
//!
//! The event log is an audit trail for operators; diagnostics go through
//! `tracing`. Failing to write a record never stops the server.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;
use udpecho_core::{LogEvent, LoggingConfig, Result};

/// Shared handle to the event log file.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Open the log described by the `logging:` section.
    ///
    /// Returns `None` when logging is disabled or the file cannot be opened.
    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        if !config.enable {
            return None;
        }

        match Self::open(&config.file) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!(
                    "Cannot open log file {}: {}. Logging is disabled.",
                    config.file.display(),
                    e
                );
                None
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn write(&self, event: &LogEvent) {
        if let Err(e) = self.try_write(event) {
            warn!("Failed to write {} event to {}: {}", event.event, self.path.display(), e);
        }
    }

    fn try_write(&self, event: &LogEvent) -> Result<()> {
        let text = event.to_pretty_json()?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("event log lock poisoned"))?;
        writeln!(file, "{}", text)?;
        file.flush()?;
        Ok(())
    }
}

/// Write `event` if a log is present.
pub fn record(log: Option<&EventLog>, event: LogEvent) {
    if let Some(log) = log {
        log.write(&event);
    }
}

/// Split a log file back into its records.
///
/// Records are concatenated JSON objects, so a streaming deserializer
/// recovers them regardless of indentation.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<LogEvent>> {
    let text = std::fs::read_to_string(path)?;
    let events = serde_json::Deserializer::from_str(&text)
        .into_iter::<LogEvent>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(events)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use udpecho_core::EventKind;

    #[test]
    fn appends_and_reads_back_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let log = EventLog::open(&path).unwrap();
        assert_eq!(log.path(), path.as_path());
        log.write(&LogEvent::server_start());
        log.write(&LogEvent::warning("careful"));

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, EventKind::ServerStart);
        assert_eq!(events[1].event, EventKind::Warning);
        assert_eq!(events[1].message, "careful");
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        EventLog::open(&path).unwrap().write(&LogEvent::server_start());
        EventLog::open(&path).unwrap().write(&LogEvent::server_stop());

        let kinds: Vec<_> = read_events(&path).unwrap().into_iter().map(|e| e.event).collect();
        assert_eq!(kinds, vec![EventKind::ServerStart, EventKind::ServerStop]);
    }

    #[test]
    fn records_are_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        EventLog::open(&path).unwrap().write(&LogEvent::timeout());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"timestamp\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn disabled_config_yields_no_log() {
        let config = LoggingConfig {
            enable: false,
            ..LoggingConfig::default()
        };
        assert!(EventLog::from_config(&config).is_none());
    }

    #[test]
    fn unopenable_path_disables_logging() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: dir.path().join("missing-dir").join("events.log"),
            enable: true,
        };
        assert!(EventLog::from_config(&config).is_none());
    }

    #[test]
    fn record_without_log_is_a_no_op() {
        record(None, LogEvent::error("nowhere to go"));
    }
}
