use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::common::error::{AnalyzerError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: String,
    pub message: String,
    pub timestamp: String,
}

/// Current wall-clock time rendered at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct LogClock {
    offset: FixedOffset,
}

impl LogClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Failures collected during one run, keyed from 1.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorLog {
    entries: BTreeMap<u32, ErrorRecord>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: &AnalyzerError, clock: &LogClock) -> u32 {
        self.push(ErrorRecord {
            kind: error.kind().to_string(),
            message: error.detail(),
            timestamp: clock.timestamp(),
        })
    }

    pub fn push(&mut self, record: ErrorRecord) -> u32 {
        let key = self.entries.len() as u32 + 1;
        tracing::debug!("Recording error #{}: {} ({})", key, record.kind, record.message);
        self.entries.insert(key, record);
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| AnalyzerError::Other(e.into()))
    }

    /// Appends this run's records to `path` as one JSON block.
    /// Returns `false` without touching the file when there is nothing to write.
    pub fn append_to(&self, path: &Path) -> Result<bool> {
        if self.is_empty() {
            tracing::debug!("Error log empty, nothing written to {}", path.display());
            return Ok(false);
        }

        let mut block = self.to_pretty_json()?;
        block.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(block.as_bytes())?;

        tracing::info!("Wrote {} error record(s) to {}", self.len(), path.display());
        Ok(true)
    }
}

#[derive(Debug, Default)]
struct FlushState {
    log: ErrorLog,
    flushed: bool,
}

/// Error log shared by the session and the interrupt handler.
///
/// Whichever side flushes first writes the file. Later flushes are no-ops,
/// so a run appends at most one block.
#[derive(Debug, Clone)]
pub struct SharedErrorLog {
    state: Arc<Mutex<FlushState>>,
    path: PathBuf,
}

impl SharedErrorLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlushState::default())),
            path,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlushState> {
        // A panic while holding the lock leaves the map intact, keep using it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, error: &AnalyzerError, clock: &LogClock) -> u32 {
        let mut state = self.lock();
        if state.flushed {
            tracing::warn!("Error recorded after the log was written, it will be lost: {}", error);
        }
        state.log.record(error, clock)
    }

    pub fn len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn is_flushed(&self) -> bool {
        self.lock().flushed
    }

    /// Writes the log on the first call only. Returns whether a block was appended.
    pub fn flush(&self) -> Result<bool> {
        let mut state = self.lock();
        if state.flushed {
            return Ok(false);
        }
        state.flushed = true;
        state.log.append_to(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::MeasureError;

    fn record(kind: &str) -> ErrorRecord {
        ErrorRecord {
            kind: kind.to_string(),
            message: "boom".to_string(),
            timestamp: "2026-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn keys_start_at_one_and_increase() {
        let mut log = ErrorLog::new();
        assert_eq!(log.push(record("A")), 1);
        assert_eq!(log.push(record("B")), 2);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries.get(&2).map(|r| r.kind.as_str()), Some("B"));
    }

    #[test]
    fn record_uses_error_kind_and_detail() {
        let mut log = ErrorLog::new();
        let clock = LogClock::new(FixedOffset::east_opt(3600).unwrap());
        let err = AnalyzerError::from(MeasureError::AllocationFailed { bytes: 8 });
        let key = log.record(&err, &clock);

        let entry = log.entries.get(&key).unwrap();
        assert_eq!(entry.kind, "AllocationFailed");
        assert_eq!(entry.message, "Failed to reserve 8 bytes for the array");
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn pretty_json_layout() {
        let mut log = ErrorLog::new();
        log.push(record("AllocationTooLarge"));
        let expected = "{\n    \"1\": {\n        \"kind\": \"AllocationTooLarge\",\n        \"message\": \"boom\",\n        \"timestamp\": \"2026-01-01 12:00:00\"\n    }\n}";
        assert_eq!(log.to_pretty_json().unwrap(), expected);
    }

    #[test]
    fn empty_log_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.json");
        assert!(!ErrorLog::new().append_to(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn append_keeps_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.json");

        let mut first = ErrorLog::new();
        first.push(record("A"));
        assert!(first.append_to(&path).unwrap());

        let mut second = ErrorLog::new();
        second.push(record("B"));
        assert!(second.append_to(&path).unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let blocks = serde_json::Deserializer::from_str(&contents)
            .into_iter::<BTreeMap<String, ErrorRecord>>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["1"].kind, "A");
        assert_eq!(blocks[1]["1"].kind, "B");
    }

    #[test]
    fn shared_log_flushes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.json");
        let clock = LogClock::new(FixedOffset::east_opt(3600).unwrap());

        let log = SharedErrorLog::new(path.clone());
        let handler_side = log.clone();
        log.record(&AnalyzerError::from(MeasureError::AllocationFailed { bytes: 8 }), &clock);
        assert_eq!(handler_side.len(), 1);

        assert!(handler_side.flush().unwrap());
        assert!(log.is_flushed());
        assert!(!log.flush().unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let blocks = serde_json::Deserializer::from_str(&contents)
            .into_iter::<BTreeMap<String, ErrorRecord>>()
            .count();
        assert_eq!(blocks, 1);
    }

    #[test]
    fn shared_log_empty_flush_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.json");
        let log = SharedErrorLog::new(path.clone());
        assert_eq!(log.len(), 0);
        assert!(!log.flush().unwrap());
        assert!(log.is_flushed());
        assert!(!path.exists());
    }

    #[test]
    fn clock_applies_offset() {
        let clock = LogClock::new(FixedOffset::east_opt(3600).unwrap());
        assert_eq!(clock.now().offset().local_minus_utc(), 3600);
    }
}
