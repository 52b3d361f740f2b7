//! Event logger - audit trail
//!
//! Every outcome is appended as one JSON line to `<log_dir>/<YYYY-MM-DD>_log.jsonl`
//! (UTC day of the record). Writes happen on a dedicated thread behind a
//! bounded queue; a full queue blocks the producer instead of dropping.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Mutex;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{AppError, AppResult};
use crate::models::ApplicationOutcome;

const QUEUE_CAPACITY: usize = 16;

/// Fire-and-forget structured record sink
pub trait EventLogger: Send + Sync {
    fn record(&self, outcome: &ApplicationOutcome);

    /// Flush everything queued so far and stop accepting records
    fn shutdown(&self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub logged_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: ApplicationOutcome,
}

pub struct JsonlEventLogger {
    sender: Mutex<Option<SyncSender<LogRecord>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JsonlEventLogger {
    pub fn start(log_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let log_dir = log_dir.into();
        let (sender, receiver) = sync_channel::<LogRecord>(QUEUE_CAPACITY);
        let worker = std::thread::Builder::new()
            .name("event-logger".to_string())
            .spawn(move || run_worker(&log_dir, receiver))
            .map_err(|e| AppError::Other(format!("cannot spawn event logger: {}", e)))?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// File a record logged at `at` ends up in
    pub fn file_for(log_dir: &Path, at: DateTime<Utc>) -> PathBuf {
        log_dir.join(format!("{}_log.jsonl", at.format("%Y-%m-%d")))
    }
}

impl EventLogger for JsonlEventLogger {
    fn record(&self, outcome: &ApplicationOutcome) {
        let record = LogRecord {
            logged_at: Utc::now(),
            outcome: outcome.clone(),
        };
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        match sender {
            Some(sender) => {
                if sender.send(record).is_err() {
                    error!("❌ Event logger worker is gone, record lost");
                }
            }
            None => warn!("Event logger already shut down, record dropped"),
        }
    }

    fn shutdown(&self) {
        // dropping the last sender ends the worker loop
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!("❌ Event logger worker panicked");
            }
            debug!("Event logger flushed");
        }
    }
}

impl Drop for JsonlEventLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(log_dir: &Path, receiver: Receiver<LogRecord>) {
    for record in receiver {
        if let Err(e) = append(log_dir, &record) {
            error!("❌ Failed to write audit record: {}", e);
        }
    }
}

fn append(log_dir: &Path, record: &LogRecord) -> AppResult<()> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| AppError::file_write_failed(log_dir.display().to_string(), e))?;
    let path = JsonlEventLogger::file_for(log_dir, record.logged_at);
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, JobCandidate, SkipReason};
    use crate::platform::Board;

    fn candidate(i: usize) -> JobCandidate {
        JobCandidate::new(Board::LinkedIn, format!("Job {i}"), "Acme", "Remote", format!("https://x/{i}"))
    }

    #[test]
    fn shutdown_flushes_every_queued_record() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlEventLogger::start(dir.path()).unwrap();

        // more than the queue holds, producer must block rather than drop
        for i in 0..40 {
            logger.record(&ApplicationOutcome::skipped(candidate(i), SkipReason::BlacklistedCompany));
        }
        logger.record(&ApplicationOutcome::failed(candidate(99), FailureKind::ValidationError, None));
        logger.shutdown();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        assert!(path.to_string_lossy().ends_with("_log.jsonl"));

        let content = std::fs::read_to_string(path).unwrap();
        let records: Vec<LogRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 41);
        assert_eq!(records[40].outcome.failure(), Some(FailureKind::ValidationError));
    }

    #[test]
    fn records_after_shutdown_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlEventLogger::start(dir.path()).unwrap();
        logger.shutdown();
        logger.record(&ApplicationOutcome::applied(candidate(1)));
        logger.shutdown();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn file_name_uses_utc_day() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            JsonlEventLogger::file_for(Path::new("log"), at),
            PathBuf::from("log/2024-03-05_log.jsonl")
        );
    }
}
