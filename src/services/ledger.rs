//! Outcome ledger
//!
//! Per-decision result files: `<output_dir>/applied.jsonl`, `skipped.jsonl`
//! and `failed.jsonl`, one JSON object per line.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{ApplicationOutcome, OutcomeKind, OutcomeReason};
use crate::platform::Board;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub outcome: OutcomeKind,
    pub platform: Board,
    pub company: String,
    pub job_title: String,
    pub link: String,
    pub job_recruiter: String,
    pub job_location: String,
    /// `file://` URIs of the attached documents
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub reason: Option<OutcomeReason>,
    #[serde(default)]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<&ApplicationOutcome> for LedgerRecord {
    fn from(outcome: &ApplicationOutcome) -> Self {
        let c = &outcome.candidate;
        Self {
            outcome: outcome.kind,
            platform: c.platform,
            company: c.company.clone(),
            job_title: c.title.clone(),
            link: c.link.clone(),
            job_recruiter: c.recruiter_link.clone(),
            job_location: c.location.clone(),
            documents: outcome.documents.iter().map(|p| file_uri(p)).collect(),
            reason: outcome.reason,
            detail: outcome.detail.clone(),
            recorded_at: outcome.recorded_at,
        }
    }
}

pub struct OutcomeLedger {
    output_dir: PathBuf,
}

impl OutcomeLedger {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, kind: OutcomeKind) -> PathBuf {
        self.output_dir.join(format!("{}.jsonl", kind.as_str()))
    }

    pub async fn append(&self, outcome: &ApplicationOutcome) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let path = self.path_for(outcome.kind);
        let mut line = serde_json::to_string(&LedgerRecord::from(outcome))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        file.flush()
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        debug!("Ledger: {} -> {}", outcome.candidate, path.display());
        Ok(())
    }

    pub async fn read(&self, kind: OutcomeKind) -> AppResult<Vec<LedgerRecord>> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(AppError::from))
            .collect()
    }

    /// Every record, applied first, then skipped, then failed
    pub async fn read_all(&self) -> AppResult<Vec<LedgerRecord>> {
        let mut all = Vec::new();
        for kind in OutcomeKind::all() {
            all.extend(self.read(kind).await?);
        }
        Ok(all)
    }
}

fn file_uri(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.display().to_string().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}
