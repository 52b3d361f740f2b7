//! Advisory answer cache
//!
//! Remembers answers to boilerplate questions across runs so the oracle is
//! not asked twice. Lookups are fuzzy and may miss; nothing here is ever
//! allowed to fail an application.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::FieldKind;

/// Minimum Jaro-Winkler similarity for a fuzzy hit
const SIMILARITY_THRESHOLD: f64 = 0.95;
/// Minimum similarity of each differing word; typos pass, other words do not
const WORD_THRESHOLD: f64 = 0.92;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub question: String,
    pub kind: FieldKind,
    pub answers: Vec<String>,
}

#[derive(Debug, Default)]
pub struct AnswerCache {
    path: Option<PathBuf>,
    entries: Vec<CachedAnswer>,
    dirty: bool,
}

impl AnswerCache {
    /// In-memory only
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing or corrupt file starts an empty cache.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path).await {
            Ok(entries) => {
                debug!("Loaded {} cached answers from {}", entries.len(), path.display());
                entries
            }
            Err(e) => {
                warn!("⚠️ Answer cache unavailable ({}), starting empty", e);
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, question: &str, kind: FieldKind) -> Option<&[String]> {
        let key = normalize_question(question);
        if key.is_empty() {
            return None;
        }
        let same_kind = self.entries.iter().filter(|e| e.kind == kind);

        if let Some(hit) = same_kind.clone().find(|e| normalize_question(&e.question) == key) {
            return Some(&hit.answers);
        }

        same_kind
            .map(|e| (normalize_question(&e.question), e))
            .filter(|(cached, _)| words_align(cached, &key))
            .map(|(cached, e)| (jaro_winkler(&cached, &key), e))
            .filter(|(score, _)| *score >= SIMILARITY_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(score, e)| {
                debug!("Fuzzy cache hit ({:.3}) for '{}'", score, question);
                e.answers.as_slice()
            })
    }

    pub fn insert(&mut self, question: &str, kind: FieldKind, answers: Vec<String>) {
        let key = normalize_question(question);
        if key.is_empty() || answers.is_empty() {
            return;
        }
        self.entries
            .retain(|e| !(e.kind == kind && normalize_question(&e.question) == key));
        self.entries.push(CachedAnswer {
            question: question.trim().to_string(),
            kind,
            answers,
        });
        self.dirty = true;
    }

    /// Merge-on-write persist. Errors are logged and swallowed.
    pub async fn save(&mut self) {
        if !self.dirty {
            return;
        }
        let Some(path) = self.path.clone() else {
            return;
        };
        match self.merge_and_write(&path).await {
            Ok(count) => {
                debug!("Answer cache saved ({} entries)", count);
                self.dirty = false;
            }
            Err(e) => warn!("⚠️ Answer cache not saved: {}", e),
        }
    }

    async fn merge_and_write(&mut self, path: &Path) -> AppResult<usize> {
        // entries written by another run since we loaded are kept
        let on_disk = read_entries(path).await.unwrap_or_default();
        for entry in on_disk {
            let key = normalize_question(&entry.question);
            let known = self
                .entries
                .iter()
                .any(|e| e.kind == entry.kind && normalize_question(&e.question) == key);
            if !known {
                self.entries.push(entry);
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::file_write_failed(tmp.display().to_string(), e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(self.entries.len())
    }
}

async fn read_entries(path: &Path) -> AppResult<Vec<CachedAnswer>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Same word count, and every differing word is a near spelling of its
/// counterpart. "with Python" vs "with Java" never aligns.
fn words_align(a: &str, b: &str) -> bool {
    let left = words(a);
    let right = words(b);
    left.len() == right.len()
        && left
            .iter()
            .zip(&right)
            .all(|(l, r)| l == r || jaro_winkler(l, r) >= WORD_THRESHOLD)
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercase, collapse whitespace, drop required-markers and trailing
/// punctuation.
pub fn normalize_question(question: &str) -> String {
    let lower = question.to_lowercase().replace("(required)", "");
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == '*' || c == ':' || c == '?' || c.is_whitespace())
        .to_string()
}
