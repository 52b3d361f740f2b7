//! Application outcomes
//!
//! One record per candidate decision per run. Written once, never updated.

use std::fmt::Display;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobCandidate;

/// Final decision for a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Applied,
    Skipped,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Applied => "applied",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Failed => "failed",
        }
    }

    pub fn all() -> [OutcomeKind; 3] {
        [OutcomeKind::Applied, OutcomeKind::Skipped, OutcomeKind::Failed]
    }
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a candidate was skipped before the application surface was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    BlacklistedCompany,
    BlacklistedTitle,
    IncompleteListing,
    ExternalApplication,
    DryRun,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::BlacklistedCompany => "blacklisted-company",
            SkipReason::BlacklistedTitle => "blacklisted-title",
            SkipReason::IncompleteListing => "incomplete-listing",
            SkipReason::ExternalApplication => "external-application",
            SkipReason::DryRun => "dry-run",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified candidate-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    ExtractionFailed,
    ApplyAffordanceMissing,
    SurfaceNotFound,
    NoAdvanceAffordance,
    ValidationError,
    MaxPagesExceeded,
    OracleContractViolation,
    TransientUiExhausted,
    Interrupted,
    Unexpected,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ExtractionFailed => "extraction-failed",
            FailureKind::ApplyAffordanceMissing => "apply-affordance-missing",
            FailureKind::SurfaceNotFound => "surface-not-found",
            FailureKind::NoAdvanceAffordance => "no-advance-affordance",
            FailureKind::ValidationError => "validation-error",
            FailureKind::MaxPagesExceeded => "max-pages-exceeded",
            FailureKind::OracleContractViolation => "oracle-contract-violation",
            FailureKind::TransientUiExhausted => "transient-ui-exhausted",
            FailureKind::Interrupted => "interrupted",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome reason, tagged by the kind that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OutcomeReason {
    Skip(SkipReason),
    Failure(FailureKind),
}

/// Application outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationOutcome {
    pub kind: OutcomeKind,
    pub reason: Option<OutcomeReason>,
    /// Free-form detail (error text), never used for decisions
    #[serde(default)]
    pub detail: Option<String>,
    pub candidate: JobCandidate,
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    pub recorded_at: DateTime<Utc>,
}

impl ApplicationOutcome {
    pub fn applied(candidate: JobCandidate) -> Self {
        let documents = candidate
            .resume_path
            .iter()
            .chain(candidate.cover_letter_path.iter())
            .cloned()
            .collect();
        Self {
            kind: OutcomeKind::Applied,
            reason: None,
            detail: None,
            candidate,
            documents,
            recorded_at: Utc::now(),
        }
    }

    pub fn skipped(candidate: JobCandidate, reason: SkipReason) -> Self {
        Self {
            kind: OutcomeKind::Skipped,
            reason: Some(OutcomeReason::Skip(reason)),
            detail: None,
            candidate,
            documents: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn failed(candidate: JobCandidate, failure: FailureKind, detail: Option<String>) -> Self {
        Self {
            kind: OutcomeKind::Failed,
            reason: Some(OutcomeReason::Failure(failure)),
            detail,
            candidate,
            documents: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self.reason {
            Some(OutcomeReason::Failure(kind)) => Some(kind),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.reason {
            Some(OutcomeReason::Skip(reason)) => Some(reason),
            _ => None,
        }
    }
}
