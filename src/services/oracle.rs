//! Answer oracle - service layer
//!
//! Answers application questions on behalf of the candidate. The oracle
//! only produces text; checking that an answer fits the offered options is
//! the caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::JobCandidate;
use crate::services::documents::DocumentSelection;

/// What the oracle extracted from a posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostingSummary {
    pub normalized_title: String,
    pub documents: DocumentSelection,
}

#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Free-text answer for a text / textarea field
    async fn answer_free_text(&self, job: &JobCandidate, question: &str) -> AppResult<String>;

    /// Exactly one of `options` (dropdown, radio group)
    async fn answer_from_options(&self, job: &JobCandidate, question: &str, options: &[String]) -> AppResult<String>;

    /// Route the question to a profile section and answer from it.
    /// May return zero, one or many labels (checkbox groups).
    async fn classify_and_extract(
        &self,
        job: &JobCandidate,
        question: &str,
        options: &[String],
    ) -> AppResult<Vec<String>>;

    async fn parse_job_posting(&self, job: &JobCandidate) -> AppResult<JobPostingSummary>;
}
