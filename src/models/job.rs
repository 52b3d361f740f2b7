//! Job candidate entity
//!
//! A single posting under consideration, from the moment its listing tile is
//! parsed until its outcome lands in the ledger.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::platform::Board;

pub const UNKNOWN_TITLE: &str = "Unknown Position";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Deduplication key: `(platform, link)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateKey {
    pub platform: Board,
    pub link: String,
}

/// Job candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCandidate {
    pub platform: Board,
    /// Platform job id, when the listing exposes one
    #[serde(default)]
    pub external_id: Option<String>,
    pub link: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub apply_method: String,

    // --- classification metadata ---
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub remote_option: String,

    // --- enrichment (filled once the application page is opened) ---
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recruiter_link: String,
    #[serde(default)]
    pub normalized_title: Option<String>,
    #[serde(default)]
    pub resume_path: Option<PathBuf>,
    #[serde(default)]
    pub cover_letter_path: Option<PathBuf>,

    /// Opaque per-platform extension fields
    #[serde(default)]
    pub platform_specific_data: HashMap<String, JsonValue>,
}

impl JobCandidate {
    pub fn new(
        platform: Board,
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            external_id: None,
            link: link.into(),
            title: title.into(),
            company: company.into(),
            location: location.into(),
            apply_method: String::new(),
            salary: String::new(),
            job_type: String::new(),
            experience_level: String::new(),
            industry: String::new(),
            remote_option: String::new(),
            description: String::new(),
            recruiter_link: String::new(),
            normalized_title: None,
            resume_path: None,
            cover_letter_path: None,
            platform_specific_data: HashMap::new(),
        }
    }

    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            platform: self.platform,
            link: self.link.clone(),
        }
    }

    /// Title or company fell back to a sentinel during tile extraction.
    pub fn is_incomplete(&self) -> bool {
        self.title == UNKNOWN_TITLE || self.company == UNKNOWN_COMPANY
    }

    pub fn set_platform_data(&mut self, key: impl Into<String>, value: JsonValue) {
        self.platform_specific_data.insert(key.into(), value);
    }

    pub fn platform_data(&self, key: &str) -> Option<&JsonValue> {
        self.platform_specific_data.get(key)
    }

    /// Markdown summary fed to the oracle prompts.
    pub fn formatted_job_information(&self) -> String {
        let mut additional = Vec::new();
        let extra = [
            ("Salary", &self.salary),
            ("Job Type", &self.job_type),
            ("Experience Level", &self.experience_level),
            ("Industry", &self.industry),
            ("Work Arrangement", &self.remote_option),
        ];
        for (label, value) in extra {
            if !value.is_empty() {
                additional.push(format!("- {}: {}", label, value));
            }
        }
        let additional = if additional.is_empty() {
            "- No additional information available".to_string()
        } else {
            additional.join("\n")
        };

        let recruiter = if self.recruiter_link.is_empty() {
            "Not available"
        } else {
            &self.recruiter_link
        };
        let description = if self.description.is_empty() {
            "No description provided."
        } else {
            &self.description
        };

        format!(
            "# Job Description\n\
             ## Job Information\n\
             - Platform: {}\n\
             - Position: {}\n\
             - At: {}\n\
             - Location: {}\n\
             - Apply Method: {}\n\
             - Recruiter Profile: {}\n\n\
             ## Additional Details\n{}\n\n\
             ## Description\n{}",
            self.platform.display_name(),
            self.title,
            self.company,
            self.location,
            self.apply_method,
            recruiter,
            additional,
            description
        )
    }
}

impl Display for JobCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.title, self.company)
    }
}
