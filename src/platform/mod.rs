//! Job boards
//!
//! Every board is a data table of selectors and strategies consumed by the
//! shared discovery loop and application flow. No board-specific control
//! flow lives anywhere else.

mod indeed;
mod jobsdb;
mod linkedin;

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    LinkedIn,
    JobsDb,
    Indeed,
}

impl Board {
    pub fn as_str(self) -> &'static str {
        match self {
            Board::LinkedIn => "linkedin",
            Board::JobsDb => "jobsdb",
            Board::Indeed => "indeed",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Board::LinkedIn => "LinkedIn",
            Board::JobsDb => "JobsDB",
            Board::Indeed => "Indeed",
        }
    }

    pub fn profile(self) -> &'static BoardProfile {
        match self {
            Board::LinkedIn => &linkedin::PROFILE,
            Board::JobsDb => &jobsdb::PROFILE,
            Board::Indeed => &indeed::PROFILE,
        }
    }

    /// Results page URL for `query` (page index is zero-based)
    pub fn search_url(self, query: &SearchQuery) -> String {
        match self {
            Board::LinkedIn => linkedin::search_url(query),
            Board::JobsDb => jobsdb::search_url(query),
            Board::Indeed => indeed::search_url(query),
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Board {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Board::LinkedIn),
            "jobsdb" => Ok(Board::JobsDb),
            "indeed" => Ok(Board::Indeed),
            other => Err(ConfigError::UnknownBoard(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
    pub page: u32,
    pub remote_only: bool,
}

/// Selector / strategy table for one board
///
/// Selector lists are tried in order; the first hit wins unless noted.
#[derive(Debug)]
pub struct BoardProfile {
    pub base_url: &'static str,
    /// Query parameters that identify a posting; every other parameter is
    /// stripped from listing links
    pub link_params: &'static [&'static str],

    // --- results page ---
    /// Page text (lowercased comparison) meaning the search is exhausted
    pub no_jobs_indicators: &'static [&'static str],
    pub results_ready: &'static [&'static str],
    /// Listing tiles; the first selector with any hit is used exclusively
    pub tiles: &'static [&'static str],
    pub tile_title: &'static [&'static str],
    pub tile_company: &'static [&'static str],
    pub tile_location: &'static [&'static str],
    pub tile_link: &'static [&'static str],
    pub tile_salary: &'static [&'static str],
    pub tile_apply_method: &'static [&'static str],
    /// Tile attributes carrying the platform job id
    pub tile_id_attributes: &'static [&'static str],

    // --- detail view ---
    pub detail_ready: &'static [&'static str],
    pub description: &'static [&'static str],
    pub recruiter: &'static [&'static str],
    pub apply_buttons: &'static [&'static str],
    pub apply_button_texts: &'static [&'static str],
    /// Apply affordance text must contain one of these, otherwise the
    /// application is handled off-board
    pub easy_apply_keywords: &'static [&'static str],

    // --- application surface ---
    pub surfaces: &'static [&'static str],
    pub form_containers: &'static [&'static str],
    pub form_sections: &'static [&'static str],
    pub section_cap: usize,
    pub submit_buttons: &'static [&'static str],
    pub next_buttons: &'static [&'static str],
    pub submit_texts: &'static [&'static str],
    pub next_texts: &'static [&'static str],
    pub error_selectors: &'static [&'static str],
    /// Clicked best-effort, in order, to dismiss a half-filled surface
    pub discard_selectors: &'static [&'static str],

    // --- login ---
    pub login_url: &'static str,
    pub email_inputs: &'static [&'static str],
    pub password_inputs: &'static [&'static str],
    pub login_submit: &'static [&'static str],
    pub logged_in_indicators: &'static [&'static str],
    pub verification_markers: &'static [&'static str],
}

/// Selectors shared by every board for question labels inside a section
pub const LABEL_SELECTORS: &[&str] = &[
    "legend",
    "label",
    ".form-label",
    ".question-text",
    "h3",
    "h4",
    ".field-label",
    "[data-test-id*=\"question\"]",
];

/// Upload affordance wording when no `input[type=file]` is present
pub const UPLOAD_WORDS: &[&str] = &["upload", "choose file", "browse", "attach"];

/// Shared validation-error selectors
pub const COMMON_ERROR_SELECTORS: &[&str] = &[
    ".error",
    ".field-error",
    ".validation-error",
    "[role=\"alert\"]",
    ".alert-danger",
    ".form-error",
];
