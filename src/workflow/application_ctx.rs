//! Application context
//!
//! "Which candidate of this run am I working on", carried through every log
//! line of the flow.

use std::fmt::Display;

use crate::models::JobCandidate;
use crate::platform::Board;

/// Application context
#[derive(Debug, Clone)]
pub struct ApplicationCtx {
    /// Position of the candidate in this run (1-based, display only)
    pub index: usize,

    pub board: Board,

    pub company: String,

    pub title: String,
}

impl ApplicationCtx {
    pub fn new(index: usize, candidate: &JobCandidate) -> Self {
        Self {
            index,
            board: candidate.platform,
            company: candidate.company.clone(),
            title: candidate.title.clone(),
        }
    }
}

impl Display for ApplicationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Job #{} {} / {}]", self.index, self.company, self.title)
    }
}
