//! # Easy Apply
//!
//! Browser automation that submits one-click job applications on supported
//! job boards, answering screening questions through an LLM.
//!
//! ## Architecture
//!
//! The system follows a strict four-layer layout:
//!
//! ### ① Infrastructure
//! - `infrastructure/` - owns the browser page, exposes capabilities only
//! - `UiDriver` - element / context primitives, implemented by `ChromeDriver`
//! - `UiSession` - retries, waits and human pacing on top of a driver
//!
//! ### ② Services
//! - `services/` - "what can I do", one question or one record at a time
//! - `AnswerOracle` / `LlmOracle` - screening answers and posting analysis
//! - `DocumentGenerator` - resume / cover letter per posting
//! - `AnswerCache`, `OutcomeLedger`, `EventLogger` - persistence
//!
//! ### ③ Workflow
//! - `workflow/` - the full lifecycle of one application
//! - `ApplicationCtx` - log context (job index + company + title)
//! - `FormClassifier` / `QuestionResolver` - one form page at a time
//! - `ApplicationFlow` - open → fill pages → submit → restore
//!
//! ### ④ Orchestration
//! - `orchestrator/app` - run lifecycle and search loop
//! - `orchestrator/discovery` - result pages → candidates
//! - `orchestrator/auth` - login and manual verification
//!
//! Board specifics (URLs, selectors, keywords) live in `platform/`.

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod services;
pub mod utils;
pub mod workflow;

// Commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{UiDriver, UiSession};
pub use models::{ApplicationOutcome, JobCandidate, OutcomeKind};
pub use orchestrator::{App, RunStats};
pub use platform::Board;
pub use workflow::{ApplicationCtx, ApplicationFlow};
