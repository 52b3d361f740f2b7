//! Orchestration layer
//!
//! ## Responsibilities
//!
//! Owns the run: login, searching, the per-candidate loop and recording.
//!
//! ## Modules
//!
//! ### `app` - run lifecycle
//! - builds every collaborator (browser, oracle, documents, cache, loggers)
//! - iterates (position, location) pairs and result pages
//! - hands each eligible candidate to `workflow::ApplicationFlow`
//! - records every outcome and prints the final tally
//!
//! ### `auth` - login
//! - detects an existing session
//! - submits credentials, waits out manual verification
//!
//! ### `discovery` - listing scan
//! - parses result tiles into candidates
//! - seen-set, blacklists, incomplete listings
//! - page dwell and long pauses
//!
//! ## Layering
//!
//! ```text
//! app (Vec<(position, location)>)
//!     ↓
//! discovery (one results page → Vec<Verdict>)
//!     ↓
//! workflow::ApplicationFlow (one candidate)
//!     ↓
//! services (oracle / documents / cache / ledger / audit log)
//!     ↓
//! infrastructure (UiSession over a UiDriver)
//! ```

pub mod app;
pub mod auth;
pub mod discovery;

pub use app::{App, AppParts, RunStats};
pub use auth::Authenticator;
pub use discovery::{BlacklistRules, Decision, JobDiscovery, PageDwell, PageScan, SeenJobs, Verdict};
