pub mod form;
pub mod job;
pub mod loaders;
pub mod outcome;
pub mod profile;

pub use form::{FieldKind, FieldOption, FormField, UNKNOWN_QUESTION};
pub use job::{CandidateKey, JobCandidate, UNKNOWN_COMPANY, UNKNOWN_LOCATION, UNKNOWN_TITLE};
pub use loaders::load_profile;
pub use outcome::{ApplicationOutcome, FailureKind, OutcomeKind, OutcomeReason, SkipReason};
pub use profile::{ApplicationProfile, ProfileSection};
