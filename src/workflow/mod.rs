//! Workflow layer
//!
//! Everything about ONE candidate: classify the form, answer it, and walk
//! the application state machine.

pub mod application_ctx;
pub mod classifier;
pub mod flow;
pub mod resolver;

pub use application_ctx::ApplicationCtx;
pub use classifier::FormClassifier;
pub use flow::{ApplicationFlow, FlowReport, FlowSettings, FlowState, SurfaceMode};
pub use resolver::{match_option, QuestionResolver};
