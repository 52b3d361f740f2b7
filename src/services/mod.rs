pub mod answer_cache;
pub mod documents;
pub mod event_logger;
pub mod ledger;
pub mod llm_oracle;
pub mod oracle;

pub use answer_cache::{AnswerCache, CachedAnswer};
pub use documents::{DocumentChoices, DocumentGenerator, DocumentSelection, GeneratedDocuments, TemplateDocumentGenerator};
pub use event_logger::{EventLogger, JsonlEventLogger, LogRecord};
pub use ledger::{LedgerRecord, OutcomeLedger};
pub use llm_oracle::LlmOracle;
pub use oracle::{AnswerOracle, JobPostingSummary};
