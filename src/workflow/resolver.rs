//! Question resolution - workflow layer
//!
//! Turns one classified field into an answer and applies it:
//! - free text: oracle answer, typed at human pace
//! - dropdown / radio: exactly one offered option
//! - checkbox group: zero or more offered options (consent boxes are ticked outright)
//! - file upload: resume or cover letter path, skipped when the file is missing
//!
//! The advisory cache is consulted first and written after every accepted
//! answer. An answer that matches none of the offered options is a hard
//! error for the whole application; nothing is ever guessed.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppResult, OracleError};
use crate::infrastructure::{ElementHandle, UiSession};
use crate::models::{FieldKind, FormField, JobCandidate};
use crate::services::{AnswerCache, AnswerOracle, DocumentGenerator, DocumentSelection};
use crate::utils::logging::truncate_text;
use crate::workflow::application_ctx::ApplicationCtx;

/// Section wording that marks a consent checkbox
const CONSENT_TERMS: &[&str] = &["terms", "privacy", "policy", "agreement", "consent"];

pub struct QuestionResolver {
    oracle: Arc<dyn AnswerOracle>,
    documents: Arc<dyn DocumentGenerator>,
    cache: AnswerCache,
}

impl QuestionResolver {
    pub fn new(oracle: Arc<dyn AnswerOracle>, documents: Arc<dyn DocumentGenerator>, cache: AnswerCache) -> Self {
        Self {
            oracle,
            documents,
            cache,
        }
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    /// Best-effort cache write
    pub async fn persist(&mut self) {
        self.cache.save().await;
    }

    pub async fn resolve(
        &mut self,
        session: &UiSession,
        field: &mut FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        field.cached_answer = self
            .cache
            .lookup(&field.label, field.kind)
            .map(|answers| answers.to_vec());

        match field.kind {
            FieldKind::Text | FieldKind::Textarea => self.fill_text(session, field, job, ctx).await,
            FieldKind::Dropdown => self.pick_dropdown(session, field, job, ctx).await,
            FieldKind::RadioGroup => self.pick_radio(session, field, job, ctx).await,
            FieldKind::CheckboxGroup => self.tick_checkboxes(session, field, job, ctx).await,
            FieldKind::FileUpload => self.upload(session, field, job, ctx).await,
        }
    }

    // ========== free text ==========

    async fn fill_text(
        &mut self,
        session: &UiSession,
        field: &FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        if let Some(value) = session.attribute(field.control, "value").await? {
            if !value.trim().is_empty() {
                debug!("{} '{}' already filled, leaving it", ctx, field.label);
                return Ok(());
            }
        }

        let answer = match field.cached_answer.as_ref().and_then(|a| a.first()) {
            Some(cached) => cached.clone(),
            None => self.oracle.answer_free_text(job, &field.label).await?,
        };
        session.human_type(field.control, &answer).await?;
        info!(
            "{} ✓ {} → {}",
            ctx,
            truncate_text(&field.label, 60),
            truncate_text(&answer, 60)
        );
        self.cache.insert(&field.label, field.kind, vec![answer]);
        Ok(())
    }

    // ========== single choice ==========

    async fn single_choice(&self, field: &FormField, job: &JobCandidate) -> AppResult<usize> {
        let options = field.option_labels();

        if let Some(cached) = field.cached_answer.as_ref().and_then(|a| a.first()) {
            if let Some(index) = match_option(cached, &options) {
                return Ok(index);
            }
            debug!("Cached answer '{}' no longer offered for '{}'", cached, field.label);
        }

        let answer = self.oracle.answer_from_options(job, &field.label, &options).await?;
        match match_option(&answer, &options) {
            Some(index) => Ok(index),
            None => Err(OracleError::OptionNotOffered { answer, options }.into()),
        }
    }

    async fn pick_dropdown(
        &mut self,
        session: &UiSession,
        field: &FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        let index = self.single_choice(field, job).await?;
        let chosen = field.options[index].label.clone();
        session.select_option(field.control, &chosen).await?;
        info!("{} ✓ {} → {}", ctx, truncate_text(&field.label, 60), chosen);
        self.cache.insert(&field.label, field.kind, vec![chosen]);
        Ok(())
    }

    async fn pick_radio(
        &mut self,
        session: &UiSession,
        field: &FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        let index = self.single_choice(field, job).await?;
        let option = &field.options[index];
        let control = option.control.unwrap_or(field.control);
        session.click(control).await?;
        info!("{} ✓ {} → {}", ctx, truncate_text(&field.label, 60), option.label);
        self.cache.insert(&field.label, field.kind, vec![option.label.clone()]);
        Ok(())
    }

    // ========== multiple choice ==========

    async fn tick_checkboxes(
        &mut self,
        session: &UiSession,
        field: &FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        if is_consent(&field.section_text) || is_consent(&field.label) {
            for option in &field.options {
                if let Some(control) = option.control {
                    check(session, control).await?;
                }
            }
            info!("{} ✓ Accepted '{}'", ctx, truncate_text(&field.label, 60));
            return Ok(());
        }

        let options = field.option_labels();
        let cached = field
            .cached_answer
            .clone()
            .filter(|answers| answers.iter().all(|a| match_option(a, &options).is_some()));
        let answers = match cached {
            Some(answers) => answers,
            None => {
                self.oracle
                    .classify_and_extract(job, &field.label, &options)
                    .await?
            }
        };

        let mut chosen = Vec::with_capacity(answers.len());
        for answer in answers {
            match match_option(&answer, &options) {
                Some(index) if chosen.contains(&index) => {}
                Some(index) => chosen.push(index),
                None => {
                    return Err(OracleError::OptionNotOffered {
                        answer,
                        options: options.clone(),
                    }
                    .into())
                }
            }
        }

        let mut labels = Vec::with_capacity(chosen.len());
        for index in chosen {
            let option = &field.options[index];
            if let Some(control) = option.control {
                check(session, control).await?;
            }
            labels.push(option.label.clone());
        }
        info!(
            "{} ✓ {} → [{}]",
            ctx,
            truncate_text(&field.label, 60),
            labels.join(", ")
        );
        self.cache.insert(&field.label, field.kind, labels);
        Ok(())
    }

    // ========== uploads ==========

    async fn upload(
        &mut self,
        session: &UiSession,
        field: &FormField,
        job: &JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<()> {
        let wants_cover = field.label.to_lowercase().contains("cover")
            || field.section_text.to_lowercase().contains("cover letter");

        let path = match self.document_path(job, wants_cover).await {
            Some(path) => path,
            None => {
                warn!("{} ⚠️ No document for '{}', upload skipped", ctx, field.label);
                return Ok(());
            }
        };
        if !path.is_file() {
            warn!("{} ⚠️ {} does not exist, upload skipped", ctx, path.display());
            return Ok(());
        }

        let Some(input) = file_input(session, field).await? else {
            warn!("{} ⚠️ No file input behind '{}', upload skipped", ctx, field.label);
            return Ok(());
        };
        session.set_files(input, &[path.clone()]).await?;
        info!("{} 📎 Uploaded {}", ctx, path.display());
        Ok(())
    }

    /// Candidate's generated documents first, the generator otherwise
    async fn document_path(&self, job: &JobCandidate, wants_cover: bool) -> Option<PathBuf> {
        let existing = if wants_cover {
            job.cover_letter_path.clone()
        } else {
            job.resume_path.clone()
        };
        if existing.is_some() {
            return existing;
        }
        let generated = self.documents.generate(job, &DocumentSelection::default()).await;
        if wants_cover {
            generated.cover_letter
        } else {
            generated.resume
        }
    }
}

/// The control itself when it is a file input, otherwise the first file
/// input inside it
async fn file_input(session: &UiSession, field: &FormField) -> AppResult<Option<ElementHandle>> {
    let kind = session.attribute(field.control, "type").await?.unwrap_or_default();
    if kind.eq_ignore_ascii_case("file") {
        return Ok(Some(field.control));
    }
    session.find("input[type='file']", Some(field.control)).await
}

async fn check(session: &UiSession, control: ElementHandle) -> AppResult<()> {
    if !session.driver().is_selected(control).await? {
        session.click(control).await?;
    }
    Ok(())
}

fn is_consent(text: &str) -> bool {
    let lower = text.to_lowercase();
    CONSENT_TERMS.iter().any(|term| lower.contains(term))
}

/// Index of the option an answer refers to.
///
/// Exact (case-insensitive, trimmed) match wins; otherwise the first option,
/// in list order, whose text contains the answer. An option that merely
/// appears inside the answer is not a match.
pub fn match_option(answer: &str, options: &[String]) -> Option<usize> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return None;
    }
    let normalized: Vec<String> = options.iter().map(|o| o.trim().to_lowercase()).collect();

    if let Some(index) = normalized.iter().position(|o| *o == answer) {
        return Some(index);
    }
    normalized
        .iter()
        .position(|o| o.contains(answer.as_str()))
}
