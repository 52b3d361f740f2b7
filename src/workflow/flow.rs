//! Application flow - workflow layer
//!
//! Drives ONE candidate from its listing to a final state:
//!
//! ```text
//! Discovered → Opened → FormPage(1..n) → Submitting → Applied
//!     │           │            │
//!     └→ Discarded └────────────┴→ Failed
//! ```
//!
//! Flow order:
//! 1. apply-method filter, detail page, apply affordance, enrichment
//! 2. snapshot contexts, click apply, detect where the surface opened
//! 3. per page: classify → resolve → continue/submit → validation check
//! 4. restore the browser to the snapshot, on every exit path
//!
//! Only run-level faults leave this module as errors; everything else ends
//! up in the outcome.

use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, OracleError};
use crate::infrastructure::{ContextId, ElementHandle, UiSession};
use crate::models::{ApplicationOutcome, FailureKind, JobCandidate, SkipReason};
use crate::platform::BoardProfile;
use crate::services::{AnswerCache, AnswerOracle, DocumentGenerator, DocumentSelection};
use crate::utils::shutdown::{never, wait_for_shutdown};
use crate::utils::truncate_text;
use crate::workflow::application_ctx::ApplicationCtx;
use crate::workflow::classifier::FormClassifier;
use crate::workflow::resolver::QuestionResolver;

/// Apply-method wording for postings handled off-board
const EXTERNAL_METHODS: &[&str] = &["external", "redirect", "company site"];

/// Minimum description length before falling back to the page text
const MIN_DESCRIPTION_CHARS: usize = 50;
const MAX_PAGE_TEXT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Discovered,
    Opened,
    FormPage(u32),
    Submitting,
    Applied,
    Discarded(SkipReason),
    Failed(FailureKind),
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowState::Applied | FlowState::Discarded(_) | FlowState::Failed(_)
        )
    }
}

impl Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowState::Discovered => f.write_str("discovered"),
            FlowState::Opened => f.write_str("opened"),
            FlowState::FormPage(n) => write!(f, "form-page({})", n),
            FlowState::Submitting => f.write_str("submitting"),
            FlowState::Applied => f.write_str("applied"),
            FlowState::Discarded(reason) => write!(f, "discarded({})", reason),
            FlowState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Where the application surface appeared after the apply click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// New tab / window
    NewContext,
    /// Same context, different URL
    SamePageNavigation,
    /// Modal or sidebar on the same page
    InPlace,
}

/// Result of one flow run
#[derive(Debug, Clone)]
pub struct FlowReport {
    pub outcome: ApplicationOutcome,
    /// Every state entered, in order
    pub trace: Vec<FlowState>,
    pub mode: Option<SurfaceMode>,
}

impl FlowReport {
    pub fn reached(&self, state: FlowState) -> bool {
        self.trace.contains(&state)
    }

    pub fn final_state(&self) -> Option<FlowState> {
        self.trace.last().copied()
    }
}

#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub max_form_pages: u32,
    pub surface_timeout: Duration,
    pub skip_apply: bool,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            max_form_pages: 10,
            surface_timeout: Duration::from_secs(10),
            skip_apply: false,
        }
    }
}

impl From<&Config> for FlowSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_form_pages: config.max_form_pages,
            surface_timeout: Duration::from_secs(config.surface_timeout_secs),
            skip_apply: config.skip_apply,
        }
    }
}

/// Browser position right before the apply click
#[derive(Debug, Clone)]
struct Origin {
    context: ContextId,
    contexts: HashSet<ContextId>,
    url: String,
}

/// Bookkeeping that outlives an aborted `drive`
#[derive(Debug, Default)]
struct Attempt {
    trace: Vec<FlowState>,
    origin: Option<Origin>,
    mode: Option<SurfaceMode>,
    detail: Option<String>,
}

impl Attempt {
    fn enter(&mut self, state: FlowState) {
        debug!("→ {}", state);
        self.trace.push(state);
    }

    fn fail(&mut self, kind: FailureKind, detail: impl Into<String>) -> FlowState {
        self.detail = Some(detail.into());
        FlowState::Failed(kind)
    }
}

/// An advance affordance and whether it submits
struct Advance {
    element: ElementHandle,
    submits: bool,
    label: String,
}

/// Application flow
///
/// Responsibilities:
/// - own the per-candidate state machine
/// - keep the browser in a known state between candidates
/// - classify every candidate-level fault into a [`FailureKind`]
pub struct ApplicationFlow {
    board: &'static BoardProfile,
    classifier: FormClassifier,
    resolver: QuestionResolver,
    oracle: Arc<dyn AnswerOracle>,
    documents: Arc<dyn DocumentGenerator>,
    settings: FlowSettings,
    shutdown: tokio::sync::watch::Receiver<bool>,
}

impl ApplicationFlow {
    pub fn new(
        board: &'static BoardProfile,
        oracle: Arc<dyn AnswerOracle>,
        documents: Arc<dyn DocumentGenerator>,
        cache: AnswerCache,
        settings: FlowSettings,
    ) -> Self {
        Self {
            board,
            classifier: FormClassifier::new(board),
            resolver: QuestionResolver::new(oracle.clone(), documents.clone(), cache),
            oracle,
            documents,
            settings,
            shutdown: never(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: tokio::sync::watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn resolver(&self) -> &QuestionResolver {
        &self.resolver
    }

    /// Flush the answer cache
    pub async fn finish(&mut self) {
        self.resolver.persist().await;
    }

    /// Run one candidate to a final state
    ///
    /// `Err` only for run-level faults; the browser is restored either way.
    pub async fn run(
        &mut self,
        session: &UiSession,
        candidate: JobCandidate,
        ctx: &ApplicationCtx,
    ) -> AppResult<FlowReport> {
        let mut candidate = candidate;
        let mut attempt = Attempt::default();
        attempt.enter(FlowState::Discovered);

        let mut shutdown = self.shutdown.clone();
        let driven = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => Ok(None),
            result = self.drive(session, &mut candidate, ctx, &mut attempt) => result.map(Some),
        };

        let terminal = match driven {
            Ok(Some(state)) => state,
            Ok(None) => {
                warn!("{} ⚠️ Interrupted", ctx);
                attempt.fail(FailureKind::Interrupted, "interrupted by operator")
            }
            Err(e) if e.is_run_level() => {
                error!("{} ❌ Browser session lost: {}", ctx, e);
                if let Err(restore) = self.restore(session, &attempt).await {
                    debug!("Restore after session loss failed: {}", restore);
                }
                return Err(e);
            }
            Err(e) => {
                let kind = classify_failure(&e);
                warn!("{} ❌ {}: {}", ctx, kind, e);
                attempt.fail(kind, e.to_string())
            }
        };
        attempt.enter(terminal);

        if let Err(e) = self.restore(session, &attempt).await {
            if e.is_run_level() {
                error!("{} ❌ Browser session lost while restoring: {}", ctx, e);
                return Err(e);
            }
            warn!("{} ⚠️ Restore failed ({}), falling back", ctx, e);
            self.recover(session, &attempt, ctx).await?;
        }
        self.resolver.persist().await;

        let outcome = match terminal {
            FlowState::Applied => ApplicationOutcome::applied(candidate),
            FlowState::Discarded(reason) => ApplicationOutcome::skipped(candidate, reason),
            FlowState::Failed(kind) => ApplicationOutcome::failed(candidate, kind, attempt.detail.take()),
            other => ApplicationOutcome::failed(
                candidate,
                FailureKind::Unexpected,
                Some(format!("flow stopped in non-final state {}", other)),
            ),
        };

        Ok(FlowReport {
            outcome,
            trace: attempt.trace,
            mode: attempt.mode,
        })
    }

    async fn drive(
        &mut self,
        session: &UiSession,
        candidate: &mut JobCandidate,
        ctx: &ApplicationCtx,
        attempt: &mut Attempt,
    ) -> AppResult<FlowState> {
        // ========== 1. before opening ==========
        if is_external_method(&candidate.apply_method) {
            info!("{} ⏭️ Applies off-board ({}), skipping", ctx, candidate.apply_method);
            return Ok(FlowState::Discarded(SkipReason::ExternalApplication));
        }

        info!("{} 🔍 Opening posting", ctx);
        session.navigate(&candidate.link).await?;
        if let Err(e) = session
            .wait_until_visible_any(self.board.detail_ready, None, self.settings.surface_timeout)
            .await
        {
            if e.is_run_level() {
                return Err(e);
            }
            warn!("{} ⚠️ Detail view not confirmed ({}), trying anyway", ctx, e);
        }

        let Some((apply, apply_text)) = self.find_apply_affordance(session).await? else {
            return Ok(attempt.fail(FailureKind::ApplyAffordanceMissing, "no apply button on the posting"));
        };
        if !self
            .board
            .easy_apply_keywords
            .iter()
            .any(|k| apply_text.contains(k))
        {
            info!("{} ⏭️ '{}' leads off-board, skipping", ctx, apply_text);
            return Ok(FlowState::Discarded(SkipReason::ExternalApplication));
        }

        self.enrich(session, candidate, ctx).await?;

        if self.settings.skip_apply {
            info!("{} 💡 Dry run, not clicking '{}'", ctx, apply_text);
            return Ok(FlowState::Discarded(SkipReason::DryRun));
        }

        // ========== 2. open the application surface ==========
        let origin = Origin {
            context: session.current_context().await?,
            contexts: session.context_set().await?,
            url: session.current_url().await?,
        };
        attempt.origin = Some(origin.clone());

        info!("{} 🚀 Clicking '{}'", ctx, apply_text);
        session.click(apply).await?;
        attempt.enter(FlowState::Opened);

        let mode = self.follow_surface(session, &origin).await?;
        attempt.mode = Some(mode);
        debug!("{} surface mode: {:?}", ctx, mode);

        if let Err(e) = session
            .wait_until_visible_any(self.board.surfaces, None, self.settings.surface_timeout)
            .await
        {
            if e.is_run_level() {
                return Err(e);
            }
            return Ok(attempt.fail(FailureKind::SurfaceNotFound, e.to_string()));
        }

        // ========== 3. form pages ==========
        for page in 1..=self.settings.max_form_pages {
            attempt.enter(FlowState::FormPage(page));

            // multi-step forms re-render, so the surface is looked up per page
            let surface = session
                .find_first(self.board.surfaces, None)
                .await?
                .map(|(surface, _)| surface);

            let mut fields = self.classifier.classify_page(session, surface).await?;
            info!("{} 📝 Page {}: {} field(s)", ctx, page, fields.len());
            for field in fields.iter_mut() {
                self.resolver.resolve(session, field, candidate, ctx).await?;
                session.settle().await;
            }

            let Some(advance) = self.find_advance(session, surface).await? else {
                return Ok(attempt.fail(
                    FailureKind::NoAdvanceAffordance,
                    format!("no continue or submit button on page {}", page),
                ));
            };

            if advance.submits {
                attempt.enter(FlowState::Submitting);
                info!("{} 📤 Submitting ('{}')", ctx, advance.label);
            } else {
                debug!("{} continuing ('{}')", ctx, advance.label);
            }
            session.click(advance.element).await?;
            session.settle().await;

            let errors = session.visible_errors(self.board.error_selectors, None).await?;
            if !errors.is_empty() {
                warn!(
                    "{} ❌ Validation error on page {}: {}",
                    ctx,
                    page,
                    truncate_text(&errors.join("; "), 200)
                );
                return Ok(attempt.fail(FailureKind::ValidationError, errors.join("; ")));
            }

            if advance.submits {
                info!("{} ✅ Application submitted", ctx);
                return Ok(FlowState::Applied);
            }
        }

        Ok(attempt.fail(
            FailureKind::MaxPagesExceeded,
            format!("still no submit after {} pages", self.settings.max_form_pages),
        ))
    }

    // ========== detail page ==========

    /// Apply button by selector, then by text. Returns its lowercased text.
    async fn find_apply_affordance(&self, session: &UiSession) -> AppResult<Option<(ElementHandle, String)>> {
        if let Some(button) = session.find_first_clickable(self.board.apply_buttons, None).await? {
            let text = session.text(button).await?.to_lowercase();
            let text = if text.is_empty() {
                session
                    .attribute(button, "aria-label")
                    .await?
                    .unwrap_or_default()
                    .to_lowercase()
            } else {
                text
            };
            return Ok(Some((button, text)));
        }
        session
            .find_button_by_text(self.board.apply_button_texts, None)
            .await
    }

    /// Description, recruiter, oracle summary and documents
    async fn enrich(&self, session: &UiSession, candidate: &mut JobCandidate, ctx: &ApplicationCtx) -> AppResult<()> {
        let mut description = String::new();
        for selector in self.board.description {
            if let Some(element) = session.find(selector, None).await? {
                let text = session.text(element).await?;
                if text.chars().count() > MIN_DESCRIPTION_CHARS {
                    description = text;
                    break;
                }
            }
        }
        if description.is_empty() {
            description = session
                .page_text()
                .await?
                .chars()
                .take(MAX_PAGE_TEXT_CHARS)
                .collect();
        }
        candidate.description = description;

        if let Some((recruiter, _)) = session.find_first(self.board.recruiter, None).await? {
            if let Some(href) = session.attribute(recruiter, "href").await? {
                candidate.recruiter_link = href;
            }
        }

        let selection = match self.oracle.parse_job_posting(candidate).await {
            Ok(summary) => {
                debug!("{} normalized title: {}", ctx, summary.normalized_title);
                candidate.normalized_title = Some(summary.normalized_title);
                summary.documents
            }
            Err(e) => {
                warn!("{} ⚠️ Posting summary unavailable: {}", ctx, e);
                DocumentSelection::default()
            }
        };

        let documents = self.documents.generate(candidate, &selection).await;
        candidate.resume_path = documents.resume;
        candidate.cover_letter_path = documents.cover_letter;
        Ok(())
    }

    // ========== surface ==========

    /// Diff the context set around the click; switch into a new context if
    /// one appeared.
    async fn follow_surface(&self, session: &UiSession, origin: &Origin) -> AppResult<SurfaceMode> {
        let mut opened = new_contexts(session, origin).await?;
        if opened.is_empty() {
            // new tabs can take a moment to register
            session.settle().await;
            opened = new_contexts(session, origin).await?;
        }

        if let Some(target) = opened.last() {
            session.switch_context(target).await?;
            return Ok(SurfaceMode::NewContext);
        }
        if session.current_url().await? != origin.url {
            return Ok(SurfaceMode::SamePageNavigation);
        }
        Ok(SurfaceMode::InPlace)
    }

    /// Submit beats continue; selectors beat texts
    async fn find_advance(&self, session: &UiSession, surface: Option<ElementHandle>) -> AppResult<Option<Advance>> {
        if let Some(element) = session.find_first_clickable(self.board.submit_buttons, surface).await? {
            return Ok(Some(Advance {
                element,
                submits: true,
                label: "submit".to_string(),
            }));
        }
        if let Some(element) = session.find_first_clickable(self.board.next_buttons, surface).await? {
            return Ok(Some(Advance {
                element,
                submits: false,
                label: "next".to_string(),
            }));
        }
        if let Some((element, word)) = session.find_button_by_text(self.board.submit_texts, surface).await? {
            return Ok(Some(Advance {
                element,
                submits: true,
                label: word,
            }));
        }
        if let Some((element, word)) = session.find_button_by_text(self.board.next_texts, surface).await? {
            return Ok(Some(Advance {
                element,
                submits: false,
                label: word,
            }));
        }
        Ok(None)
    }

    // ========== restore ==========

    /// Back to the pre-click position: close what was opened, switch back,
    /// then navigate back or dismiss the in-place surface.
    async fn restore(&self, session: &UiSession, attempt: &Attempt) -> AppResult<()> {
        let Some(origin) = &attempt.origin else {
            return Ok(());
        };

        for context in new_contexts(session, origin).await? {
            debug!("Closing context {}", context);
            session.close_context(&context).await?;
        }
        if session.current_context().await? != origin.context {
            session.switch_context(&origin.context).await?;
        }

        if session.current_url().await? != origin.url {
            debug!("Navigating back to {}", origin.url);
            return session.navigate(&origin.url).await;
        }
        self.dismiss_surface(session).await
    }

    /// Fallback after a failed restore: focus the origin (or any surviving)
    /// context, close everything else that was opened, reload the origin
    /// URL. Only run-level faults escape.
    async fn recover(&self, session: &UiSession, attempt: &Attempt, ctx: &ApplicationCtx) -> AppResult<()> {
        let Some(origin) = &attempt.origin else {
            return Ok(());
        };

        let contexts = best_effort(session.driver().list_contexts().await, "listing contexts")?.unwrap_or_default();
        let target = if contexts.contains(&origin.context) {
            Some(origin.context.clone())
        } else {
            contexts
                .iter()
                .find(|c| origin.contexts.contains(*c))
                .or_else(|| contexts.first())
                .cloned()
        };

        for context in &contexts {
            if origin.contexts.contains(context) || Some(context) == target.as_ref() {
                continue;
            }
            best_effort(session.close_context(context).await, "closing context")?;
        }
        if let Some(target) = &target {
            best_effort(session.switch_context(target).await, "switching context")?;
        }
        if best_effort(session.navigate(&origin.url).await, "reloading origin")?.is_none() {
            error!("{} ❌ Browser could not be returned to {}", ctx, origin.url);
        }
        Ok(())
    }

    /// Best-effort: click every visible discard control, in order
    async fn dismiss_surface(&self, session: &UiSession) -> AppResult<()> {
        for selector in self.board.discard_selectors {
            let Some(button) = session.find_first_clickable(&[selector], None).await? else {
                continue;
            };
            match session.click(button).await {
                Ok(()) => session.settle().await,
                Err(e) if e.is_run_level() => return Err(e),
                Err(e) => debug!("Discard click on {} failed: {}", selector, e),
            }
        }
        Ok(())
    }
}

/// Contexts present now but not at `origin`, in driver order
async fn new_contexts(session: &UiSession, origin: &Origin) -> AppResult<Vec<ContextId>> {
    Ok(session
        .driver()
        .list_contexts()
        .await?
        .into_iter()
        .filter(|c| !origin.contexts.contains(c))
        .collect())
}

/// Swallow candidate-level faults of a recovery step
fn best_effort<T>(result: AppResult<T>, step: &str) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_run_level() => Err(e),
        Err(e) => {
            debug!("Recovery step '{}' failed: {}", step, e);
            Ok(None)
        }
    }
}

pub fn is_external_method(apply_method: &str) -> bool {
    let lower = apply_method.to_lowercase();
    EXTERNAL_METHODS.iter().any(|m| lower.contains(m))
}

pub fn classify_failure(err: &AppError) -> FailureKind {
    match err {
        AppError::Oracle(OracleError::OptionNotOffered { .. }) => FailureKind::OracleContractViolation,
        e if e.is_transient() => FailureKind::TransientUiExhausted,
        _ => FailureKind::Unexpected,
    }
}
