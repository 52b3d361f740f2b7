//! Application run - orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Initialization**: connect the browser, load the profile, build the
//!    oracle, document generator, answer cache and audit logger
//! 2. **Login**: hand the session to the [`Authenticator`] once
//! 3. **Search loop**: every (position, location) pair, page by page, until
//!    the board runs dry or the page ceiling is hit
//! 4. **Recording**: every verdict lands in the ledger and the audit log
//! 5. **Shutdown**: Ctrl-C aborts the current candidate, restores the
//!    browser, flushes logs and cache, prints the tally
//!
//! Candidates are processed strictly one at a time; the browser session is
//! never shared between concurrent tasks.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ChromeDriver, Pacer, RetryPolicy, UiSession};
use crate::models::{load_profile, ApplicationOutcome, OutcomeKind};
use crate::orchestrator::auth::Authenticator;
use crate::orchestrator::discovery::{BlacklistRules, Decision, JobDiscovery, PageDwell, Verdict};
use crate::platform::SearchQuery;
use crate::services::{
    AnswerCache, AnswerOracle, DocumentGenerator, EventLogger, JsonlEventLogger, LlmOracle, OutcomeLedger,
    TemplateDocumentGenerator,
};
use crate::utils::logging::{log_search_start, log_startup, print_final_stats};
use crate::utils::shutdown::{install_ctrl_c, wait_for_shutdown};
use crate::workflow::{ApplicationCtx, ApplicationFlow, FlowSettings};

/// Outcome tally
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.applied + self.skipped + self.failed
    }

    fn count(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Applied => self.applied += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
    }
}

/// Collaborators an [`App`] is assembled from
pub struct AppParts {
    pub session: UiSession,
    pub oracle: Arc<dyn AnswerOracle>,
    pub documents: Arc<dyn DocumentGenerator>,
    pub cache: AnswerCache,
    pub logger: Arc<dyn EventLogger>,
    pub shutdown: watch::Receiver<bool>,
}

/// Application main structure
pub struct App {
    config: Config,
    session: UiSession,
    discovery: JobDiscovery,
    flow: ApplicationFlow,
    ledger: OutcomeLedger,
    logger: Arc<dyn EventLogger>,
    authenticator: Option<Authenticator>,
    shutdown: watch::Receiver<bool>,
    stats: RunStats,
}

impl App {
    /// Initialize against a real browser
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);
        let profile_table = config.board.profile();

        let (browser, page) = browser::open_browser(&config, profile_table.base_url).await?;
        let driver = Arc::new(ChromeDriver::new(browser, page));
        let session = UiSession::new(
            driver,
            RetryPolicy::new(config.click_max_attempts, 500, 4_000),
            Pacer::new(
                config.typing_delay_min_ms..=config.typing_delay_max_ms,
                1_000..=2_000,
            ),
        );

        let profile = Arc::new(load_profile(&config.profile_path).await?);
        info!("✓ Profile loaded from {}", config.profile_path.display());

        let documents = Arc::new(TemplateDocumentGenerator::new(&config.documents_dir));
        let choices = documents.available().await;
        let oracle = Arc::new(LlmOracle::new(&config, profile).with_document_choices(choices));
        let cache = AnswerCache::load(&config.answer_cache_path).await;
        info!("✓ {} cached answer(s)", cache.len());
        let logger = Arc::new(JsonlEventLogger::start(&config.log_dir)?);

        let authenticator = Authenticator::new(profile_table, &config);
        let parts = AppParts {
            session,
            oracle,
            documents,
            cache,
            logger,
            shutdown: install_ctrl_c(),
        };
        Ok(Self::from_parts(config, parts)?.with_authenticator(authenticator))
    }

    /// Assemble from ready-made collaborators (no login step)
    pub fn from_parts(config: Config, parts: AppParts) -> AppResult<Self> {
        let board = config.board.profile();
        let discovery = JobDiscovery::new(config.board, BlacklistRules::from_config(&config)?)
            .with_ready_timeout(Duration::from_secs(config.surface_timeout_secs));
        let flow = ApplicationFlow::new(
            board,
            parts.oracle,
            parts.documents,
            parts.cache,
            FlowSettings::from(&config),
        )
        .with_shutdown(parts.shutdown.clone());
        let ledger = OutcomeLedger::new(&config.output_dir);

        Ok(Self {
            config,
            session: parts.session,
            discovery,
            flow,
            ledger,
            logger: parts.logger,
            authenticator: None,
            shutdown: parts.shutdown,
            stats: RunStats::default(),
        })
    }

    pub fn with_authenticator(mut self, authenticator: Authenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn discovery(&self) -> &JobDiscovery {
        &self.discovery
    }

    pub fn ledger(&self) -> &OutcomeLedger {
        &self.ledger
    }

    /// Run every search, then flush. Only run-level faults are errors.
    pub async fn run(&mut self) -> AppResult<RunStats> {
        let result = self.run_searches().await;
        if let Err(e) = &result {
            error!("❌ Run aborted: {}", e);
        }
        self.finish().await;
        result.map(|_| self.stats)
    }

    async fn run_searches(&mut self) -> AppResult<()> {
        if let Some(authenticator) = &self.authenticator {
            authenticator.ensure_logged_in(&self.session).await?;
        }

        let mut pairs: Vec<(String, String)> = self
            .config
            .positions
            .iter()
            .flat_map(|p| self.config.locations.iter().map(move |l| (p.clone(), l.clone())))
            .collect();
        pairs.shuffle(&mut rand::thread_rng());

        let mut dwell = PageDwell::from_config(&self.config);
        let total = pairs.len();
        for (i, (position, location)) in pairs.into_iter().enumerate() {
            if self.interrupted() {
                break;
            }
            log_search_start(i + 1, total, &position, &location);
            self.search(&position, &location, &mut dwell).await?;
        }
        Ok(())
    }

    /// One (position, location) pair, page by page until the board runs
    /// out of results or the page ceiling is reached. A page of already
    /// seen listings does not end the search.
    pub async fn search(&mut self, position: &str, location: &str, dwell: &mut PageDwell) -> AppResult<()> {
        for page in 0..self.config.max_search_pages {
            if self.interrupted() {
                return Ok(());
            }
            dwell.start_page();

            let query = SearchQuery {
                keywords: position.to_string(),
                location: location.to_string(),
                page,
                remote_only: self.config.remote_only,
            };
            let scan = self.discovery.scan(&self.session, &query).await?;
            if scan.exhausted {
                break;
            }
            let fresh = scan.verdicts.len();
            info!("📋 {} listing(s), {} new", scan.tiles, fresh);

            let mut verdicts = scan.verdicts.into_iter();
            for verdict in verdicts.by_ref() {
                self.handle(verdict).await?;
                if self.interrupted() {
                    break;
                }
            }
            let left = verdicts.count();
            if left > 0 {
                warn!("⚠️ {} candidate(s) left unprocessed", left);
                return Ok(());
            }

            let wait = dwell.finish_page();
            if !wait.is_zero() {
                info!("⏳ Waiting {}s before the next page", wait.as_secs());
                if self.pause(wait).await {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn handle(&mut self, verdict: Verdict) -> AppResult<()> {
        let Verdict { candidate, decision } = verdict;
        let ctx = ApplicationCtx::new(self.stats.total() + 1, &candidate);

        let outcome = match decision {
            Decision::Skip(reason) => {
                info!("{} ⏭️ Skipped: {}", ctx, reason);
                ApplicationOutcome::skipped(candidate, reason)
            }
            Decision::Fail(kind, detail) => {
                warn!("{} ❌ {}: {}", ctx, kind, detail);
                ApplicationOutcome::failed(candidate, kind, Some(detail))
            }
            Decision::Apply => self.flow.run(&self.session, candidate, &ctx).await?.outcome,
        };
        self.record(outcome).await;
        Ok(())
    }

    async fn record(&mut self, outcome: ApplicationOutcome) {
        if let Err(e) = self.ledger.append(&outcome).await {
            error!("❌ Ledger write failed for {}: {}", outcome.candidate, e);
        }
        self.logger.record(&outcome);
        self.stats.count(outcome.kind);
    }

    /// `true` when interrupted during the pause
    async fn pause(&self, wait: Duration) -> bool {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = sleep(wait) => false,
            _ = wait_for_shutdown(&mut shutdown) => true,
        }
    }

    fn interrupted(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn finish(&mut self) {
        self.logger.shutdown();
        self.flow.finish().await;
        print_final_stats(
            self.stats.applied,
            self.stats.skipped,
            self.stats.failed,
            &self.config.output_dir,
        );
    }
}
