//! Job discovery - orchestration layer
//!
//! Turns results pages into candidate verdicts:
//! 1. parse every listing tile (missing fields degrade to sentinels)
//! 2. dedupe by `(platform, link)`; the seen-set is updated BEFORE the
//!    blacklist check, so a relisted job is evaluated once per run
//! 3. blacklist: company by exact case-insensitive match, title by
//!    whole-word case-insensitive token
//!
//! Pacing between pages lives in [`PageDwell`].

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use regex::Regex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::{ElementHandle, UiSession};
use crate::models::{
    CandidateKey, FailureKind, JobCandidate, SkipReason, UNKNOWN_COMPANY, UNKNOWN_LOCATION, UNKNOWN_TITLE,
};
use crate::platform::{Board, BoardProfile, SearchQuery};

// ========== blacklist ==========

/// Company and title blacklist
#[derive(Debug, Clone)]
pub struct BlacklistRules {
    /// Trimmed, lowercased company names
    companies: HashSet<String>,
    /// One whole-token pattern per title token
    titles: Vec<(String, Regex)>,
}

impl BlacklistRules {
    pub fn new<S: AsRef<str>>(companies: &[S], title_tokens: &[S]) -> AppResult<Self> {
        let companies = companies
            .iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let mut titles = Vec::with_capacity(title_tokens.len());
        for token in title_tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            // \b would never match around tokens like "c++"
            let pattern = Regex::new(&format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(token))).map_err(|e| {
                AppError::Config(ConfigError::Invalid {
                    key: "title_blacklist".to_string(),
                    reason: format!("'{}': {}", token, e),
                })
            })?;
            titles.push((token.to_string(), pattern));
        }

        Ok(Self { companies, titles })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(&config.company_blacklist, &config.title_blacklist)
    }

    pub fn is_company_blacklisted(&self, company: &str) -> bool {
        self.companies.contains(&company.trim().to_lowercase())
    }

    /// The blacklisted token found in `title`, if any
    pub fn blacklisted_title_token(&self, title: &str) -> Option<&str> {
        self.titles
            .iter()
            .find(|(_, pattern)| pattern.is_match(title))
            .map(|(token, _)| token.as_str())
    }

    pub fn check(&self, candidate: &JobCandidate) -> Option<SkipReason> {
        if self.is_company_blacklisted(&candidate.company) {
            return Some(SkipReason::BlacklistedCompany);
        }
        if self.blacklisted_title_token(&candidate.title).is_some() {
            return Some(SkipReason::BlacklistedTitle);
        }
        None
    }
}

// ========== seen-set ==========

/// Every `(platform, link)` evaluated this run; only ever grows
#[derive(Debug, Default)]
pub struct SeenJobs {
    keys: HashSet<CandidateKey>,
}

impl SeenJobs {
    pub fn contains(&self, key: &CandidateKey) -> bool {
        self.keys.contains(key)
    }

    /// `true` on first sight
    pub fn insert(&mut self, key: CandidateKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ========== verdicts ==========

/// What to do with a freshly parsed candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Skip(SkipReason),
    Fail(FailureKind, String),
}

#[derive(Debug, Clone)]
pub struct Verdict {
    pub candidate: JobCandidate,
    pub decision: Decision,
}

#[derive(Debug, Default)]
pub struct PageScan {
    /// The board reported no (more) jobs
    pub exhausted: bool,
    /// Tiles found on the page, including already-seen ones
    pub tiles: usize,
    /// Verdicts for candidates seen for the first time
    pub verdicts: Vec<Verdict>,
}

/// Job discovery
///
/// Responsibilities:
/// - own the blacklist and the seen-set (single writer)
/// - scan results pages into verdicts
pub struct JobDiscovery {
    board: Board,
    profile: &'static BoardProfile,
    blacklist: BlacklistRules,
    seen: SeenJobs,
    ready_timeout: Duration,
}

impl JobDiscovery {
    pub fn new(board: Board, blacklist: BlacklistRules) -> Self {
        Self {
            board,
            profile: board.profile(),
            blacklist,
            seen: SeenJobs::default(),
            ready_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn seen(&self) -> &SeenJobs {
        &self.seen
    }

    pub fn blacklist(&self) -> &BlacklistRules {
        &self.blacklist
    }

    /// Decide about one candidate. `None` when it was already seen.
    pub fn evaluate(&mut self, candidate: JobCandidate) -> Option<Verdict> {
        if candidate.link.trim().is_empty() {
            return Some(Verdict {
                candidate,
                decision: Decision::Fail(FailureKind::ExtractionFailed, "listing has no link".to_string()),
            });
        }

        // seen-set first, then the blacklist
        if !self.seen.insert(candidate.key()) {
            debug!("Already seen: {}", candidate.link);
            return None;
        }

        let decision = if let Some(reason) = self.blacklist.check(&candidate) {
            Decision::Skip(reason)
        } else if candidate.is_incomplete() {
            Decision::Skip(SkipReason::IncompleteListing)
        } else {
            Decision::Apply
        };
        Some(Verdict { candidate, decision })
    }

    /// Load one results page and evaluate every tile on it
    pub async fn scan(&mut self, session: &UiSession, query: &SearchQuery) -> AppResult<PageScan> {
        let url = self.board.search_url(query);
        info!("🔍 Results page {} for '{}' in '{}'", query.page + 1, query.keywords, query.location);
        session.navigate(&url).await?;
        self.scan_current(session).await
    }

    /// Evaluate the results page currently shown
    pub async fn scan_current(&mut self, session: &UiSession) -> AppResult<PageScan> {
        if let Err(e) = session
            .wait_until_visible_any(self.profile.results_ready, None, self.ready_timeout)
            .await
        {
            if e.is_run_level() {
                return Err(e);
            }
            debug!("Results list not confirmed: {}", e);
        }

        let page_text = session.page_text().await?.to_lowercase();
        if self
            .profile
            .no_jobs_indicators
            .iter()
            .any(|indicator| page_text.contains(indicator))
        {
            info!("No more jobs for this search");
            return Ok(PageScan {
                exhausted: true,
                ..PageScan::default()
            });
        }

        let tiles = self.tiles(session).await?;
        if tiles.is_empty() {
            info!("No listing tiles on this page");
            return Ok(PageScan {
                exhausted: true,
                ..PageScan::default()
            });
        }

        let mut scan = PageScan {
            exhausted: false,
            tiles: tiles.len(),
            verdicts: Vec::new(),
        };
        for tile in tiles {
            let candidate = match self.parse_tile(session, tile).await {
                Ok(candidate) => candidate,
                Err(e) if e.is_run_level() => return Err(e),
                Err(e) => {
                    warn!("⚠️ Tile could not be read: {}", e);
                    continue;
                }
            };
            if let Some(verdict) = self.evaluate(candidate) {
                scan.verdicts.push(verdict);
            }
        }
        debug!(
            "{} tile(s), {} new, {} seen so far",
            scan.tiles,
            scan.verdicts.len(),
            self.seen.len()
        );
        Ok(scan)
    }

    /// Tiles of the first tile selector that matches anything
    async fn tiles(&self, session: &UiSession) -> AppResult<Vec<ElementHandle>> {
        for selector in self.profile.tiles {
            let tiles = session.find_all(selector, None).await?;
            if !tiles.is_empty() {
                return Ok(tiles);
            }
        }
        Ok(Vec::new())
    }

    /// Parse one tile; missing fields fall back to sentinel values
    pub async fn parse_tile(&self, session: &UiSession, tile: ElementHandle) -> AppResult<JobCandidate> {
        let p = self.profile;
        let title = session
            .text_by_selectors(Some(tile), p.tile_title)
            .await?
            .map(|t| first_line(&t))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let company = session
            .text_by_selectors(Some(tile), p.tile_company)
            .await?
            .map(|t| first_line(&t))
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
        let location = session
            .text_by_selectors(Some(tile), p.tile_location)
            .await?
            .map(|t| first_line(&t))
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        let mut href = String::new();
        for selector in p.tile_link {
            if let Some(link) = session.find(selector, Some(tile)).await? {
                if let Some(value) = session.attribute(link, "href").await? {
                    if !value.trim().is_empty() {
                        href = value;
                        break;
                    }
                }
            }
        }
        let link = absolutize(p.base_url, &href, p.link_params);

        let mut candidate = JobCandidate::new(self.board, title, company, location, link);
        candidate.salary = session
            .text_by_selectors(Some(tile), p.tile_salary)
            .await?
            .unwrap_or_default();
        candidate.apply_method = session
            .text_by_selectors(Some(tile), p.tile_apply_method)
            .await?
            .unwrap_or_default();

        for attribute in p.tile_id_attributes {
            if let Some(id) = session.attribute(tile, attribute).await? {
                if !id.trim().is_empty() {
                    candidate.external_id = Some(id.trim().to_string());
                    break;
                }
            }
        }
        if candidate.external_id.is_none() {
            candidate.external_id = job_id_from_link(&candidate.link);
        }
        Ok(candidate)
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Resolve `href` against the board. Fragments and tracking parameters are
/// dropped; the query parameters named in `keep` identify the posting and
/// stay, in their original order.
pub fn absolutize(base_url: &str, href: &str, keep: &[&str]) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    let resolved = Url::parse(base_url).and_then(|base| base.join(href));
    let mut url = match resolved {
        Ok(url) => url,
        Err(e) => {
            debug!("Unusable listing href '{}': {}", href, e);
            return String::new();
        }
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| keep.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.set_fragment(None);
    url.set_query(None);
    if !kept.is_empty() {
        url.query_pairs_mut().extend_pairs(kept);
    }
    url.to_string()
}

/// Job id from `/job/<id>` or `/view/<id>` style paths, else the `jk`
/// query parameter
pub fn job_id_from_link(link: &str) -> Option<String> {
    let re = Regex::new(r"/(?:job|jobs|view)/(\d+)").ok()?;
    if let Some(id) = re.captures(link).and_then(|caps| caps.get(1)) {
        return Some(id.as_str().to_string());
    }
    let url = Url::parse(link).ok()?;
    let id = url
        .query_pairs()
        .find(|(name, value)| name == "jk" && !value.is_empty())
        .map(|(_, value)| value.into_owned());
    id
}

// ========== pacing ==========

/// Minimum wall-clock time per results page, plus a longer pause every
/// `long_pause_every` pages
#[derive(Debug)]
pub struct PageDwell {
    min_dwell: Duration,
    long_pause_every: u32,
    long_pause_secs: (u64, u64),
    pages: u32,
    page_started: Instant,
}

impl PageDwell {
    pub fn new(min_dwell: Duration, long_pause_every: u32, long_pause_secs: (u64, u64)) -> Self {
        Self {
            min_dwell,
            long_pause_every,
            long_pause_secs,
            pages: 0,
            page_started: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_secs(config.page_dwell_secs),
            config.long_pause_every,
            (config.long_pause_min_secs, config.long_pause_max_secs),
        )
    }

    /// Mark the start of a results page
    pub fn start_page(&mut self) {
        self.page_started = Instant::now();
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// How long to wait now that a page is done
    pub fn finish_page(&mut self) -> Duration {
        self.pages += 1;
        let elapsed = self.page_started.elapsed();
        let mut wait = self.min_dwell.saturating_sub(elapsed);

        if self.long_pause_every > 0 && self.pages % self.long_pause_every == 0 {
            let (min, max) = self.long_pause_secs;
            let secs = if min >= max {
                min
            } else {
                rand::thread_rng().gen_range(min..=max)
            };
            info!("💤 {} pages done, pausing {}s", self.pages, secs);
            wait += Duration::from_secs(secs);
        }
        wait
    }
}
