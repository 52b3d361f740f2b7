use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ConfigError};
use crate::platform::Board;

/// Program configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- browser ---
    /// Remote debugging port of an already running browser
    pub browser_debug_port: u16,
    /// Launch a fresh browser instead of attaching to one
    pub launch_browser: bool,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,

    // --- search ---
    pub board: Board,
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    /// Page-count ceiling per (position, location) pair
    pub max_search_pages: u32,
    pub remote_only: bool,

    // --- blacklist ---
    pub company_blacklist: Vec<String>,
    pub title_blacklist: Vec<String>,

    // --- pacing ---
    /// Minimum wall-clock dwell per results page
    pub page_dwell_secs: u64,
    /// Take a longer pause every N pages (0 disables)
    pub long_pause_every: u32,
    pub long_pause_min_secs: u64,
    pub long_pause_max_secs: u64,
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,

    // --- flow ---
    pub max_form_pages: u32,
    pub surface_timeout_secs: u64,
    pub click_max_attempts: u32,
    /// Stop right before the apply click and record the candidate as skipped
    pub skip_apply: bool,

    // --- files ---
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub answer_cache_path: PathBuf,
    pub profile_path: PathBuf,
    pub documents_dir: PathBuf,

    // --- LLM ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,

    // --- auth ---
    pub verification_timeout_secs: u64,
    #[serde(skip)]
    pub email: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,

    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            launch_browser: false,
            headless: false,
            chrome_executable: None,
            board: Board::LinkedIn,
            positions: Vec::new(),
            locations: Vec::new(),
            max_search_pages: 10,
            remote_only: false,
            company_blacklist: Vec::new(),
            title_blacklist: Vec::new(),
            page_dwell_secs: 15 * 60,
            long_pause_every: 5,
            long_pause_min_secs: 50,
            long_pause_max_secs: 90,
            typing_delay_min_ms: 50,
            typing_delay_max_ms: 150,
            max_form_pages: 10,
            surface_timeout_secs: 10,
            click_max_attempts: 3,
            skip_apply: false,
            output_dir: PathBuf::from("output"),
            log_dir: PathBuf::from("log"),
            answer_cache_path: PathBuf::from("answers.json"),
            profile_path: PathBuf::from("profile.toml"),
            documents_dir: PathBuf::from("documents"),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.4,
            verification_timeout_secs: 120,
            email: None,
            password: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// Load `path` if it exists (defaults otherwise), then apply env overrides.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let base = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            Self::from_toml_str(&content).map_err(|e| match e {
                AppError::File(crate::error::FileError::TomlParseFailed { source, .. }) => {
                    AppError::File(crate::error::FileError::TomlParseFailed {
                        path: path.display().to_string(),
                        source,
                    })
                }
                other => other,
            })?
        } else {
            debug!("{} not found, using defaults", path.display());
            Self::default()
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults plus env overrides, without a config file.
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Some(v) = env_parse("BROWSER_DEBUG_PORT")? {
            self.browser_debug_port = v;
        }
        if let Some(v) = env_parse("LAUNCH_BROWSER")? {
            self.launch_browser = v;
        }
        if let Some(v) = env_parse("HEADLESS")? {
            self.headless = v;
        }
        if let Ok(v) = std::env::var("APPLY_BOARD") {
            self.board = v.parse()?;
        }
        if let Some(v) = env_parse("PAGE_DWELL_SECS")? {
            self.page_dwell_secs = v;
        }
        if let Some(v) = env_parse("MAX_SEARCH_PAGES")? {
            self.max_search_pages = v;
        }
        if let Some(v) = env_parse("SKIP_APPLY")? {
            self.skip_apply = v;
        }
        if let Some(v) = env_parse("VERBOSE_LOGGING")? {
            self.verbose_logging = v;
        }
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        self.email = std::env::var("APPLY_EMAIL").ok().or(self.email);
        self.password = std::env::var("APPLY_PASSWORD").ok().or(self.password);
        Ok(self)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.positions.is_empty() {
            return Err(invalid("positions", "at least one position is required"));
        }
        if self.locations.is_empty() {
            return Err(invalid("locations", "at least one location is required"));
        }
        if self.max_form_pages == 0 {
            return Err(invalid("max_form_pages", "must be greater than 0"));
        }
        if self.click_max_attempts == 0 {
            return Err(invalid("click_max_attempts", "must be greater than 0"));
        }
        if self.long_pause_min_secs > self.long_pause_max_secs {
            return Err(invalid("long_pause_min_secs", "must not exceed long_pause_max_secs"));
        }
        if self.typing_delay_min_ms > self.typing_delay_max_ms {
            return Err(invalid("typing_delay_min_ms", "must not exceed typing_delay_max_ms"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

fn env_parse<T: std::str::FromStr>(var_name: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            })
        }),
        Err(_) => Ok(None),
    }
}
