use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Browser / UI driver errors
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
    /// Answer oracle (LLM) errors
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    /// File and persistence errors
    #[error("file error: {0}")]
    File(#[from] FileError),
    /// Document generation errors
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Authentication glue errors
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    /// Anything else (wrapped third-party errors)
    #[error("error: {0}")]
    Other(String),
}

impl AppError {
    /// Faults that must halt the whole run (browser gone, session dropped).
    pub fn is_run_level(&self) -> bool {
        matches!(self, AppError::Driver(e) if e.is_fatal())
    }

    /// Transient UI faults that a bounded retry may clear.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Driver(e) if e.is_transient())
    }
}

/// UI driver errors
#[derive(Debug, Error)]
pub enum DriverError {
    /// Element handle no longer attached to the document
    #[error("stale element reference: {0}")]
    StaleElement(String),
    /// Click landed on another element (overlay, sticky header, ...)
    #[error("click intercepted: {0}")]
    ClickIntercepted(String),
    /// Element exists but cannot be interacted with yet
    #[error("element not interactable: {0}")]
    NotInteractable(String),
    /// Bounded wait expired
    #[error("timed out after {timeout_ms}ms waiting for `{selector}`")]
    Timeout { selector: String, timeout_ms: u64 },
    /// Selector matched nothing where something was required
    #[error("element not found: {selector}")]
    NotFound { selector: String },
    /// Option text not present in a select element
    #[error("option `{option}` not present in select")]
    OptionNotFound { option: String },
    /// Unknown element handle (driver-side bookkeeping)
    #[error("unknown element handle #{0}")]
    UnknownHandle(u64),
    /// Unknown browser context
    #[error("unknown context: {0}")]
    UnknownContext(String),
    /// Browser connection dropped or crashed
    #[error("browser session lost: {0}")]
    SessionLost(String),
    /// Failed to connect or launch the browser
    #[error("cannot connect to browser (port {port}): {message}")]
    ConnectionFailed { port: u16, message: String },
    /// Any other protocol-level failure
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl DriverError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::StaleElement(_)
                | DriverError::ClickIntercepted(_)
                | DriverError::NotInteractable(_)
                | DriverError::Timeout { .. }
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DriverError::SessionLost(_) | DriverError::ConnectionFailed { .. }
        )
    }
}

/// Answer oracle errors
#[derive(Debug, Error)]
pub enum OracleError {
    /// API call failed
    #[error("LLM API call failed (model: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// Response contained no content
    #[error("LLM returned empty content (model: {model})")]
    EmptyContent { model: String },
    /// Oracle answered with something outside the offered options
    #[error("answer `{answer}` is not one of the offered options {options:?}")]
    OptionNotOffered { answer: String, options: Vec<String> },
    /// Section routing produced a section the profile does not know
    #[error("unknown profile section `{0}`")]
    UnknownSection(String),
}

/// File and persistence errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {path}")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to parse TOML {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to parse JSON: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// Document generation errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("template not found: {path}")]
    TemplateMissing { path: String },
    #[error("failed to render {path}: {message}")]
    RenderFailed { path: String, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var_name}: value '{value}' cannot be parsed as {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: String, reason: String },
    #[error("unknown board `{0}`")]
    UnknownBoard(String),
}

// ========== Conversions from common error types ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Driver(DriverError::from(err))
    }
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;
        match err {
            CdpError::Timeout => DriverError::Timeout {
                selector: "<cdp>".to_string(),
                timeout_ms: 0,
            },
            CdpError::NotFound => DriverError::NotFound {
                selector: "<cdp>".to_string(),
            },
            CdpError::Ws(e) => DriverError::SessionLost(e.to_string()),
            CdpError::NoResponse => DriverError::SessionLost("no response from browser".into()),
            CdpError::ChannelSendError(e) => DriverError::SessionLost(e.to_string()),
            other => {
                let message = other.to_string();
                let lower = message.to_lowercase();
                if lower.contains("no node with given id")
                    || lower.contains("could not find node")
                    || lower.contains("cannot find context")
                {
                    DriverError::StaleElement(message)
                } else if lower.contains("not clickable") || lower.contains("intercept") {
                    DriverError::ClickIntercepted(message)
                } else if lower.contains("not interactable") || lower.contains("scroll") {
                    DriverError::NotInteractable(message)
                } else {
                    DriverError::Protocol(message)
                }
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<async_openai::error::OpenAIError> for AppError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AppError::Oracle(OracleError::ApiCallFailed {
            model: String::new(),
            message: err.to_string(),
        })
    }
}

// ========== Convenience constructors ==========

impl AppError {
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    pub fn llm_api_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Oracle(OracleError::ApiCallFailed {
            model: model.into(),
            message: message.into(),
        })
    }

    pub fn not_found(selector: impl Into<String>) -> Self {
        AppError::Driver(DriverError::NotFound {
            selector: selector.into(),
        })
    }

    pub fn timeout(selector: impl Into<String>, timeout_ms: u64) -> Self {
        AppError::Driver(DriverError::Timeout {
            selector: selector.into(),
            timeout_ms,
        })
    }
}

// ========== Result alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
