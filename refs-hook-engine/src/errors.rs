//! Crate-wide error hierarchy for refs-hook-engine.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type HookEngineResult<T> = Result<T, HookEngineError>;

/// Convenient alias for results of remote Bitbucket Server calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Root error type for the refs-hook-engine crate.
#[derive(Debug, Error)]
pub enum HookEngineError {
    /// Bitbucket Server REST failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Hook payload could not be decoded.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Environment configuration problems (missing vars, bad numbers).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source registry file could not be loaded or is inconsistent.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failure of a single remote call to Bitbucket Server.
///
/// `NotFound` is kept apart from everything else: a vanished ref or
/// repository is an expected outcome, the rest are transport problems.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of a server response.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// True when the remote reported that the ref or repository does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }
}

/// Hook payload decoding errors.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body is not valid JSON or misses required fields.
    #[error("can not read hook payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (timeouts, page sizes).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Shared HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    HttpClient(String),
}

/// Source registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry file could not be read.
    #[error("can not read source registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Registry YAML is malformed.
    #[error("invalid source registry yaml: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Registry content failed validation.
    #[error("invalid source registry entry '{id}': {reason}")]
    Invalid { id: String, reason: String },

    /// Two entries share the same id.
    #[error("duplicate source registry id '{0}'")]
    DuplicateId(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for HookEngineError {
    fn from(e: reqwest::Error) -> Self {
        HookEngineError::Provider(ProviderError::from(e))
    }
}

impl From<serde_json::Error> for HookEngineError {
    fn from(e: serde_json::Error) -> Self {
        HookEngineError::Payload(PayloadError::Json(e))
    }
}

// ===== Mapping from reqwest::Error into ProviderError =====

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return ProviderError::from_status(status.as_u16());
        }

        if e.is_decode() {
            return ProviderError::InvalidResponse(e.to_string());
        }

        ProviderError::Network(e.to_string())
    }
}

impl ProviderError {
    /// Maps a non-2xx HTTP status code onto the provider taxonomy.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden,
            404 => ProviderError::NotFound,
            429 => ProviderError::RateLimited,
            500..=599 => ProviderError::Server(code),
            _ => ProviderError::HttpStatus(code),
        }
    }
}
