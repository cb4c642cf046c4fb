//! Engine configuration read from the process environment.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `HOOK_SOURCES_FILE` | yes | |
//! | `BITBUCKET_TOKEN` | no | |
//! | `BITBUCKET_HTTP_TIMEOUT_SECS` | no | `30` |
//! | `BITBUCKET_PAGE_LIMIT` | no | `100` |

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::git_providers::ProviderConfig;

pub const HOOK_SOURCES_FILE: &str = "HOOK_SOURCES_FILE";
pub const BITBUCKET_TOKEN: &str = "BITBUCKET_TOKEN";
pub const BITBUCKET_HTTP_TIMEOUT_SECS: &str = "BITBUCKET_HTTP_TIMEOUT_SECS";
pub const BITBUCKET_PAGE_LIMIT: &str = "BITBUCKET_PAGE_LIMIT";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// YAML file with registered navigators and sources.
    pub sources_file: PathBuf,
    pub provider: ProviderConfig,
}

impl EngineConfig {
    /// # Errors
    ///
    /// [`ConfigError::MissingVar`] without `HOOK_SOURCES_FILE`,
    /// [`ConfigError::InvalidNumber`] for a malformed timeout or page limit.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ProviderConfig::default();

        let sources_file = PathBuf::from(must_env(&lookup, HOOK_SOURCES_FILE)?);
        let token = non_empty(&lookup, BITBUCKET_TOKEN);
        let timeout = env_opt_u64(&lookup, BITBUCKET_HTTP_TIMEOUT_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let page_limit = env_opt_u32(&lookup, BITBUCKET_PAGE_LIMIT)?.unwrap_or(defaults.page_limit);

        Ok(Self {
            sources_file,
            provider: ProviderConfig {
                token,
                timeout,
                page_limit,
            },
        })
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn must_env<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn env_opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        })
        .transpose()
}

fn env_opt_u32<F>(lookup: &F, name: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        })
        .transpose()
}
