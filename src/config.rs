use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::composer::prompt::{PromptTemplate, DEFAULT_PROMPT};
use crate::kernel::reactor::StalePolicy;

// Runtime settings (endpoint, trigger cadence, prompt shape).

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:1234/v1/completions";
pub const DELIVERY_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarratorConfig {
    pub endpoint: String,
    /// `None` ticks once at startup and then only applies completions.
    pub tick_interval: Option<Duration>,
    /// `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    pub prompt_template: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub stale_policy: StalePolicy,
    pub world_file: Option<PathBuf>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tick_interval: None,
            request_timeout: None,
            prompt_template: DEFAULT_PROMPT.to_string(),
            max_tokens: None,
            temperature: None,
            stale_policy: StalePolicy::default(),
            world_file: None,
        }
    }
}

impl NarratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading through `lookup` instead of the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("NARRATOR_ENDPOINT") {
            config.endpoint = endpoint;
        }
        config.tick_interval = parse_var(&lookup, "NARRATOR_TICK_MS", "milliseconds")?
            .map(Duration::from_millis);
        config.request_timeout = parse_var(&lookup, "NARRATOR_REQUEST_TIMEOUT_MS", "milliseconds")?
            .map(Duration::from_millis);
        if let Some(prompt) = lookup("NARRATOR_PROMPT") {
            config.prompt_template = prompt;
        }
        config.max_tokens = parse_var(&lookup, "NARRATOR_MAX_TOKENS", "a token count")?;
        config.temperature = parse_var(&lookup, "NARRATOR_TEMPERATURE", "a float")?;
        if let Some(policy) = parse_var(&lookup, "NARRATOR_STALE_POLICY", "`discard` or `apply`")? {
            config.stale_policy = policy;
        }
        config.world_file = lookup("NARRATOR_WORLD_FILE").map(PathBuf::from);

        // Zero period would spin the tick loop
        if config.tick_interval == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid {
                var: "NARRATOR_TICK_MS",
                value: "0".to_string(),
                expected: "a positive period",
            });
        }

        Ok(config)
    }

    pub fn prompt(&self) -> PromptTemplate {
        PromptTemplate::new(self.prompt_template.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value, expected }),
    }
}
