use crate::{
    Config, UsageReport, WeatherObservation, WeatherQuery,
    credential::{self, Credential, OPENAI_API_KEY_VAR, OPENWEATHER_API_KEY_VAR},
    error::ApiError,
    provider::{openai::OpenAiProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

pub mod openai;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::OpenWeather => "openweather",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => OPENAI_API_KEY_VAR,
            ProviderId::OpenWeather => OPENWEATHER_API_KEY_VAR,
        }
    }

    /// Where to obtain an API key.
    pub fn signup_url(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "https://platform.openai.com/api-keys",
            ProviderId::OpenWeather => "https://home.openweathermap.org/",
        }
    }
}

/// Chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Text of the first choice.
    async fn query(&self, text: &str, model: &str) -> Result<String, ApiError>;

    /// First choice plus token counters and the computed cost.
    async fn query_with_usage(&self, text: &str, model: &str) -> Result<UsageReport, ApiError>;
}

/// Current-weather backend.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherObservation, ApiError>;
}

/// Read the provider's credential through `lookup`.
pub fn resolve_credential<F>(id: ProviderId, lookup: F) -> Result<Credential, ApiError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let credential = credential::resolve_with(id.credential_var(), lookup)?;
    debug!(provider = id.as_str(), "credential resolved");
    Ok(credential)
}

/// Construct the chat provider from config, reading its key from the environment.
pub fn chat_provider_from_env(config: &Config) -> Result<Box<dyn ChatProvider>, ApiError> {
    chat_provider_with(config, env_lookup)
}

/// Construct the weather provider from config, reading its key from the environment.
pub fn weather_provider_from_env(config: &Config) -> Result<Box<dyn WeatherProvider>, ApiError> {
    weather_provider_with(config, env_lookup)
}

/// Same as [`chat_provider_from_env`], with the key lookup supplied by the caller.
pub fn chat_provider_with<F>(config: &Config, lookup: F) -> Result<Box<dyn ChatProvider>, ApiError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let credential = resolve_credential(ProviderId::OpenAi, lookup)?;
    Ok(Box::new(OpenAiProvider::new(credential, config.openai.clone())))
}

/// Same as [`weather_provider_from_env`], with the key lookup supplied by the caller.
pub fn weather_provider_with<F>(
    config: &Config,
    lookup: F,
) -> Result<Box<dyn WeatherProvider>, ApiError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let credential = resolve_credential(ProviderId::OpenWeather, lookup)?;
    Ok(Box::new(OpenWeatherProvider::new(credential, config.openweather.clone())))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
