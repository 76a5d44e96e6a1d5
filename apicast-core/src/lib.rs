//! Core library for the `apicast` CLI.
//!
//! This crate defines:
//! - Credential resolution from the environment
//! - Configuration (endpoints, pricing table, display zone)
//! - Providers for the chat-completion and current-weather APIs
//! - Shared domain models and plain-text report formatting
//!
//! It is used by `apicast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod credential;
pub mod error;
pub mod model;
pub mod pricing;
pub mod provider;
pub mod report;
pub mod units;

pub use config::{Config, OpenAiSettings, OpenWeatherSettings};
pub use credential::Credential;
pub use error::{ApiError, ErrorReason};
pub use model::{UsageReport, WeatherObservation, WeatherQuery};
pub use pricing::{ModelPricing, PricingTable};
pub use provider::{ChatProvider, ProviderId, WeatherProvider};
pub use units::{TemperatureUnit, Units};
