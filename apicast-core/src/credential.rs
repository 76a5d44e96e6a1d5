use std::fmt;

use crate::error::ApiError;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENWEATHER_API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// An API key read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Read the credential stored in environment variable `var`.
pub fn resolve(var: &str) -> Result<Credential, ApiError> {
    resolve_with(var, |name| std::env::var(name).ok())
}

/// Same as [`resolve`], with the variable lookup supplied by the caller.
pub fn resolve_with<F>(var: &str, lookup: F) -> Result<Credential, ApiError>
where
    F: FnOnce(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(Credential(value)),
        _ => {
            tracing::debug!(var, "credential not present in environment");
            Err(ApiError::CredentialMissing { var: var.to_string() })
        }
    }
}
