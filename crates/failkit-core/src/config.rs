//! Registry configuration
//!
//! Loaded from TOML text or from `FAILKIT_*` environment variables. Unknown or
//! malformed environment values fall back to the default and are logged.

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::policy::StaticMutationPolicy;

pub const ENV_INTERNAL_LOGS: &str = "FAILKIT_INTERNAL_LOGS";
pub const ENV_STATIC_MUTATION: &str = "FAILKIT_STATIC_MUTATION";
pub const ENV_DEFAULT_LOCALE: &str = "FAILKIT_DEFAULT_LOCALE";

/// Fallback when neither the instance nor the registry names a locale
pub const FALLBACK_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Emit library diagnostics (contract violations, static mutations)
    pub internal_logging: bool,
    pub static_mutation: StaticMutationPolicy,
    pub default_locale: Option<String>,
}

impl RegistryConfig {
    /// Parse a TOML document; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` if the text is not valid TOML or a value has
    /// the wrong shape.
    ///
    /// # Example
    /// ```
    /// use failkit_core::config::RegistryConfig;
    /// use failkit_core::policy::StaticMutationPolicy;
    ///
    /// let config = RegistryConfig::from_toml_str("static_mutation = \"allow\"").unwrap();
    /// assert_eq!(config.static_mutation, StaticMutationPolicy::Allow);
    /// assert!(!config.internal_logging);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read `FAILKIT_INTERNAL_LOGS`, `FAILKIT_STATIC_MUTATION` and
    /// `FAILKIT_DEFAULT_LOCALE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_INTERNAL_LOGS) {
            match parse_flag(&raw) {
                Some(flag) => config.internal_logging = flag,
                None => tracing::warn!(
                    component = module_path!(),
                    key = ENV_INTERNAL_LOGS,
                    value = %raw,
                    "ignoring unrecognised boolean"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_STATIC_MUTATION) {
            match raw.parse::<StaticMutationPolicy>() {
                Ok(policy) => config.static_mutation = policy,
                Err(reason) => tracing::warn!(
                    component = module_path!(),
                    key = ENV_STATIC_MUTATION,
                    "{}",
                    reason
                ),
            }
        }

        config.default_locale = lookup(ENV_DEFAULT_LOCALE)
            .map(|raw| raw.trim().to_string())
            .filter(|locale| !locale.is_empty());

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
