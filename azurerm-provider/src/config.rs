//! Provider configuration
//!
//! Settings come from `ARM_*` environment variables or are built directly
//! by the host.

use std::time::Duration;

use azurerm_core::provider::Timeouts;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_TRANSIENT_FAILURES: u32 = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub subscription_id: String,
    /// Management endpoint without a trailing slash
    pub endpoint: String,
    pub access_token: String,
    /// Refuse to create resources that already exist remotely
    pub require_import: bool,
    pub timeouts: Timeouts,
    pub poll_interval: Duration,
    pub max_transient_failures: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("subscription_id", &self.subscription_id)
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("require_import", &self.require_import)
            .field("timeouts", &self.timeouts)
            .field("poll_interval", &self.poll_interval)
            .field("max_transient_failures", &self.max_transient_failures)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(subscription_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: access_token.into(),
            require_import: true,
            timeouts: Timeouts::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_transient_failures: DEFAULT_MAX_TRANSIENT_FAILURES,
        }
    }

    /// Read `ARM_SUBSCRIPTION_ID`, `ARM_ACCESS_TOKEN`, `ARM_ENDPOINT`,
    /// `ARM_REQUIRE_IMPORT` and `ARM_POLL_INTERVAL_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut config = Self::new(
            required("ARM_SUBSCRIPTION_ID")?,
            required("ARM_ACCESS_TOKEN")?,
        );

        if let Some(endpoint) = lookup("ARM_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        if let Some(value) = lookup("ARM_REQUIRE_IMPORT") {
            config.require_import = parse_bool("ARM_REQUIRE_IMPORT", &value)?;
        }
        if let Some(value) = lookup("ARM_POLL_INTERVAL_SECS") {
            let secs = value.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "ARM_POLL_INTERVAL_SECS",
                value: value.clone(),
                reason: e.to_string(),
            })?;
            config.poll_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_require_import(mut self, require_import: bool) -> Self {
        self.require_import = require_import;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_transient_failures(mut self, max: u32) -> Self {
        self.max_transient_failures = max;
        self
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
