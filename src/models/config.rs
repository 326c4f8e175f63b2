//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

/// Where the list lands after a successful create.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Refetch the current query; the new row shows up if it falls on this page.
    #[default]
    StayOnPage,
    /// Jump to page 1 before refetching.
    FirstPage,
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by every list view.
pub struct ClientConfig {
    pub api_base_url: String,
    /// Only used by the probe binary; views get tokens from the auth context.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub create_policy: CreatePolicy,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Loads `config/default`, the optional `config/{app_env}` override and
/// `APP_`-prefixed environment variables.
#[cfg(feature = "cli")]
pub fn load(app_env: &str) -> Result<ClientConfig, ::config::ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::with_name("config/default"))
        .add_source(::config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(::config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ClientConfig>()
}
