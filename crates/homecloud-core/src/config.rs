//! Configuration types for the agent
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main agent configuration
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the registration service
    pub service_url: String,

    /// Advertisement period in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Shared secret for the registration service
    ///
    /// Its presence selects the authenticated announce variant; when set it
    /// must be non-empty.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Transfer-service settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Capacity of the agent event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl AgentConfig {
    /// Create a new configuration with defaults
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            refresh_interval_secs: default_refresh_interval_secs(),
            secret_key: None,
            transfer: TransferConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the shared secret, selecting the authenticated announce variant
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the advertisement period
    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.service_url.is_empty() {
            return Err(crate::Error::config("Service URL cannot be empty"));
        }

        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Service URL must use HTTP or HTTPS scheme. Got: {}",
                self.service_url
            )));
        }

        if self.refresh_interval_secs == 0 {
            return Err(crate::Error::config("Refresh interval must be > 0"));
        }

        if let Some(key) = &self.secret_key
            && key.is_empty()
        {
            return Err(crate::Error::config("Secret key, when set, cannot be empty"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.transfer.validate()?;

        Ok(())
    }
}

/// Transfer-service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Listen address for the transfer service
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory served to authenticated users
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Path to the JSON user store
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
}

impl TransferConfig {
    /// Validate the transfer-service configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(crate::Error::config(format!(
                "Transfer bind address is not a valid socket address: {}",
                self.bind_addr
            )));
        }

        if self.users_file.as_os_str().is_empty() {
            return Err(crate::Error::config("User store path cannot be empty"));
        }

        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            root_dir: default_root_dir(),
            users_file: default_users_file(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_event_channel_capacity() -> usize {
    64
}

fn default_bind_addr() -> String {
    "0.0.0.0:2121".to_string()
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_users_file() -> PathBuf {
    PathBuf::from("users.json")
}
