//! Connection parameters for the backup-producing service.

use esnap_core::errors::{ExError, ExErrorKind};
use esnap_core_types::Sensitive;
use esnap_store::errors::Result;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Explicit service configuration handed to [`super::HttpBackupService::new`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// e.g. `https://es.internal:9200`
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Sensitive<String>>,
    /// PEM bundle trusted in addition to the system roots
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Snapshot creation waits for completion, so this is generous
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            ca_cert: None,
            accept_invalid_certs: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// `base_url` with any trailing slash removed
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Check the configuration is usable before building a client.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if no URL is set, the URL is not http(s), or a password
    /// is given without a username.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("service_config")
                .with_message(message.to_string())
        };

        if self.base_url.trim().is_empty() {
            return Err(invalid("backup service URL is not configured"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("backup service URL must start with http:// or https://"));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(invalid("a password is configured without a username"));
        }
        Ok(())
    }
}
