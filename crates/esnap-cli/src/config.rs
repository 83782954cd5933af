//! Service configuration loading
//!
//! Sources, later ones winning:
//! 1. `--config <file>` or `./esnap.toml` when present
//! 2. `ESNAP_SERVICE_*` environment variables (a `.env` file is honoured)

use esnap_core::errors::{ExError, ExErrorKind};
use esnap_core_types::Sensitive;
use esnap_engine::service::ServiceConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "esnap.toml";

pub const ENV_URL: &str = "ESNAP_SERVICE_URL";
pub const ENV_USER: &str = "ESNAP_SERVICE_USER";
pub const ENV_PASSWORD: &str = "ESNAP_SERVICE_PASSWORD";
pub const ENV_CA_CERT: &str = "ESNAP_SERVICE_CA_CERT";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    service: ServiceConfig,
}

/// Load the service configuration for one CLI invocation.
///
/// # Errors
///
/// `NotFound` if an explicit `--config` file does not exist, `Io` if it
/// cannot be read, `InvalidInput` if it is not valid TOML.
pub fn load_service_config(explicit: Option<&Path>) -> Result<ServiceConfig, ExError> {
    let _ = dotenvy::dotenv();

    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("load_config")
                .with_path(path.display().to_string())
                .with_message("configuration file does not exist"));
        }
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let config = match path {
        Some(path) => parse_config_file(&path)?,
        None => ServiceConfig::default(),
    };
    Ok(apply_env_overrides(config, |name| std::env::var(name).ok()))
}

fn parse_config_file(path: &Path) -> Result<ServiceConfig, ExError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("load_config")
            .with_path(path.display().to_string())
            .with_message(e.to_string())
    })?;
    parse_config(&raw).map_err(|e| e.with_path(path.display().to_string()))
}

fn parse_config(raw: &str) -> Result<ServiceConfig, ExError> {
    toml::from_str::<ConfigFile>(raw)
        .map(|file| file.service)
        .map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_config")
                .with_message(e.to_string())
        })
}

/// Overlay non-empty environment values on a loaded configuration
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_URL) {
        config.base_url = url;
    }
    if let Some(user) = get(ENV_USER) {
        config.username = Some(user);
    }
    if let Some(password) = get(ENV_PASSWORD) {
        config.password = Some(Sensitive::new(password));
    }
    if let Some(ca) = get(ENV_CA_CERT) {
        config.ca_cert = Some(PathBuf::from(ca));
    }
    config
}
