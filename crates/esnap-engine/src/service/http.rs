//! reqwest-backed [`BackupService`]

use esnap_core::errors::{ExError, ExErrorKind};
use esnap_store::errors::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::time::Duration;

use super::{BackupService, CreateSnapshotRequest, RemoteIndex, RemoteSnapshot, ServiceConfig};

/// Blocking HTTP client for the backup service
pub struct HttpBackupService {
    client: Client,
    config: ServiceConfig,
}

impl HttpBackupService {
    /// Build a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an unusable configuration or CA bundle, `Io` if the
    /// CA bundle cannot be read.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("esnap/", env!("CARGO_PKG_VERSION")));

        if let Some(ca_path) = &config.ca_cert {
            let pem = fs::read(ca_path)
                .map_err(|e| esnap_store::errors::io_error_at("load_ca_cert", ca_path, e))?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("load_ca_cert")
                    .with_path(ca_path.display().to_string())
                    .with_message(e.to_string())
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("build_http_client")
                .with_message(e.to_string())
        })?;

        Ok(Self { client, config })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(username) => request.basic_auth(
                username,
                self.config.password.as_ref().map(|p| p.expose().as_str()),
            ),
            None => request,
        }
    }

    fn send(&self, op: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().map_err(|e| {
            ExError::new(ExErrorKind::RemoteService)
                .with_op(op.to_string())
                .with_message(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = body_or_placeholder(response.text());
            return Err(ExError::new(ExErrorKind::RemoteService)
                .with_op(op.to_string())
                .with_status(status.as_u16())
                .with_message(body));
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, op: &str, path: &str) -> Result<T> {
        let url = self.config.endpoint(path);
        tracing::debug!(url = %url, "GET");
        let response = self.send(op, self.client.get(&url))?;
        response.json::<T>().map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op(op.to_string())
                .with_message(format!("unexpected response from {}: {}", url, e))
        })
    }
}

/// Error bodies are reported verbatim; a body that cannot be read is named
/// as such rather than dropped.
fn body_or_placeholder<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    match body {
        Ok(text) => text,
        Err(e) => format!("<unreadable body: {}>", e),
    }
}

fn check_segment(op: &str, what: &str, value: &str) -> Result<()> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '/' | '?' | '#' | '%'));
    if ok {
        Ok(())
    } else {
        Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op(op.to_string())
            .with_message(format!("invalid {}: {:?}", what, value)))
    }
}

impl BackupService for HttpBackupService {
    fn list_snapshots(&self, repository: &str) -> Result<Vec<RemoteSnapshot>> {
        check_segment("list_remote_snapshots", "repository", repository)?;
        self.get_json(
            "list_remote_snapshots",
            &format!("_cat/snapshots/{}?format=json", repository),
        )
    }

    fn create_snapshot(
        &self,
        repository: &str,
        name: &str,
        request: &CreateSnapshotRequest,
    ) -> Result<Value> {
        check_segment("create_remote_snapshot", "repository", repository)?;
        check_segment("create_remote_snapshot", "snapshot name", name)?;

        let url = self.config.endpoint(&format!(
            "_snapshot/{}/{}?wait_for_completion=true",
            repository, name
        ));
        tracing::debug!(url = %url, indices = %request.indices, "PUT");
        let response = self.send("create_remote_snapshot", self.client.put(&url).json(request))?;
        response.json::<Value>().map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("create_remote_snapshot")
                .with_message(e.to_string())
        })
    }

    fn list_indices(&self) -> Result<Vec<RemoteIndex>> {
        self.get_json("list_remote_indices", "_cat/indices?format=json")
    }
}
