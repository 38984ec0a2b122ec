//! HTTP implementation of the remote directory service client.
//!
//! Maps the four directory operations onto the service's HTTP surface:
//!
//! 1. GET  `/api/cd`      -> `{ "cwd": string }`
//! 2. POST `/api/cd`      with `{ "command": string }` -> `{ "cwd": string }`
//! 3. GET  `/api/ls`      with query `options` -> `{ "ls": string }`
//! 4. GET  `/api/history` -> `[{ "command": string, "cwd"?: string }]`
//!
//! Every request carries the session's bearer credential. All failure modes
//! collapse into [`RemoteFailure`]; nothing from the HTTP layer escapes raw.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use webterm_protocol::{HistoryEntry, RemoteDirectoryClient, RemoteFailure};

const CD_ENDPOINT: &str = "/api/cd";
const LS_ENDPOINT: &str = "/api/ls";
const HISTORY_ENDPOINT: &str = "/api/history";

/// Configuration for [`HttpRemoteClient`].
///
/// The bearer token comes from an out-of-scope login flow and is opaque
/// here. `request_timeout` is optional; when `None`, requests wait on the
/// server indefinitely.
#[derive(Debug, Clone)]
pub struct RemoteClientConfig {
    /// Base URL of the directory service, without a trailing slash.
    pub base_url: String,
    /// Opaque session credential, sent as `Authorization: Bearer <token>`.
    pub bearer_token: String,
    /// Optional per-request timeout.
    pub request_timeout: Option<Duration>,
}

impl RemoteClientConfig {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// reqwest-backed [`RemoteDirectoryClient`].
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

/// `{ "cwd": ... }` body returned by both cd operations.
#[derive(Debug, Deserialize)]
struct CwdResponse {
    cwd: String,
}

/// `{ "ls": ... }` body returned by the listing operation.
#[derive(Debug, Deserialize)]
struct LsResponse {
    ls: String,
}

/// Directory-change request body.
#[derive(Debug, Serialize)]
struct ChangeDirectoryRequest<'a> {
    command: &'a str,
}

/// Best-effort shape of a non-success body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl HttpRemoteClient {
    /// Build a client from config. Fails only if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: RemoteClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token,
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a prepared request and decode a 2xx body as `T`.
    ///
    /// The three failure modes map onto [`RemoteFailure`] as follows: a
    /// request that never completes is `Transport`; a 401/403 is also
    /// `Transport` (the credential is dead, indistinguishable from a session
    /// that can no longer reach the server); any other non-2xx is `Protocol`
    /// with the body's `error` field as the message when one parses; a 2xx
    /// body that does not decode as `T` is `Protocol` with no message.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteFailure> {
        let response = request
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|err| {
                warn!("{operation}: transport error: {err}");
                RemoteFailure::transport()
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            warn!("{operation}: server answered {status}");
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(RemoteFailure {
                    class: webterm_protocol::FailureClass::Transport,
                    message,
                });
            }
            return Err(RemoteFailure::protocol(message));
        }

        response.json::<T>().await.map_err(|err| {
            warn!("{operation}: undecodable success payload: {err}");
            RemoteFailure::protocol(None)
        })
    }
}

#[async_trait]
impl RemoteDirectoryClient for HttpRemoteClient {
    async fn probe_directory(&self) -> Result<String, RemoteFailure> {
        debug!("probing current directory");
        let body: CwdResponse = self
            .execute("probe_directory", self.http.get(self.endpoint_url(CD_ENDPOINT)))
            .await?;
        Ok(body.cwd)
    }

    async fn change_directory(&self, command_text: &str) -> Result<String, RemoteFailure> {
        debug!("forwarding directory-change candidate");
        let request = self
            .http
            .post(self.endpoint_url(CD_ENDPOINT))
            .json(&ChangeDirectoryRequest {
                command: command_text,
            });
        let body: CwdResponse = self.execute("change_directory", request).await?;
        Ok(body.cwd)
    }

    async fn list_directory(&self, options: &str) -> Result<String, RemoteFailure> {
        debug!("listing directory with options {options:?}");
        let request = self
            .http
            .get(self.endpoint_url(LS_ENDPOINT))
            .query(&[("options", options)]);
        let body: LsResponse = self.execute("list_directory", request).await?;
        Ok(body.ls)
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, RemoteFailure> {
        debug!("fetching command history");
        self.execute("fetch_history", self.http.get(self.endpoint_url(HISTORY_ENDPOINT)))
            .await
    }
}
