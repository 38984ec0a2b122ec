//! Shared types for the webterm remote-directory session.
//!
//! This crate defines the boundary between the command dispatch core and
//! whatever transport talks to the directory service: the
//! [`RemoteDirectoryClient`] trait, the collapsed [`RemoteFailure`] error,
//! and the [`HistoryEntry`] record returned by history queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a failed remote operation.
///
/// `Transport` means the call could not complete at all (network fault,
/// client-side error, rejected or expired credential). `Protocol` means the
/// server answered, but with a non-success status or an undecodable success
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transport,
    Protocol,
}

/// A failed remote directory operation.
///
/// Both failure classes collapse into this one type so callers match on a
/// single `Result` instead of probing optional fields. `message` carries the
/// server-supplied error text when one was present in the response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote directory operation failed ({class:?}): {}", .message.as_deref().unwrap_or("no detail"))]
pub struct RemoteFailure {
    pub class: FailureClass,
    pub message: Option<String>,
}

impl RemoteFailure {
    /// The call never completed; any detail is a logging concern, not a
    /// user-facing message.
    pub fn transport() -> Self {
        Self {
            class: FailureClass::Transport,
            message: None,
        }
    }

    /// The server answered with a non-success status.
    pub fn protocol(message: Option<String>) -> Self {
        Self {
            class: FailureClass::Protocol,
            message,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.class == FailureClass::Transport
    }
}

/// One recorded command from the server-side history.
///
/// Ordinals shown to the user are assigned per query by the dispatcher and
/// are never part of the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The command text as originally submitted.
    pub command: String,
    /// Directory that resulted from the command, when the server recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

/// Asynchronous surface of the remote directory service.
///
/// All four operations are authenticated with the session credential held by
/// the implementation. `Ok` carries the operation's success payload; every
/// failure mode, transport or protocol, must surface as [`RemoteFailure`];
/// implementations never panic and never let transport errors escape raw.
#[async_trait]
pub trait RemoteDirectoryClient: Send + Sync {
    /// One-shot startup probe: ask the server for the current directory.
    async fn probe_directory(&self) -> Result<String, RemoteFailure>;

    /// Forward a full command line as a directory-change candidate. The
    /// server is authoritative on what constitutes a valid change.
    async fn change_directory(&self, command_text: &str) -> Result<String, RemoteFailure>;

    /// List the current directory with a free-form options string.
    async fn list_directory(&self, options: &str) -> Result<String, RemoteFailure>;

    /// Fetch the full recorded command history, oldest first.
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, RemoteFailure>;
}

#[async_trait]
impl<T: RemoteDirectoryClient + ?Sized> RemoteDirectoryClient for std::sync::Arc<T> {
    async fn probe_directory(&self) -> Result<String, RemoteFailure> {
        (**self).probe_directory().await
    }

    async fn change_directory(&self, command_text: &str) -> Result<String, RemoteFailure> {
        (**self).change_directory(command_text).await
    }

    async fn list_directory(&self, options: &str) -> Result<String, RemoteFailure> {
        (**self).list_directory(options).await
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, RemoteFailure> {
        (**self).fetch_history().await
    }
}
