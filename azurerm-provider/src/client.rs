//! Remote client contract for the Azure Resource Manager API
//!
//! The CRUD engine only talks to Azure through [`ArmClient`], so it can be
//! driven by the HTTP client in production and by an in-memory fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use azurerm_core::identifier::ResourceIdentifier;
use serde::{Deserialize, Serialize};

/// A resource document as returned (and accepted) by ARM
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub properties: serde_json::Value,
}

/// Errors reported by an [`ArmClient`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("resource not found")]
    NotFound,

    #[error("status {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RemoteError::NotFound | RemoteError::Api { status: 404, .. }
        )
    }

    /// Failures worth retrying while polling
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// How a long-running operation reports progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    /// `Azure-AsyncOperation` URL returning a `status` document
    AsyncOperation,
    /// `Location` URL returning 202 until done
    Location,
}

/// Handle to a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub url: String,
    pub kind: PollKind,
    /// Delay requested by the server before the first poll
    pub retry_after: Option<Duration>,
}

/// Result of submitting a mutating request
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    /// Finished synchronously; the body, if the API returned one
    Done(Option<RemoteResource>),
    /// Accepted; poll the handle until it reaches a terminal state
    Accepted(OperationHandle),
}

/// Status of a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress { retry_after: Option<Duration> },
    Succeeded,
    Failed(String),
    Canceled,
}

/// Azure Resource Manager operations used by the resource adapters
#[async_trait]
pub trait ArmClient: Send + Sync {
    /// GET the resource; `RemoteError::NotFound` if it does not exist
    async fn get(
        &self,
        id: &ResourceIdentifier,
        api_version: &str,
    ) -> RemoteResult<RemoteResource>;

    /// PUT (create or replace) the resource
    async fn put(
        &self,
        id: &ResourceIdentifier,
        api_version: &str,
        body: &RemoteResource,
    ) -> RemoteResult<Submitted>;

    /// DELETE the resource
    async fn delete(&self, id: &ResourceIdentifier, api_version: &str) -> RemoteResult<Submitted>;

    /// Query the status of a long-running operation once
    async fn poll(&self, handle: &OperationHandle) -> RemoteResult<OperationStatus>;
}
