//! Control-plane API error types

use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code the control plane puts in a `504` body when the request may
/// already have been applied (index DDL racing the gateway timeout).
pub const AMBIGUOUS_COMPLETION_CODE: i64 = 7001;

/// Error payload returned by the control plane alongside non-success statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteError {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub hint: String,

    #[serde(default)]
    pub http_status_code: u16,

    #[serde(default)]
    pub message: String,
}

impl RemoteError {
    /// Decode a response body, returning `None` unless it is a JSON object
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

/// Everything the caller needs to correlate a failed exchange with the
/// control plane's own diagnostics.
#[derive(Debug, Clone)]
pub struct FailedResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub remote: Option<RemoteError>,
}

impl FailedResponse {
    pub(crate) fn new(status: StatusCode, body: Bytes) -> Self {
        let remote = RemoteError::from_body(&body);
        Self {
            status,
            body,
            remote,
        }
    }

    /// Raw body as (lossy) UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl std::fmt::Display for FailedResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status: {}, body: {}", self.status.as_u16(), self.body_text())
    }
}

/// Control-plane API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The exchange failed before a status code was obtained
    #[error("error executing request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    /// `504` carrying code 7001: the side effect may already have landed,
    /// so the request was not replayed
    #[error("gateway timeout, operation may have completed ({0})")]
    AmbiguousCompletion(FailedResponse),

    #[error("resource not found ({0})")]
    NotFound(FailedResponse),

    #[error("unexpected status, expected: {expected} ({response})")]
    UnexpectedStatus {
        expected: u16,
        response: FailedResponse,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_ambiguous_completion(&self) -> bool {
        matches!(self, ApiError::AmbiguousCompletion(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Status code of the failed exchange, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    /// The failed response, when one was received
    pub fn response(&self) -> Option<&FailedResponse> {
        match self {
            ApiError::AmbiguousCompletion(r) | ApiError::NotFound(r) => Some(r),
            ApiError::UnexpectedStatus { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Decoded control-plane error payload, when the body carried one
    pub fn remote(&self) -> Option<&RemoteError> {
        self.response().and_then(|r| r.remote.as_ref())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
