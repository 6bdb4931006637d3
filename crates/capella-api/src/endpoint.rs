//! Request description types

use crate::error::{ApiError, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_JAVASCRIPT: &str = "application/javascript";

/// One logical call against the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCfg {
    /// Fully qualified endpoint URL
    pub url: String,

    pub method: Method,

    /// Status code that signals an unambiguous success
    pub success_status: StatusCode,
}

impl EndpointCfg {
    pub fn new(url: impl Into<String>, method: Method, success_status: StatusCode) -> Self {
        Self {
            url: url.into(),
            method,
            success_status,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, Method::GET, StatusCode::OK)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, Method::POST, StatusCode::CREATED)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(url, Method::PUT, StatusCode::NO_CONTENT)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(url, Method::DELETE, StatusCode::ACCEPTED)
    }
}

/// A buffered request body, replayed verbatim on every attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: &'static str,
    bytes: Bytes,
}

impl RequestBody {
    /// Serialize a payload to JSON once, up front
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(Self {
            content_type: CONTENT_TYPE_JSON,
            bytes: Bytes::from(bytes),
        })
    }

    /// Source sent as-is; JSON encoding would escape it into an invalid script
    pub fn javascript(source: impl Into<String>) -> Self {
        Self {
            content_type: CONTENT_TYPE_JAVASCRIPT,
            bytes: Bytes::from(source.into()),
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// Caller-supplied auth material and extra headers
#[derive(Clone, Default)]
pub struct Credentials {
    token: String,
    headers: BTreeMap<String, String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build the per-request header map (authorization plus extras)
    pub(crate) fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|e| {
            ApiError::InvalidHeader {
                name: "Authorization".to_string(),
                reason: e.to_string(),
            }
        })?;
        map.insert(reqwest::header::AUTHORIZATION, auth);

        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            map.insert(header_name, header_value);
        }

        Ok(map)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("headers", &self.headers)
            .finish()
    }
}
