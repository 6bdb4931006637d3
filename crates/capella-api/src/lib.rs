//! Capella control-plane transport
//!
//! A thin reqwest-based client that executes one logical request against the
//! control plane and hides its transient failures from the caller.
//!
//! # Example
//!
//! ```ignore
//! use capella_api::{Client, Credentials, EndpointCfg};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Client::new(capella_api::DEFAULT_REQUEST_TIMEOUT)?;
//! let cancel = CancellationToken::new();
//! let endpoint = EndpointCfg::get(format!("{}/v4/organizations/{}", host, org_id));
//!
//! let response = client
//!     .execute_with_retry(&cancel, &endpoint, None, &Credentials::bearer(token))
//!     .await?;
//! let org: serde_json::Value = response.json()?;
//! ```

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{Client, DEFAULT_REQUEST_TIMEOUT, Response, RetryPolicy, USER_AGENT};
pub use endpoint::{Credentials, EndpointCfg, RequestBody};
pub use error::{AMBIGUOUS_COMPLETION_CODE, ApiError, FailedResponse, RemoteError, Result};

pub use reqwest::{Method, StatusCode};
