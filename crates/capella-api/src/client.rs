//! Retrying control-plane client
//!
//! Every call goes through [`Client::execute_with_retry`], which replays the
//! buffered request on the transient conditions the control plane signals by
//! status code:
//!
//! - `429 Too Many Requests`: wait for `Retry-After` seconds (or the previous
//!   backoff when the header is absent or unusable) and retry, without limit.
//! - `504 Gateway Timeout`: retry with a fixed backoff up to
//!   [`RetryPolicy::max_gateway_timeout_retries`] times, unless the body
//!   carries code `7001`, which is surfaced as
//!   [`ApiError::AmbiguousCompletion`] without a retry.
//!
//! Network failures are never retried here.

use crate::endpoint::{Credentials, EndpointCfg, RequestBody};
use crate::error::{AMBIGUOUS_COMPLETION_CODE, ApiError, FailedResponse, Result};
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const USER_AGENT: &str = concat!("capella-flow/", env!("CARGO_PKG_VERSION"));

/// Default per-attempt HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backoff and attempt limits for the transient conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Backoff before the first rate-limit retry when no `Retry-After` is given
    pub rate_limit_backoff: Duration,

    /// Fixed backoff between gateway-timeout retries
    pub gateway_timeout_backoff: Duration,

    /// Gateway-timeout retries after the first attempt
    pub max_gateway_timeout_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_backoff: Duration::from_secs(2),
            gateway_timeout_backoff: Duration::from_secs(2),
            max_gateway_timeout_retries: 5,
        }
    }
}

/// A successful exchange, body fully buffered
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Result of one attempt
#[derive(Debug)]
enum Outcome {
    Success(Response),
    Retryable(RetryReason),
    Terminal(ApiError),
}

#[derive(Debug)]
enum RetryReason {
    RateLimited { retry_after: Option<Duration> },
    GatewayTimeout(FailedResponse),
}

/// Control-plane HTTP client
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl Client {
    /// Create a client whose individual attempts time out after `request_timeout`
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::from_http(http))
    }

    /// Wrap an existing reqwest client
    pub fn from_http(http: reqwest::Client) -> Self {
        Self {
            http,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a request, retrying rate limits and gateway timeouts
    ///
    /// Returns the response when its status equals `endpoint.success_status`.
    /// A `404` becomes [`ApiError::NotFound`]; any other status becomes
    /// [`ApiError::UnexpectedStatus`] carrying the response body.
    pub async fn execute_with_retry(
        &self,
        cancel: &CancellationToken,
        endpoint: &EndpointCfg,
        body: Option<&RequestBody>,
        credentials: &Credentials,
    ) -> Result<Response> {
        let headers = credentials.header_map()?;
        let mut rate_limit_backoff = self.policy.rate_limit_backoff;
        let mut gateway_retries = 0u32;

        loop {
            let outcome = self.attempt(cancel, endpoint, body, &headers).await?;

            let backoff = match outcome {
                Outcome::Success(response) => return Ok(response),
                Outcome::Terminal(err) => return Err(err),
                Outcome::Retryable(RetryReason::RateLimited { retry_after }) => {
                    rate_limit_backoff = retry_after.unwrap_or(rate_limit_backoff);
                    tracing::debug!(
                        "API rate limited: {} {}, retrying in {:?}",
                        endpoint.method,
                        endpoint.url,
                        rate_limit_backoff
                    );
                    rate_limit_backoff
                }
                Outcome::Retryable(RetryReason::GatewayTimeout(response)) => {
                    if gateway_retries >= self.policy.max_gateway_timeout_retries {
                        tracing::warn!(
                            "Gateway timeout on {} {} after {} retries, giving up",
                            endpoint.method,
                            endpoint.url,
                            gateway_retries
                        );
                        return Err(ApiError::UnexpectedStatus {
                            expected: endpoint.success_status.as_u16(),
                            response,
                        });
                    }
                    gateway_retries += 1;
                    tracing::warn!(
                        "Gateway timeout on {} {}, retry {}/{} in {:?}",
                        endpoint.method,
                        endpoint.url,
                        gateway_retries,
                        self.policy.max_gateway_timeout_retries,
                        self.policy.gateway_timeout_backoff
                    );
                    self.policy.gateway_timeout_backoff
                }
            };

            sleep_or_cancel(cancel, backoff).await?;
        }
    }

    /// One request/response exchange; the body is drained before returning
    async fn attempt(
        &self,
        cancel: &CancellationToken,
        endpoint: &EndpointCfg,
        body: Option<&RequestBody>,
        headers: &HeaderMap,
    ) -> Result<Outcome> {
        let mut headers = headers.clone();
        let mut request = self.http.request(endpoint.method.clone(), &endpoint.url);

        // the payload's own type replaces any caller-supplied Content-Type
        if let Some(body) = body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
            request = request.body(body.bytes().clone());
        }
        let request = request.headers(headers);

        let response = or_cancel(cancel, request.send()).await??;
        let status = response.status();
        let response_headers = response.headers().clone();
        let response_body = or_cancel(cancel, response.bytes()).await??;

        Ok(classify(
            endpoint.success_status,
            status,
            response_headers,
            response_body,
        ))
    }
}

/// Decide what to do with a fully-read response
fn classify(success_status: StatusCode, status: StatusCode, headers: HeaderMap, body: Bytes) -> Outcome {
    if status == success_status {
        return Outcome::Success(Response {
            status,
            headers,
            body,
        });
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => Outcome::Retryable(RetryReason::RateLimited {
            retry_after: parse_retry_after(&headers),
        }),
        StatusCode::GATEWAY_TIMEOUT => {
            let response = FailedResponse::new(status, body);
            if is_ambiguous_completion(&response.body) {
                Outcome::Terminal(ApiError::AmbiguousCompletion(response))
            } else {
                Outcome::Retryable(RetryReason::GatewayTimeout(response))
            }
        }
        StatusCode::NOT_FOUND => Outcome::Terminal(ApiError::NotFound(FailedResponse::new(status, body))),
        _ => Outcome::Terminal(ApiError::UnexpectedStatus {
            expected: success_status.as_u16(),
            response: FailedResponse::new(status, body),
        }),
    }
}

/// `Retry-After` as a positive number of seconds; anything else is ignored
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

/// Whether a `504` body carries the non-retryable code
fn is_ambiguous_completion(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(serde_json::Value::as_i64))
        == Some(AMBIGUOUS_COMPLETION_CODE)
}

async fn or_cancel<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        out = fut => Ok(out),
    }
}

async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> Result<()> {
    or_cancel(cancel, tokio::time::sleep(duration)).await
}
