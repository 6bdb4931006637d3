pub mod id;
pub mod status;
pub mod wait;

use anyhow::Context;
use capella_api::{Client, Credentials, RetryPolicy};
use capella_cloud::{CompositeId, Lifecycle, ResourceKind, ResourceMonitor};
use capella_config::CapellaConfig;
use colored::{ColoredString, Colorize};
use std::time::Duration;

/// Load the configuration and build a monitor from it
pub fn connect() -> anyhow::Result<(ResourceMonitor, CapellaConfig)> {
    let config = capella_config::load()?;
    if let Some(path) = &config.source {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let policy = RetryPolicy {
        rate_limit_backoff: Duration::from_secs(config.retry.rate_limit_backoff_secs),
        gateway_timeout_backoff: Duration::from_secs(config.retry.gateway_timeout_backoff_secs),
        max_gateway_timeout_retries: config.retry.max_gateway_timeout_retries,
    };
    let client = Client::new(config.request_timeout)
        .context("Failed to build HTTP client")?
        .with_policy(policy);

    let monitor = ResourceMonitor::new(
        client,
        config.host.clone(),
        Credentials::bearer(config.auth_token.clone()),
    );
    Ok((monitor, config))
}

/// Parse a kind name and a composite ID addressed to it
pub fn parse_target(kind: &str, id: &str) -> anyhow::Result<(ResourceKind, CompositeId)> {
    let kind: ResourceKind = kind.parse()?;
    let id = capella_cloud::decode(id, kind.id_fields())
        .with_context(|| format!("Invalid {} ID", kind))?;
    Ok((kind, id))
}

pub fn paint(lifecycle: Lifecycle) -> ColoredString {
    let label = lifecycle.to_string();
    match lifecycle {
        Lifecycle::Ready => label.green().bold(),
        Lifecycle::Failed => label.red().bold(),
        Lifecycle::Pending => label.yellow(),
        Lifecycle::Absent => label.dimmed(),
    }
}
