//! Resource status fetching and waiting against the control plane

use crate::error::{CloudError, Result};
use crate::import_id::CompositeId;
use crate::resource::ResourceKind;
use crate::status::StatusSnapshot;
use crate::waiter::{WaitConfig, WaitError, WaitOutcome, WaitTarget, wait_for_status};
use capella_api::{Client, Credentials, EndpointCfg};
use tokio_util::sync::CancellationToken;

/// Reads resource state through a retrying [`Client`]
#[derive(Debug, Clone)]
pub struct ResourceMonitor {
    client: Client,
    host: String,
    credentials: Credentials,
}

impl ResourceMonitor {
    pub fn new(client: Client, host: impl Into<String>, credentials: Credentials) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            client,
            host,
            credentials,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn endpoint(&self, kind: ResourceKind, id: &CompositeId) -> Result<EndpointCfg> {
        Ok(EndpointCfg::get(format!("{}{}", self.host, kind.path(id)?)))
    }

    /// Fetch the current state of one resource
    ///
    /// A resource that does not exist surfaces as a not-found [`CloudError::Api`].
    pub async fn fetch_status(
        &self,
        cancel: &CancellationToken,
        kind: ResourceKind,
        id: &CompositeId,
    ) -> Result<StatusSnapshot> {
        let endpoint = self.endpoint(kind, id)?;
        let response = self
            .client
            .execute_with_retry(cancel, &endpoint, None, &self.credentials)
            .await?;

        let body: serde_json::Value = response.json()?;
        let state = body
            .get(kind.state_field())
            .and_then(|v| v.as_str())
            .ok_or_else(|| CloudError::MissingState {
                kind: kind.to_string(),
                field: kind.state_field().to_string(),
            })?;

        Ok(StatusSnapshot::new(kind.lifecycle(state), state))
    }

    /// Poll a resource until it reaches `target`
    pub async fn wait_for(
        &self,
        cancel: &CancellationToken,
        kind: ResourceKind,
        id: &CompositeId,
        target: WaitTarget,
        config: &WaitConfig,
    ) -> std::result::Result<WaitOutcome, WaitError<CloudError>> {
        // an unaddressable ID would fail every poll
        kind.path(id)
            .map_err(|e| WaitError::Fetch(CloudError::from(e)))?;

        tracing::info!(
            "Waiting for {} {} to become {} (timeout: {:?})",
            kind,
            id,
            target,
            config.timeout
        );

        let outcome =
            wait_for_status(cancel, || self.fetch_status(cancel, kind, id), target, config).await;

        match &outcome {
            Ok(WaitOutcome::Ready(snapshot)) => {
                tracing::info!("{} {} is ready ({})", kind, id, snapshot.state)
            }
            Ok(WaitOutcome::Absent) => tracing::info!("{} {} no longer exists", kind, id),
            Err(e) => tracing::warn!("Waiting for {} {} ended: {}", kind, id, e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import_id::{ID, ORGANIZATION_ID, PROJECT_ID};

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let monitor = ResourceMonitor::new(
            Client::new(capella_api::DEFAULT_REQUEST_TIMEOUT).unwrap(),
            "https://cloudapi.example.com/",
            Credentials::bearer("t"),
        );
        assert_eq!(monitor.host(), "https://cloudapi.example.com");

        let id = CompositeId::new([(ID, "c1"), (PROJECT_ID, "p1"), (ORGANIZATION_ID, "o1")])
            .unwrap();
        let endpoint = monitor.endpoint(ResourceKind::Cluster, &id).unwrap();
        assert_eq!(
            endpoint.url,
            "https://cloudapi.example.com/v4/organizations/o1/projects/p1/clusters/c1"
        );
    }
}
