//! Monitored resource kinds

use std::str::FromStr;

use crate::error::CloudError;
use crate::import_id::{CLUSTER_ID, CompositeId, ID, IdError, ORGANIZATION_ID, PROJECT_ID};
use crate::status::Lifecycle;

/// Resource kinds whose lifecycle can be observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Cluster,
    AppService,
    Backup,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Cluster,
        ResourceKind::AppService,
        ResourceKind::Backup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::AppService => "app-service",
            ResourceKind::Backup => "backup",
        }
    }

    /// Fields making up this kind's composite ID, in canonical order
    pub fn id_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Cluster => &[ID, PROJECT_ID, ORGANIZATION_ID],
            ResourceKind::AppService | ResourceKind::Backup => {
                &[ID, CLUSTER_ID, PROJECT_ID, ORGANIZATION_ID]
            }
        }
    }

    /// JSON field of the GET response carrying the state
    pub fn state_field(&self) -> &'static str {
        match self {
            ResourceKind::Cluster | ResourceKind::AppService => "currentState",
            ResourceKind::Backup => "status",
        }
    }

    /// API path, relative to the host, of the resource addressed by `id`
    pub fn path(&self, id: &CompositeId) -> Result<String, IdError> {
        let org = id.require(ORGANIZATION_ID)?;
        let project = id.require(PROJECT_ID)?;
        let resource = id.require(ID)?;

        let path = match self {
            ResourceKind::Cluster => format!(
                "/v4/organizations/{}/projects/{}/clusters/{}",
                org, project, resource
            ),
            ResourceKind::AppService => format!(
                "/v4/organizations/{}/projects/{}/clusters/{}/appservices/{}",
                org,
                project,
                id.require(CLUSTER_ID)?,
                resource
            ),
            ResourceKind::Backup => format!(
                "/v4/organizations/{}/projects/{}/clusters/{}/backups/{}",
                org,
                project,
                id.require(CLUSTER_ID)?,
                resource
            ),
        };
        Ok(path)
    }

    /// Map a reported state onto the canonical lifecycle
    ///
    /// Anything not known to be settled or failed counts as pending.
    pub fn lifecycle(&self, state: &str) -> Lifecycle {
        match self {
            ResourceKind::Cluster => match state {
                "healthy" | "degraded" => Lifecycle::Ready,
                "deploymentFailed" | "destroyFailed" | "peeringFailed" | "rebalanceFailed"
                | "scaleFailed" | "upgradeFailed" | "turningOffFailed" | "turningOnFailed" => {
                    Lifecycle::Failed
                }
                _ => Lifecycle::Pending,
            },
            ResourceKind::AppService => match state {
                "healthy" | "degraded" => Lifecycle::Ready,
                "deploymentFailed" | "destroyFailed" | "scaleFailed" | "upgradeFailed"
                | "turnOffFailed" | "turnOnFailed" => Lifecycle::Failed,
                _ => Lifecycle::Pending,
            },
            ResourceKind::Backup => match state {
                "ready" => Lifecycle::Ready,
                "failed" => Lifecycle::Failed,
                _ => Lifecycle::Pending,
            },
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cluster" => Ok(ResourceKind::Cluster),
            "app-service" | "appservice" | "app_service" => Ok(ResourceKind::AppService),
            "backup" => Ok(ResourceKind::Backup),
            _ => Err(CloudError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_service_id() -> CompositeId {
        CompositeId::new([
            (ID, "a1"),
            (CLUSTER_ID, "c1"),
            (PROJECT_ID, "p1"),
            (ORGANIZATION_ID, "o1"),
        ])
        .unwrap()
    }

    #[test]
    fn test_paths() {
        let cluster = CompositeId::new([(ID, "c1"), (PROJECT_ID, "p1"), (ORGANIZATION_ID, "o1")])
            .unwrap();
        assert_eq!(
            ResourceKind::Cluster.path(&cluster).unwrap(),
            "/v4/organizations/o1/projects/p1/clusters/c1"
        );
        assert_eq!(
            ResourceKind::AppService.path(&app_service_id()).unwrap(),
            "/v4/organizations/o1/projects/p1/clusters/c1/appservices/a1"
        );
        assert_eq!(
            ResourceKind::Backup.path(&app_service_id()).unwrap(),
            "/v4/organizations/o1/projects/p1/clusters/c1/backups/a1"
        );
    }

    #[test]
    fn test_path_requires_cluster_id() {
        let cluster = CompositeId::new([(ID, "b1"), (PROJECT_ID, "p1"), (ORGANIZATION_ID, "o1")])
            .unwrap();
        let err = ResourceKind::Backup.path(&cluster).unwrap_err();
        assert!(matches!(err, IdError::Missing { ref field, .. } if field == CLUSTER_ID));
    }

    #[test]
    fn test_cluster_lifecycle() {
        let kind = ResourceKind::Cluster;
        assert_eq!(kind.lifecycle("healthy"), Lifecycle::Ready);
        assert_eq!(kind.lifecycle("degraded"), Lifecycle::Ready);
        assert_eq!(kind.lifecycle("deploying"), Lifecycle::Pending);
        assert_eq!(kind.lifecycle("turnedOff"), Lifecycle::Pending);
        assert_eq!(kind.lifecycle("peeringFailed"), Lifecycle::Failed);
        assert_eq!(kind.lifecycle("turningOnFailed"), Lifecycle::Failed);
        assert_eq!(kind.lifecycle("somethingNew"), Lifecycle::Pending);
    }

    #[test]
    fn test_app_service_lifecycle() {
        let kind = ResourceKind::AppService;
        assert_eq!(kind.lifecycle("healthy"), Lifecycle::Ready);
        assert_eq!(kind.lifecycle("turnOffFailed"), Lifecycle::Failed);
        // cluster-only failure names are not app service failures
        assert_eq!(kind.lifecycle("peeringFailed"), Lifecycle::Pending);
    }

    #[test]
    fn test_backup_lifecycle() {
        let kind = ResourceKind::Backup;
        assert_eq!(kind.lifecycle("ready"), Lifecycle::Ready);
        assert_eq!(kind.lifecycle("failed"), Lifecycle::Failed);
        assert_eq!(kind.lifecycle("pending"), Lifecycle::Pending);
        assert_eq!(kind.state_field(), "status");
    }

    #[test]
    fn test_from_str() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.name().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!(
            "AppService".parse::<ResourceKind>().unwrap(),
            ResourceKind::AppService
        );
        assert!(matches!(
            "bucket".parse::<ResourceKind>(),
            Err(CloudError::UnknownKind(ref s)) if s == "bucket"
        ));
    }
}
