//! Canonical resource lifecycle

use serde::{Deserialize, Serialize};

/// Where a remote resource is in its lifecycle, independent of its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Being created, updated or destroyed
    Pending,
    /// Settled and usable
    Ready,
    /// Reported a failure it will not recover from on its own
    Failed,
    /// Does not exist
    Absent,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Pending => write!(f, "pending"),
            Lifecycle::Ready => write!(f, "ready"),
            Lifecycle::Failed => write!(f, "failed"),
            Lifecycle::Absent => write!(f, "absent"),
        }
    }
}

/// A point-in-time read of a resource's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub lifecycle: Lifecycle,

    /// State as reported by the control plane (e.g. "deploying")
    pub state: String,
}

impl StatusSnapshot {
    pub fn new(lifecycle: Lifecycle, state: impl Into<String>) -> Self {
        Self {
            lifecycle,
            state: state.into(),
        }
    }

    pub fn pending(state: impl Into<String>) -> Self {
        Self::new(Lifecycle::Pending, state)
    }

    pub fn ready(state: impl Into<String>) -> Self {
        Self::new(Lifecycle::Ready, state)
    }

    pub fn failed(state: impl Into<String>) -> Self {
        Self::new(Lifecycle::Failed, state)
    }

    pub fn absent() -> Self {
        Self::new(Lifecycle::Absent, "absent")
    }
}

impl std::fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.lifecycle, self.state)
    }
}
