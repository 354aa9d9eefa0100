//! Container role classification.

use crate::constants::{SIDECAR_CONTAINER_NAME, WORKLOAD_CONTAINER_NAME};

/// Role of a container within a function pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    /// The user workload, redirected into a VM.
    Workload,
    /// The request-routing sidecar that needs the VM's address.
    Sidecar,
    /// Anything else (control plane, system pods); passed to the stock runtime.
    Other,
}

impl ContainerRole {
    /// Classifies a container by its metadata name. Exact, case-sensitive match.
    #[must_use]
    pub fn classify(container_name: &str) -> Self {
        match container_name {
            WORKLOAD_CONTAINER_NAME => Self::Workload,
            SIDECAR_CONTAINER_NAME => Self::Sidecar,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workload => write!(f, "workload"),
            Self::Sidecar => write!(f, "sidecar"),
            Self::Other => write!(f, "other"),
        }
    }
}
