//! VM supervisor trait and VM handle types.
//!
//! The supervisor boots a microVM for a function revision and reports the
//! guest address the sidecar should route to. How the VM is booted (kernel,
//! rootfs, tap devices, snapshots) is entirely the supervisor's concern.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Boot Request
// =============================================================================

/// Parameters for booting one VM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VmBootRequest {
    /// Guest image reference (e.g. `ghcr.io/acme/fn:v1`).
    pub image: String,
    /// Revision identifier of the function.
    pub revision: String,
    /// Guest memory in MiB.
    pub memory_mib: u32,
    /// Guest vCPU count.
    pub vcpu_count: u32,
}

// =============================================================================
// VM Instance
// =============================================================================

/// Handle to a running VM, as returned by [`VmSupervisor::start_vm`].
///
/// Stored in the [`crate::store::ActiveVmRegistry`] and handed back to
/// [`VmSupervisor::stop_vm`] on teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInstance {
    /// Supervisor-assigned VM identifier.
    pub vm_id: String,
    /// Routable guest address.
    pub guest_address: String,
    /// Revision the VM was booted for.
    pub revision: String,
    /// Image the VM was booted from.
    pub image: String,
    /// When the supervisor reported the VM as booted.
    pub started_at: DateTime<Utc>,
}

impl VmInstance {
    /// Creates a handle for a VM booted from `request`, stamped now.
    pub fn new(
        vm_id: impl Into<String>,
        guest_address: impl Into<String>,
        request: &VmBootRequest,
    ) -> Self {
        Self {
            vm_id: vm_id.into(),
            guest_address: guest_address.into(),
            revision: request.revision.clone(),
            image: request.image.clone(),
            started_at: Utc::now(),
        }
    }
}

// =============================================================================
// Supervisor Trait
// =============================================================================

/// Boots and stops microVMs.
///
/// # Thread Safety
///
/// Called concurrently for unrelated pods. Implementations are responsible
/// for honouring their own deadlines; the shim adds no timeout or retry.
#[async_trait]
pub trait VmSupervisor: Send + Sync {
    /// Boots a VM and returns its handle.
    async fn start_vm(&self, request: VmBootRequest) -> Result<VmInstance>;

    /// Stops a VM previously returned by [`start_vm`](Self::start_vm).
    async fn stop_vm(&self, instance: &VmInstance) -> Result<()>;
}
