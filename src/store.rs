//! Shared coordination state.
//!
//! Two concurrent maps are shared between creation requests:
//!
//! ```text
//!              workload path                       sidecar path
//!              ─────────────                       ────────────
//!   VM booted ──put(sandbox, PodVmConfig)──▶ ┌──────────────────┐
//!                                            │ PodVmConfigStore │ ──take(sandbox)──▶ GUEST_ADDR/PORT
//!                                            └──────────────────┘
//!   placeholder created
//!       ──insert(container_id, VmInstance)─▶ ┌──────────────────┐
//!                                            │ ActiveVmRegistry │ ──remove(container_id)──▶ stop_vm
//!                                            └──────────────────┘
//! ```
//!
//! Both are backed by `DashMap`, which shards keys over independent locks:
//! operations on unrelated sandboxes or containers never contend on a global
//! lock, and every single-key operation is atomic.
//!
//! Neither store is global. The coordinator receives them by `Arc`, so each
//! test (or each shim instance) owns its own.

use crate::error::{Error, Result};
use crate::supervisor::VmInstance;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

// =============================================================================
// Pod VM Config
// =============================================================================

/// Network identity of a freshly booted VM, handed to the pod's sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodVmConfig {
    /// Guest address of the VM.
    pub guest_address: String,
    /// Port the in-VM workload listens on.
    pub guest_port: u16,
}

/// Pod sandbox id → [`PodVmConfig`], written once by the workload path and
/// consumed once by the sidecar path.
///
/// Entries whose sidecar never arrives stay until
/// [`crate::Coordinator::forget_pod_sandbox`] is called for the sandbox.
#[derive(Debug, Default)]
pub struct PodVmConfigStore {
    entries: DashMap<String, PodVmConfig>,
}

impl PodVmConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for a sandbox, returning the previous one.
    pub fn put(&self, pod_sandbox_id: impl Into<String>, config: PodVmConfig) -> Option<PodVmConfig> {
        self.entries.insert(pod_sandbox_id.into(), config)
    }

    /// Returns a copy of the entry for a sandbox without removing it.
    #[must_use]
    pub fn get(&self, pod_sandbox_id: &str) -> Option<PodVmConfig> {
        self.entries.get(pod_sandbox_id).map(|e| e.value().clone())
    }

    /// Removes and returns the entry for a sandbox in one atomic step.
    pub fn take(&self, pod_sandbox_id: &str) -> Option<PodVmConfig> {
        self.entries.remove(pod_sandbox_id).map(|(_, config)| config)
    }

    /// Removes the entry for a sandbox. Returns whether one was present.
    pub fn remove(&self, pod_sandbox_id: &str) -> bool {
        self.entries.remove(pod_sandbox_id).is_some()
    }

    #[must_use]
    pub fn contains(&self, pod_sandbox_id: &str) -> bool {
        self.entries.contains_key(pod_sandbox_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Active VM Registry
// =============================================================================

/// Stock runtime container id → the VM running that workload.
///
/// Write-once per key: a second [`insert`](Self::insert) for the same
/// container id is a protocol violation and is rejected.
#[derive(Debug, Default)]
pub struct ActiveVmRegistry {
    vms: DashMap<String, VmInstance>,
}

impl ActiveVmRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a VM under a container id.
    ///
    /// # Errors
    ///
    /// [`Error::VmAlreadyRegistered`] if the id is already present; the
    /// existing entry is left untouched.
    pub fn insert(&self, container_id: impl Into<String>, vm: VmInstance) -> Result<()> {
        match self.vms.entry(container_id.into()) {
            Entry::Occupied(entry) => Err(Error::VmAlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(vm);
                Ok(())
            }
        }
    }

    /// Returns a copy of the VM registered for a container.
    #[must_use]
    pub fn get(&self, container_id: &str) -> Option<VmInstance> {
        self.vms.get(container_id).map(|e| e.value().clone())
    }

    /// Unregisters and returns the VM for a container.
    pub fn remove(&self, container_id: &str) -> Option<VmInstance> {
        self.vms.remove(container_id).map(|(_, vm)| vm)
    }

    #[must_use]
    pub fn contains(&self, container_id: &str) -> bool {
        self.vms.contains_key(container_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    /// Lists registered container ids (unordered snapshot).
    #[must_use]
    pub fn container_ids(&self) -> Vec<String> {
        self.vms.iter().map(|e| e.key().clone()).collect()
    }
}
