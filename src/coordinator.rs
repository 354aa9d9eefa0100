//! Container creation coordinator.
//!
//! Entry point for every `CreateContainer` call the orchestrator makes. The
//! container's role decides the path:
//!
//! ```text
//!                       create_container(request)
//!                                 │
//!                     ContainerRole::classify(name)
//!            ┌────────────────────┼─────────────────────┐
//!            ▼                    ▼                     ▼
//!        Workload              Sidecar                Other
//!   ┌──────────────────┐  ┌────────────────┐   ┌────────────────┐
//!   │ extract params   │  │ take PodVmCfg  │   │ stock runtime  │
//!   │ spawn placeholder│  │ inject env     │   │ (verbatim)     │
//!   │ spawn VM boot    │  │ stock runtime  │   └────────────────┘
//!   │ await boot       │  └────────────────┘
//!   │ publish PodVmCfg │
//!   │ await placeholder│
//!   │ register VM      │
//!   └──────────────────┘
//! ```
//!
//! # Workload Path Ordering
//!
//! The placeholder container and the VM boot run as two independently
//! spawned tasks. The boot is awaited first. A failed boot returns
//! immediately; the placeholder task is detached, not aborted, and its
//! result is discarded. On a successful boot the pod's VM config is
//! published *before* the placeholder is awaited, so a sidecar request for
//! the same sandbox can proceed while the placeholder is still being created.
//!
//! # Orphaned VMs
//!
//! A VM whose placeholder fails to create is never registered and therefore
//! has no teardown path. By default it is left running and a warning is
//! logged. Setting [`ShimConfig::reap_orphaned_vms`] stops it instead.

use crate::config::ShimConfig;
use crate::constants::{GUEST_ADDR_ENV, GUEST_PORT_ENV};
use crate::cri::{CreateContainerRequest, CreateContainerResponse, RemoveContainerRequest};
use crate::error::{Error, Result};
use crate::launch;
use crate::role::ContainerRole;
use crate::runtime::StockRuntime;
use crate::store::{ActiveVmRegistry, PodVmConfig, PodVmConfigStore};
use crate::supervisor::{VmInstance, VmSupervisor};
use std::sync::Arc;
use tokio::task::JoinError;

/// Routes container creation between the stock runtime and the VM supervisor.
pub struct Coordinator {
    config: ShimConfig,
    stock: Arc<dyn StockRuntime>,
    supervisor: Arc<dyn VmSupervisor>,
    pod_configs: Arc<PodVmConfigStore>,
    active_vms: Arc<ActiveVmRegistry>,
}

impl Coordinator {
    /// Creates a coordinator with fresh, empty stores.
    pub fn new(
        config: ShimConfig,
        stock: Arc<dyn StockRuntime>,
        supervisor: Arc<dyn VmSupervisor>,
    ) -> Self {
        Self::with_stores(
            config,
            stock,
            supervisor,
            Arc::new(PodVmConfigStore::new()),
            Arc::new(ActiveVmRegistry::new()),
        )
    }

    /// Creates a coordinator over existing stores.
    pub fn with_stores(
        config: ShimConfig,
        stock: Arc<dyn StockRuntime>,
        supervisor: Arc<dyn VmSupervisor>,
        pod_configs: Arc<PodVmConfigStore>,
        active_vms: Arc<ActiveVmRegistry>,
    ) -> Self {
        Self {
            config,
            stock,
            supervisor,
            pod_configs,
            active_vms,
        }
    }

    /// Configuration the coordinator was built with.
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Store of VM configs awaiting their sidecar.
    pub fn pod_configs(&self) -> &Arc<PodVmConfigStore> {
        &self.pod_configs
    }

    /// Registry of VMs backing live workload containers.
    pub fn active_vms(&self) -> &Arc<ActiveVmRegistry> {
        &self.active_vms
    }

    /// Returns the VM backing a workload container.
    ///
    /// # Errors
    ///
    /// [`Error::VmNotFound`] if no VM is registered for the container.
    pub fn vm_for_container(&self, container_id: &str) -> Result<VmInstance> {
        self.active_vms
            .get(container_id)
            .ok_or_else(|| Error::VmNotFound(container_id.to_string()))
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a container, booting a VM for it if it is the workload.
    ///
    /// The response is always the stock runtime's response; the VM is
    /// invisible to the orchestrator.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingEnv`] / [`Error::InvalidEnv`] for a malformed
    ///   workload request, before any side effect
    /// - [`Error::NoVmConfig`] for a sidecar whose workload VM was never published
    /// - [`Error::VmAlreadyRegistered`] if the placeholder's id is already registered
    /// - [`Error::TaskFailed`] if a spawned task panicked
    /// - Collaborator errors, unchanged
    pub async fn create_container(
        &self,
        request: CreateContainerRequest,
    ) -> Result<CreateContainerResponse> {
        let role = ContainerRole::classify(request.container_name());

        tracing::debug!(
            pod_sandbox = %request.pod_sandbox_id,
            container = %request.container_name(),
            role = %role,
            runtime = self.stock.name(),
            "CreateContainer"
        );

        match role {
            ContainerRole::Workload => self.create_workload(request).await,
            ContainerRole::Sidecar => self.create_sidecar(request).await,
            ContainerRole::Other => self.stock.create_container(request).await,
        }
    }

    async fn create_workload(
        &self,
        request: CreateContainerRequest,
    ) -> Result<CreateContainerResponse> {
        let pod_sandbox_id = request.pod_sandbox_id.clone();

        let boot = launch::extract(&request.config, &self.config).inspect_err(|e| {
            tracing::error!(pod_sandbox = %pod_sandbox_id, error = %e, "Invalid workload container config");
        })?;

        tracing::debug!(
            pod_sandbox = %pod_sandbox_id,
            image = %boot.image,
            revision = %boot.revision,
            memory_mib = boot.memory_mib,
            vcpus = boot.vcpu_count,
            "Booting VM for workload container"
        );

        let stock = Arc::clone(&self.stock);
        let placeholder = tokio::spawn(async move { stock.create_container(request).await });

        let supervisor = Arc::clone(&self.supervisor);
        let booting = tokio::spawn(async move { supervisor.start_vm(boot).await });

        // Dropping `placeholder` on these early returns detaches the task.
        let vm = match booting.await {
            Ok(Ok(vm)) => vm,
            Ok(Err(e)) => {
                tracing::error!(pod_sandbox = %pod_sandbox_id, error = %e, "Failed to start VM");
                return Err(e);
            }
            Err(e) => return Err(task_failed("VM boot", e)),
        };

        tracing::info!(
            pod_sandbox = %pod_sandbox_id,
            vm_id = %vm.vm_id,
            guest_address = %vm.guest_address,
            "VM started"
        );

        self.pod_configs.put(
            pod_sandbox_id.clone(),
            PodVmConfig {
                guest_address: vm.guest_address.clone(),
                guest_port: self.config.guest_port,
            },
        );

        let response = match placeholder.await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(pod_sandbox = %pod_sandbox_id, error = %e, "Failed to create placeholder container");
                self.release_orphaned_vm(&pod_sandbox_id, &vm).await;
                return Err(e);
            }
            Err(e) => {
                let err = task_failed("placeholder container", e);
                self.release_orphaned_vm(&pod_sandbox_id, &vm).await;
                return Err(err);
            }
        };

        let vm_id = vm.vm_id.clone();
        self.active_vms
            .insert(response.container_id.clone(), vm)
            .inspect_err(|e| {
                tracing::error!(pod_sandbox = %pod_sandbox_id, error = %e, "Failed to register active VM");
            })?;

        tracing::info!(
            pod_sandbox = %pod_sandbox_id,
            container_id = %response.container_id,
            vm_id = %vm_id,
            "Workload container created"
        );

        Ok(response)
    }

    async fn release_orphaned_vm(&self, pod_sandbox_id: &str, vm: &VmInstance) {
        if !self.config.reap_orphaned_vms {
            tracing::warn!(
                pod_sandbox = %pod_sandbox_id,
                vm_id = %vm.vm_id,
                "Leaving VM running without a registered container"
            );
            return;
        }

        match self.supervisor.stop_vm(vm).await {
            Ok(()) => tracing::info!(pod_sandbox = %pod_sandbox_id, vm_id = %vm.vm_id, "Stopped orphaned VM"),
            Err(e) => tracing::warn!(
                pod_sandbox = %pod_sandbox_id,
                vm_id = %vm.vm_id,
                error = %e,
                "Failed to stop orphaned VM"
            ),
        }
    }

    async fn create_sidecar(
        &self,
        mut request: CreateContainerRequest,
    ) -> Result<CreateContainerResponse> {
        let Some(vm_config) = self.pod_configs.take(&request.pod_sandbox_id) else {
            let err = Error::NoVmConfig {
                pod_sandbox_id: request.pod_sandbox_id.clone(),
            };
            tracing::error!(pod_sandbox = %request.pod_sandbox_id, error = %err, "Sidecar created before workload VM");
            return Err(err);
        };

        tracing::debug!(
            pod_sandbox = %request.pod_sandbox_id,
            guest_address = %vm_config.guest_address,
            guest_port = vm_config.guest_port,
            "Injecting guest address into sidecar"
        );

        let pod_sandbox_id = request.pod_sandbox_id.clone();
        request.config.push_env(GUEST_ADDR_ENV, vm_config.guest_address);
        request.config.push_env(GUEST_PORT_ENV, vm_config.guest_port.to_string());

        self.stock.create_container(request).await.inspect_err(|e| {
            tracing::error!(pod_sandbox = %pod_sandbox_id, error = %e, "Stock runtime failed to create sidecar");
        })
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Removes a container, stopping its VM first if it is a workload.
    ///
    /// The registry entry is only dropped once the VM has stopped. If
    /// stopping fails the error is returned, and both the entry and the stock
    /// container are left in place so a retried removal stops the VM again.
    pub async fn remove_container(&self, request: RemoveContainerRequest) -> Result<()> {
        if let Some(vm) = self.active_vms.get(&request.container_id) {
            self.supervisor.stop_vm(&vm).await.inspect_err(|e| {
                tracing::error!(
                    container_id = %request.container_id,
                    vm_id = %vm.vm_id,
                    error = %e,
                    "Failed to stop VM"
                );
            })?;
            self.active_vms.remove(&request.container_id);
            tracing::info!(container_id = %request.container_id, vm_id = %vm.vm_id, "VM stopped");
        }

        self.stock.remove_container(request).await
    }

    /// Drops an unconsumed VM config for a sandbox being torn down.
    ///
    /// Returns whether an entry was present.
    pub fn forget_pod_sandbox(&self, pod_sandbox_id: &str) -> bool {
        let removed = self.pod_configs.remove(pod_sandbox_id);
        if removed {
            tracing::debug!(pod_sandbox = %pod_sandbox_id, "Dropped unconsumed VM config");
        }
        removed
    }
}

fn task_failed(task: &str, e: JoinError) -> Error {
    tracing::error!(task = task, error = %e, "Creation task did not complete");
    Error::TaskFailed {
        task: task.to_string(),
        reason: e.to_string(),
    }
}
