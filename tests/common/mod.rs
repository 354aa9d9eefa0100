//! In-memory test doubles for the stock runtime and the VM supervisor.
//!
//! Both record every call and can be told to fail or to hold a call until
//! released, so tests can control the interleaving of the workload path.

#![allow(dead_code)]

use async_trait::async_trait;
use podvm_shim::{
    CreateContainerRequest, CreateContainerResponse, Error, RemoveContainerRequest, Result,
    StockRuntime, VmBootRequest, VmInstance, VmSupervisor, GUEST_IMAGE_ENV, REVISION_ENV,
    WORKLOAD_CONTAINER_NAME,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

// =============================================================================
// Gate
// =============================================================================

/// Holds calls until released. Open (pass-through) until `close` is called.
pub struct Gate {
    enabled: AtomicBool,
    permits: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            permits: Semaphore::new(0),
        }
    }
}

impl Gate {
    pub fn close(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    async fn pass(&self) {
        if self.enabled.load(Ordering::SeqCst) {
            let permit = self.permits.acquire().await.expect("gate semaphore closed");
            permit.forget();
        }
    }
}

// =============================================================================
// Fake Stock Runtime
// =============================================================================

#[derive(Default)]
pub struct FakeStockRuntime {
    pub create_calls: AtomicUsize,
    pub completed_creates: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub requests: Mutex<Vec<CreateContainerRequest>>,
    pub removed: Mutex<Vec<String>>,
    /// Fail creation of containers with this name.
    pub fail_create_for: Mutex<Option<String>>,
    pub fail_remove: AtomicBool,
    /// Return this id for every creation instead of a fresh one.
    pub fixed_id: Mutex<Option<String>>,
    /// Gate applied to workload placeholder creations only.
    pub workload_gate: Gate,
}

impl FakeStockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(name: &str) -> Self {
        let stock = Self::default();
        *stock.fail_create_for.lock().unwrap() = Some(name.to_string());
        stock
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CreateContainerRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StockRuntime for FakeStockRuntime {
    fn name(&self) -> &str {
        "fake-containerd"
    }

    async fn create_container(
        &self,
        request: CreateContainerRequest,
    ) -> Result<CreateContainerResponse> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let name = request.container_name().to_string();
        self.requests.lock().unwrap().push(request);

        if name == WORKLOAD_CONTAINER_NAME {
            self.workload_gate.pass().await;
        }
        self.completed_creates.fetch_add(1, Ordering::SeqCst);

        if self.fail_create_for.lock().unwrap().as_deref() == Some(name.as_str()) {
            return Err(Error::Runtime {
                operation: "create".to_string(),
                reason: format!("cannot create {name}"),
            });
        }

        let id = self
            .fixed_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("ctr-{n}"));
        Ok(CreateContainerResponse::new(id))
    }

    async fn remove_container(&self, request: RemoveContainerRequest) -> Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Error::Runtime {
                operation: "remove".to_string(),
                reason: "busy".to_string(),
            });
        }
        self.removed.lock().unwrap().push(request.container_id);
        Ok(())
    }
}

// =============================================================================
// Fake VM Supervisor
// =============================================================================

#[derive(Default)]
pub struct FakeSupervisor {
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub boots: Mutex<Vec<VmBootRequest>>,
    pub stopped: Mutex<Vec<String>>,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    pub boot_gate: Gate,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let supervisor = Self::default();
        supervisor.fail_start.store(true, Ordering::SeqCst);
        supervisor
    }

    pub fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VmSupervisor for FakeSupervisor {
    async fn start_vm(&self, request: VmBootRequest) -> Result<VmInstance> {
        let n = self.start_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.boots.lock().unwrap().push(request.clone());
        self.boot_gate.pass().await;

        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Error::Supervisor {
                operation: "start".to_string(),
                reason: format!("no capacity for {}", request.revision),
            });
        }
        Ok(VmInstance::new(format!("vm-{n}"), format!("10.0.0.{}", n + 1), &request))
    }

    async fn stop_vm(&self, instance: &VmInstance) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(Error::Supervisor {
                operation: "stop".to_string(),
                reason: "vmm not responding".to_string(),
            });
        }
        self.stopped.lock().unwrap().push(instance.vm_id.clone());
        Ok(())
    }
}

// =============================================================================
// Requests
// =============================================================================

pub fn workload_request(sandbox: &str) -> CreateContainerRequest {
    CreateContainerRequest::new(sandbox, WORKLOAD_CONTAINER_NAME)
        .with_env(GUEST_IMAGE_ENV, "fn:v1")
        .with_env(REVISION_ENV, "rev-7")
}

/// Polls `cond` every millisecond for up to a second.
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    cond()
}
