//! Stock runtime trait - the unmodified container runtime behind the shim.
//!
//! Every container that is not redirected into a VM, and the placeholder
//! container that stands in for the workload, is created through this trait.
//! The shim never interprets responses beyond the returned container id.
//!
//! # Lifecycle
//!
//! ```text
//! create_container(request) → container_id → ... → remove_container(container_id)
//! ```
//!
//! # Implementations
//!
//! Production deployments wrap a CRI client connected to the stock
//! containerd socket. Tests use in-memory doubles.

use crate::cri::{CreateContainerRequest, CreateContainerResponse, RemoveContainerRequest};
use crate::error::Result;
use async_trait::async_trait;

/// Client for the stock container runtime.
///
/// Errors returned by implementations are surfaced to the orchestrator
/// unchanged, so they should already describe the failure fully
/// (typically [`crate::Error::Runtime`]).
#[async_trait]
pub trait StockRuntime: Send + Sync {
    /// Returns the runtime name, used in log fields.
    fn name(&self) -> &str;

    /// Creates an ordinary container.
    ///
    /// # Arguments
    ///
    /// * `request` - Request to forward; passed through verbatim
    async fn create_container(
        &self,
        request: CreateContainerRequest,
    ) -> Result<CreateContainerResponse>;

    /// Removes a container previously created through this runtime.
    async fn remove_container(&self, request: RemoveContainerRequest) -> Result<()>;
}
