//! # podvm-shim
//!
//! **CRI interception shim that runs serverless workloads in microVMs**
//!
//! The shim sits between the orchestrator (kubelet) and the stock container
//! runtime. Function pods are created as usual, except that the user
//! workload container is backed by a dedicated microVM, while its
//! request-routing sidecar and every control-plane container keep running
//! as ordinary containers.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     orchestrator (CreateContainer)                  │
//! └───────────────────────────────┬─────────────────────────────────────┘
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Coordinator                                │
//! │   ContainerRole::classify ─▶ Workload │ Sidecar │ Other             │
//! │                                                                     │
//! │  ┌──────────────────┐   ┌──────────────────┐                        │
//! │  │ PodVmConfigStore │   │ ActiveVmRegistry │   (sharded, per-key)   │
//! │  │ sandbox → addr   │   │ container → VM   │                        │
//! │  └──────────────────┘   └──────────────────┘                        │
//! ├──────────────────────────────┬──────────────────────────────────────┤
//! │  StockRuntime (trait)        │  VmSupervisor (trait)                │
//! │  ordinary containers,        │  boot/stop microVMs,                 │
//! │  workload placeholders       │  report guest address                │
//! └──────────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! # Pod Creation Sequence
//!
//! ```text
//!   kubelet            Coordinator              VmSupervisor    StockRuntime
//!     │ user-container     │                          │               │
//!     │───────────────────▶│── start_vm ─────────────▶│               │
//!     │                    │── create (placeholder) ──┼──────────────▶│
//!     │                    │◀─ VmInstance ────────────│               │
//!     │                    │  publish PodVmConfig     │               │
//!     │                    │◀─ container_id ──────────┼───────────────│
//!     │◀───────────────────│  register VM             │               │
//!     │ queue-proxy        │                          │               │
//!     │───────────────────▶│  take PodVmConfig,       │               │
//!     │                    │  add GUEST_ADDR/PORT ────┼──────────────▶│
//!     │◀───────────────────│◀─────────────────────────┼───────────────│
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use podvm_shim::{Coordinator, CreateContainerRequest, ShimConfig};
//! use std::sync::Arc;
//!
//! let config = ShimConfig::load("/etc/podvm-shim/config.yaml")?;
//! podvm_shim::logging::init(config.log_level()?)?;
//!
//! let coordinator = Coordinator::new(config, Arc::new(stock), Arc::new(supervisor));
//! let response = coordinator.create_container(request).await?;
//! ```

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod cri;
pub mod error;
pub mod launch;
pub mod logging;
pub mod role;
pub mod runtime;
pub mod store;
pub mod supervisor;

// Re-exports
pub use config::ShimConfig;
pub use constants::*;
pub use coordinator::Coordinator;
pub use cri::{
    ContainerConfig, ContainerMetadata, CreateContainerRequest, CreateContainerResponse, KeyValue,
    RemoveContainerRequest,
};
pub use error::{Error, Result};
pub use role::ContainerRole;
pub use runtime::StockRuntime;
pub use store::{ActiveVmRegistry, PodVmConfig, PodVmConfigStore};
pub use supervisor::{VmBootRequest, VmInstance, VmSupervisor};
