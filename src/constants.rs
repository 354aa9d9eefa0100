//! # Shim Constants
//!
//! Canonical container names, environment variable keys and launch defaults
//! shared by the classifier, the launch-parameter extraction and the sidecar
//! injection path. These constants are the **single source of truth** for the
//! contract between the serverless platform and the shim.
//!
//! ## Contract Overview
//!
//! ```text
//!   orchestrator                          shim
//!   ────────────                          ────
//!   user-container  ──GUEST_IMAGE──────▶  VM boot
//!                   ──K_REVISION───────▶
//!                   ──GUEST_MEM_SIZE_MIB▶ (optional)
//!                   ──GUEST_VCPU_COUNT──▶ (optional)
//!
//!   queue-proxy     ◀──GUEST_ADDR───────  published by the VM boot
//!                   ◀──GUEST_PORT───────
//! ```
//!
//! ## Modification Guidelines
//!
//! The names below are matched byte-for-byte against what the platform's
//! revision controller writes into pod specs. Renaming any of them silently
//! routes workloads back to the stock runtime.

// =============================================================================
// Container Roles
// =============================================================================

/// Canonical name of the workload container that is redirected into a VM.
pub const WORKLOAD_CONTAINER_NAME: &str = "user-container";

/// Canonical name of the request-routing sidecar that fronts the workload.
pub const SIDECAR_CONTAINER_NAME: &str = "queue-proxy";

// =============================================================================
// Environment Variables (read from the workload request)
// =============================================================================

/// Guest image reference to boot. Required.
pub const GUEST_IMAGE_ENV: &str = "GUEST_IMAGE";

/// Revision identifier of the function. Required.
pub const REVISION_ENV: &str = "K_REVISION";

/// Guest memory size in MiB. Optional.
pub const GUEST_MEMORY_MIB_ENV: &str = "GUEST_MEM_SIZE_MIB";

/// Guest vCPU count. Optional.
pub const GUEST_VCPU_COUNT_ENV: &str = "GUEST_VCPU_COUNT";

// =============================================================================
// Environment Variables (injected into the sidecar request)
// =============================================================================

/// Guest address of the booted VM.
pub const GUEST_ADDR_ENV: &str = "GUEST_ADDR";

/// Port the in-VM workload listens on.
pub const GUEST_PORT_ENV: &str = "GUEST_PORT";

// =============================================================================
// Launch Defaults
// =============================================================================

/// Default guest memory when `GUEST_MEM_SIZE_MIB` is absent (256 MiB).
///
/// **Rationale**: Enough for a function runtime plus a minimal guest kernel.
pub const DEFAULT_MEMORY_MIB: u32 = 256;

/// Default guest vCPU count when `GUEST_VCPU_COUNT` is absent.
pub const DEFAULT_VCPU_COUNT: u32 = 1;

/// Well-known port the in-VM workload serves on.
pub const DEFAULT_GUEST_PORT: u16 = 50051;

/// Default log level for [`crate::logging::init`].
pub const DEFAULT_LOG_LEVEL: &str = "info";
