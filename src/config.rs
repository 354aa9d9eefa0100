//! Shim configuration.
//!
//! Loaded from YAML (JSON is accepted too, YAML being a superset). Every
//! field has a default taken from [`crate::constants`], so an empty document
//! yields [`ShimConfig::default`].
//!
//! ```yaml
//! guest_port: 50051
//! default_memory_mib: 256
//! default_vcpu_count: 1
//! reap_orphaned_vms: false
//! log_level: info
//! ```

use crate::constants::{
    DEFAULT_GUEST_PORT, DEFAULT_LOG_LEVEL, DEFAULT_MEMORY_MIB, DEFAULT_VCPU_COUNT,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Maximum config file size accepted by [`ShimConfig::load`] (64 KiB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Runtime configuration for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimConfig {
    /// Port published to the sidecar as `GUEST_PORT`.
    pub guest_port: u16,
    /// Memory used when the workload does not set `GUEST_MEM_SIZE_MIB`.
    pub default_memory_mib: u32,
    /// vCPUs used when the workload does not set `GUEST_VCPU_COUNT`.
    pub default_vcpu_count: u32,
    /// Stop the VM when its placeholder container fails to create.
    ///
    /// Off by default: the orphaned VM is left running and only a warning
    /// is logged.
    pub reap_orphaned_vms: bool,
    /// Log level name (`trace`, `debug`, `info`, `warn`, `error`).
    pub log_level: String,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            guest_port: DEFAULT_GUEST_PORT,
            default_memory_mib: DEFAULT_MEMORY_MIB,
            default_vcpu_count: DEFAULT_VCPU_COUNT,
            reap_orphaned_vms: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ShimConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(Error::InvalidConfig {
                field: path.display().to_string(),
                reason: format!("file is {size} bytes, limit is {MAX_CONFIG_FILE_SIZE}"),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded shim config");
        Ok(config)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.guest_port == 0 {
            return Err(invalid("guest_port", "must be non-zero"));
        }
        if self.default_memory_mib == 0 {
            return Err(invalid("default_memory_mib", "must be non-zero"));
        }
        if self.default_vcpu_count == 0 {
            return Err(invalid("default_vcpu_count", "must be non-zero"));
        }
        self.log_level()?;
        Ok(())
    }

    /// Returns the configured level as a `tracing` level.
    pub fn log_level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|e| invalid("log_level", &format!("'{}': {e}", self.log_level)))
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
