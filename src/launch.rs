//! Launch parameter extraction for workload containers.
//!
//! The platform passes VM launch parameters to the shim as environment
//! variables on the workload container:
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GUEST_IMAGE` | yes | - |
//! | `K_REVISION` | yes | - |
//! | `GUEST_MEM_SIZE_MIB` | no | `default_memory_mib` (256) |
//! | `GUEST_VCPU_COUNT` | no | `default_vcpu_count` (1) |
//!
//! The first entry with a matching key wins. Numeric values that fail to
//! parse as `u32` are rejected rather than defaulted.

use crate::config::ShimConfig;
use crate::constants::{GUEST_IMAGE_ENV, GUEST_MEMORY_MIB_ENV, GUEST_VCPU_COUNT_ENV, REVISION_ENV};
use crate::cri::ContainerConfig;
use crate::error::{Error, Result};
use crate::supervisor::VmBootRequest;

/// Extracts the VM boot parameters from a workload container config.
///
/// # Errors
///
/// - [`Error::MissingEnv`] if the image or revision is absent or empty
/// - [`Error::InvalidEnv`] if memory or vCPU count is not an unsigned integer
pub fn extract(config: &ContainerConfig, defaults: &ShimConfig) -> Result<VmBootRequest> {
    Ok(VmBootRequest {
        image: required(config, GUEST_IMAGE_ENV)?,
        revision: required(config, REVISION_ENV)?,
        memory_mib: numeric(config, GUEST_MEMORY_MIB_ENV, defaults.default_memory_mib)?,
        vcpu_count: numeric(config, GUEST_VCPU_COUNT_ENV, defaults.default_vcpu_count)?,
    })
}

fn required(config: &ContainerConfig, key: &str) -> Result<String> {
    match config.env(key) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Error::MissingEnv {
            key: key.to_string(),
        }),
    }
}

fn numeric(config: &ContainerConfig, key: &str, default: u32) -> Result<u32> {
    let Some(value) = config.env(key) else {
        return Ok(default);
    };

    value.parse::<u32>().map_err(|e| Error::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cri::CreateContainerRequest;

    fn workload() -> CreateContainerRequest {
        CreateContainerRequest::new("sb", "user-container")
            .with_env(GUEST_IMAGE_ENV, "fn:v1")
            .with_env(REVISION_ENV, "rev-7")
    }

    #[test]
    fn test_defaults_applied() {
        let req = workload();
        let boot = extract(&req.config, &ShimConfig::default()).unwrap();
        assert_eq!(
            boot,
            VmBootRequest {
                image: "fn:v1".to_string(),
                revision: "rev-7".to_string(),
                memory_mib: 256,
                vcpu_count: 1,
            }
        );
    }

    #[test]
    fn test_configured_defaults_applied() {
        let defaults = ShimConfig {
            default_memory_mib: 1024,
            default_vcpu_count: 2,
            ..ShimConfig::default()
        };
        let boot = extract(&workload().config, &defaults).unwrap();
        assert_eq!((boot.memory_mib, boot.vcpu_count), (1024, 2));
    }

    #[test]
    fn test_numeric_values_parsed() {
        let req = workload()
            .with_env(GUEST_MEMORY_MIB_ENV, "512")
            .with_env(GUEST_VCPU_COUNT_ENV, "4");
        let boot = extract(&req.config, &ShimConfig::default()).unwrap();
        assert_eq!((boot.memory_mib, boot.vcpu_count), (512, 4));
    }

    #[test]
    fn test_missing_image() {
        let req = CreateContainerRequest::new("sb", "user-container").with_env(REVISION_ENV, "r");
        let err = extract(&req.config, &ShimConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingEnv { ref key } if key == GUEST_IMAGE_ENV));
    }

    #[test]
    fn test_empty_revision_is_missing() {
        let req = CreateContainerRequest::new("sb", "user-container")
            .with_env(GUEST_IMAGE_ENV, "fn:v1")
            .with_env(REVISION_ENV, "");
        let err = extract(&req.config, &ShimConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingEnv { ref key } if key == REVISION_ENV));
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        for (key, value) in [
            (GUEST_MEMORY_MIB_ENV, "lots"),
            (GUEST_MEMORY_MIB_ENV, "-1"),
            (GUEST_VCPU_COUNT_ENV, "1.5"),
            (GUEST_VCPU_COUNT_ENV, ""),
        ] {
            let req = workload().with_env(key, value);
            let err = extract(&req.config, &ShimConfig::default()).unwrap_err();
            assert!(
                matches!(err, Error::InvalidEnv { key: ref k, .. } if k == key),
                "{key}={value:?} should be rejected"
            );
        }
    }
}
