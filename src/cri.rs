//! Container-creation messages exchanged with the orchestrator.
//!
//! These mirror the subset of the CRI `CreateContainer`/`RemoveContainer`
//! messages the shim inspects. Only the pod sandbox id, the container
//! metadata name and the environment list are read; every other field is
//! carried in a flattened `extra` map and forwarded to the stock runtime
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Environment Entries
// =============================================================================

/// A single environment variable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    /// Creates a new key/value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Container Config
// =============================================================================

/// Container metadata. The name drives role classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetadata {
    pub name: String,
    #[serde(default)]
    pub attempt: u32,
}

/// Container configuration block of a creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    #[serde(default)]
    pub metadata: ContainerMetadata,
    #[serde(default)]
    pub envs: Vec<KeyValue>,
    /// Runtime-specific fields, forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerConfig {
    /// Returns the value of the first environment entry named `key`.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// Appends an environment entry.
    pub fn push_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.envs.push(KeyValue::new(key, value));
    }
}

// =============================================================================
// Requests / Responses
// =============================================================================

/// `CreateContainer` request as received from the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerRequest {
    pub pod_sandbox_id: String,
    #[serde(default)]
    pub config: ContainerConfig,
    /// Sandbox config and any other request fields, forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateContainerRequest {
    /// Creates a request with the given sandbox id and container name.
    pub fn new(pod_sandbox_id: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            pod_sandbox_id: pod_sandbox_id.into(),
            config: ContainerConfig {
                metadata: ContainerMetadata {
                    name: container_name.into(),
                    attempt: 0,
                },
                ..Default::default()
            },
            extra: Map::new(),
        }
    }

    /// Adds an environment entry (builder style).
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push_env(key, value);
        self
    }

    /// Returns the container name used for role classification.
    pub fn container_name(&self) -> &str {
        &self.config.metadata.name
    }
}

/// `CreateContainer` response. Only the container id is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerResponse {
    pub container_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateContainerResponse {
    /// Creates a response carrying only a container id.
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            extra: Map::new(),
        }
    }
}

/// `RemoveContainer` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveContainerRequest {
    pub container_id: String,
}

impl RemoveContainerRequest {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}
