//! Error types for the shim.

/// Result type alias for shim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while coordinating container creation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// A required environment variable was missing from the workload request.
    #[error("missing required environment variable '{key}' in workload container config")]
    MissingEnv { key: String },

    /// An environment variable was present but could not be parsed.
    #[error("invalid value '{value}' for environment variable '{key}': {reason}")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    // =========================================================================
    // Coordination Errors
    // =========================================================================
    /// No VM configuration was published for the sidecar's pod sandbox.
    #[error("no VM configuration available for pod sandbox '{pod_sandbox_id}'")]
    NoVmConfig { pod_sandbox_id: String },

    /// A VM is already registered under this container id.
    #[error("VM already registered for container: {0}")]
    VmAlreadyRegistered(String),

    /// No VM is registered under this container id.
    #[error("no VM registered for container: {0}")]
    VmNotFound(String),

    /// A spawned creation task did not run to completion.
    #[error("{task} task failed: {reason}")]
    TaskFailed { task: String, reason: String },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Stock container runtime call failed.
    #[error("stock runtime {operation} failed: {reason}")]
    Runtime { operation: String, reason: String },

    /// VM supervisor call failed.
    #[error("VM supervisor {operation} failed: {reason}")]
    Supervisor { operation: String, reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration value rejected by validation.
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
