//! Simulation error handling
//!
//! Host-side failures only. The update kernel has no error channel; numerical
//! edge cases inside it are absorbed as "no collision".

use std::path::PathBuf;

/// Errors surfaced by the simulation lifecycle
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Invalid BVH buffers: {reason}")]
    InvalidBvh { reason: String },

    #[error("Simulation already initialized")]
    AlreadyInitialized,

    #[error("Simulation not initialized")]
    NotInitialized,

    #[error("Simulation has been shut down")]
    ShutDown,

    #[error("GPU device unavailable: {message}")]
    DeviceUnavailable { message: String },

    #[error("Shader compilation failed: {shader}: {error}")]
    ShaderCompilationFailed { shader: String, error: String },

    #[error("Failed to map GPU buffer: {message}")]
    BufferMapFailed { message: String },

    #[error("Kernel dispatch failed: {message}")]
    DispatchFailed { message: String },

    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Type alias for simulation results
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Attach context to foreign errors raised while talking to a device
pub trait SimulationErrorContext<T> {
    fn dispatch_context(self, context: &str) -> SimulationResult<T>;
}

impl<T, E> SimulationErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn dispatch_context(self, context: &str) -> SimulationResult<T> {
        self.map_err(|e| SimulationError::DispatchFailed {
            message: format!("{}: {}", context, e),
        })
    }
}

/// Create an invalid configuration error
pub fn invalid_config(field: &'static str, reason: impl std::fmt::Display) -> SimulationError {
    SimulationError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

/// Create an invalid BVH error
pub fn invalid_bvh(reason: impl std::fmt::Display) -> SimulationError {
    SimulationError::InvalidBvh {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_as_dispatch_failure() {
        let result: Result<(), &str> = Err("queue lost");
        let err = result.dispatch_context("submit").unwrap_err();
        assert!(matches!(err, SimulationError::DispatchFailed { .. }));
        assert_eq!(err.to_string(), "Kernel dispatch failed: submit: queue lost");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = invalid_config("particle_count", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: particle_count: must be positive"
        );
    }
}
