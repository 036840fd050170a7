//! Error types and handling
//!
//! This module contains error types and error handling for the simulation.

use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A rate or the horizon is zero, negative, or not finite
    #[error("Invalid parameter {name}: {value} (must be a positive finite number)")]
    InvalidParameter {
        /// Name of the rejected parameter
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// The waiting queue grew past the configured cap
    #[error("Waiting queue exceeded {limit} customers at simulated time {time:.3}")]
    ResourceExceeded {
        /// Configured queue cap
        limit: usize,
        /// Simulated time at which the cap was exceeded
        time: f64,
    },

    /// The closed-form model has no steady state for these rates
    #[error("No steady state: arrival rate {arrival_rate} is not below service rate {service_rate}")]
    UnstableSystem {
        /// Arrival rate λ
        arrival_rate: f64,
        /// Service rate μ
        service_rate: f64,
    },

    /// Configuration loading or validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Create a resource exceeded error
    pub fn resource_exceeded(limit: usize, time: f64) -> Self {
        Self::ResourceExceeded { limit, time }
    }

    /// Create an unstable system error
    pub fn unstable_system(arrival_rate: f64, service_rate: f64) -> Self {
        Self::UnstableSystem { arrival_rate, service_rate }
    }

    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors concern a single run or scenario; a batch may skip the
    /// scenario and carry on. Everything else points at bad input or the environment.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::InvalidParameter { .. } => false,
            SimulationError::ResourceExceeded { .. } => true,
            SimulationError::UnstableSystem { .. } => true,
            SimulationError::ConfigurationError(_) => false,
            SimulationError::IoError(_) => false,
            SimulationError::SerializationError(_) => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::InvalidParameter { .. } => "Invalid Parameter",
            SimulationError::ResourceExceeded { .. } => "Resource Exceeded",
            SimulationError::UnstableSystem { .. } => "Unstable System",
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// What a batch does with a failed scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Skip the current scenario and continue
    Skip,
    /// Abort the entire batch
    Abort,
}

/// Error handler deciding how batches react to failed runs
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    /// Whether to continue on recoverable errors
    pub continue_on_recoverable: bool,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self { continue_on_recoverable: true }
    }
}

impl ErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler that aborts on any error
    pub fn strict() -> Self {
        Self { continue_on_recoverable: false }
    }

    /// Log the error and decide whether the batch goes on
    pub fn handle_error(&self, error: &SimulationError, context: &str) -> RecoveryStrategy {
        if !error.is_recoverable() {
            error!("Critical error in {} ({}): {}", error.category(), context, error);
            return RecoveryStrategy::Abort;
        }

        if self.continue_on_recoverable {
            warn!("Recoverable error in {} ({}): {}", error.category(), context, error);
            info!("Skipping {}", context);
            RecoveryStrategy::Skip
        } else {
            error!("Aborting on error in {} ({}): {}", error.category(), context, error);
            RecoveryStrategy::Abort
        }
    }

    /// Run a scenario, turning skippable failures into `Ok(None)`
    pub fn execute<T, F>(&self, context: &str, operation: F) -> SimulationResult<Option<T>>
    where
        F: FnOnce() -> SimulationResult<T>,
    {
        match operation() {
            Ok(result) => Ok(Some(result)),
            Err(error) => match self.handle_error(&error, context) {
                RecoveryStrategy::Skip => Ok(None),
                RecoveryStrategy::Abort => Err(error),
            },
        }
    }
}
