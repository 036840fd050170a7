//! Core types and configuration for the queue simulator
//!
//! This module contains the fundamental types shared by the engine, the analytical
//! model, and the command-line front end.
//!
//! # Overview
//!
//! - **Parameters**: validated λ, μ, horizon, and optional queue cap for one run
//! - **Enums**: event kinds, driver phases, and output formats
//! - **Configuration**: file and CLI configuration with validation
//!
//! # Usage Example
//!
//! ```rust
//! use mm1_queue_simulator::types::*;
//!
//! let params = SimulationParameters::new(4.0, 12.0, 1_000.0)?;
//! assert!(params.is_stable());
//!
//! let config = SimulationConfig {
//!     arrival_rate: 10.0,
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod enums;
pub mod parameters;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use parameters::*;
