//! Discrete-event simulation of the M/M/1 queue
//!
//! This module contains the event loop, its collaborators, and the batch helpers
//! built on top of it.
//!
//! # Overview
//!
//! - **RandomProcessSource**: exponential inter-arrival and service samples
//! - **StateTracker**: server, FIFO queue, and time-weighted occupancy ledgers
//! - **EventScheduler**: next-event selection and the simulated clock
//! - **SimulationDriver**: runs to the horizon, drains, and computes metrics
//! - **MetricsCalculator**: turns ledgers and logs into [`QueueMetrics`]
//! - **ScenarioBatch / UtilizationSweep**: sequential multi-scenario runs
//! - **SimulationError**: error handling for simulation operations
//!
//! # Usage Example
//!
//! ```rust
//! use mm1_queue_simulator::simulation::*;
//! use mm1_queue_simulator::types::SimulationParameters;
//!
//! let params = SimulationParameters::new(6.0, 12.0, 1_000.0)?;
//! let report = SimulationDriver::seeded(params, 42).run()?;
//! assert!(report.metrics.utilization > 0.0);
//!
//! let metrics = run_simulation_seeded(4.0, 12.0, 1_000.0, 7)?;
//! assert!(metrics.customers_served > 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod driver;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod random_source;
pub mod scheduler;
pub mod state_tracker;
pub mod sweep;

// Re-export all public types for convenience
pub use driver::*;
pub use error::*;
pub use logging::*;
pub use metrics::*;
pub use random_source::*;
pub use scheduler::*;
pub use state_tracker::*;
pub use sweep::*;
