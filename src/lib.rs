//! M/M/1 Queue Simulator
//!
//! A discrete-event simulation of a single-server FIFO queue with Poisson arrivals
//! and exponential service, checked against the closed-form M/M/1 model.
//!
//! # Overview
//!
//! The simulation reconstructs the standard steady-state metrics from first
//! principles: it orders arrival and departure events, accumulates time-weighted
//! occupancy while the clock advances, and derives utilization, mean occupancy,
//! mean waits, and occupancy probabilities once the system has drained.
//!
//! ## Key Features
//!
//! - **Deterministic Runs**: seedable random source, or a scripted one in tests
//! - **O(1) Accounting**: running sums per occupancy count instead of interval histories
//! - **Drain Phase**: customers present at the horizon are served before metrics are taken
//! - **Closed-Form Reference**: analytical ρ, L, Lq, Ws, Wq, and Pₙ with relative errors
//! - **Batches and Sweeps**: reference scenarios and the Wq-versus-ρ curve
//!
//! ## Quick Start
//!
//! ```rust
//! use mm1_queue_simulator::*;
//!
//! let simulated = run_simulation_seeded(6.0, 12.0, 5_000.0, 42)?;
//! let analytical = AnalyticalMetrics::compute(6.0, 12.0)?;
//!
//! let comparison = MetricComparison::new(&analytical, &simulated);
//! println!("Utilization {:.4} (closed form {:.4})", simulated.utilization, analytical.utilization);
//! assert!(comparison.utilization < 0.1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Run parameters, enums, and configuration
//! - [`simulation`]: Event loop, state tracking, metrics, batches, and logging
//! - [`analytical`]: Closed-form model and comparisons
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │ RandomProcess    │    │  EventScheduler  │    │  StateTracker    │
//! │ Source           │    │  (clock, next    │    │  (server, queue, │
//! │                  │    │   event)         │    │   ledgers, log)  │
//! └──────────────────┘    └──────────────────┘    └──────────────────┘
//!          ▲                       ▲                       ▲
//!          └───────────────┬───────┴───────────────────────┘
//!                          │
//!                 ┌──────────────────┐    ┌──────────────────┐
//!                 │ SimulationDriver │───►│ MetricsCalculator│
//!                 └──────────────────┘    └──────────────────┘
//!                          ▲
//!                 ┌──────────────────┐    ┌──────────────────┐
//!                 │ ScenarioBatch /  │───►│ AnalyticalMetrics│
//!                 │ UtilizationSweep │    │                  │
//!                 └──────────────────┘    └──────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod analytical;
pub mod simulation;
pub mod types;

// Configuration, parameters, and enums
pub use types::{
    CliArgs, ConfigError, ConfigValidationError, DriverPhase, OutputFormat, QueueEvent,
    SimulationConfig, SimulationParameters,
};

// Simulation engine
pub use simulation::{
    run_simulation, run_simulation_seeded, ErrorHandler, ExponentialSource, LoggingConfig,
    MetricsCalculator, QueueMetrics, RandomProcessSource, ScenarioBatch, ScenarioOutcome,
    SimulationDriver, SimulationError, SimulationReport, SimulationResult, SweepPoint,
    UtilizationSweep,
};

// Closed-form model
pub use analytical::{AnalyticalMetrics, MetricComparison};
