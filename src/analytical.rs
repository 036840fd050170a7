//! Closed-form M/M/1 steady state and comparison against simulated results
//!
//! The simulation engine does not depend on this module; it exists so simulated
//! metrics can be checked against the textbook formulas.

use crate::simulation::{QueueMetrics, SimulationError, SimulationResult, TRACKED_STATES};
use crate::types::parameters::check_rate;
use serde::{Deserialize, Serialize};

/// Steady-state metrics of an M/M/1 queue with λ < μ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticalMetrics {
    /// λ
    pub arrival_rate: f64,
    /// μ
    pub service_rate: f64,
    /// ρ = λ/μ
    pub utilization: f64,
    /// L = ρ/(1−ρ)
    pub mean_in_system: f64,
    /// Lq = ρ²/(1−ρ)
    pub mean_in_queue: f64,
    /// Ws = 1/(μ−λ)
    pub mean_time_in_system: f64,
    /// Wq = λ/(μ(μ−λ))
    pub mean_wait_in_queue: f64,
    /// Pₙ = (1−ρ)ρⁿ for n = 0..3
    pub state_probabilities: [f64; TRACKED_STATES],
}

impl AnalyticalMetrics {
    /// Evaluate the closed-form model
    ///
    /// Fails with `InvalidParameter` for non-positive rates and `UnstableSystem`
    /// when λ ≥ μ, where no steady state exists.
    pub fn compute(arrival_rate: f64, service_rate: f64) -> SimulationResult<Self> {
        check_rate("arrival_rate", arrival_rate)?;
        check_rate("service_rate", service_rate)?;
        if arrival_rate >= service_rate {
            return Err(SimulationError::unstable_system(arrival_rate, service_rate));
        }

        let rho = arrival_rate / service_rate;
        let mut state_probabilities = [0.0; TRACKED_STATES];
        for (n, probability) in state_probabilities.iter_mut().enumerate() {
            *probability = (1.0 - rho) * rho.powi(n as i32);
        }

        Ok(Self {
            arrival_rate,
            service_rate,
            utilization: rho,
            mean_in_system: rho / (1.0 - rho),
            mean_in_queue: rho * rho / (1.0 - rho),
            mean_time_in_system: 1.0 / (service_rate - arrival_rate),
            mean_wait_in_queue: arrival_rate / (service_rate * (service_rate - arrival_rate)),
            state_probabilities,
        })
    }

    /// Pₙ for any n ≥ 0
    pub fn probability(&self, n: u32) -> f64 {
        (1.0 - self.utilization) * self.utilization.powi(n as i32)
    }
}

/// Relative error of each simulated metric against its closed-form value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// ρ
    pub utilization: f64,
    /// L
    pub mean_in_system: f64,
    /// Lq
    pub mean_in_queue: f64,
    /// Ws
    pub mean_time_in_system: f64,
    /// Wq
    pub mean_wait_in_queue: f64,
    /// P₀..P₃
    pub state_probabilities: [f64; TRACKED_STATES],
}

impl MetricComparison {
    /// Compare a simulated run against the closed form
    pub fn new(analytical: &AnalyticalMetrics, simulated: &QueueMetrics) -> Self {
        let mut state_probabilities = [0.0; TRACKED_STATES];
        for (n, error) in state_probabilities.iter_mut().enumerate() {
            *error = relative_error(
                analytical.state_probabilities[n],
                simulated.state_probabilities[n],
            );
        }

        Self {
            utilization: relative_error(analytical.utilization, simulated.utilization),
            mean_in_system: relative_error(analytical.mean_in_system, simulated.mean_in_system),
            mean_in_queue: relative_error(analytical.mean_in_queue, simulated.mean_in_queue),
            mean_time_in_system: relative_error(
                analytical.mean_time_in_system,
                simulated.mean_time_in_system,
            ),
            mean_wait_in_queue: relative_error(
                analytical.mean_wait_in_queue,
                simulated.mean_wait_in_queue,
            ),
            state_probabilities,
        }
    }

    /// Largest relative error among ρ, L, Lq, Ws and Wq
    pub fn worst(&self) -> f64 {
        [
            self.utilization,
            self.mean_in_system,
            self.mean_in_queue,
            self.mean_time_in_system,
            self.mean_wait_in_queue,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    /// Whether ρ, L, Lq, Ws and Wq are all within `tolerance`
    ///
    /// State probabilities are left out; P₃ is small at light load and noisy.
    pub fn within(&self, tolerance: f64) -> bool {
        self.worst() <= tolerance
    }

    /// Whether every tracked Pₙ is within `tolerance`
    pub fn state_probabilities_within(&self, tolerance: f64) -> bool {
        self.state_probabilities.iter().all(|error| *error <= tolerance)
    }
}

/// |simulated − expected| / |expected|, or the absolute difference when expected is zero
pub fn relative_error(expected: f64, actual: f64) -> f64 {
    let difference = (actual - expected).abs();
    if expected == 0.0 {
        difference
    } else {
        difference / expected.abs()
    }
}
