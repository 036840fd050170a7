//! Steady-state queue metrics derived from a completed run

use super::state_tracker::{CompletedCustomerLog, OccupancyLedger, TRACKED_STATES};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standard M/M/1 metrics produced by one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMetrics {
    /// ρ: fraction of time the server was busy
    pub utilization: f64,
    /// L: time-average number of customers in the system
    pub mean_in_system: f64,
    /// Lq: time-average number of customers waiting
    pub mean_in_queue: f64,
    /// Ws: mean time a customer spends in the system
    pub mean_time_in_system: f64,
    /// Wq: mean time a customer waits before service
    pub mean_wait_in_queue: f64,
    /// P₀..P₃: fraction of time with exactly n customers in the system
    pub state_probabilities: [f64; TRACKED_STATES],
    /// Customers that completed service
    pub customers_served: usize,
    /// Clock value when the system emptied after the horizon
    pub total_simulation_time: f64,
    /// Total time the server was busy
    pub busy_time: f64,
    /// Longest waiting line observed
    pub peak_queue_length: usize,
}

impl QueueMetrics {
    /// Pₙ for a tracked count
    pub fn probability(&self, n: usize) -> Option<f64> {
        self.state_probabilities.get(n).copied()
    }

    /// Served customers per unit of simulated time
    pub fn effective_arrival_rate(&self) -> f64 {
        if self.total_simulation_time > 0.0 {
            self.customers_served as f64 / self.total_simulation_time
        } else {
            0.0
        }
    }

    /// Sum of the tracked occupancy probabilities
    pub fn tracked_probability_mass(&self) -> f64 {
        self.state_probabilities.iter().sum()
    }
}

/// Inputs gathered by the driver when a run completes
#[derive(Debug, Clone, Copy)]
pub struct RunTotals<'a> {
    /// System-occupancy ledger
    pub system_ledger: &'a OccupancyLedger,
    /// Queue-occupancy ledger
    pub queue_ledger: &'a OccupancyLedger,
    /// Completed customer log
    pub log: &'a CompletedCustomerLog,
    /// Accumulated busy time
    pub busy_time: f64,
    /// Final clock value
    pub total_simulation_time: f64,
    /// Longest waiting line
    pub peak_queue_length: usize,
}

/// Converts ledgers and logs into [`QueueMetrics`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Compute the final metrics
    ///
    /// Waits are averaged over served customers; a run that served nobody reports
    /// zero waits. Time averages use `total_simulation_time` as the denominator.
    pub fn compute(totals: RunTotals<'_>) -> QueueMetrics {
        let total_time = totals.total_simulation_time;
        let served = totals.log.customers_served();

        let per_time = |value: f64| if total_time > 0.0 { value / total_time } else { 0.0 };
        let per_customer = |value: f64| if served > 0 { value / served as f64 } else { 0.0 };

        let mut state_probabilities = [0.0; TRACKED_STATES];
        for (probability, time) in
            state_probabilities.iter_mut().zip(totals.system_ledger.time_by_count.iter())
        {
            *probability = per_time(*time);
        }

        let metrics = QueueMetrics {
            utilization: per_time(totals.busy_time),
            mean_in_system: per_time(totals.system_ledger.weighted_area),
            mean_in_queue: per_time(totals.queue_ledger.weighted_area),
            mean_time_in_system: per_customer(totals.log.total_time_in_system()),
            mean_wait_in_queue: per_customer(totals.log.total_time_in_queue()),
            state_probabilities,
            customers_served: served,
            total_simulation_time: total_time,
            busy_time: totals.busy_time,
            peak_queue_length: totals.peak_queue_length,
        };

        debug!(
            utilization = metrics.utilization,
            mean_in_system = metrics.mean_in_system,
            mean_wait_in_queue = metrics.mean_wait_in_queue,
            "Computed queue metrics"
        );
        metrics
    }
}
