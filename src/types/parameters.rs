//! Validated parameters for a single simulation run

use crate::simulation::{SimulationError, SimulationResult};
use serde::Serialize;
use tracing::warn;

/// Parameters of one M/M/1 simulation run
///
/// Construct through [`SimulationParameters::new`], which rejects non-positive
/// or non-finite values, and rates so small that their mean `1 / rate` overflows. An arrival rate at or above the service rate is accepted:
/// the queue then grows for the whole horizon, which only stays bounded in memory
/// if a [`max_queue_length`](Self::with_max_queue_length) is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParameters {
    arrival_rate: f64,
    service_rate: f64,
    horizon: f64,
    max_queue_length: Option<usize>,
}

impl SimulationParameters {
    /// Validate and create run parameters
    pub fn new(arrival_rate: f64, service_rate: f64, horizon: f64) -> SimulationResult<Self> {
        check_rate("arrival_rate", arrival_rate)?;
        check_rate("service_rate", service_rate)?;
        check_positive("horizon", horizon)?;

        let parameters = Self { arrival_rate, service_rate, horizon, max_queue_length: None };
        if !parameters.is_stable() {
            warn!(
                arrival_rate,
                service_rate,
                "Arrival rate is not below service rate; the waiting queue will grow until the horizon"
            );
        }
        Ok(parameters)
    }

    /// Abort the run with `ResourceExceeded` once the waiting queue grows past `limit`
    pub fn with_max_queue_length(mut self, limit: usize) -> Self {
        self.max_queue_length = Some(limit);
        self
    }

    /// Arrival rate λ
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    /// Service rate μ
    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Simulated time after which arrivals stop
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Optional cap on the waiting queue length
    pub fn max_queue_length(&self) -> Option<usize> {
        self.max_queue_length
    }

    /// Offered load λ/μ
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    /// Whether the closed-form steady state exists (λ < μ)
    pub fn is_stable(&self) -> bool {
        self.arrival_rate < self.service_rate
    }
}

fn check_positive(name: &'static str, value: f64) -> SimulationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(name, value))
    }
}

/// A rate must be positive and finite, with a finite mean duration `1 / rate`
pub(crate) fn check_rate(name: &'static str, value: f64) -> SimulationResult<()> {
    check_positive(name, value)?;
    if (1.0 / value).is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_parameters() {
        let params = SimulationParameters::new(4.0, 12.0, 100.0).unwrap();
        assert_eq!(params.arrival_rate(), 4.0);
        assert_eq!(params.service_rate(), 12.0);
        assert_eq!(params.horizon(), 100.0);
        assert!(params.max_queue_length().is_none());
        assert!(params.is_stable());
        assert!((params.offered_load() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        for (lambda, mu, horizon) in [(0.0, 12.0, 10.0), (4.0, -1.0, 10.0), (4.0, 12.0, 0.0)] {
            let err = SimulationParameters::new(lambda, mu, horizon).unwrap_err();
            assert!(matches!(err, SimulationError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(SimulationParameters::new(f64::NAN, 12.0, 10.0).is_err());
        assert!(SimulationParameters::new(4.0, f64::INFINITY, 10.0).is_err());
        assert!(SimulationParameters::new(4.0, 12.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_rates_with_overflowing_mean() {
        // 1 / 1e-310 is infinite, so every sample would land at infinity
        assert!(matches!(
            SimulationParameters::new(1e-310, 12.0, 100.0),
            Err(SimulationError::InvalidParameter { name: "arrival_rate", .. })
        ));
        assert!(matches!(
            SimulationParameters::new(4.0, 1e-310, 100.0),
            Err(SimulationError::InvalidParameter { name: "service_rate", .. })
        ));
        // Tiny but representable rates still pass, and a tiny horizon is fine
        assert!(SimulationParameters::new(1e-300, 12.0, 100.0).is_ok());
        assert!(SimulationParameters::new(4.0, 12.0, 1e-310).is_ok());
    }

    #[test]
    fn test_unstable_parameters_are_accepted() {
        let params = SimulationParameters::new(12.0, 10.0, 50.0).unwrap();
        assert!(!params.is_stable());
    }

    #[test]
    fn test_max_queue_length_builder() {
        let params = SimulationParameters::new(4.0, 12.0, 10.0).unwrap().with_max_queue_length(25);
        assert_eq!(params.max_queue_length(), Some(25));
    }
}
