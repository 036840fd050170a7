//! Scenario batches and the utilization sweep
//!
//! Both helpers run their scenarios one after another, each with its own driver
//! and its own source. With a base seed, scenario `i` uses `seed + i`, so a batch
//! is reproducible as a whole and its scenarios stay independent.

use super::driver::SimulationDriver;
use super::error::{ErrorHandler, SimulationResult};
use super::metrics::QueueMetrics;
use super::random_source::ExponentialSource;
use crate::analytical::{AnalyticalMetrics, MetricComparison};
use crate::perf_span;
use crate::types::config::reference;
use crate::types::{SimulationConfig, SimulationParameters};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// One (λ, μ) pair to simulate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    /// λ
    pub arrival_rate: f64,
    /// μ
    pub service_rate: f64,
}

/// Simulated and closed-form results for one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// The scenario that was run
    pub scenario: Scenario,
    /// Seed used for this scenario, if the batch was seeded
    pub seed: Option<u64>,
    /// Simulated metrics
    pub simulated: QueueMetrics,
    /// Closed-form metrics; absent when λ ≥ μ
    pub analytical: Option<AnalyticalMetrics>,
    /// Relative errors; absent when λ ≥ μ
    pub comparison: Option<MetricComparison>,
}

/// Settings shared by every scenario in a batch or sweep
#[derive(Debug, Clone)]
struct RunSettings {
    horizon: f64,
    seed: Option<u64>,
    max_queue_length: Option<usize>,
    error_handler: ErrorHandler,
}

impl RunSettings {
    fn new(horizon: f64) -> Self {
        Self { horizon, seed: None, max_queue_length: None, error_handler: ErrorHandler::new() }
    }

    fn from_config(config: &SimulationConfig) -> Self {
        Self {
            horizon: config.horizon,
            seed: config.seed,
            max_queue_length: config.max_queue_length,
            error_handler: ErrorHandler::new(),
        }
    }

    fn seed_for(&self, index: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(index as u64))
    }

    fn simulate(&self, scenario: Scenario, seed: Option<u64>) -> SimulationResult<QueueMetrics> {
        let mut parameters =
            SimulationParameters::new(scenario.arrival_rate, scenario.service_rate, self.horizon)?;
        if let Some(limit) = self.max_queue_length {
            parameters = parameters.with_max_queue_length(limit);
        }
        let report = SimulationDriver::new(parameters, ExponentialSource::new(seed)).run()?;
        Ok(report.metrics)
    }
}

/// A list of scenarios run with a shared horizon
#[derive(Debug, Clone)]
pub struct ScenarioBatch {
    scenarios: Vec<Scenario>,
    settings: RunSettings,
}

impl ScenarioBatch {
    /// Create an empty batch
    pub fn new(horizon: f64) -> Self {
        Self { scenarios: Vec::new(), settings: RunSettings::new(horizon) }
    }

    /// The light, moderate, and heavy reference scenarios (μ = 12, λ = 4, 6, 10)
    pub fn reference(config: &SimulationConfig) -> Self {
        let scenarios = reference::COMPARISON_ARRIVAL_RATES
            .iter()
            .map(|&arrival_rate| Scenario { arrival_rate, service_rate: reference::SERVICE_RATE })
            .collect();
        Self { scenarios, settings: RunSettings::from_config(config) }
    }

    /// Add a scenario
    pub fn with_scenario(mut self, arrival_rate: f64, service_rate: f64) -> Self {
        self.scenarios.push(Scenario { arrival_rate, service_rate });
        self
    }

    /// Seed the batch; scenario `i` uses `seed + i`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Cap the waiting queue of every scenario
    pub fn with_max_queue_length(mut self, limit: usize) -> Self {
        self.settings.max_queue_length = Some(limit);
        self
    }

    /// Replace the error handler
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.settings.error_handler = handler;
        self
    }

    /// Scenarios in run order
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Run every scenario
    ///
    /// Scenarios that fail with a recoverable error are skipped and left out of the
    /// result; any other error aborts the batch.
    #[instrument(skip(self), fields(scenarios = self.scenarios.len()))]
    pub fn run(&self) -> SimulationResult<Vec<ScenarioOutcome>> {
        let span = perf_span!("scenario_batch", scenarios = self.scenarios.len());
        let _enter = span.enter();

        let mut outcomes = Vec::with_capacity(self.scenarios.len());
        for (index, scenario) in self.scenarios.iter().copied().enumerate() {
            let seed = self.settings.seed_for(index);
            let context = format!("scenario λ={} μ={}", scenario.arrival_rate, scenario.service_rate);

            let Some(simulated) =
                self.settings.error_handler.execute(&context, || self.settings.simulate(scenario, seed))?
            else {
                continue;
            };

            let analytical =
                AnalyticalMetrics::compute(scenario.arrival_rate, scenario.service_rate).ok();
            let comparison = analytical
                .as_ref()
                .map(|expected| MetricComparison::new(expected, &simulated));
            debug!(
                index,
                utilization = simulated.utilization,
                worst_error = ?comparison.as_ref().map(MetricComparison::worst),
                "Scenario finished"
            );

            outcomes.push(ScenarioOutcome { scenario, seed, simulated, analytical, comparison });
        }

        info!(completed = outcomes.len(), requested = self.scenarios.len(), "Scenario batch finished");
        Ok(outcomes)
    }
}

/// Simulated and closed-form Wq at one utilization
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Requested ρ
    pub target_utilization: f64,
    /// λ = ρμ
    pub arrival_rate: f64,
    /// Utilization the run actually observed
    pub simulated_utilization: f64,
    /// Simulated Wq
    pub simulated_wait: f64,
    /// Closed-form Wq; absent when ρ ≥ 1
    pub analytical_wait: Option<f64>,
}

/// Wq against ρ for a fixed service rate
#[derive(Debug, Clone)]
pub struct UtilizationSweep {
    service_rate: f64,
    utilizations: Vec<f64>,
    settings: RunSettings,
}

impl UtilizationSweep {
    /// Sweep the reference points at the given service rate
    pub fn new(service_rate: f64, horizon: f64) -> Self {
        Self {
            service_rate,
            utilizations: reference::SWEEP_UTILIZATIONS.to_vec(),
            settings: RunSettings::new(horizon),
        }
    }

    /// Sweep configured by a [`SimulationConfig`]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            service_rate: config.service_rate,
            utilizations: config.sweep_utilizations.clone(),
            settings: RunSettings::from_config(config),
        }
    }

    /// Replace the utilization points
    pub fn with_utilizations(mut self, utilizations: Vec<f64>) -> Self {
        self.utilizations = utilizations;
        self
    }

    /// Seed the sweep; point `i` uses `seed + i`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Cap the waiting queue of every point
    pub fn with_max_queue_length(mut self, limit: usize) -> Self {
        self.settings.max_queue_length = Some(limit);
        self
    }

    /// Replace the error handler
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.settings.error_handler = handler;
        self
    }

    /// Utilization points in run order
    pub fn utilizations(&self) -> &[f64] {
        &self.utilizations
    }

    /// Run every point, skipping those that fail recoverably
    #[instrument(skip(self), fields(points = self.utilizations.len(), service_rate = self.service_rate))]
    pub fn run(&self) -> SimulationResult<Vec<SweepPoint>> {
        let span = perf_span!("utilization_sweep", points = self.utilizations.len());
        let _enter = span.enter();

        let mut points = Vec::with_capacity(self.utilizations.len());
        for (index, &target_utilization) in self.utilizations.iter().enumerate() {
            let scenario = Scenario {
                arrival_rate: target_utilization * self.service_rate,
                service_rate: self.service_rate,
            };
            let seed = self.settings.seed_for(index);
            let context = format!("sweep point ρ={}", target_utilization);

            let Some(simulated) =
                self.settings.error_handler.execute(&context, || self.settings.simulate(scenario, seed))?
            else {
                continue;
            };

            let analytical_wait = AnalyticalMetrics::compute(scenario.arrival_rate, scenario.service_rate)
                .ok()
                .map(|expected| expected.mean_wait_in_queue);

            points.push(SweepPoint {
                target_utilization,
                arrival_rate: scenario.arrival_rate,
                simulated_utilization: simulated.utilization,
                simulated_wait: simulated.mean_wait_in_queue,
                analytical_wait,
            });
        }

        info!(completed = points.len(), requested = self.utilizations.len(), "Utilization sweep finished");
        Ok(points)
    }
}
