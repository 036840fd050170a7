//! Simulation driver
//!
//! This module contains the [`SimulationDriver`] event loop and the
//! [`run_simulation`] entry points.

use super::metrics::{MetricsCalculator, QueueMetrics, RunTotals};
use super::random_source::{ExponentialSource, RandomProcessSource};
use super::scheduler::EventScheduler;
use super::state_tracker::{CompletedCustomerLog, OccupancyLedger, PendingDeparture, StateTracker};
use super::{SimulationError, SimulationResult};
use crate::sim_event;
use crate::types::{DriverPhase, QueueEvent, SimulationParameters};
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

/// Everything a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Parameters the run used
    pub parameters: SimulationParameters,
    /// Final metrics
    pub metrics: QueueMetrics,
    /// Time spent at each system occupancy
    pub system_occupancy: OccupancyLedger,
    /// Time spent at each queue occupancy
    pub queue_occupancy: OccupancyLedger,
    /// Completed sojourns and queue waits
    pub customers: CompletedCustomerLog,
    /// Clock value of the last event handled before the drain phase
    pub horizon_crossed_at: f64,
    /// Arrivals and departures handled, drain included
    pub events_processed: u64,
    /// Phase the driver ended in; always [`DriverPhase::Done`] for a returned report
    pub phase: DriverPhase,
}

/// Runs one M/M/1 simulation from an empty system to an empty system
///
/// The driver owns all per-run state and is consumed by [`run`](Self::run), so each
/// run starts from an idle server, an empty queue, and empty ledgers.
#[derive(Debug)]
pub struct SimulationDriver<R> {
    parameters: SimulationParameters,
    source: R,
    scheduler: EventScheduler,
    state: StateTracker,
    phase: DriverPhase,
    events_processed: u64,
}

impl SimulationDriver<ExponentialSource> {
    /// Create a driver with a seeded exponential source
    pub fn seeded(parameters: SimulationParameters, seed: u64) -> Self {
        Self::new(parameters, ExponentialSource::from_seed(seed))
    }
}

impl<R: RandomProcessSource> SimulationDriver<R> {
    /// Create a driver; the first arrival is drawn immediately
    pub fn new(parameters: SimulationParameters, mut source: R) -> Self {
        let first_arrival = source.sample_exponential(parameters.arrival_rate());
        Self {
            parameters,
            source,
            scheduler: EventScheduler::new(first_arrival),
            state: StateTracker::new(),
            phase: DriverPhase::Running,
            events_processed: 0,
        }
    }

    /// Current phase of the run
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Run to completion and compute the metrics
    ///
    /// Events are processed while the clock is below the horizon; the event that
    /// reaches or crosses it is handled in full. Afterwards no arrivals are admitted
    /// and queued customers are served in FIFO order until the system is empty.
    #[instrument(
        skip(self),
        fields(
            arrival_rate = self.parameters.arrival_rate(),
            service_rate = self.parameters.service_rate(),
            horizon = self.parameters.horizon()
        )
    )]
    pub fn run(mut self) -> SimulationResult<SimulationReport> {
        sim_event!(
            info,
            "Simulation run started",
            arrival_rate = self.parameters.arrival_rate(),
            service_rate = self.parameters.service_rate(),
            horizon = self.parameters.horizon(),
        );

        let horizon = self.parameters.horizon();
        while self.scheduler.now() < horizon {
            self.step()?;
        }
        let horizon_crossed_at = self.scheduler.now();

        self.phase = DriverPhase::Draining;
        debug!(
            clock = horizon_crossed_at,
            in_system = self.state.customers_in_system(),
            "Horizon reached, draining remaining customers"
        );
        self.drain()?;

        self.phase = DriverPhase::Done;
        Ok(self.finish(horizon_crossed_at))
    }

    fn step(&mut self) -> SimulationResult<()> {
        let event = self.scheduler.peek(self.state.server());
        self.check_event_time(event.kind, event.time)?;
        let (previous, now) = self.scheduler.advance(&event);
        self.state.account_interval(previous, now);

        match event.kind {
            QueueEvent::Arrival => self.handle_arrival(now)?,
            QueueEvent::Departure => self.handle_departure(now),
        }
        self.events_processed += 1;
        Ok(())
    }

    fn handle_arrival(&mut self, now: f64) -> SimulationResult<()> {
        let next_arrival = now + self.source.sample_exponential(self.parameters.arrival_rate());
        self.scheduler.set_next_arrival(next_arrival);

        if !self.state.server().is_busy() {
            let service = self.source.sample_exponential(self.parameters.service_rate());
            self.state.start_service(PendingDeparture { arrival_time: now, departure_time: now + service });
            trace!(now, departure = now + service, "Arrival went straight to service");
            return Ok(());
        }

        let queue_length = self.state.enqueue(now);
        trace!(now, queue_length, "Arrival joined the queue");
        match self.parameters.max_queue_length() {
            Some(limit) if queue_length > limit => {
                sim_event!(warn, "Waiting queue exceeded its cap", limit = limit, time = now);
                Err(SimulationError::resource_exceeded(limit, now))
            }
            _ => Ok(()),
        }
    }

    fn handle_departure(&mut self, now: f64) {
        self.state.complete_service();
        if self.state.queue_length() > 0 {
            let service = self.source.sample_exponential(self.parameters.service_rate());
            self.state.promote_next(now, service);
        }
        trace!(now, in_system = self.state.customers_in_system(), "Departure");
    }

    fn drain(&mut self) -> SimulationResult<()> {
        while !self.state.is_empty() {
            if let Some(pending) = self.state.server().pending_departure() {
                self.check_event_time(QueueEvent::Departure, pending.departure_time)?;
            }
            let Some((previous, now)) = self.scheduler.advance_to_departure(self.state.server())
            else {
                break;
            };
            self.state.account_interval(previous, now);
            self.handle_departure(now);
            self.events_processed += 1;
        }
        Ok(())
    }

    /// Reject an event whose sampled time overflowed to infinity
    ///
    /// Advancing the clock to such a time would turn every time average into NaN.
    fn check_event_time(&self, kind: QueueEvent, time: f64) -> SimulationResult<()> {
        if time.is_finite() {
            return Ok(());
        }
        let (name, rate) = match kind {
            QueueEvent::Arrival => ("arrival_rate", self.parameters.arrival_rate()),
            QueueEvent::Departure => ("service_rate", self.parameters.service_rate()),
        };
        warn!(component = "simulation", event = %kind, time, "Sampled event time is not finite");
        Err(SimulationError::invalid_parameter(name, rate))
    }

    fn finish(self, horizon_crossed_at: f64) -> SimulationReport {
        let total_simulation_time = self.scheduler.now();
        let busy_time = self.state.busy_time();
        let peak_queue_length = self.state.peak_queue_length();
        let (system_occupancy, queue_occupancy, customers) = self.state.into_parts();

        let metrics = MetricsCalculator::compute(RunTotals {
            system_ledger: &system_occupancy,
            queue_ledger: &queue_occupancy,
            log: &customers,
            busy_time,
            total_simulation_time,
            peak_queue_length,
        });

        sim_event!(
            info,
            "Simulation run completed",
            total_simulation_time = total_simulation_time,
            customers_served = metrics.customers_served,
            utilization = metrics.utilization,
            events_processed = self.events_processed,
        );

        SimulationReport {
            parameters: self.parameters,
            metrics,
            system_occupancy,
            queue_occupancy,
            customers,
            horizon_crossed_at,
            events_processed: self.events_processed,
            phase: self.phase,
        }
    }
}

/// Run one simulation with an entropy-seeded source
pub fn run_simulation(arrival_rate: f64, service_rate: f64, horizon: f64) -> SimulationResult<QueueMetrics> {
    let parameters = SimulationParameters::new(arrival_rate, service_rate, horizon)?;
    let report = SimulationDriver::new(parameters, ExponentialSource::from_entropy()).run()?;
    Ok(report.metrics)
}

/// Run one reproducible simulation from a seed
pub fn run_simulation_seeded(
    arrival_rate: f64,
    service_rate: f64,
    horizon: f64,
    seed: u64,
) -> SimulationResult<QueueMetrics> {
    let parameters = SimulationParameters::new(arrival_rate, service_rate, horizon)?;
    let report = SimulationDriver::seeded(parameters, seed).run()?;
    Ok(report.metrics)
}
