//! Next-event selection and the simulated clock

use super::state_tracker::ServerState;
use crate::types::QueueEvent;
use serde::{Deserialize, Serialize};

/// An event chosen to run next, with its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Arrival or departure
    pub kind: QueueEvent,
    /// When it happens
    pub time: f64,
}

/// Monotonically non-decreasing simulated time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    current_time: f64,
}

impl SimulationClock {
    /// Clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.current_time
    }

    /// Move the clock to `time` and return the time it was at before
    ///
    /// A timestamp earlier than the current time leaves the clock where it is.
    pub fn advance_to(&mut self, time: f64) -> f64 {
        let previous = self.current_time;
        self.current_time = self.current_time.max(time);
        previous
    }
}

/// Chooses between the next arrival and the pending departure
#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    clock: SimulationClock,
    next_arrival: f64,
}

impl EventScheduler {
    /// Create a scheduler at time zero with the first arrival at `first_arrival`
    pub fn new(first_arrival: f64) -> Self {
        Self { clock: SimulationClock::new(), next_arrival: first_arrival }
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Time of the next scheduled arrival
    pub fn next_arrival(&self) -> f64 {
        self.next_arrival
    }

    /// Schedule the next arrival
    pub fn set_next_arrival(&mut self, time: f64) {
        self.next_arrival = time;
    }

    /// Pick the next event without moving the clock
    ///
    /// An idle server only admits an arrival. A busy server lets the arrival go first
    /// only if it is strictly earlier than the departure.
    pub fn peek(&self, server: &ServerState) -> ScheduledEvent {
        select_next_event(self.next_arrival, server)
    }

    /// Move the clock to `event` and return the elapsed interval as `(previous, current)`
    pub fn advance(&mut self, event: &ScheduledEvent) -> (f64, f64) {
        let previous = self.clock.advance_to(event.time);
        (previous, self.clock.now())
    }

    /// Move the clock to the pending departure during the drain phase
    pub fn advance_to_departure(&mut self, server: &ServerState) -> Option<(f64, f64)> {
        let departure = server.pending_departure()?;
        let event = ScheduledEvent { kind: QueueEvent::Departure, time: departure.departure_time };
        Some(self.advance(&event))
    }
}

/// Next-event rule shared by the scheduler and its tests
pub fn select_next_event(next_arrival: f64, server: &ServerState) -> ScheduledEvent {
    match server.pending_departure() {
        Some(departure) if next_arrival >= departure.departure_time => {
            ScheduledEvent { kind: QueueEvent::Departure, time: departure.departure_time }
        }
        _ => ScheduledEvent { kind: QueueEvent::Arrival, time: next_arrival },
    }
}
