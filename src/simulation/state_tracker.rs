//! Instantaneous queue state and time-weighted occupancy accounting
//!
//! [`StateTracker`] owns everything that changes while a run is in progress: the
//! server, the FIFO waiting line, busy time, and the two occupancy ledgers. The
//! ledgers keep running sums per customer count instead of interval histories, so
//! every update is O(1) while still tiling `[0, total_simulation_time)`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// Number of individually tracked occupancy counts (0, 1, 2, 3)
pub const TRACKED_STATES: usize = 4;

/// The customer currently in service and when it will leave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDeparture {
    /// When the in-service customer entered the system
    pub arrival_time: f64,
    /// When its service completes
    pub departure_time: f64,
}

/// Busy/idle state of the single server
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ServerState {
    /// No customer in service
    #[default]
    Idle,
    /// Serving a customer until the pending departure
    Busy(PendingDeparture),
}

impl ServerState {
    /// Whether a customer is in service
    pub fn is_busy(&self) -> bool {
        matches!(self, ServerState::Busy(_))
    }

    /// The pending departure, if busy
    pub fn pending_departure(&self) -> Option<PendingDeparture> {
        match self {
            ServerState::Busy(departure) => Some(*departure),
            ServerState::Idle => None,
        }
    }
}

/// Time spent at each occupancy count, accumulated in O(1) per interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyLedger {
    /// Time spent with exactly n customers, for n < [`TRACKED_STATES`]
    pub time_by_count: [f64; TRACKED_STATES],
    /// Time spent with [`TRACKED_STATES`] or more customers
    pub overflow_time: f64,
    /// Integral of the count over time (Σ count × interval length)
    pub weighted_area: f64,
    /// Total length of all recorded intervals
    pub total_time: f64,
}

impl OccupancyLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `count` customers were present for `duration`
    pub fn record(&mut self, count: usize, duration: f64) {
        match self.time_by_count.get_mut(count) {
            Some(slot) => *slot += duration,
            None => self.overflow_time += duration,
        }
        self.weighted_area += count as f64 * duration;
        self.total_time += duration;
    }

    /// Time spent with exactly `count` customers, if that count is tracked
    pub fn time_at(&self, count: usize) -> Option<f64> {
        self.time_by_count.get(count).copied()
    }

    /// Sum of the tracked buckets and the overflow bucket
    pub fn bucketed_time(&self) -> f64 {
        self.time_by_count.iter().sum::<f64>() + self.overflow_time
    }
}

/// A customer that completed service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedSojourn {
    /// Arrival time
    pub arrival_time: f64,
    /// Departure time
    pub departure_time: f64,
}

impl CompletedSojourn {
    /// Time spent in the system
    pub fn duration(&self) -> f64 {
        self.departure_time - self.arrival_time
    }
}

/// A customer that waited in line before service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueWait {
    /// Arrival time
    pub arrival_time: f64,
    /// Time the customer reached the server
    pub service_start: f64,
}

impl QueueWait {
    /// Time spent waiting in line
    pub fn duration(&self) -> f64 {
        self.service_start - self.arrival_time
    }
}

/// Append-only record of completed sojourns and queue waits, in completion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletedCustomerLog {
    /// Sojourns in departure order
    pub sojourns: Vec<CompletedSojourn>,
    /// Queue waits in service-start order
    pub queue_waits: Vec<QueueWait>,
}

impl CompletedCustomerLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of customers that completed service
    pub fn customers_served(&self) -> usize {
        self.sojourns.len()
    }

    /// Σ (departure − arrival)
    pub fn total_time_in_system(&self) -> f64 {
        self.sojourns.iter().map(CompletedSojourn::duration).sum()
    }

    /// Σ (service start − arrival)
    pub fn total_time_in_queue(&self) -> f64 {
        self.queue_waits.iter().map(QueueWait::duration).sum()
    }
}

/// Mutable per-run queue state
#[derive(Debug, Default)]
pub struct StateTracker {
    server: ServerState,
    waiting: VecDeque<f64>,
    system_ledger: OccupancyLedger,
    queue_ledger: OccupancyLedger,
    busy_time: f64,
    peak_queue_length: usize,
    log: CompletedCustomerLog,
}

impl StateTracker {
    /// Create a tracker with an idle server and empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Current server state
    pub fn server(&self) -> &ServerState {
        &self.server
    }

    /// Customers waiting in line (excluding the one in service)
    pub fn queue_length(&self) -> usize {
        self.waiting.len()
    }

    /// Customers in the system (waiting plus in service)
    pub fn customers_in_system(&self) -> usize {
        self.waiting.len() + usize::from(self.server.is_busy())
    }

    /// Whether no customer is waiting or in service
    pub fn is_empty(&self) -> bool {
        !self.server.is_busy() && self.waiting.is_empty()
    }

    /// Longest waiting line observed so far
    pub fn peak_queue_length(&self) -> usize {
        self.peak_queue_length
    }

    /// Accumulated busy time
    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    /// Charge the interval `[previous_time, current_time)` to the counts that held during it
    ///
    /// Must be called before the event at `current_time` changes the state.
    pub fn account_interval(&mut self, previous_time: f64, current_time: f64) {
        let duration = current_time - previous_time;
        let in_system = self.customers_in_system();
        let in_queue = self.waiting.len();

        self.system_ledger.record(in_system, duration);
        self.queue_ledger.record(in_queue, duration);
        if self.server.is_busy() {
            self.busy_time += duration;
        }

        trace!(previous_time, current_time, in_system, in_queue, "Accounted interval");
    }

    /// Put an arriving customer into service
    pub fn start_service(&mut self, departure: PendingDeparture) {
        self.server = ServerState::Busy(departure);
    }

    /// Put an arriving customer at the back of the line; returns the new queue length
    pub fn enqueue(&mut self, arrival_time: f64) -> usize {
        self.waiting.push_back(arrival_time);
        self.peak_queue_length = self.peak_queue_length.max(self.waiting.len());
        self.waiting.len()
    }

    /// Retire the in-service customer and return it, leaving the server idle
    pub fn complete_service(&mut self) -> Option<CompletedSojourn> {
        let departure = self.server.pending_departure()?;
        self.server = ServerState::Idle;

        let sojourn = CompletedSojourn {
            arrival_time: departure.arrival_time,
            departure_time: departure.departure_time,
        };
        self.log.sojourns.push(sojourn);
        Some(sojourn)
    }

    /// Move the oldest waiting customer to the server at `now`
    ///
    /// Returns the customer's arrival time, or `None` if nobody is waiting.
    pub fn promote_next(&mut self, now: f64, service_duration: f64) -> Option<f64> {
        let arrival_time = self.waiting.pop_front()?;
        self.log.queue_waits.push(QueueWait { arrival_time, service_start: now });
        self.server = ServerState::Busy(PendingDeparture {
            arrival_time,
            departure_time: now + service_duration,
        });
        Some(arrival_time)
    }

    /// System-occupancy ledger
    pub fn system_ledger(&self) -> &OccupancyLedger {
        &self.system_ledger
    }

    /// Queue-occupancy ledger
    pub fn queue_ledger(&self) -> &OccupancyLedger {
        &self.queue_ledger
    }

    /// Completed customer log
    pub fn log(&self) -> &CompletedCustomerLog {
        &self.log
    }

    /// Consume the tracker and hand back its ledgers and log
    pub fn into_parts(self) -> (OccupancyLedger, OccupancyLedger, CompletedCustomerLog) {
        (self.system_ledger, self.queue_ledger, self.log)
    }
}
