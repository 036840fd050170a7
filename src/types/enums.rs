//! Enumeration types for the queue simulator
//!
//! This module contains the enumeration types used throughout the simulation system:
//! event kinds, driver phases, and output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of events processed by the simulation driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueEvent {
    /// A customer enters the system
    Arrival,
    /// The in-service customer leaves the system
    Departure,
}

impl fmt::Display for QueueEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEvent::Arrival => write!(f, "Arrival"),
            QueueEvent::Departure => write!(f, "Departure"),
        }
    }
}

/// Phases of a single simulation run
///
/// A run moves strictly forward: `Running` until the clock reaches the horizon,
/// `Draining` while customers remain in the system, then `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverPhase {
    /// Arrivals are admitted and the clock is below the horizon
    Running,
    /// The horizon has passed; remaining customers are being served
    Draining,
    /// The system is empty and metrics can be computed
    Done,
}

impl fmt::Display for DriverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverPhase::Running => write!(f, "Running"),
            DriverPhase::Draining => write!(f, "Draining"),
            DriverPhase::Done => write!(f, "Done"),
        }
    }
}

/// Output formats for the command-line summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Plain-text side-by-side summary
    Text,
    /// JSON document for downstream tooling
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "TEXT"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_event_display() {
        assert_eq!(format!("{}", QueueEvent::Arrival), "Arrival");
        assert_eq!(format!("{}", QueueEvent::Departure), "Departure");
    }

    #[test]
    fn test_driver_phase_display() {
        assert_eq!(DriverPhase::Running.to_string(), "Running");
        assert_eq!(DriverPhase::Draining.to_string(), "Draining");
        assert_eq!(DriverPhase::Done.to_string(), "Done");
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(format!("{}", OutputFormat::Text), "TEXT");
        assert_eq!(format!("{}", OutputFormat::Json), "JSON");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);

        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_serialization() {
        let json = serde_json::to_string(&OutputFormat::Json).unwrap();
        assert_eq!(json, "\"Json\"");
        let parsed: OutputFormat = serde_json::from_str("\"Text\"").unwrap();
        assert_eq!(parsed, OutputFormat::Text);
    }
}
