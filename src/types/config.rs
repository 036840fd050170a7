//! Configuration structures for the queue simulator
//!
//! This module contains the simulation configuration structure and validation logic
//! used to control the parameters of a run, a scenario comparison, or a sweep.

use super::{OutputFormat, SimulationParameters};
use crate::simulation::SimulationResult;
use clap::Parser;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Reference scenario constants
pub mod reference {
    /// Default arrival rate λ
    pub const ARRIVAL_RATE: f64 = 6.0;

    /// Default service rate μ, shared by the comparison scenarios
    pub const SERVICE_RATE: f64 = 12.0;

    /// Default simulated horizon
    pub const HORIZON: f64 = 20_000.0;

    /// Default waiting-queue cap guarding against unstable inputs
    pub const MAX_QUEUE_LENGTH: usize = 1_000_000;

    /// Arrival rates of the light, moderate, and heavy comparison scenarios
    pub const COMPARISON_ARRIVAL_RATES: [f64; 3] = [4.0, 6.0, 10.0];

    /// Utilization points for the Wq-versus-ρ sweep
    pub const SWEEP_UTILIZATIONS: [f64; 20] = [
        0.05, 0.1, 0.15, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.75, 0.8, 0.85, 0.9, 0.92, 0.94, 0.95,
        0.96, 0.97, 0.98, 0.99,
    ];
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mm1-queue-simulator",
    version = "0.1.0",
    about = "M/M/1 Queue Simulator - Discrete-event simulation checked against the closed-form model",
    long_about = "Simulates a single-server FIFO queue with Poisson arrivals and exponential service, then reports utilization, mean occupancy, mean waits, and occupancy probabilities next to the closed-form M/M/1 values.

EXAMPLES:
    # Run with default settings (λ=6, μ=12, horizon 20000)
    mm1-queue-simulator

    # Custom rates with a fixed seed
    mm1-queue-simulator --arrival-rate 4 --service-rate 12 --seed 42

    # Compare the light, moderate, and heavy reference scenarios
    mm1-queue-simulator --compare

    # Sweep utilization and print Wq per point as JSON
    mm1-queue-simulator --sweep --output-format json

    # Generate configuration template
    mm1-queue-simulator --print-config > my-config.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Arrival rate λ
    #[arg(
        long,
        help = "Arrival rate λ (customers per time unit)",
        long_help = "Mean number of arrivals per time unit. Must be greater than 0. Default: 6"
    )]
    pub arrival_rate: Option<f64>,

    /// Service rate μ
    #[arg(
        long,
        help = "Service rate μ (customers per time unit)",
        long_help = "Mean number of service completions per busy time unit. Must be greater than 0. Default: 12"
    )]
    pub service_rate: Option<f64>,

    /// Simulated horizon
    #[arg(
        long,
        help = "Simulated time after which arrivals stop",
        long_help = "Arrivals are admitted until the simulated clock reaches the horizon; the queue is then drained. Must be greater than 0. Default: 20000"
    )]
    pub horizon: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Waiting-queue cap
    #[arg(
        long,
        help = "Abort a run once the waiting queue exceeds this length",
        long_help = "Abort a run with a resource-exceeded error once the waiting queue grows past this length. Guards against unstable inputs (λ ≥ μ). Default: 1000000"
    )]
    pub max_queue_length: Option<usize>,

    /// Disable the waiting-queue cap
    #[arg(
        long,
        help = "Let the waiting queue grow without a cap",
        conflicts_with = "max_queue_length"
    )]
    pub no_queue_cap: bool,

    /// Output format for the summary
    #[arg(long, help = "Output format (text or json)")]
    pub output_format: Option<String>,

    /// Run the reference comparison scenarios
    #[arg(long, help = "Compare λ = 4, 6, 10 against μ = 12", conflicts_with = "sweep")]
    pub compare: bool,

    /// Run the utilization sweep
    #[arg(long, help = "Sweep utilization and report Wq per point")]
    pub sweep: bool,

    /// Display times in minutes
    #[arg(long, help = "Treat rates as hourly and display times in minutes")]
    pub minutes: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Arrival rate λ
    pub arrival_rate: Option<f64>,

    /// Service rate μ
    pub service_rate: Option<f64>,

    /// Simulated horizon
    pub horizon: Option<f64>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Waiting-queue cap; an explicit `null` removes the cap
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub max_queue_length: Option<Option<usize>>,

    /// Output format for the summary
    pub output_format: Option<String>,

    /// Utilization points for the sweep
    pub sweep_utilizations: Option<Vec<f64>>,

    /// Treat rates as hourly and display times in minutes
    pub display_minutes: Option<bool>,
}

/// Keep an explicit `null` apart from a missing key
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Configuration for the queue simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Arrival rate λ
    pub arrival_rate: f64,

    /// Service rate μ
    pub service_rate: f64,

    /// Simulated horizon
    pub horizon: f64,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Waiting-queue cap (`None` leaves the queue unbounded)
    pub max_queue_length: Option<usize>,

    /// Output format for the summary
    pub output_format: String,

    /// Utilization points for the sweep
    pub sweep_utilizations: Vec<f64>,

    /// Treat rates as hourly and display times in minutes
    pub display_minutes: bool,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A rate is zero, negative, or not finite
    #[error("Invalid {field}: {value} (must be a positive finite number)")]
    InvalidRate {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: f64,
    },

    /// Horizon is zero, negative, or not finite
    #[error("Horizon must be a positive finite number, got {0}")]
    InvalidHorizon(f64),

    /// Queue cap of zero would reject the first waiting customer
    #[error("Max queue length must be greater than 0, got {0}")]
    InvalidQueueLimit(usize),

    /// Sweep point outside the open interval (0, 1)
    #[error("Invalid sweep utilization: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidSweepPoint(f64),

    /// Unknown output format
    #[error("Unknown output format: {0} (supported: text, json)")]
    UnknownOutputFormat(String),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate: reference::ARRIVAL_RATE,
            service_rate: reference::SERVICE_RATE,
            horizon: reference::HORIZON,
            seed: None,
            max_queue_length: Some(reference::MAX_QUEUE_LENGTH),
            output_format: "text".to_string(),
            sweep_utilizations: reference::SWEEP_UTILIZATIONS.to_vec(),
            display_minutes: false,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            arrival_rate: config_file.arrival_rate.unwrap_or(defaults.arrival_rate),
            service_rate: config_file.service_rate.unwrap_or(defaults.service_rate),
            horizon: config_file.horizon.unwrap_or(defaults.horizon),
            seed: config_file.seed.or(defaults.seed),
            max_queue_length: config_file.max_queue_length.unwrap_or(defaults.max_queue_length),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            sweep_utilizations: config_file
                .sweep_utilizations
                .unwrap_or(defaults.sweep_utilizations),
            display_minutes: config_file.display_minutes.unwrap_or(defaults.display_minutes),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.arrival_rate {
            config.arrival_rate = value;
        }
        if let Some(value) = args.service_rate {
            config.service_rate = value;
        }
        if let Some(value) = args.horizon {
            config.horizon = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.max_queue_length {
            config.max_queue_length = Some(value);
        }
        if args.no_queue_cap {
            config.max_queue_length = None;
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
        if args.minutes {
            config.display_minutes = true;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    ///
    /// Invalid values are rejected outright; no defaults are substituted.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.validate_rate("arrival_rate", self.arrival_rate)?;
        self.validate_rate("service_rate", self.service_rate)?;

        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(ConfigValidationError::InvalidHorizon(self.horizon));
        }

        if let Some(0) = self.max_queue_length {
            return Err(ConfigValidationError::InvalidQueueLimit(0));
        }

        if let Some(&point) =
            self.sweep_utilizations.iter().find(|&&rho| !(rho > 0.0 && rho < 1.0))
        {
            return Err(ConfigValidationError::InvalidSweepPoint(point));
        }

        self.get_output_format()?;

        Ok(())
    }

    fn validate_rate(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        // A rate whose mean 1 / rate overflows would put every event at infinity
        if !(value.is_finite() && value > 0.0 && (1.0 / value).is_finite()) {
            return Err(ConfigValidationError::InvalidRate { field: field.to_string(), value });
        }
        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, ConfigValidationError> {
        self.output_format
            .parse()
            .map_err(|_| ConfigValidationError::UnknownOutputFormat(self.output_format.clone()))
    }

    /// Build engine parameters for a single run from this configuration
    pub fn to_parameters(&self) -> SimulationResult<SimulationParameters> {
        let parameters =
            SimulationParameters::new(self.arrival_rate, self.service_rate, self.horizon)?;
        Ok(match self.max_queue_length {
            Some(limit) => parameters.with_max_queue_length(limit),
            None => parameters,
        })
    }

    /// Multiplier applied to displayed times (60 when rates are hourly and times shown in minutes)
    pub fn display_time_scale(&self) -> f64 {
        if self.display_minutes {
            60.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            config: None,
            arrival_rate: None,
            service_rate: None,
            horizon: None,
            seed: None,
            max_queue_length: None,
            no_queue_cap: false,
            output_format: None,
            compare: false,
            sweep: false,
            minutes: false,
            verbose: false,
            debug: false,
            dry_run: false,
            print_config: false,
        }
    }

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert_eq!(config.arrival_rate, 6.0);
        assert_eq!(config.service_rate, 12.0);
        assert_eq!(config.horizon, 20_000.0);
        assert!(config.seed.is_none());
        assert_eq!(config.max_queue_length, Some(1_000_000));
        assert_eq!(config.output_format, "text");
        assert_eq!(config.sweep_utilizations.len(), 20);
        assert!(!config.display_minutes);
    }

    #[test]
    fn test_cli_parsing() {
        let args = vec!["test", "--arrival-rate", "4", "--service-rate", "12", "--seed", "7"];
        let cli_args = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(cli_args.arrival_rate, Some(4.0));
        assert_eq!(cli_args.service_rate, Some(12.0));
        assert_eq!(cli_args.seed, Some(7));
        assert!(!cli_args.compare);

        let args = vec!["test", "--compare"];
        let cli_args = CliArgs::try_parse_from(args).unwrap();
        assert!(cli_args.compare);
    }

    #[test]
    fn test_compare_conflicts_with_sweep() {
        let args = vec!["test", "--compare", "--sweep"];
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "arrival_rate": 4.0,
            "service_rate": 10.0,
            "horizon": 500.0,
            "seed": 12345,
            "output_format": "json"
        }"#;

        temp_file.write_all(config_json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = SimulationConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.arrival_rate, 4.0);
        assert_eq!(config.service_rate, 10.0);
        assert_eq!(config.horizon, 500.0);
        assert_eq!(config.seed, Some(12345));
        assert_eq!(config.output_format, "json");
        // Missing fields fall back to defaults
        assert_eq!(config.max_queue_length, Some(1_000_000));
        assert_eq!(config.sweep_utilizations.len(), 20);
    }

    #[test]
    fn test_config_file_missing_and_unsupported() {
        let missing = SimulationConfig::from_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        let temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let unsupported = SimulationConfig::from_file(temp_file.path());
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = empty_args();
        args.arrival_rate = Some(10.0);
        args.seed = Some(54321);
        args.minutes = true;

        let config = SimulationConfig::from_cli_args(args).unwrap();

        assert_eq!(config.arrival_rate, 10.0);
        assert_eq!(config.seed, Some(54321));
        assert!(config.display_minutes);
        assert_eq!(config.display_time_scale(), 60.0);
        // Default values should remain for non-overridden fields
        assert_eq!(config.service_rate, 12.0);
        assert_eq!(config.horizon, 20_000.0);
    }

    #[test]
    fn test_simulation_config_validation_success() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulation_config_validation_rates() {
        let mut config = SimulationConfig::default();
        config.arrival_rate = 0.0;

        match config.validate() {
            Err(ConfigValidationError::InvalidRate { field, value }) => {
                assert_eq!(field, "arrival_rate");
                assert_eq!(value, 0.0);
            }
            other => panic!("Expected InvalidRate, got {:?}", other),
        }

        let mut config = SimulationConfig::default();
        config.service_rate = -3.0;
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidRate { .. })));
    }

    #[test]
    fn test_simulation_config_validation_horizon() {
        let mut config = SimulationConfig::default();
        config.horizon = 0.0;
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidHorizon(_))));
    }

    #[test]
    fn test_simulation_config_validation_queue_limit() {
        let mut config = SimulationConfig::default();
        config.max_queue_length = Some(0);
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidQueueLimit(0))));

        config.max_queue_length = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_null_removes_queue_cap() {
        let explicit: ConfigFile = serde_json::from_str(r#"{ "max_queue_length": null }"#).unwrap();
        assert_eq!(explicit.max_queue_length, Some(None));
        assert_eq!(SimulationConfig::from_config_file(explicit).max_queue_length, None);

        let missing: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.max_queue_length, None);
        assert_eq!(SimulationConfig::from_config_file(missing).max_queue_length, Some(1_000_000));

        let capped: ConfigFile = serde_json::from_str(r#"{ "max_queue_length": 50 }"#).unwrap();
        assert_eq!(SimulationConfig::from_config_file(capped).max_queue_length, Some(50));
    }

    #[test]
    fn test_no_queue_cap_override() {
        let mut args = empty_args();
        args.no_queue_cap = true;

        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.max_queue_length, None);
        assert_eq!(config.to_parameters().unwrap().max_queue_length(), None);
    }

    #[test]
    fn test_validation_rejects_rate_with_overflowing_mean() {
        let mut config = SimulationConfig::default();
        config.arrival_rate = 1e-310;
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidRate { .. })));
    }

    #[test]
    fn test_simulation_config_validation_sweep_points() {
        let mut config = SimulationConfig::default();
        config.sweep_utilizations = vec![0.5, 1.0];
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidSweepPoint(_))));
    }

    #[test]
    fn test_simulation_config_validation_output_format() {
        let mut config = SimulationConfig::default();
        config.output_format = "xml".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::UnknownOutputFormat(_))
        ));
    }

    #[test]
    fn test_to_parameters_carries_queue_limit() {
        let mut config = SimulationConfig::default();
        config.max_queue_length = Some(64);
        let params = config.to_parameters().unwrap();
        assert_eq!(params.arrival_rate(), 6.0);
        assert_eq!(params.max_queue_length(), Some(64));

        config.max_queue_length = None;
        assert!(config.to_parameters().unwrap().max_queue_length().is_none());
    }

    #[test]
    fn test_simulation_config_serialization() {
        let config = SimulationConfig::default();
        let json = config.print_json().unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.arrival_rate, config.arrival_rate);
        assert_eq!(parsed.sweep_utilizations, config.sweep_utilizations);
    }
}
