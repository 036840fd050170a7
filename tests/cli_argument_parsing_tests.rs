//! Tests for CLI argument parsing functionality
//!
//! These tests verify that command line arguments are parsed, merged with a
//! configuration file, and validated into run parameters.

use clap::Parser;
use mm1_queue_simulator::simulation::SimulationError;
use mm1_queue_simulator::types::config::{CliArgs, ConfigValidationError, SimulationConfig};
use mm1_queue_simulator::types::OutputFormat;
use std::fs;
use tempfile::TempDir;

/// Test that no arguments gives the reference configuration
#[test]
fn test_defaults_without_arguments() {
    let args = CliArgs::try_parse_from(["mm1-queue-simulator"]).unwrap();
    assert!(!args.compare);
    assert!(!args.sweep);
    assert!(!args.minutes);

    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.arrival_rate, 6.0);
    assert_eq!(config.service_rate, 12.0);
    assert_eq!(config.horizon, 20_000.0);
    assert_eq!(config.max_queue_length, Some(1_000_000));
    assert_eq!(config.sweep_utilizations.len(), 20);
    config.validate().unwrap();
}

/// Test parsing of every run option
#[test]
fn test_run_options_parsing() {
    let args = CliArgs::try_parse_from([
        "mm1-queue-simulator",
        "--arrival-rate",
        "10",
        "--service-rate",
        "12",
        "--horizon",
        "500",
        "--seed",
        "42",
        "--max-queue-length",
        "250",
        "--output-format",
        "json",
        "--minutes",
        "--sweep",
        "-v",
    ])
    .unwrap();

    assert!(args.sweep);
    assert!(args.verbose);

    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.arrival_rate, 10.0);
    assert_eq!(config.horizon, 500.0);
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.max_queue_length, Some(250));
    assert_eq!(config.get_output_format().unwrap(), OutputFormat::Json);
    assert_eq!(config.display_time_scale(), 60.0);

    let params = config.to_parameters().unwrap();
    assert_eq!(params.arrival_rate(), 10.0);
    assert_eq!(params.max_queue_length(), Some(250));
}

/// Test that --compare and --sweep cannot be combined
#[test]
fn test_compare_and_sweep_conflict() {
    let result = CliArgs::try_parse_from(["mm1-queue-simulator", "--compare", "--sweep"]);
    assert!(result.is_err());
}

/// Test that invalid values parse but fail validation without substitution
#[test]
fn test_invalid_values_are_rejected() {
    let args = CliArgs::try_parse_from(["mm1-queue-simulator", "--arrival-rate=-4"]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();

    assert_eq!(config.arrival_rate, -4.0);
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidRate { .. })));
    assert!(matches!(
        config.to_parameters(),
        Err(SimulationError::InvalidParameter { name: "arrival_rate", .. })
    ));

    let args = CliArgs::try_parse_from(["mm1-queue-simulator", "--horizon", "0"]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidHorizon(_))));
}

/// Test that the queue cap can be removed from the command line or a file
#[test]
fn test_queue_cap_can_be_disabled() {
    let args = CliArgs::try_parse_from(["mm1-queue-simulator", "--no-queue-cap"]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.max_queue_length, None);
    config.validate().unwrap();

    let conflicting = CliArgs::try_parse_from([
        "mm1-queue-simulator",
        "--no-queue-cap",
        "--max-queue-length",
        "10",
    ]);
    assert!(conflicting.is_err());

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("uncapped.json");
    fs::write(&path, r#"{ "max_queue_length": null }"#).unwrap();
    let config = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(config.max_queue_length, None);
}

/// Test that a non-numeric rate is a parse error
#[test]
fn test_non_numeric_rate_fails_parsing() {
    let result = CliArgs::try_parse_from(["mm1-queue-simulator", "--service-rate", "fast"]);
    assert!(result.is_err());
}

/// Test that CLI flags override a configuration file
#[test]
fn test_cli_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scenario.json");
    fs::write(
        &path,
        r#"{ "arrival_rate": 4.0, "service_rate": 10.0, "horizon": 1000.0, "seed": 5 }"#,
    )
    .unwrap();

    let args = CliArgs::try_parse_from([
        "mm1-queue-simulator",
        "--config",
        path.to_str().unwrap(),
        "--seed",
        "9",
    ])
    .unwrap();

    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.arrival_rate, 4.0);
    assert_eq!(config.service_rate, 10.0);
    assert_eq!(config.horizon, 1000.0);
    assert_eq!(config.seed, Some(9));
    config.validate().unwrap();
}
