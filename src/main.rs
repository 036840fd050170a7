// M/M/1 Queue Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/mm1-queue-simulator
// ```
//
// Or with custom rates:
//
// ```console
// $ ./target/release/mm1-queue-simulator --arrival-rate 10 --service-rate 12 --seed 42 --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use mm1_queue_simulator::analytical::{AnalyticalMetrics, MetricComparison};
use mm1_queue_simulator::simulation::{
    ExponentialSource, LoggingConfig, QueueMetrics, ScenarioBatch, ScenarioOutcome,
    SimulationDriver, SweepPoint, UtilizationSweep,
};
use mm1_queue_simulator::types::config::CliArgs;
use mm1_queue_simulator::types::{OutputFormat, SimulationConfig, SimulationParameters};
use serde::Serialize;
use std::process;
use tracing::{error, info};

/// JSON document for a single run
#[derive(Serialize)]
struct SingleRunOutput<'a> {
    parameters: &'a SimulationParameters,
    simulated: &'a QueueMetrics,
    analytical: Option<&'a AnalyticalMetrics>,
    comparison: Option<MetricComparison>,
    time_scale: f64,
}

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };

    // The guard flushes file logs on drop, so it lives until main returns
    let _log_guard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting M/M/1 Queue Simulator");

    let config = match SimulationConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    let outcome = if args.compare {
        run_comparison(&config)
    } else if args.sweep {
        run_sweep(&config)
    } else {
        run_single(&config)
    };

    if let Err(e) = outcome {
        error!("Simulation failed: {:#}", e);
        eprintln!("Simulation failed: {:#}", e);
        process::exit(1);
    }

    info!("M/M/1 Queue Simulator completed successfully");
}

/// Run the configured scenario once and print it next to the closed form
fn run_single(config: &SimulationConfig) -> Result<()> {
    let parameters = config.to_parameters().context("Invalid run parameters")?;
    let format = config.get_output_format()?;
    let scale = config.display_time_scale();

    let report = SimulationDriver::new(parameters, ExponentialSource::new(config.seed))
        .run()
        .context("Simulation run failed")?;

    let analytical =
        AnalyticalMetrics::compute(parameters.arrival_rate(), parameters.service_rate()).ok();
    let comparison =
        analytical.as_ref().map(|expected| MetricComparison::new(expected, &report.metrics));

    match format {
        OutputFormat::Json => {
            let output = SingleRunOutput {
                parameters: &report.parameters,
                simulated: &report.metrics,
                analytical: analytical.as_ref(),
                comparison,
                time_scale: scale,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!(
                "Scenario λ={} μ={} (horizon {}, drained at {:.3})",
                parameters.arrival_rate(),
                parameters.service_rate(),
                parameters.horizon(),
                report.metrics.total_simulation_time
            );
            print_metrics_table(&report.metrics, analytical.as_ref(), scale);
        }
    }
    Ok(())
}

/// Run the light, moderate, and heavy reference scenarios
fn run_comparison(config: &SimulationConfig) -> Result<()> {
    let format = config.get_output_format()?;
    let scale = config.display_time_scale();
    let outcomes = ScenarioBatch::reference(config).run().context("Scenario batch failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => {
            for outcome in &outcomes {
                print_outcome(outcome, scale);
            }
        }
    }
    Ok(())
}

/// Run the utilization sweep and print Wq per point
fn run_sweep(config: &SimulationConfig) -> Result<()> {
    let format = config.get_output_format()?;
    let scale = config.display_time_scale();
    let points = UtilizationSweep::from_config(config).run().context("Utilization sweep failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&points)?),
        OutputFormat::Text => print_sweep_table(&points, scale),
    }
    Ok(())
}

fn print_outcome(outcome: &ScenarioOutcome, scale: f64) {
    println!(
        "Scenario λ={} μ={}{}",
        outcome.scenario.arrival_rate,
        outcome.scenario.service_rate,
        outcome.seed.map(|seed| format!(" (seed {})", seed)).unwrap_or_default()
    );
    print_metrics_table(&outcome.simulated, outcome.analytical.as_ref(), scale);
    if let Some(comparison) = &outcome.comparison {
        println!("  Largest relative error: {:.2}%", comparison.worst() * 100.0);
    }
    println!();
}

fn closed_form(
    analytical: Option<&AnalyticalMetrics>,
    pick: impl Fn(&AnalyticalMetrics) -> f64,
    scale: f64,
) -> String {
    match analytical {
        Some(metrics) => format!("{:>12.4}", pick(metrics) * scale),
        None => format!("{:>12}", "n/a"),
    }
}

fn print_metrics_table(simulated: &QueueMetrics, analytical: Option<&AnalyticalMetrics>, scale: f64) {
    let rows = [
        ("Utilization (ρ)", simulated.utilization, closed_form(analytical, |a| a.utilization, 1.0)),
        ("Mean in system (L)", simulated.mean_in_system, closed_form(analytical, |a| a.mean_in_system, 1.0)),
        ("Mean in queue (Lq)", simulated.mean_in_queue, closed_form(analytical, |a| a.mean_in_queue, 1.0)),
        (
            "Time in system (Ws)",
            simulated.mean_time_in_system * scale,
            closed_form(analytical, |a| a.mean_time_in_system, scale),
        ),
        (
            "Wait in queue (Wq)",
            simulated.mean_wait_in_queue * scale,
            closed_form(analytical, |a| a.mean_wait_in_queue, scale),
        ),
    ];

    println!("  {:<28} {:>12} {:>12}", "Metric", "Simulated", "Analytical");
    for (label, value, expected) in &rows {
        println!("  {:<28} {:>12.4} {}", label, value, expected);
    }
    for (n, probability) in simulated.state_probabilities.iter().enumerate() {
        let expected = closed_form(analytical, |a| a.state_probabilities[n], 1.0);
        println!("  {:<28} {:>12.4} {}", format!("P{}", n), probability, expected);
    }
    println!("  Customers served: {}, peak queue: {}", simulated.customers_served, simulated.peak_queue_length);
}

fn print_sweep_table(points: &[SweepPoint], scale: f64) {
    println!("  {:>6} {:>10} {:>12} {:>12} {:>12}", "ρ", "λ", "Simulated ρ", "Simulated Wq", "Analytical Wq");
    for point in points {
        let analytical = point
            .analytical_wait
            .map(|wait| format!("{:>12.4}", wait * scale))
            .unwrap_or_else(|| format!("{:>12}", "n/a"));
        println!(
            "  {:>6.2} {:>10.4} {:>12.4} {:>12.4} {}",
            point.target_utilization,
            point.arrival_rate,
            point.simulated_utilization,
            point.simulated_wait * scale,
            analytical
        );
    }
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("M/M/1 Queue Simulator");
    eprintln!("=====================");
    eprintln!("Discrete-event simulation checked against the closed-form model");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("Configuration:");
    eprintln!("  Arrival Rate (λ): {}", config.arrival_rate);
    eprintln!("  Service Rate (μ): {}", config.service_rate);
    eprintln!("  Horizon: {}", config.horizon);
    eprintln!("  Offered Load (λ/μ): {:.4}", config.arrival_rate / config.service_rate);
    match config.max_queue_length {
        Some(limit) => eprintln!("  Max Queue Length: {}", limit),
        None => eprintln!("  Max Queue Length: unbounded"),
    }
    eprintln!("  Output Format: {}", config.output_format);
    eprintln!("  Times Shown In: {}", if config.display_minutes { "minutes" } else { "rate units" });
    eprintln!("  Sweep Points: {}", config.sweep_utilizations.len());
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    if config.arrival_rate >= config.service_rate {
        eprintln!("  Warning: λ ≥ μ, the queue has no steady state");
    }
    eprintln!();
}
