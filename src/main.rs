use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use adaptive_cruise_control::benchmark::metrics::{MetricsReport, TimingMetrics};
use adaptive_cruise_control::config::{load_or_default, AccConfig, DEFAULT_CONFIG_PATH};
use adaptive_cruise_control::ipc::{DiagnosticLog, SharedController, SimulationChannels};
use adaptive_cruise_control::simulation::{History, Simulation};
use adaptive_cruise_control::threaded_impl::simulation_thread::{
    join_simulation_thread, spawn_simulation_thread, TickSettings,
};
use adaptive_cruise_control::threaded_impl::telemetry_thread::spawn_telemetry_thread;
use adaptive_cruise_control::vehicle::VehicleController;
use adaptive_cruise_control::visualization::dashboard::render_report_charts;

#[derive(Parser, Debug)]
#[command(name = "acc-sim", about = "Adaptive cruise control simulation")]
struct Cli {
    /// TOML configuration file; defaults are used when it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Simulated seconds to run, overriding the configuration.
    #[arg(short, long)]
    duration: Option<f64>,

    /// Seed for a random lead-object scenario, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Tick on the wall clock from a dedicated thread instead of as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Write speed and distance charts to this PNG file.
    #[arg(long)]
    chart: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_or_default(&cli.config)?;
    if let Some(duration) = cli.duration {
        config.duration_secs = duration;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;

    println!("===========================================");
    println!("Adaptive Cruise Control Simulation");
    println!("===========================================");
    println!(
        "dt {:.3}s | initial {:.1} kph | set {:.1} kph | lead {:.1} kph @ {:.1} m | policy {}",
        config.time_step,
        config.initial_speed,
        config.set_speed,
        config.lead_speed,
        config.lead_distance,
        config.safe_distance_policy().name()
    );

    let (history, report) = if cli.realtime {
        let (history, report) = run_realtime(&config)?;
        (history, Some(report))
    } else {
        (run_headless(&config)?, None)
    };

    print_summary(&history);
    if let Some(report) = &report {
        print_report(report);
    }

    if let Some(path) = cli.chart {
        render_report_charts(&history, report.as_ref(), &path)?;
        info!(path = %path.display(), "charts written");
    }
    Ok(())
}

fn run_headless(config: &AccConfig) -> Result<History, Box<dyn std::error::Error>> {
    let mut sim = Simulation::from_config(config)?;
    let every = config.telemetry_every.max(1);
    let ticks = (config.duration_secs / config.time_step).round() as u64;

    for _ in 0..ticks {
        let t = sim.tick()?;
        if t.tick % every == 0 {
            info!(
                "[{:7.2}s] speed {:6.2} kph, target {:6.2} kph, safe {:6.2} m, lead {:6.2} m ({})",
                t.time,
                t.result.current_speed,
                t.result.target_speed,
                t.result.safe_distance,
                t.lead_distance,
                t.result.command()
            );
        }
    }
    Ok(sim.history().clone())
}

fn run_realtime(
    config: &AccConfig,
) -> Result<(History, MetricsReport), Box<dyn std::error::Error>> {
    let controller = SharedController::new(VehicleController::from_config(config));
    let channels = SimulationChannels::new(256);
    let diagnostic_log = DiagnosticLog::new(2000);
    let metrics = TimingMetrics::new();

    let mut settings = TickSettings::realtime(config.time_step)?;
    settings.max_ticks = Some((config.duration_secs / config.time_step).round() as u64);

    let (sim_handle, stats) = spawn_simulation_thread(
        controller.clone(),
        channels.clone(),
        config.build_scenario()?,
        diagnostic_log.clone(),
        metrics.clone(),
        settings,
    );
    let telemetry_handle = spawn_telemetry_thread(
        channels,
        stats.clone(),
        config.history_window_secs,
        config.telemetry_every,
    );

    info!("running for {:.1} seconds", config.duration_secs);
    let joined = join_simulation_thread(sim_handle, &stats);
    stats.request_shutdown();
    let history = telemetry_handle
        .join()
        .map_err(|_| "telemetry thread panicked")?;

    println!("\n===========================================");
    println!("Threaded run completed");
    println!("Ticks: {}", stats.ticks.load(Ordering::Relaxed));
    println!("Commands applied: {}", stats.commands_applied.load(Ordering::Relaxed));
    println!("Dropped telemetry: {}", stats.dropped_telemetry.load(Ordering::Relaxed));
    println!("Step failures: {}", stats.step_failures.load(Ordering::Relaxed));
    for line in diagnostic_log.read_all().iter().rev().take(5).rev() {
        println!("  {}", line);
    }
    let final_state = controller.snapshot();
    println!(
        "Final speed {:.2} kph (set {:.1} kph)",
        final_state.current_speed(),
        final_state.set_speed()
    );

    joined?;
    Ok((history, metrics.report()))
}

fn print_summary(history: &History) {
    println!("===========================================");
    println!("RUN SUMMARY");
    println!("===========================================");
    let Some(last) = history.last() else {
        println!("No samples recorded");
        return;
    };

    let min_gap = history
        .samples()
        .map(|s| s.lead_distance - s.safe_distance)
        .filter(|m| m.is_finite())
        .fold(f64::INFINITY, f64::min);

    println!("Samples retained: {}", history.len());
    println!("Time: {:.1}s", last.time);
    println!("Speed: {:.2} kph (target {:.2} kph)", last.current_speed, last.target_speed);
    println!("Lead distance: {:.2} m (safe {:.2} m)", last.lead_distance, last.safe_distance);
    if min_gap.is_finite() {
        println!("Worst distance margin: {:.2} m", min_gap);
    }
}

fn print_report(report: &MetricsReport) {
    let us = |d: Duration| d.as_secs_f64() * 1_000_000.0;
    println!("\n=== Timing ===");
    println!(
        "Step P50: {:.1}us, P99: {:.1}us, max: {:.1}us",
        us(report.step_p50),
        us(report.step_p99),
        us(report.step_max)
    );
    println!("Tick P50: {:?}, P99: {:?}", report.tick_p50, report.tick_p99);
    println!("Jitter P50: {:?}, P99: {:?}", report.jitter_p50, report.jitter_p99);
    println!("Missed deadlines: {} of {}", report.missed_deadlines, report.steps);
}
