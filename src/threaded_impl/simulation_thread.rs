use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::benchmark::metrics::TimingMetrics;
use crate::command::DriverCommand;
use crate::error::{check_timestep, AccError, Result};
use crate::ipc::{DiagnosticLog, SharedController, SimulationChannels, Telemetry};
use crate::sensor::LeadScenario;
use crate::simulation::advance_lead;

pub struct SimulationStats {
    pub ticks: AtomicU64,
    pub commands_applied: AtomicU64,
    pub dropped_telemetry: AtomicU64,
    pub step_failures: AtomicU64,
    pub shutdown: AtomicBool,
    pub paused: AtomicBool,
}

impl SimulationStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ticks: AtomicU64::new(0),
            commands_applied: AtomicU64::new(0),
            dropped_telemetry: AtomicU64::new(0),
            step_failures: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        })
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Stops issuing ticks until `resume`. The controller keeps its state.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TickSettings {
    /// Simulated seconds per tick.
    pub dt: f64,
    /// Wall-clock period between tick starts.
    pub period: Duration,
    /// Stop on its own after this many ticks.
    pub max_ticks: Option<u64>,
}

impl TickSettings {
    /// One simulated second per wall-clock second.
    pub fn realtime(dt: f64) -> Result<Self> {
        check_timestep(dt)?;
        let period = Duration::try_from_secs_f64(dt).map_err(|_| AccError::InvalidTimestep(dt))?;
        Ok(Self {
            dt,
            period,
            max_ticks: None,
        })
    }
}

/// Parses a line of driver input and queues it for the next tick.
/// Rejected lines are logged and never reach the controller.
pub fn submit_line(channels: &SimulationChannels, log: &DiagnosticLog, line: &str) -> Result<()> {
    match line.parse::<DriverCommand>() {
        Ok(command) => {
            if channels.command_tx.send(command).is_err() {
                log.write("[INPUT] Command channel closed".to_string());
            }
            Ok(())
        }
        Err(e) => {
            warn!(input = line, error = %e, "rejected command");
            log.write(format!("[INPUT] {}", e));
            Err(e)
        }
    }
}

pub fn spawn_simulation_thread(
    controller: SharedController,
    channels: SimulationChannels,
    mut scenario: LeadScenario,
    diagnostic_log: DiagnosticLog,
    metrics: TimingMetrics,
    settings: TickSettings,
) -> (thread::JoinHandle<()>, Arc<SimulationStats>) {
    let stats = SimulationStats::new();
    let stats_clone = stats.clone();

    let handle = thread::spawn(move || {
        let dt = settings.dt;
        let mut tick = 0u64;
        let mut last_start: Option<Instant> = None;

        info!(dt, period = ?settings.period, "simulation thread started");

        loop {
            if stats_clone.is_shutdown() {
                info!("simulation thread shutting down");
                break;
            }
            if settings.max_ticks.is_some_and(|max| tick >= max) {
                break;
            }
            if stats_clone.is_paused() {
                // The gap is not a tick interval.
                last_start = None;
                thread::sleep(settings.period.max(Duration::from_millis(1)));
                continue;
            }

            let cycle_start = Instant::now();
            if let Some(prev) = last_start {
                metrics.record_tick_interval(cycle_start.duration_since(prev));
            }
            last_start = Some(cycle_start);

            // 1. Inputs: scripted events first, then whatever the driver queued
            let elapsed = tick as f64 * dt;
            let mut commands = scenario.due(elapsed);
            commands.extend(channels.drain_commands());
            for command in &commands {
                controller.apply(*command);
                diagnostic_log.write(format!("[COMMAND] t={:.1}s {}", elapsed, command));
            }
            stats_clone
                .commands_applied
                .fetch_add(commands.len() as u64, Ordering::Relaxed);

            // 2. Step and move the lead object under one lock
            let step_start = Instant::now();
            let stepped = controller.update(|car| {
                let result = car.step(dt)?;
                advance_lead(car, dt);
                Ok::<_, crate::error::AccError>((result, car.sensor()))
            });
            metrics.record_step(step_start.elapsed(), settings.period);

            let (result, reading) = match stepped {
                Ok(out) => out,
                Err(e) => {
                    // Same dt next time would fail the same way.
                    error!(error = %e, "step failed, stopping tick source");
                    diagnostic_log.write(format!("[STEP] {}", e));
                    stats_clone.step_failures.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            };
            tick += 1;
            stats_clone.ticks.store(tick, Ordering::Relaxed);

            // 3. Publish
            let published = channels.publish(Telemetry {
                tick,
                time: tick as f64 * dt,
                result,
                lead_speed: reading.lead_speed,
                lead_distance: reading.lead_distance,
            });
            if !published {
                stats_clone.dropped_telemetry.fetch_add(1, Ordering::Relaxed);
            }

            // Sleep out the rest of the period
            let busy = cycle_start.elapsed();
            if busy < settings.period {
                thread::sleep(settings.period - busy);
            }
        }
    });

    (handle, stats)
}

/// Waits for the tick thread and returns how many ticks it ran. A panic in the
/// thread or a failed step is an error.
pub fn join_simulation_thread(
    handle: thread::JoinHandle<()>,
    stats: &SimulationStats,
) -> Result<u64> {
    handle
        .join()
        .map_err(|_| AccError::TickSource("simulation thread panicked".to_string()))?;

    let failures = stats.step_failures.load(Ordering::Relaxed);
    if failures > 0 {
        return Err(AccError::TickSource(format!("{} step failure(s)", failures)));
    }
    Ok(stats.ticks.load(Ordering::Relaxed))
}
