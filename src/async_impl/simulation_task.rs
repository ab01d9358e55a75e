use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::debug;

use crate::benchmark::metrics::TimingMetrics;
use crate::error::{check_period, check_timestep, AccError, Result};
use crate::ipc::{SharedController, SimulationChannels, Telemetry};
use crate::sensor::LeadScenario;
use crate::simulation::advance_lead;

/// Drives `ticks` steps from a tokio interval. The controller lock is never
/// held across an await point.
pub async fn simulation_task(
    controller: SharedController,
    channels: SimulationChannels,
    mut scenario: LeadScenario,
    metrics: TimingMetrics,
    dt: f64,
    period: Duration,
    ticks: u64,
) -> Result<u64> {
    check_timestep(dt)?;
    check_period(period)?;

    let mut interval_timer = interval(period);
    // A late tick is not made up for; the simulated clock simply advances.
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_start: Option<Instant> = None;

    for tick in 1..=ticks {
        let start = interval_timer.tick().await;
        if let Some(prev) = last_start {
            metrics.record_tick_interval(start.duration_since(prev));
        }
        last_start = Some(start);

        let elapsed = (tick - 1) as f64 * dt;
        for command in scenario.due(elapsed).into_iter().chain(channels.drain_commands()) {
            controller.apply(command);
        }

        let step_start = Instant::now();
        let (result, reading) = controller.update(|car| {
            let result = car.step(dt)?;
            advance_lead(car, dt);
            Ok::<_, AccError>((result, car.sensor()))
        })?;
        metrics.record_step(step_start.elapsed(), period);

        let published = channels.publish(Telemetry {
            tick,
            time: tick as f64 * dt,
            result,
            lead_speed: reading.lead_speed,
            lead_distance: reading.lead_distance,
        });
        if !published {
            debug!(tick, "telemetry dropped");
        }
    }

    Ok(ticks)
}
