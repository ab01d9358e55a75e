use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;
use tracing::info;

use super::simulation_thread::SimulationStats;
use crate::ipc::{SimulationChannels, Telemetry};
use crate::simulation::{History, HistorySample};

fn report(sample: &Telemetry) {
    let r = &sample.result;
    info!(
        "[{:7.2}s] ACC: tick #{:<5} speed {:6.2} kph, target {:6.2} kph, \
         safe {:6.2} m, lead {:6.2} m ({})",
        sample.time,
        sample.tick,
        r.current_speed,
        r.target_speed,
        r.safe_distance,
        sample.lead_distance,
        r.command()
    );
}

/// Collects telemetry into a history until shutdown, logging every
/// `report_every`th tick. The join handle yields the collected history.
pub fn spawn_telemetry_thread(
    channels: SimulationChannels,
    stats: Arc<SimulationStats>,
    history_window_secs: Option<f64>,
    report_every: u64,
) -> thread::JoinHandle<History> {
    thread::spawn(move || {
        let mut history = History::new(history_window_secs);
        let report_every = report_every.max(1);

        loop {
            match channels.telemetry_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(sample) => {
                    if sample.tick % report_every == 0 {
                        report(&sample);
                    }
                    history.push(HistorySample::from(&sample));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if stats.is_shutdown() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Whatever was published before shutdown still belongs in the history.
        for sample in channels.telemetry_rx.try_iter() {
            history.push(HistorySample::from(&sample));
        }
        history
    })
}
