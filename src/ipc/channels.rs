use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

use crate::command::DriverCommand;
use crate::vehicle::StepResult;

/// One published tick, as the display side sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry {
    pub tick: u64,
    pub time: f64,
    pub result: StepResult,
    pub lead_speed: f64,
    pub lead_distance: f64,
}

#[derive(Clone)]
pub struct SimulationChannels {
    // Driver/sensor input -> tick loop
    pub command_tx: Sender<DriverCommand>,
    pub command_rx: Receiver<DriverCommand>,

    // Tick loop -> display
    pub telemetry_tx: Sender<Telemetry>,
    pub telemetry_rx: Receiver<Telemetry>,
}

impl SimulationChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (command_tx, command_rx) = bounded(buffer_size);
        let (telemetry_tx, telemetry_rx) = bounded(buffer_size);

        Self {
            command_tx,
            command_rx,
            telemetry_tx,
            telemetry_rx,
        }
    }

    /// Everything queued since the last tick, in arrival order.
    pub fn drain_commands(&self) -> Vec<DriverCommand> {
        self.command_rx.try_iter().collect()
    }

    /// Never blocks the tick loop. Returns false when the sample was dropped.
    pub fn publish(&self, telemetry: Telemetry) -> bool {
        match self.telemetry_tx.try_send(telemetry) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
