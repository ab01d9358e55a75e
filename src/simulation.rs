//! Simulation module - Headless presentation layer around the controller
//!
//! Owns everything the control core deliberately leaves outside: the tick
//! clock, lead-object kinematics, scripted inputs and the plotted history.

use std::collections::VecDeque;

use tracing::{info, warn};

use crate::command::DriverCommand;
use crate::config::AccConfig;
use crate::error::{check_timestep, Result};
use crate::ipc::{DiagnosticLog, Telemetry};
use crate::sensor::LeadScenario;
use crate::vehicle::{StepResult, VehicleController};

/// Seconds of history kept unless a window is configured.
pub const DEFAULT_HISTORY_WINDOW_SECS: f64 = 60.0;

/// Lead kinematics between ticks. The speed difference is applied as-is, the
/// same convention the control loop was tuned against.
pub fn integrate_lead_distance(
    lead_distance: f64,
    lead_speed: f64,
    ego_speed: f64,
    dt: f64,
) -> f64 {
    lead_distance + (lead_speed - ego_speed) * dt
}

/// Moves the lead object after a step. Nothing moves while no object is ahead.
pub fn advance_lead(controller: &mut VehicleController, dt: f64) {
    let reading = controller.sensor();
    if reading.is_object_ahead {
        let distance = integrate_lead_distance(
            reading.lead_distance,
            reading.lead_speed,
            controller.current_speed(),
            dt,
        );
        controller.set_lead_distance(distance);
    }
}

// ============================================================================
// HISTORY - Series the display plots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySample {
    pub time: f64,
    pub current_speed: f64,
    pub target_speed: f64,
    pub safe_distance: f64,
    pub lead_distance: f64,
}

impl From<&Telemetry> for HistorySample {
    fn from(t: &Telemetry) -> Self {
        Self {
            time: t.time,
            current_speed: t.result.current_speed,
            target_speed: t.result.target_speed,
            safe_distance: t.result.safe_distance,
            lead_distance: t.lead_distance,
        }
    }
}

/// History with an optional sliding time window.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: VecDeque<HistorySample>,
    window_secs: Option<f64>,
}

impl History {
    pub fn new(window_secs: Option<f64>) -> Self {
        Self {
            samples: VecDeque::new(),
            window_secs,
        }
    }

    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        if let Some(window) = self.window_secs {
            while let Some(front) = self.samples.front() {
                if sample.time - front.time > window {
                    self.samples.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn last(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(start, end)` of the retained samples.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        Some((self.samples.front()?.time, self.samples.back()?.time))
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

pub struct Simulation {
    controller: VehicleController,
    dt: f64,
    ticks: u64,
    scenario: LeadScenario,
    history: History,
    log: DiagnosticLog,
}

impl Simulation {
    pub fn new(controller: VehicleController, dt: f64) -> Result<Self> {
        check_timestep(dt)?;
        Ok(Self {
            controller,
            dt,
            ticks: 0,
            scenario: LeadScenario::empty(),
            history: History::new(Some(DEFAULT_HISTORY_WINDOW_SECS)),
            log: DiagnosticLog::new(1000),
        })
    }

    pub fn from_config(config: &AccConfig) -> Result<Self> {
        Ok(Self::new(VehicleController::from_config(config), config.time_step)?
            .with_scenario(config.build_scenario()?)
            .with_history_window(config.history_window_secs))
    }

    pub fn with_scenario(mut self, scenario: LeadScenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_history_window(mut self, window_secs: Option<f64>) -> Self {
        self.history = History::new(window_secs);
        self
    }

    pub fn with_log(mut self, log: DiagnosticLog) -> Self {
        self.log = log;
        self
    }

    pub fn apply(&mut self, command: DriverCommand) {
        info!(%command, time = self.elapsed(), "applying command");
        command.apply(&mut self.controller);
    }

    /// Parses and applies one line of driver input. A rejected line is
    /// logged and leaves the controller untouched.
    pub fn submit(&mut self, line: &str) -> Result<()> {
        match line.parse::<DriverCommand>() {
            Ok(command) => {
                self.apply(command);
                Ok(())
            }
            Err(e) => {
                warn!(input = line, error = %e, "rejected command");
                self.log.write(format!("[INPUT] {}", e));
                Err(e)
            }
        }
    }

    pub fn tick(&mut self) -> Result<Telemetry> {
        let elapsed = self.elapsed();
        for command in self.scenario.due(elapsed) {
            self.apply(command);
        }

        let result: StepResult = self.controller.step(self.dt)?;
        advance_lead(&mut self.controller, self.dt);
        self.ticks += 1;

        let reading = self.controller.sensor();
        let telemetry = Telemetry {
            tick: self.ticks,
            time: self.elapsed(),
            result,
            lead_speed: reading.lead_speed,
            lead_distance: reading.lead_distance,
        };
        self.history.push(HistorySample::from(&telemetry));
        Ok(telemetry)
    }

    pub fn run_ticks(&mut self, n: u64) -> Result<Vec<Telemetry>> {
        (0..n).map(|_| self.tick()).collect()
    }

    /// Runs for `seconds` of simulated time and returns the last sample.
    pub fn run_for(&mut self, seconds: f64) -> Result<Option<Telemetry>> {
        let n = (seconds / self.dt).round().max(0.0) as u64;
        let mut last = None;
        for _ in 0..n {
            last = Some(self.tick()?);
        }
        Ok(last)
    }

    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn controller(&self) -> &VehicleController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut VehicleController {
        &mut self.controller
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::PidGains;
    use crate::error::AccError;
    use crate::sensor::ScenarioEvent;
    use approx::assert_relative_eq;

    fn sim() -> Simulation {
        Simulation::new(VehicleController::new(50.0, 50.0, PidGains::default()), 0.1).unwrap()
    }

    #[test]
    fn rejects_bad_timestep() {
        let car = VehicleController::new(0.0, 0.0, PidGains::default());
        assert!(matches!(Simulation::new(car, 0.0), Err(AccError::InvalidTimestep(_))));
    }

    #[test]
    fn lead_distance_integrates_relative_speed() {
        assert_relative_eq!(integrate_lead_distance(30.0, 40.0, 50.0, 0.1), 29.0);

        let mut sim = sim();
        let t = sim.tick().unwrap();
        let expected = 30.0 + (30.0 - t.result.current_speed) * 0.1;
        assert_relative_eq!(t.lead_distance, expected, epsilon = 1e-12);
    }

    #[test]
    fn lead_is_frozen_when_not_ahead() {
        let mut sim = sim();
        sim.apply(DriverCommand::ObjectAhead(false));
        sim.run_ticks(10).unwrap();
        assert_eq!(sim.controller().sensor().lead_distance, 30.0);
    }

    #[test]
    fn submit_rejects_and_logs_bad_input() {
        let mut sim = sim();
        assert!(sim.submit("set-speed eighty").is_err());
        assert_eq!(sim.controller().set_speed(), 50.0);
        assert_eq!(sim.log().len(), 1);

        sim.submit("set-speed 80").unwrap();
        assert_eq!(sim.controller().set_speed(), 80.0);
    }

    #[test]
    fn scenario_events_fire_on_schedule() {
        let mut sim = sim().with_scenario(LeadScenario::scripted(vec![ScenarioEvent {
            at: 1.0,
            command: DriverCommand::LeadSpeed(90.0),
        }]));

        sim.run_for(1.0).unwrap();
        assert_eq!(sim.controller().sensor().lead_speed, 30.0);
        sim.tick().unwrap();
        assert_eq!(sim.controller().sensor().lead_speed, 90.0);
    }

    #[test]
    fn history_window_drops_old_samples() {
        let mut sim = sim().with_history_window(Some(2.0));
        sim.run_for(10.0).unwrap();

        let (start, end) = sim.history().time_span().unwrap();
        assert_relative_eq!(end, 10.0, epsilon = 1e-9);
        assert!(end - start <= 2.0 + 1e-9);
        assert!(sim.history().len() <= 21);
    }

    #[test]
    fn default_history_keeps_the_last_minute() {
        let mut sim = sim();
        sim.run_for(150.0).unwrap();

        let (start, end) = sim.history().time_span().unwrap();
        assert_relative_eq!(end, 150.0, epsilon = 1e-9);
        assert!(end - start <= DEFAULT_HISTORY_WINDOW_SECS + 1e-9);
        assert!(sim.history().len() <= 601);
        assert_eq!(sim.ticks(), 1500);
    }

    #[test]
    fn unbounded_history_keeps_everything() {
        let mut sim = sim().with_history_window(None);
        sim.run_ticks(2000).unwrap();
        assert_eq!(sim.history().len(), 2000);
        assert_eq!(sim.ticks(), 2000);
    }
}
