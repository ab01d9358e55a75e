// Configuration loading for the simulator (TOML)
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::actuator::PidGains;
use crate::command::DriverCommand;
use crate::error::{AccError, Result};
use crate::policy::{RateLimit, SafeDistancePolicy, TargetSpeedArbiter};
use crate::sensor::{LeadScenario, ScenarioEvent, SensorModel};
use crate::simulation::DEFAULT_HISTORY_WINDOW_SECS;
use crate::vehicle::VehicleController;

pub const DEFAULT_CONFIG_PATH: &str = "config/acc_config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    ReactionBraking,
    TimeToCollision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitKind {
    PerCall,
    PerSecond,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventConfig {
    pub at: f64,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AccConfig {
    pub time_step: f64,
    pub initial_speed: f64,
    pub set_speed: f64,
    pub lead_speed: f64,
    pub lead_distance: f64,
    pub object_ahead: bool,
    pub pid: PidGains,
    pub policy: PolicyKind,
    pub reaction_time: Option<f64>,
    pub comfortable_deceleration: f64,
    pub rate_limit: RateLimitKind,
    /// m/s per call, or m/s² with `rate_limit = "per_second"`.
    pub max_target_change: f64,
    pub safety_margin: f64,
    pub duration_secs: f64,
    pub history_window_secs: Option<f64>,
    pub telemetry_every: u64,
    pub seed: Option<u64>,
    pub events: Vec<EventConfig>,
}

impl Default for AccConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            initial_speed: 50.0,
            set_speed: 50.0,
            lead_speed: 30.0,
            lead_distance: 30.0,
            object_ahead: true,
            pid: PidGains::default(),
            policy: PolicyKind::ReactionBraking,
            reaction_time: None,
            comfortable_deceleration: 4.0,
            rate_limit: RateLimitKind::PerCall,
            max_target_change: 2.0,
            safety_margin: 2.0,
            duration_secs: 60.0,
            history_window_secs: Some(DEFAULT_HISTORY_WINDOW_SECS),
            telemetry_every: 10,
            seed: None,
            events: Vec::new(),
        }
    }
}

impl AccConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AccConfig = toml::from_str(s).map_err(|e| AccError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(AccError::Config(format!(
                "time_step must be > 0, got {}",
                self.time_step
            )));
        }
        // Realtime runs sleep for one time_step per tick.
        if Duration::try_from_secs_f64(self.time_step).is_err() {
            return Err(AccError::Config(format!(
                "time_step {} does not fit a tick period",
                self.time_step
            )));
        }
        if let Some(reaction_time) = self.reaction_time {
            if !(reaction_time >= 0.0 && reaction_time.is_finite()) {
                return Err(AccError::Config(format!(
                    "reaction_time must be >= 0, got {}",
                    reaction_time
                )));
            }
        }
        if !(self.max_target_change > 0.0 && self.max_target_change.is_finite()) {
            return Err(AccError::Config(format!(
                "max_target_change must be > 0, got {}",
                self.max_target_change
            )));
        }
        if !(self.comfortable_deceleration > 0.0) {
            return Err(AccError::Config(format!(
                "comfortable_deceleration must be > 0, got {}",
                self.comfortable_deceleration
            )));
        }
        if self.duration_secs < 0.0 {
            return Err(AccError::Config("duration_secs must not be negative".into()));
        }
        Ok(())
    }

    pub fn safe_distance_policy(&self) -> SafeDistancePolicy {
        match self.policy {
            PolicyKind::ReactionBraking => SafeDistancePolicy::ReactionBraking {
                reaction_time: self.reaction_time.unwrap_or(1.5),
                comfortable_deceleration: self.comfortable_deceleration,
            },
            PolicyKind::TimeToCollision => SafeDistancePolicy::TimeToCollision {
                reaction_time: self.reaction_time.unwrap_or(1.0),
                comfortable_deceleration: self.comfortable_deceleration,
            },
        }
    }

    pub fn rate_limit(&self) -> RateLimit {
        match self.rate_limit {
            RateLimitKind::PerCall => RateLimit::PerCall {
                max_change_ms: self.max_target_change,
            },
            RateLimitKind::PerSecond => RateLimit::PerSecond {
                max_rate_ms2: self.max_target_change,
            },
        }
    }

    pub fn build_controller(&self) -> VehicleController {
        let mut sensor = SensorModel::new(self.lead_speed, self.lead_distance);
        sensor.set_object_ahead(self.object_ahead);

        VehicleController::new(self.initial_speed, self.set_speed, self.pid)
            .with_sensor(sensor)
            .with_policy(self.safe_distance_policy())
            .with_arbiter(TargetSpeedArbiter::new(self.safety_margin, self.rate_limit()))
    }

    /// Scripted events, or a seeded random timeline when none are given.
    pub fn build_scenario(&self) -> Result<LeadScenario> {
        if self.events.is_empty() {
            return Ok(match self.seed {
                Some(seed) => LeadScenario::random(seed, self.duration_secs, 5.0),
                None => LeadScenario::empty(),
            });
        }

        let events = self
            .events
            .iter()
            .map(|e| {
                let command = e.command.parse::<DriverCommand>()?;
                Ok(ScenarioEvent { at: e.at, command })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LeadScenario::scripted(events))
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AccConfig> {
    let s = std::fs::read_to_string(path)?;
    AccConfig::from_toml_str(&s)
}

/// Missing file means defaults; a file that exists but does not parse is an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AccConfig> {
    match std::fs::read_to_string(path) {
        Ok(s) => AccConfig::from_toml_str(&s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AccConfig::default()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(AccConfig::from_toml_str("").unwrap(), AccConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let cfg = AccConfig::from_toml_str(
            r#"
            time_step = 0.05
            initial_speed = 0.0
            set_speed = 90.0
            policy = "time_to_collision"
            rate_limit = "per_second"
            max_target_change = 3.0

            [pid]
            kp = 0.5
            ki = 0.01
            kd = 0.0

            [[events]]
            at = 4.0
            command = "lead-speed 20"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.time_step, 0.05);
        assert_eq!(cfg.pid, PidGains::new(0.5, 0.01, 0.0));
        assert_eq!(cfg.policy, PolicyKind::TimeToCollision);
        assert_eq!(cfg.rate_limit(), RateLimit::PerSecond { max_rate_ms2: 3.0 });
        assert_eq!(cfg.safe_distance_policy(), SafeDistancePolicy::time_to_collision());

        let scenario = cfg.build_scenario().unwrap();
        assert_eq!(scenario.remaining(), 1);
    }

    #[test]
    fn rejects_bad_timestep() {
        assert!(matches!(AccConfig::from_toml_str("time_step = 0.0"), Err(AccError::Config(_))));
        assert!(matches!(AccConfig::from_toml_str("time_step = -0.1"), Err(AccError::Config(_))));
    }

    #[test]
    fn rejects_timestep_too_large_for_a_period() {
        assert!(matches!(AccConfig::from_toml_str("time_step = 1e20"), Err(AccError::Config(_))));
        assert!(AccConfig::from_toml_str("time_step = 2.5").is_ok());
    }

    #[test]
    fn rejects_negative_reaction_time() {
        assert!(matches!(
            AccConfig::from_toml_str("reaction_time = -5.0"),
            Err(AccError::Config(_))
        ));
        let cfg = AccConfig::from_toml_str("reaction_time = 0.0").unwrap();
        assert_eq!(cfg.reaction_time, Some(0.0));
    }

    #[test]
    fn rejects_unknown_policy_and_bad_event() {
        let unknown = AccConfig::from_toml_str("policy = \"psychic\"");
        assert!(matches!(unknown, Err(AccError::Config(_))));

        let cfg =
            AccConfig::from_toml_str("[[events]]\nat = 1.0\ncommand = \"set-speed abc\"\n")
                .unwrap();
        assert!(matches!(cfg.build_scenario(), Err(AccError::InvalidInput { .. })));
    }

    #[test]
    fn builds_configured_controller() {
        let cfg = AccConfig {
            object_ahead: false,
            initial_speed: 12.0,
            ..AccConfig::default()
        };
        let car = cfg.build_controller();
        assert_eq!(car.current_speed(), 12.0);
        assert_eq!(car.previous_target_speed(), 12.0);
        assert!(!car.sensor().is_object_ahead);
        assert_eq!(car.policy(), SafeDistancePolicy::reaction_braking());
        assert_eq!(car.arbiter(), TargetSpeedArbiter::default());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let cfg = load_or_default("/nonexistent/acc/config.toml").unwrap();
        assert_eq!(cfg, AccConfig::default());
        assert!(matches!(load_config("/nonexistent/acc/config.toml"), Err(AccError::Io(_))));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("acc_config_{}.toml", std::process::id()));
        std::fs::write(&path, "set_speed = 110.0\nseed = 3\n").unwrap();
        let cfg = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.set_speed, 110.0);
        assert_eq!(cfg.seed, Some(3));
        assert!(!cfg.build_scenario().unwrap().is_finished());
    }
}
