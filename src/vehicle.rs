//! Vehicle module - The per-tick longitudinal control loop
//!
//! Speeds are in kph, distances in metres and `dt` in seconds. The PID output
//! is read as an acceleration in kph/s.

use tracing::debug;

use crate::actuator::{LongitudinalCommand, PIDController, PidGains};
use crate::config::AccConfig;
use crate::error::{check_timestep, Result};
use crate::policy::{PolicyInput, RateLimit, SafeDistancePolicy, TargetSpeedArbiter};
use crate::sensor::{SensorModel, SensorReading};

pub const MIN_SPEED_KPH: f64 = 0.0;
pub const MAX_SPEED_KPH: f64 = 130.0;

/// Per-tick output of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub current_speed: f64,
    pub target_speed: f64,
    pub safe_distance: f64,
    pub acceleration: f64,
    pub distance_margin: f64,
}

impl StepResult {
    pub fn command(&self) -> LongitudinalCommand {
        LongitudinalCommand::from_acceleration(self.acceleration)
    }
}

/// The ego vehicle's cruise controller.
///
/// Not internally synchronised: a host that steps it from several threads
/// must hold an exclusive lock around every `step` (see `ipc::SharedController`).
#[derive(Debug, Clone)]
pub struct VehicleController {
    current_speed: f64,
    set_speed: f64,
    previous_target_speed: f64,
    sensor: SensorModel,
    pid: PIDController,
    policy: SafeDistancePolicy,
    arbiter: TargetSpeedArbiter,
}

impl VehicleController {
    pub fn new(initial_speed: f64, set_speed: f64, gains: PidGains) -> Self {
        Self {
            current_speed: initial_speed,
            set_speed,
            previous_target_speed: initial_speed,
            sensor: SensorModel::default(),
            pid: PIDController::new(gains),
            policy: SafeDistancePolicy::default(),
            arbiter: TargetSpeedArbiter::default(),
        }
    }

    /// Fully configured controller: sensor, policy, margin and rate limit.
    pub fn from_config(config: &AccConfig) -> Self {
        config.build_controller()
    }

    pub fn with_policy(mut self, policy: SafeDistancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_arbiter(mut self, arbiter: TargetSpeedArbiter) -> Self {
        self.arbiter = arbiter;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.arbiter.rate_limit = rate_limit;
        self
    }

    pub fn with_sensor(mut self, sensor: SensorModel) -> Self {
        self.sensor = sensor;
        self
    }

    /// Runs one control tick. On error nothing is mutated.
    pub fn step(&mut self, dt: f64) -> Result<StepResult> {
        check_timestep(dt)?;

        let reading = self.sensor.reading();
        let safe_distance = self.policy.safe_distance(&PolicyInput {
            ego_speed: self.current_speed,
            lead_speed: reading.lead_speed,
            lead_distance: reading.lead_distance,
        });

        // No object in range: arbitrate against an unconstrained lead.
        let (lead_speed, lead_distance) = if reading.is_object_ahead {
            (reading.lead_speed, reading.lead_distance)
        } else {
            (f64::INFINITY, f64::INFINITY)
        };

        let arbitration = self.arbiter.arbitrate(
            self.set_speed,
            lead_speed,
            lead_distance,
            safe_distance,
            self.previous_target_speed,
            dt,
        );
        let target_speed = arbitration.target_speed;

        let speed_error = target_speed - self.current_speed;
        let acceleration = self.pid.compute(speed_error, dt)?;

        self.previous_target_speed = target_speed;
        self.current_speed =
            (self.current_speed + acceleration * dt).clamp(MIN_SPEED_KPH, MAX_SPEED_KPH);

        debug!(
            current_speed = self.current_speed,
            target_speed,
            distance_margin = arbitration.distance_margin,
            safe_distance,
            lead_speed = reading.lead_speed,
            following = arbitration.following,
            "acc step"
        );

        Ok(StepResult {
            current_speed: self.current_speed,
            target_speed,
            safe_distance,
            acceleration,
            distance_margin: arbitration.distance_margin,
        })
    }

    // Driver and sensor commands. Plain overwrites; validation belongs to the
    // caller.

    pub fn set_set_speed(&mut self, speed: f64) {
        self.set_speed = speed;
    }

    pub fn set_lead_speed(&mut self, speed: f64) {
        self.sensor.set_lead_speed(speed);
    }

    pub fn set_lead_distance(&mut self, distance: f64) {
        self.sensor.set_lead_distance(distance);
    }

    pub fn set_current_speed(&mut self, speed: f64) {
        self.current_speed = speed;
    }

    pub fn set_object_ahead(&mut self, ahead: bool) {
        self.sensor.set_object_ahead(ahead);
    }

    pub fn increase_set_speed(&mut self) {
        self.set_speed = (self.set_speed + 1.0).min(MAX_SPEED_KPH);
    }

    pub fn decrease_set_speed(&mut self) {
        self.set_speed = (self.set_speed - 1.0).max(MIN_SPEED_KPH);
    }

    /// Clears the PID history, e.g. when the driver re-engages the system.
    pub fn reset_controller(&mut self) {
        self.pid.reset();
        self.previous_target_speed = self.current_speed;
    }

    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    pub fn set_speed(&self) -> f64 {
        self.set_speed
    }

    pub fn previous_target_speed(&self) -> f64 {
        self.previous_target_speed
    }

    pub fn sensor(&self) -> SensorReading {
        self.sensor.reading()
    }

    pub fn pid(&self) -> &PIDController {
        &self.pid
    }

    pub fn policy(&self) -> SafeDistancePolicy {
        self.policy
    }

    pub fn arbiter(&self) -> TargetSpeedArbiter {
        self.arbiter
    }
}
