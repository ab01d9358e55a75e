use serde::Deserialize;

use crate::error::{check_timestep, Result};

/// Proportional, integral and derivative gains.
/// Missing keys in a config table fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Pure proportional law, the tuning the cruise controller ships with.
    pub fn proportional(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::proportional(0.8)
    }
}

/// Speed-error to acceleration law.
///
/// The integral is never clamped: the throttle/brake loop relies on the
/// unbounded accumulation, so windup is visible rather than hidden.
#[derive(Debug, Clone)]
pub struct PIDController {
    // Gains
    gains: PidGains,

    // State
    integral: f64,
    prev_error: f64,
}

impl PIDController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Advance the law by one tick. Call exactly once per tick; extra calls
    /// corrupt the derivative term.
    pub fn compute(&mut self, error: f64, dt: f64) -> Result<f64> {
        check_timestep(dt)?;

        let PidGains { kp, ki, kd } = self.gains;

        self.integral += error * dt;
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        Ok(kp * error + ki * self.integral + kd * derivative)
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.prev_error
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}
