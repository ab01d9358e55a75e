//! Actuator module - PID throttle/brake law and command classification

pub mod controller;

pub use controller::{PIDController, PidGains};

/// Below this magnitude (kph/s) the controller is considered to coast.
pub const COAST_BAND_KPH_S: f64 = 0.05;

// ============================================================================
// LONGITUDINAL COMMAND - What the acceleration request means at the pedals
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LongitudinalCommand {
    Throttle,
    Coast,
    Brake,
}

impl LongitudinalCommand {
    pub fn from_acceleration(acceleration: f64) -> Self {
        if acceleration > COAST_BAND_KPH_S {
            LongitudinalCommand::Throttle
        } else if acceleration < -COAST_BAND_KPH_S {
            LongitudinalCommand::Brake
        } else {
            LongitudinalCommand::Coast
        }
    }
}

impl std::fmt::Display for LongitudinalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LongitudinalCommand::Throttle => write!(f, "Throttle"),
            LongitudinalCommand::Coast => write!(f, "Coast"),
            LongitudinalCommand::Brake => write!(f, "Brake"),
        }
    }
}
