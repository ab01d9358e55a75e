//! Sensor module - Observed state of the lead object

pub mod scenario;

pub use scenario::{LeadScenario, ScenarioEvent};

// ============================================================================
// SENSOR READING
// ============================================================================

/// Snapshot of the lead object as seen by the controller.
///
/// `lead_distance` is a signed longitudinal offset in metres; it may go
/// negative when the presentation layer lets the ego vehicle overtake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub lead_speed: f64,
    pub lead_distance: f64,
    pub is_object_ahead: bool,
}

// ============================================================================
// SENSOR MODEL - Externally driven lead object state
// ============================================================================

#[derive(Debug, Clone)]
pub struct SensorModel {
    reading: SensorReading,
}

impl SensorModel {
    pub fn new(lead_speed: f64, lead_distance: f64) -> Self {
        Self {
            reading: SensorReading {
                lead_speed,
                lead_distance,
                is_object_ahead: true,
            },
        }
    }

    /// Nothing in range: the controller falls back to plain cruise control.
    pub fn clear_road() -> Self {
        Self {
            reading: SensorReading {
                lead_speed: 0.0,
                lead_distance: 0.0,
                is_object_ahead: false,
            },
        }
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }

    pub fn lead_speed(&self) -> f64 {
        self.reading.lead_speed
    }

    pub fn lead_distance(&self) -> f64 {
        self.reading.lead_distance
    }

    pub fn is_object_ahead(&self) -> bool {
        self.reading.is_object_ahead
    }

    pub fn set_lead_speed(&mut self, speed: f64) {
        self.reading.lead_speed = speed;
    }

    pub fn set_lead_distance(&mut self, distance: f64) {
        self.reading.lead_distance = distance;
    }

    pub fn set_object_ahead(&mut self, ahead: bool) {
        self.reading.is_object_ahead = ahead;
    }
}

impl Default for SensorModel {
    /// Object 30 m ahead travelling at 30 kph.
    fn default() -> Self {
        Self::new(30.0, 30.0)
    }
}
