use super::safe_distance::{kph_to_ms, ms_to_kph};

/// How fast the target speed may move between arbitration calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimit {
    /// Fixed cap per call, whatever `dt` is. Halving `dt` doubles the
    /// effective slew rate.
    PerCall { max_change_ms: f64 },
    /// Physical slew rate: the cap is `max_rate_ms2 * dt`.
    PerSecond { max_rate_ms2: f64 },
}

impl RateLimit {
    pub fn max_delta_ms(&self, dt: f64) -> f64 {
        match *self {
            RateLimit::PerCall { max_change_ms } => max_change_ms,
            RateLimit::PerSecond { max_rate_ms2 } => max_rate_ms2 * dt,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit::PerCall { max_change_ms: 2.0 }
    }
}

/// Outcome of one arbitration, with the reasoning kept for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arbitration {
    /// Rate-limited target speed (kph).
    pub target_speed: f64,
    /// Unlimited desired speed (kph).
    pub desired_speed: f64,
    /// `lead_distance - safe_distance` (m).
    pub distance_margin: f64,
    /// True when the gap is short and the lead speed minus margin was chosen.
    pub following: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpeedArbiter {
    pub safety_margin_kph: f64,
    pub rate_limit: RateLimit,
}

impl TargetSpeedArbiter {
    pub fn new(safety_margin_kph: f64, rate_limit: RateLimit) -> Self {
        Self {
            safety_margin_kph,
            rate_limit,
        }
    }

    /// Picks the desired speed and slews `previous_target_speed` towards it.
    ///
    /// A gap exactly equal to the safe distance counts as safe.
    pub fn arbitrate(
        &self,
        set_speed: f64,
        lead_speed: f64,
        lead_distance: f64,
        safe_distance: f64,
        previous_target_speed: f64,
        dt: f64,
    ) -> Arbitration {
        let distance_margin = lead_distance - safe_distance;
        let following = distance_margin < 0.0;

        let desired_speed = if following {
            lead_speed - self.safety_margin_kph
        } else {
            set_speed.min(lead_speed)
        };

        let desired_ms = kph_to_ms(desired_speed);
        let previous_ms = kph_to_ms(previous_target_speed);
        let max_delta = self.rate_limit.max_delta_ms(dt);

        let target_ms = if (desired_ms - previous_ms).abs() > max_delta {
            if desired_ms > previous_ms {
                previous_ms + max_delta
            } else {
                previous_ms - max_delta
            }
        } else {
            desired_ms
        };

        Arbitration {
            target_speed: ms_to_kph(target_ms),
            desired_speed,
            distance_margin,
            following,
        }
    }
}

impl Default for TargetSpeedArbiter {
    fn default() -> Self {
        Self::new(2.0, RateLimit::default())
    }
}
