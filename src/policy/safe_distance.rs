//! Minimum following distance models.
//!
//! Units: ego and lead speeds in kph, distances in metres, times in seconds,
//! decelerations in m/s².

pub const KPH_TO_MS: f64 = 1000.0 / 3600.0;

/// Below this relative speed (kph) the two vehicles are treated as not closing.
pub const MIN_RELATIVE_SPEED_KPH: f64 = 0.001;

pub fn kph_to_ms(speed_kph: f64) -> f64 {
    speed_kph * KPH_TO_MS
}

pub fn ms_to_kph(speed_ms: f64) -> f64 {
    speed_ms * (3600.0 / 1000.0)
}

/// Everything a policy may look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub ego_speed: f64,
    pub lead_speed: f64,
    pub lead_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafeDistancePolicy {
    /// Reaction distance plus braking distance at a comfortable deceleration.
    /// Depends on ego speed only.
    ReactionBraking {
        reaction_time: f64,
        comfortable_deceleration: f64,
    },
    /// Ego speed times the sum of time-to-collision, time-to-stop and
    /// reaction time.
    TimeToCollision {
        reaction_time: f64,
        comfortable_deceleration: f64,
    },
}

impl SafeDistancePolicy {
    pub fn reaction_braking() -> Self {
        SafeDistancePolicy::ReactionBraking {
            reaction_time: 1.5,
            comfortable_deceleration: 4.0,
        }
    }

    pub fn time_to_collision() -> Self {
        SafeDistancePolicy::TimeToCollision {
            reaction_time: 1.0,
            comfortable_deceleration: 4.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SafeDistancePolicy::ReactionBraking { .. } => "reaction_braking",
            SafeDistancePolicy::TimeToCollision { .. } => "time_to_collision",
        }
    }

    /// Never negative and never NaN.
    pub fn safe_distance(&self, input: &PolicyInput) -> f64 {
        match *self {
            SafeDistancePolicy::ReactionBraking {
                reaction_time,
                comfortable_deceleration,
            } => {
                reaction_braking_distance(input.ego_speed, reaction_time, comfortable_deceleration)
            }
            SafeDistancePolicy::TimeToCollision {
                reaction_time,
                comfortable_deceleration,
            } => time_to_collision_distance(input, reaction_time, comfortable_deceleration),
        }
    }
}

impl Default for SafeDistancePolicy {
    fn default() -> Self {
        Self::reaction_braking()
    }
}

pub fn reaction_braking_distance(
    ego_speed_kph: f64,
    reaction_time: f64,
    comfortable_deceleration: f64,
) -> f64 {
    let speed_ms = kph_to_ms(ego_speed_kph);
    let reaction_distance = speed_ms * reaction_time;
    let braking_distance = speed_ms.powi(2) / (2.0 * comfortable_deceleration);
    (reaction_distance + braking_distance).max(0.0)
}

fn time_to_collision_distance(
    input: &PolicyInput,
    reaction_time: f64,
    comfortable_deceleration: f64,
) -> f64 {
    let ego = input.ego_speed;
    if ego <= 0.0 {
        return 0.0;
    }

    let relative_speed = ego - input.lead_speed;
    if relative_speed.abs() < MIN_RELATIVE_SPEED_KPH {
        // No relative motion: a collision never happens.
        return f64::INFINITY;
    }

    let time_to_collision = input.lead_distance / relative_speed;
    let time_to_stop = (ego / comfortable_deceleration).abs();
    let distance = ego * (time_to_collision + time_to_stop + reaction_time);

    if distance.is_nan() {
        0.0
    } else {
        distance.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(ego_speed: f64, lead_speed: f64, lead_distance: f64) -> PolicyInput {
        PolicyInput {
            ego_speed,
            lead_speed,
            lead_distance,
        }
    }

    fn at(ego_speed: f64) -> PolicyInput {
        PolicyInput {
            ego_speed,
            lead_speed: 30.0,
            lead_distance: 30.0,
        }
    }

    #[test]
    fn reaction_braking_at_known_speeds() {
        let policy = SafeDistancePolicy::reaction_braking();
        assert_eq!(policy.safe_distance(&at(0.0)), 0.0);
        // 72 kph = 20 m/s -> 30 m reaction + 50 m braking
        assert_relative_eq!(policy.safe_distance(&at(72.0)), 80.0, epsilon = 1e-9);
        // 36 kph = 10 m/s -> 15 m + 12.5 m
        assert_relative_eq!(policy.safe_distance(&at(36.0)), 27.5, epsilon = 1e-9);
    }

    #[test]
    fn reaction_braking_ignores_lead() {
        let policy = SafeDistancePolicy::reaction_braking();
        let a = policy.safe_distance(&input(50.0, 0.0, 1.0));
        let b = policy.safe_distance(&input(50.0, 120.0, 500.0));
        assert_eq!(a, b);
    }

    #[test]
    fn reaction_braking_is_monotonic() {
        let policy = SafeDistancePolicy::reaction_braking();
        let mut last = 0.0;
        for step in 0..=1300 {
            let d = policy.safe_distance(&at(step as f64 * 0.1));
            assert!(d >= last, "safe distance decreased at {} kph", step as f64 * 0.1);
            last = d;
        }
    }

    #[test]
    fn time_to_collision_without_relative_motion_is_infinite() {
        let policy = SafeDistancePolicy::time_to_collision();
        let d = policy.safe_distance(&input(40.0, 40.0, 50.0));
        assert!(d.is_infinite() && d > 0.0);
    }

    #[test]
    fn time_to_collision_at_standstill_is_zero() {
        let policy = SafeDistancePolicy::time_to_collision();
        let d = policy.safe_distance(&input(0.0, 0.0, 50.0));
        assert_eq!(d, 0.0);
    }

    #[test]
    fn time_to_collision_closing_in() {
        let policy = SafeDistancePolicy::time_to_collision();
        // relative 10, ttc 5, tts 5, reaction 1 -> 20 * 11
        let d = policy.safe_distance(&input(20.0, 10.0, 50.0));
        assert_relative_eq!(d, 220.0, epsilon = 1e-9);
    }

    #[test]
    fn time_to_collision_never_nan_or_negative() {
        let policy = SafeDistancePolicy::time_to_collision();
        for &(ego, lead, dist) in &[
            (20.0, 80.0, 50.0),
            (20.0, 10.0, f64::INFINITY),
            (20.0, 30.0, f64::INFINITY),
            (5.0, 5.0005, -10.0),
        ] {
            let d = policy.safe_distance(&input(ego, lead, dist));
            assert!(!d.is_nan());
            assert!(d >= 0.0);
        }
    }

    #[test]
    fn unit_conversion_round_trips() {
        assert_relative_eq!(ms_to_kph(kph_to_ms(90.0)), 90.0, epsilon = 1e-12);
        assert_relative_eq!(kph_to_ms(36.0), 10.0, epsilon = 1e-12);
    }
}
