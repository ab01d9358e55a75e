//! Policy module - Safe following distance and target speed arbitration

pub mod arbiter;
pub mod safe_distance;

pub use arbiter::{Arbitration, RateLimit, TargetSpeedArbiter};
pub use safe_distance::{kph_to_ms, ms_to_kph, PolicyInput, SafeDistancePolicy};
