//! Error taxonomy shared by the control core and the presentation boundary

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccError {
    /// `dt` must be strictly positive and finite.
    #[error("invalid timestep: {0} s (must be > 0)")]
    InvalidTimestep(f64),

    #[error("invalid tick period: {0:?} (must be > 0)")]
    InvalidPeriod(Duration),

    #[error("invalid value for {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("tick source failed: {0}")]
    TickSource(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AccError>;

/// Fails fast on a timestep that would poison the derivative term.
pub fn check_timestep(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(AccError::InvalidTimestep(dt))
    }
}

/// A wall-clock tick period must be non-zero.
pub fn check_period(period: Duration) -> Result<()> {
    if period.is_zero() {
        Err(AccError::InvalidPeriod(period))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_negative_and_nan() {
        assert!(matches!(check_timestep(0.0), Err(AccError::InvalidTimestep(_))));
        assert!(matches!(check_timestep(-1.0), Err(AccError::InvalidTimestep(_))));
        assert!(matches!(check_timestep(f64::NAN), Err(AccError::InvalidTimestep(_))));
        assert!(matches!(check_timestep(f64::INFINITY), Err(AccError::InvalidTimestep(_))));
        assert!(check_timestep(0.1).is_ok());
    }

    #[test]
    fn rejects_zero_period() {
        assert!(matches!(check_period(Duration::ZERO), Err(AccError::InvalidPeriod(_))));
        assert!(check_period(Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn input_error_names_field() {
        let err = AccError::InvalidInput { field: "set_speed", value: "fast".into() };
        assert_eq!(err.to_string(), "invalid value for set_speed: \"fast\"");
    }
}
