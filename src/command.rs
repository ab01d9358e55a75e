//! Driver and sensor commands arriving from outside the control loop

use std::str::FromStr;

use crate::error::{AccError, Result};
use crate::vehicle::VehicleController;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverCommand {
    SetSpeed(f64),
    LeadSpeed(f64),
    LeadDistance(f64),
    CurrentSpeed(f64),
    ObjectAhead(bool),
    IncreaseSetSpeed,
    DecreaseSetSpeed,
}

impl DriverCommand {
    pub fn apply(&self, controller: &mut VehicleController) {
        match *self {
            DriverCommand::SetSpeed(v) => controller.set_set_speed(v),
            DriverCommand::LeadSpeed(v) => controller.set_lead_speed(v),
            DriverCommand::LeadDistance(v) => controller.set_lead_distance(v),
            DriverCommand::CurrentSpeed(v) => controller.set_current_speed(v),
            DriverCommand::ObjectAhead(ahead) => controller.set_object_ahead(ahead),
            DriverCommand::IncreaseSetSpeed => controller.increase_set_speed(),
            DriverCommand::DecreaseSetSpeed => controller.decrease_set_speed(),
        }
    }
}

impl std::fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverCommand::SetSpeed(v) => write!(f, "set-speed {}", v),
            DriverCommand::LeadSpeed(v) => write!(f, "lead-speed {}", v),
            DriverCommand::LeadDistance(v) => write!(f, "lead-distance {}", v),
            DriverCommand::CurrentSpeed(v) => write!(f, "current-speed {}", v),
            DriverCommand::ObjectAhead(ahead) => {
                write!(f, "object-ahead {}", if *ahead { "on" } else { "off" })
            }
            DriverCommand::IncreaseSetSpeed => write!(f, "set+"),
            DriverCommand::DecreaseSetSpeed => write!(f, "set-"),
        }
    }
}

fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AccError::InvalidInput {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_switch(field: &'static str, raw: Option<&str>) -> Result<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("on" | "true" | "yes" | "1") => Ok(true),
        Some("off" | "false" | "no" | "0") => Ok(false),
        other => Err(AccError::InvalidInput {
            field,
            value: other.unwrap_or("").to_string(),
        }),
    }
}

impl FromStr for DriverCommand {
    type Err = AccError;

    /// Parses `"<verb> [value]"`, e.g. `"set-speed 80"` or `"set+"`.
    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or("");
        let value = parts.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "set-speed" => DriverCommand::SetSpeed(parse_number("set_speed", value)?),
            "lead-speed" => DriverCommand::LeadSpeed(parse_number("lead_speed", value)?),
            "lead-distance" => DriverCommand::LeadDistance(parse_number("lead_distance", value)?),
            "current-speed" => DriverCommand::CurrentSpeed(parse_number("current_speed", value)?),
            "object-ahead" => DriverCommand::ObjectAhead(parse_switch("object_ahead", value)?),
            "set+" => DriverCommand::IncreaseSetSpeed,
            "set-" => DriverCommand::DecreaseSetSpeed,
            _ => return Err(AccError::UnknownCommand(line.trim().to_string())),
        };

        if parts.next().is_some() {
            return Err(AccError::UnknownCommand(line.trim().to_string()));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::PidGains;

    fn parse(line: &str) -> Result<DriverCommand> {
        line.parse()
    }

    #[test]
    fn parses_numeric_commands() {
        assert_eq!(parse("set-speed 80").unwrap(), DriverCommand::SetSpeed(80.0));
        assert_eq!(parse("lead-speed 42.5").unwrap(), DriverCommand::LeadSpeed(42.5));
        assert_eq!(
            parse("  LEAD-DISTANCE   -3 ").unwrap(),
            DriverCommand::LeadDistance(-3.0)
        );
        assert_eq!(parse("current-speed 0").unwrap(), DriverCommand::CurrentSpeed(0.0));
    }

    #[test]
    fn parses_buttons_and_switches() {
        assert_eq!(parse("set+").unwrap(), DriverCommand::IncreaseSetSpeed);
        assert_eq!(parse("set-").unwrap(), DriverCommand::DecreaseSetSpeed);
        assert_eq!(parse("object-ahead off").unwrap(), DriverCommand::ObjectAhead(false));
        assert_eq!(parse("object-ahead TRUE").unwrap(), DriverCommand::ObjectAhead(true));
    }

    #[test]
    fn rejects_non_numeric_values() {
        match parse("set-speed fast") {
            Err(AccError::InvalidInput { field, value }) => {
                assert_eq!(field, "set_speed");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(parse("lead-speed"), Err(AccError::InvalidInput { .. })));
        assert!(matches!(parse("lead-speed NaN"), Err(AccError::InvalidInput { .. })));
        assert!(matches!(parse("object-ahead maybe"), Err(AccError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_unknown_verbs_and_trailing_tokens() {
        assert!(matches!(parse("warp 9"), Err(AccError::UnknownCommand(_))));
        assert!(matches!(parse("set-speed 80 90"), Err(AccError::UnknownCommand(_))));
        assert!(matches!(parse(""), Err(AccError::UnknownCommand(_))));
    }

    #[test]
    fn display_parses_back() {
        for cmd in [
            DriverCommand::SetSpeed(72.5),
            DriverCommand::ObjectAhead(false),
            DriverCommand::DecreaseSetSpeed,
        ] {
            assert_eq!(parse(&cmd.to_string()).unwrap(), cmd);
        }
    }

    #[test]
    fn apply_overwrites_controller_fields() {
        let mut car = VehicleController::new(50.0, 50.0, PidGains::default());
        DriverCommand::SetSpeed(90.0).apply(&mut car);
        DriverCommand::LeadSpeed(70.0).apply(&mut car);
        DriverCommand::LeadDistance(120.0).apply(&mut car);
        DriverCommand::CurrentSpeed(20.0).apply(&mut car);
        DriverCommand::IncreaseSetSpeed.apply(&mut car);

        assert_eq!(car.set_speed(), 91.0);
        assert_eq!(car.sensor().lead_speed, 70.0);
        assert_eq!(car.sensor().lead_distance, 120.0);
        assert_eq!(car.current_speed(), 20.0);
    }
}
