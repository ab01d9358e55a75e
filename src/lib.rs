pub mod actuator;
pub mod async_impl;
pub mod benchmark;
pub mod command;
pub mod config;
pub mod error;
pub mod ipc;
pub mod policy;
pub mod sensor;
pub mod simulation;
pub mod threaded_impl;
pub mod vehicle;
pub mod visualization;

pub use actuator::{LongitudinalCommand, PIDController, PidGains};
pub use command::DriverCommand;
pub use config::{load_config, load_or_default, AccConfig};
pub use error::{AccError, Result};
pub use ipc::{DiagnosticLog, SharedController, SimulationChannels, Telemetry};
pub use policy::{Arbitration, PolicyInput, RateLimit, SafeDistancePolicy, TargetSpeedArbiter};
pub use sensor::{LeadScenario, ScenarioEvent, SensorModel, SensorReading};
pub use simulation::{History, HistorySample, Simulation};
pub use vehicle::{StepResult, VehicleController, MAX_SPEED_KPH, MIN_SPEED_KPH};
