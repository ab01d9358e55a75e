//! IPC module - Channels and shared state between the tick source and its collaborators

pub mod channels;
pub mod shared_resource;

pub use channels::{SimulationChannels, Telemetry};
pub use shared_resource::{DiagnosticLog, SharedController};
