//! Threaded tick source - fixed-period simulation thread and its telemetry consumer

pub mod simulation_thread;
pub mod telemetry_thread;
