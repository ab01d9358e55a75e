//! Visualization module - Offline charts of a simulation run

pub mod dashboard;
