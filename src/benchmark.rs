//! Benchmark module - Tick loop timing and its charts

pub mod analysis;
pub mod metrics;

pub use metrics::{MetricsReport, TimingMetrics};
