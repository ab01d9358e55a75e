//! Async tick source - tokio interval driven simulation task

pub mod simulation_task;
