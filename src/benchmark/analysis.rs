use super::metrics::MetricsReport;
use plotters::prelude::*;
use std::path::Path;

fn micros(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1_000_000.0
}

/// Step latency and tick jitter at p50/p99, in microseconds.
pub fn generate_latency_chart(
    report: &MetricsReport,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let step = [(50.0, micros(report.step_p50)), (99.0, micros(report.step_p99))];
    let jitter = [(50.0, micros(report.jitter_p50)), (99.0, micros(report.jitter_p99))];
    let max_us = step
        .iter()
        .chain(jitter.iter())
        .map(|&(_, v)| v)
        .fold(1.0, f64::max)
        * 1.2;

    let mut chart = ChartBuilder::on(&root)
        .caption("Tick loop latency (us)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..100.0, 0.0..max_us)?;

    chart.configure_mesh().x_desc("Quantile").y_desc("Latency (us)").draw()?;

    chart.draw_series(LineSeries::new(step, &RED))?;
    chart.draw_series(LineSeries::new(jitter, &BLUE))?;
    root.present()?;
    Ok(())
}
