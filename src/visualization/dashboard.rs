use std::path::Path;

use plotters::prelude::*;

use crate::benchmark::analysis::generate_latency_chart;
use crate::benchmark::metrics::MetricsReport;
use crate::simulation::History;
use crate::vehicle::MAX_SPEED_KPH;

/// Two stacked panels: speed vs target speed, and safe distance vs lead
/// distance, over the retained history.
pub fn render_history_chart(
    history: &History,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, end) = match history.time_span() {
        Some((start, end)) if end > start => (start, end),
        Some((start, _)) => (start, start + 1.0),
        None => return Ok(()),
    };

    let root = BitMapBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(400);

    let mut speed_chart = ChartBuilder::on(&upper)
        .caption("Speed vs Time", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, 0.0..MAX_SPEED_KPH)?;
    speed_chart.configure_mesh().x_desc("Time (s)").y_desc("Speed (kph)").draw()?;
    speed_chart.draw_series(LineSeries::new(
        history.samples().map(|s| (s.time, s.current_speed)),
        &BLUE,
    ))?;
    speed_chart.draw_series(LineSeries::new(
        history.samples().map(|s| (s.time, s.target_speed)),
        &RED,
    ))?;

    // Infinite safe distances (no relative motion) are left off the plot.
    let max_distance = history
        .samples()
        .flat_map(|s| [s.safe_distance, s.lead_distance])
        .filter(|d| d.is_finite())
        .fold(100.0, f64::max);
    let min_distance = history
        .samples()
        .map(|s| s.lead_distance)
        .filter(|d| d.is_finite())
        .fold(0.0, f64::min);

    let mut distance_chart = ChartBuilder::on(&lower)
        .caption("Safe Distance vs Object Position", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, min_distance..max_distance)?;
    distance_chart.configure_mesh().x_desc("Time (s)").y_desc("Distance (m)").draw()?;
    distance_chart.draw_series(LineSeries::new(
        history
            .samples()
            .filter(|s| s.safe_distance.is_finite())
            .map(|s| (s.time, s.safe_distance)),
        &MAGENTA,
    ))?;
    distance_chart.draw_series(LineSeries::new(
        history.samples().map(|s| (s.time, s.lead_distance)),
        &GREEN,
    ))?;

    root.present()?;
    Ok(())
}

/// History chart at `path`, plus a latency chart next to it when timing was recorded.
pub fn render_report_charts(
    history: &History,
    report: Option<&MetricsReport>,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    render_history_chart(history, path)?;
    if let Some(report) = report {
        generate_latency_chart(report, &path.with_extension("latency.png"))?;
    }
    Ok(())
}
