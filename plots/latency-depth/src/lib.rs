use std::path::Path;

use common::sweep::Series;
use eyre::{Result, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

const DIMENSIONS: (u32, u32) = (900, 600);

const SERIES_COLORS: &[RGBColor] = &[
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
    RGBColor(52, 168, 83),
];

/// Renders mean latency against queue depth, one curve per workload series,
/// queue depth on a log scale.
///
/// Refuses to write anything when no series has data. The backend is picked
/// from the output extension: `.svg` draws vector output, everything else
/// goes through the bitmap backend and its format handling.
pub fn render_latency_chart(series: &[Series], name: &str, output: &Path) -> Result<()> {
    let populated = series
        .iter()
        .filter(|series| !series.points.is_empty())
        .collect::<Vec<_>>();
    if populated.is_empty() {
        bail!(
            "no latency points were collected, not writing {}",
            output.display()
        );
    }

    match output.extension().and_then(|ext| ext.to_str()) {
        Some("svg") => draw(
            SVGBackend::new(output, DIMENSIONS).into_drawing_area(),
            &populated,
            name,
        )?,
        _ => draw(
            BitMapBackend::new(output, DIMENSIONS).into_drawing_area(),
            &populated,
            name,
        )?,
    }
    debug!("chart written to {}", output.display());
    Ok(())
}

fn draw<DB>(root: DrawingArea<DB, Shift>, series: &[&Series], name: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let depths = series
        .iter()
        .flat_map(|series| series.points.iter().map(|point| point.io_depth));
    let x_min = depths.clone().min().unwrap_or(1) as f64;
    let x_max = depths.max().unwrap_or(1) as f64;
    // a single-depth sweep still needs a non-degenerate log range
    let x_max = if x_max > x_min { x_max } else { x_min * 2.0 };

    let y_max = series
        .iter()
        .flat_map(|series| series.points.iter().map(|point| point.latency_ms))
        .fold(0.0f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{name}: Latency vs I/O depth"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_min..x_max).log_scale(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("I/O depth")
        .y_desc("Latency (ms)")
        .x_label_formatter(&|depth| format!("{depth:.0}"))
        .draw()?;

    for (idx, series) in series.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let points = series
            .points
            .iter()
            .map(|point| (point.io_depth as f64, point.latency_ms))
            .collect::<Vec<_>>();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(series.label())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
            });
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
