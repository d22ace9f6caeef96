use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::metrics::DerivedTable;

const TITLE_FONT_SIZE: u32 = 28;
const AXIS_LABEL_FONT_SIZE: u32 = 18;
const LEGEND_FONT_SIZE: u32 = 15;

const STANDALONE_SIZE: (u32, u32) = (800, 600);
const COMBINED_SIZE: (u32, u32) = (1500, 1200);

/// One color per sequence length, cycling when there are more lengths than
/// palette entries.
const COLORS: &[RGBColor] = &[
    RGBColor(66, 133, 244),  // Blue
    RGBColor(219, 68, 55),   // Red
    RGBColor(52, 168, 83),   // Green
    RGBColor(251, 188, 5),   // Yellow
    RGBColor(171, 71, 188),  // Purple
];

fn seq_color(index: usize) -> RGBColor {
    COLORS[index % COLORS.len()]
}

/// Renders the four standalone charts plus the combined 2x2 figure.
pub fn render_all(table: &DerivedTable, out_dir: &Path) -> Result<()> {
    if table.rows().is_empty() {
        anyhow::bail!("derived table is empty, nothing to plot");
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;

    render_standalone(table, out_dir, "speedup_vs_threads.png", draw_speedup)?;
    render_standalone(table, out_dir, "efficiency_vs_threads.png", draw_efficiency)?;
    render_standalone(table, out_dir, "execution_time_comparison.png", draw_times)?;
    render_standalone(table, out_dir, "scalability_analysis.png", draw_loglog)?;
    render_combined(table, out_dir)?;

    Ok(())
}

type DrawFn = fn(&DrawingArea<BitMapBackend<'_>, Shift>, &DerivedTable) -> Result<()>;

fn render_standalone(table: &DerivedTable, out_dir: &Path, name: &str, draw: DrawFn) -> Result<()> {
    let path = out_dir.join(name);
    let root = BitMapBackend::new(&path, STANDALONE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw(&root, table)?;
    root.present()?;
    println!("Generated: {}", path.display());
    Ok(())
}

fn render_combined(table: &DerivedTable, out_dir: &Path) -> Result<()> {
    let path = out_dir.join("performance_analysis_combined.png");
    let root = BitMapBackend::new(&path, COMBINED_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));
    draw_speedup(&areas[0], table)?;
    draw_efficiency(&areas[1], table)?;
    draw_times(&areas[2], table)?;
    draw_loglog(&areas[3], table)?;

    root.present()?;
    println!("Generated: {}", path.display());
    Ok(())
}

fn max_thread_count(table: &DerivedTable) -> f64 {
    table.thread_counts().last().copied().unwrap_or(1) as f64
}

fn max_speedup(table: &DerivedTable) -> f64 {
    table
        .rows()
        .iter()
        .map(|r| r.speedup)
        .fold(0.0_f64, f64::max)
}

/// Speedup vs thread count, one line per sequence length, with the ideal
/// linear-speedup reference.
fn draw_speedup(root: &DrawingArea<BitMapBackend<'_>, Shift>, table: &DerivedTable) -> Result<()> {
    let x_max = max_thread_count(table);
    let y_max = max_speedup(table).max(x_max) * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption("Speedup vs Thread Count", ("sans-serif", TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..x_max * 1.05, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Thread Count")
        .y_desc("Speedup")
        .label_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (i, seq) in table.seq_lengths().into_iter().enumerate() {
        let color = seq_color(i);
        let points: Vec<(f64, f64)> = table
            .rows_for(seq)
            .map(|r| (r.thread_count as f64, r.speedup))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(format!("seq_length={seq}"))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, color.filled())),
        )?;
    }

    let ideal = BLACK.mix(0.5);
    chart
        .draw_series(LineSeries::new(
            [(1.0, 1.0), (x_max, x_max)],
            ideal.stroke_width(1),
        ))?
        .label("Ideal (linear)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ideal.stroke_width(1)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

/// Parallel efficiency vs thread count, with the 100% reference line.
fn draw_efficiency(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    table: &DerivedTable,
) -> Result<()> {
    let x_max = max_thread_count(table);
    let y_max = table
        .rows()
        .iter()
        .map(|r| r.efficiency)
        .fold(110.0_f64, f64::max)
        * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Parallel Efficiency vs Thread Count",
            ("sans-serif", TITLE_FONT_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..x_max * 1.05, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Thread Count")
        .y_desc("Parallel Efficiency (%)")
        .label_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (i, seq) in table.seq_lengths().into_iter().enumerate() {
        let color = seq_color(i);
        let points: Vec<(f64, f64)> = table
            .rows_for(seq)
            .map(|r| (r.thread_count as f64, r.efficiency))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(format!("seq_length={seq}"))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, color.filled())),
        )?;
    }

    let ideal = BLACK.mix(0.5);
    chart
        .draw_series(LineSeries::new(
            [(0.0, 100.0), (x_max * 1.05, 100.0)],
            ideal.stroke_width(1),
        ))?
        .label("100% Efficiency")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ideal.stroke_width(1)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

/// Grouped bars: execution time per thread count, one bar group per thread
/// count, one color per sequence length.
fn draw_times(root: &DrawingArea<BitMapBackend<'_>, Shift>, table: &DerivedTable) -> Result<()> {
    let thread_counts = table.thread_counts();
    let seq_lengths = table.seq_lengths();
    let num_groups = thread_counts.len();
    let num_series = seq_lengths.len();

    let y_max = table
        .rows()
        .iter()
        .map(|r| r.execution_time_ms)
        .fold(0.0_f64, f64::max)
        * 1.1;

    // Every group needs the full thread-count grid; a hole is fatal.
    let mut groups: Vec<(u64, Vec<f64>)> = Vec::with_capacity(num_series);
    for &seq in &seq_lengths {
        let mut times = Vec::with_capacity(num_groups);
        for &tc in &thread_counts {
            let time = table
                .time_at(seq, tc)
                .with_context(|| format!("no {tc}-thread record for seq_length {seq}"))?;
            times.push(time);
        }
        groups.push((seq, times));
    }

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Execution Time vs Thread Count",
            ("sans-serif", TITLE_FONT_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(-0.5..(num_groups as f64 - 0.5), 0.0..y_max)?;

    let tick_labels: Vec<String> = thread_counts.iter().map(|tc| format!("{tc}T")).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_groups)
        .x_label_formatter(&|x| {
            let idx = x.round() as usize;
            if idx < num_groups && (x - idx as f64).abs() < 0.3 {
                tick_labels[idx].clone()
            } else {
                String::new()
            }
        })
        .x_desc("Thread Count")
        .y_desc("Execution Time (ms)")
        .label_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    let group_width = 0.8;
    let bar_width = group_width / num_series as f64;

    for (i, (seq, times)) in groups.iter().enumerate() {
        let color = seq_color(i);

        for (group, &time) in times.iter().enumerate() {
            let x_center = group as f64;
            let x_offset = (i as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;
            let x_left = x_center + x_offset - bar_width / 2.0 + 0.02;
            let x_right = x_center + x_offset + bar_width / 2.0 - 0.02;

            chart.draw_series(std::iter::once(Rectangle::new(
                [(x_left, 0.0), (x_right, time)],
                color.filled(),
            )))?;
        }

        chart
            .draw_series(std::iter::once(Circle::new(
                (num_groups as f64 - 1.0, y_max),
                0,
                color.filled(),
            )))?
            .label(format!("seq_length={seq}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

/// Same data as the speedup chart on log-log axes.
fn draw_loglog(root: &DrawingArea<BitMapBackend<'_>, Shift>, table: &DerivedTable) -> Result<()> {
    let x_max = max_thread_count(table).max(2.0);
    let y_min = table
        .rows()
        .iter()
        .map(|r| r.speedup)
        .fold(1.0_f64, f64::min)
        * 0.8;
    let y_max = max_speedup(table).max(x_max) * 1.2;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Scalability Analysis (Log-Log)",
            ("sans-serif", TITLE_FONT_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(
            (1.0..x_max * 1.1).log_scale(),
            (y_min..y_max).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc("Thread Count (log scale)")
        .y_desc("Speedup (log scale)")
        .label_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (i, seq) in table.seq_lengths().into_iter().enumerate() {
        let color = seq_color(i);
        let points: Vec<(f64, f64)> = table
            .rows_for(seq)
            .map(|r| (r.thread_count as f64, r.speedup))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(format!("seq_length={seq}"))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, color.filled())),
        )?;
    }

    let ideal = BLACK.mix(0.5);
    chart
        .draw_series(LineSeries::new(
            [(1.0, 1.0), (x_max, x_max)],
            ideal.stroke_width(1),
        ))?
        .label("Ideal")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ideal.stroke_width(1)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::{BenchmarkRecord, Implementation};
    use crate::metrics::derive;

    fn record(
        seq_length: u64,
        implementation_type: Implementation,
        thread_count: u32,
        execution_time_ms: f64,
    ) -> BenchmarkRecord {
        BenchmarkRecord {
            seq_length,
            implementation_type,
            thread_count,
            execution_time_ms,
        }
    }

    #[test]
    fn bar_chart_fails_on_missing_data_point() {
        use crate::data::Implementation::{Parallel, Serial};

        // seq_length 2000 lacks a 4-thread row.
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 2, 600.0),
            record(1000, Parallel, 4, 300.0),
            record(2000, Serial, 1, 2000.0),
            record(2000, Parallel, 2, 1100.0),
        ];
        let table = derive(&records).unwrap();

        let mut buffer = vec![0u8; 100 * 100 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (100, 100)).into_drawing_area();
        let err = draw_times(&root, &table).unwrap_err();
        assert!(
            err.to_string()
                .contains("no 4-thread record for seq_length 2000"),
            "unexpected error: {err}"
        );
    }
}
