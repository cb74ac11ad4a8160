//! Line charts of throughput against matrix size.
//!
//! Building the series is kept apart from drawing them: the first step is
//! plain data shuffling, the second needs a font backend and a file.

use std::{fmt::Display, path::Path};

use log::{debug, info};
use plotters::coord::{ranged1d::Ranged, types::RangedCoordf64, Shift};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{records::BenchmarkRecord, records::Variant, AnalysisError};

const DPI: u32 = 300;
const SCALING_FIGURE: (f64, f64) = (12.0, 7.0);
const COMPARISON_FIGURE: (f64, f64) = (12.0, 8.0);
const Y_LABELS: usize = 10;

// Legend column geometry, in points.
const LEGEND_WIDTH_PT: f64 = 170.0;
const LEGEND_SAMPLE_PT: f64 = 24.0;
const LEGEND_GAP_PT: f64 = 6.0;
const LEGEND_MARKER_PT: f64 = 3.0;
const LEGEND_ROW_PT: f64 = 16.0;

const VIRIDIS: [RGBColor; 9] = [
    RGBColor(68, 1, 84),
    RGBColor(71, 44, 122),
    RGBColor(59, 81, 139),
    RGBColor(44, 113, 142),
    RGBColor(33, 144, 141),
    RGBColor(39, 173, 129),
    RGBColor(92, 200, 99),
    RGBColor(170, 220, 50),
    RGBColor(253, 231, 37),
];

const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
    Square,
    Triangle,
}

const MARKERS: [Marker; 4] = [Marker::Circle, Marker::Cross, Marker::Square, Marker::Triangle];

/// One plotted line: `(size, metric)` points sorted by size.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub line: LineStyle,
    pub marker: Marker,
    pub points: Vec<(f64, f64)>,
}

// Sort by x and average repeated runs at the same size.
fn averaged(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut acc: Vec<(f64, f64, usize)> = Vec::new();
    for (x, y) in points {
        match acc.last_mut() {
            Some((last_x, sum, n)) if *last_x == x => {
                *sum += y;
                *n += 1;
            }
            _ => acc.push((x, y, 1)),
        }
    }
    acc.into_iter()
        .map(|(x, sum, n)| (x, sum / n as f64))
        .collect()
}

// Groups in order of first appearance.
fn group_by_first_seen<K: PartialEq>(
    items: impl IntoIterator<Item = (K, (f64, f64))>,
) -> Vec<(K, Vec<(f64, f64)>)> {
    let mut groups: Vec<(K, Vec<(f64, f64)>)> = Vec::new();
    for (key, point) in items {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, points)) => points.push(point),
            None => groups.push((key, vec![point])),
        }
    }
    groups
}

/// Evenly spaced samples from the viridis ramp.
fn viridis(i: usize, n: usize) -> RGBColor {
    let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    let frac = pos - lo as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// One solid line per method, each with its own color and marker.
pub fn scaling_series(records: &[BenchmarkRecord<u64>]) -> Vec<Series> {
    let groups = group_by_first_seen(
        records
            .iter()
            .map(|r| (r.method.as_str(), (r.size as f64, r.metric))),
    );
    let n = groups.len();
    groups
        .into_iter()
        .enumerate()
        .map(|(i, (method, points))| Series {
            label: method.to_string(),
            color: viridis(i, n),
            line: LineStyle::Solid,
            marker: MARKERS[i % MARKERS.len()],
            points: averaged(points),
        })
        .collect()
}

/// One line per (method, variant). Color follows the method, line style and
/// marker follow the variant.
pub fn comparison_series(records: &[BenchmarkRecord<f64>]) -> Vec<Series> {
    let mut methods: Vec<&str> = Vec::new();
    let mut variants: Vec<Option<Variant>> = Vec::new();
    for r in records {
        if !methods.contains(&r.method.as_str()) {
            methods.push(&r.method);
        }
        if !variants.contains(&r.variant) {
            variants.push(r.variant);
        }
    }

    let groups = group_by_first_seen(
        records
            .iter()
            .map(|r| {
                let key = (r.implementation(), r.method.as_str(), r.variant);
                (key, (r.size, r.metric))
            }),
    );
    groups
        .into_iter()
        .map(|((label, method, variant), points)| {
            let color_idx = methods.iter().position(|m| *m == method).unwrap_or(0);
            let style_idx = variants.iter().position(|v| *v == variant).unwrap_or(0);
            Series {
                label,
                color: TAB10[color_idx % TAB10.len()],
                line: if style_idx == 0 {
                    LineStyle::Solid
                } else {
                    LineStyle::Dashed
                },
                marker: MARKERS[style_idx % MARKERS.len()],
                points: averaged(points),
            }
        })
        .collect()
}

fn plot_err(e: impl Display) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

// Points to pixels at the output resolution.
fn pt(points: f64) -> f64 {
    points * DPI as f64 / 72.0
}

fn pixel_size((width_in, height_in): (f64, f64)) -> (u32, u32) {
    (
        (width_in * DPI as f64) as u32,
        (height_in * DPI as f64) as u32,
    )
}

/// Axis extents with some headroom. Sizes are on a log axis, so only
/// positive values count.
fn axis_ranges(series: &[Series]) -> ((f64, f64), (f64, f64)) {
    let points = series.iter().flat_map(|s| s.points.iter()).filter(|(x, _)| *x > 0.0);
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !x_min.is_finite() {
        (x_min, x_max) = (1.0, 2.0);
    }
    if !y_min.is_finite() {
        (y_min, y_max) = (0.0, 1.0);
    }

    let x_pad = 2f64.powf(0.2);
    let y_pad = if y_max > y_min { (y_max - y_min) * 0.05 } else { 1.0 };
    (
        (x_min / x_pad, x_max * x_pad),
        (y_min - y_pad, y_max + y_pad),
    )
}

/// Exponents `k` with `2^k` inside `[x_min, x_max]`. The x axis is laid out
/// in log2 space, so these are the tick positions.
fn power_of_two_ticks(x_min: f64, x_max: f64) -> Vec<f64> {
    let lo = x_min.log2().ceil() as i32;
    let hi = x_max.log2().floor() as i32;
    (lo..=hi).map(f64::from).collect()
}

/// Tick label for a log2-space position; only whole exponents get one.
fn power_of_two_label(exponent: f64) -> String {
    if (exponent - exponent.round()).abs() < 1e-9 {
        format!("{:.0}", exponent.round().exp2())
    } else {
        String::new()
    }
}

fn minor_ticks(major: &[f64], subdivisions: usize) -> Vec<f64> {
    major
        .windows(2)
        .flat_map(|w| {
            let step = (w[1] - w[0]) / subdivisions as f64;
            (1..subdivisions).map(move |i| w[0] + step * i as f64)
        })
        .collect()
}

/// Stroke spans of a legend sample `width` pixels wide. Dashed series get
/// gaps at the quarter points, clear of the marker drawn in the middle.
fn legend_segments(line: LineStyle, width: i32) -> Vec<(i32, i32)> {
    let gap = match line {
        LineStyle::Solid => 0,
        LineStyle::Dashed => width / 8,
    };
    let (q1, q3) = (width / 4, 3 * width / 4);
    vec![
        (0, q1 - gap / 2),
        (q1 + gap / 2, q3 - gap / 2),
        (q3 + gap / 2, width),
    ]
}

fn draw_legend_sample(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    s: &Series,
    (x, y): (i32, i32),
    stroke: u32,
) -> Result<(), AnalysisError> {
    let width = pt(LEGEND_SAMPLE_PT) as i32;
    let radius = pt(LEGEND_MARKER_PT) as i32;
    let line_style = s.color.stroke_width(stroke);
    let fill_style = s.color.filled();

    for (from, to) in legend_segments(s.line, width) {
        area.draw(&PathElement::new(vec![(x + from, y), (x + to, y)], line_style))
            .map_err(plot_err)?;
    }

    let center = (x + width / 2, y);
    match s.marker {
        Marker::Circle => area.draw(&Circle::new(center, radius, fill_style)),
        Marker::Cross => area.draw(&Cross::new(center, radius, line_style)),
        Marker::Square => area.draw(&Rectangle::new(
            [
                (center.0 - radius, y - radius),
                (center.0 + radius, y + radius),
            ],
            fill_style,
        )),
        Marker::Triangle => area.draw(&TriangleMarker::new(center, radius, fill_style)),
    }
    .map_err(plot_err)
}

/// Titled legend in its own column to the right of the plot.
fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    series: &[Series],
    stroke: u32,
) -> Result<(), AnalysisError> {
    let style = TextStyle::from(("sans-serif", pt(10.0)).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    let x = pt(6.0) as i32;
    let text_x = x + pt(LEGEND_SAMPLE_PT + LEGEND_GAP_PT) as i32;
    let row = pt(LEGEND_ROW_PT) as i32;
    let mut y = pt(48.0) as i32;

    area.draw(&Text::new(title.to_string(), (x, y), style.clone()))
        .map_err(plot_err)?;
    for s in series {
        y += row;
        draw_legend_sample(area, s, (x, y), stroke)?;
        area.draw(&Text::new(s.label.clone(), (text_x, y), style.clone()))
            .map_err(plot_err)?;
    }
    Ok(())
}

fn render(
    path: &Path,
    figure: (f64, f64),
    title: &str,
    y_desc: &str,
    legend_title: &str,
    series: &[Series],
) -> Result<(), AnalysisError> {
    let (width, height) = pixel_size(figure);
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let (plot_area, legend_area) = root.split_horizontally(width - pt(LEGEND_WIDTH_PT) as u32);

    let ((x_min, x_max), (y_min, y_max)) = axis_ranges(series);
    let (lx_min, lx_max) = (x_min.log2(), x_max.log2());
    let x_ticks = power_of_two_ticks(x_min, x_max);
    let y_ticks = RangedCoordf64::from(y_min..y_max).key_points(Y_LABELS);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(title, ("sans-serif", pt(16.0)))
        .margin(pt(12.0) as u32)
        .x_label_area_size(pt(40.0) as u32)
        .y_label_area_size(pt(50.0) as u32)
        .build_cartesian_2d(lx_min..lx_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_ticks.len().max(1))
        .y_labels(Y_LABELS)
        .x_desc("Matrix Dimension (N)")
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", pt(12.0)))
        .label_style(("sans-serif", pt(10.0)))
        .x_label_formatter(&|v: &f64| power_of_two_label(*v))
        .draw()
        .map_err(plot_err)?;

    // light dashed grid: powers of two on x, major and minor ticks on y
    let dash = pt(3.0) as u32;
    let spacing = pt(2.0) as u32;
    let major = BLACK.mix(0.25).stroke_width(1);
    let minor = BLACK.mix(0.1).stroke_width(1);
    let x_grid = x_ticks.iter().map(|&k| (vec![(k, y_min), (k, y_max)], major));
    let y_grid = y_ticks
        .iter()
        .map(|&v| (vec![(lx_min, v), (lx_max, v)], major))
        .chain(
            minor_ticks(&y_ticks, 5)
                .into_iter()
                .map(|v| (vec![(lx_min, v), (lx_max, v)], minor)),
        );
    for (line, style) in x_grid.chain(y_grid) {
        chart
            .draw_series(DashedLineSeries::new(line, dash, spacing, style))
            .map_err(plot_err)?;
    }

    let stroke = pt(2.5) as u32;
    let radius = pt(4.0) as i32;
    for s in series {
        if s.points.iter().any(|(x, _)| *x <= 0.0) {
            debug!("{}: skipping non-positive sizes on log axis", s.label);
        }
        let points: Vec<(f64, f64)> = s
            .points
            .iter()
            .filter(|(x, _)| *x > 0.0)
            .map(|&(x, y)| (x.log2(), y))
            .collect();
        let line_style = s.color.stroke_width(stroke);
        let fill_style = s.color.filled();

        match s.line {
            LineStyle::Solid => {
                chart.draw_series(LineSeries::new(points.iter().copied(), line_style))
            }
            LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(
                points.iter().copied(),
                stroke * 6,
                stroke * 3,
                line_style,
            )),
        }
        .map_err(plot_err)?;

        let markers = points.iter().copied();
        match s.marker {
            Marker::Circle => chart
                .draw_series(markers.map(|p| Circle::new(p, radius, fill_style)))
                .map_err(plot_err)?,
            Marker::Cross => chart
                .draw_series(markers.map(|p| Cross::new(p, radius, line_style)))
                .map_err(plot_err)?,
            Marker::Square => chart
                .draw_series(markers.map(|p| {
                    EmptyElement::at(p)
                        + Rectangle::new([(-radius, -radius), (radius, radius)], fill_style)
                }))
                .map_err(plot_err)?,
            Marker::Triangle => chart
                .draw_series(markers.map(|p| TriangleMarker::new(p, radius, fill_style)))
                .map_err(plot_err)?,
        };
    }

    draw_legend(&legend_area, legend_title, series, stroke)?;

    root.present().map_err(plot_err)?;
    info!("wrote {} series to {}", series.len(), path.display());
    Ok(())
}

/// Throughput vs. size, one line per method.
pub fn render_scaling(path: &Path, metric: &str, series: &[Series]) -> Result<(), AnalysisError> {
    render(
        path,
        SCALING_FIGURE,
        &format!("Matrix Multiplication Performance ({})", metric),
        metric,
        "Method",
        series,
    )
}

/// SSE2 vs. AVX2 throughput, one line per (method, variant).
pub fn render_comparison(
    path: &Path,
    metric: &str,
    series: &[Series],
) -> Result<(), AnalysisError> {
    render(
        path,
        COMPARISON_FIGURE,
        &format!("Performance Comparison: SSE2 vs AVX2 ({})", metric),
        &format!("{} (Billions of Ops/sec)", metric),
        "Implementations",
        series,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record<S>(method: &str, size: S, metric: f64, variant: Option<Variant>) -> BenchmarkRecord<S> {
        BenchmarkRecord {
            name: String::new(),
            method: method.to_string(),
            size,
            metric,
            variant,
            columns: BTreeMap::new(),
        }
    }

    #[test]
    fn test_scaling_series_one_line_per_method() {
        let records = vec![
            record("Naive", 256u64, 1.0, None),
            record("Simd", 64, 8.0, None),
            record("Naive", 64, 2.0, None),
            record("Simd", 256, 6.0, None),
        ];
        let series = scaling_series(&records);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Naive");
        assert_eq!(series[0].points, vec![(64.0, 2.0), (256.0, 1.0)]);
        assert_eq!(series[1].label, "Simd");
        assert_eq!(series[1].points, vec![(64.0, 8.0), (256.0, 6.0)]);
        assert!(series.iter().all(|s| s.line == LineStyle::Solid));
        assert_ne!(series[0].marker, series[1].marker);
        assert_ne!(series[0].color, series[1].color);
    }

    #[test]
    fn test_scaling_series_averages_repeated_sizes() {
        let records = vec![
            record("Simd", 128u64, 4.0, None),
            record("Simd", 128, 6.0, None),
        ];
        let series = scaling_series(&records);
        assert_eq!(series[0].points, vec![(128.0, 5.0)]);
    }

    #[test]
    fn test_comparison_series_encodes_method_and_variant() {
        let records = vec![
            record("Simd", 64.0, 2.0, Some(Variant::Sse2)),
            record("Naive", 64.0, 1.0, Some(Variant::Sse2)),
            record("Simd", 64.0, 4.0, Some(Variant::Avx2)),
            record("Naive", 64.0, 1.1, Some(Variant::Avx2)),
        ];
        let series = comparison_series(&records);
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Simd (SSE2)", "Naive (SSE2)", "Simd (AVX2)", "Naive (AVX2)"]
        );

        // same method, same color; same variant, same line style
        assert_eq!(series[0].color, series[2].color);
        assert_ne!(series[0].color, series[1].color);
        assert_eq!(series[0].line, LineStyle::Solid);
        assert_eq!(series[1].line, LineStyle::Solid);
        assert_eq!(series[2].line, LineStyle::Dashed);
        assert_eq!(series[3].line, LineStyle::Dashed);
        assert_eq!(series[0].marker, series[1].marker);
        assert_ne!(series[0].marker, series[2].marker);
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0, 3), VIRIDIS[0]);
        assert_eq!(viridis(2, 3), VIRIDIS[8]);
        assert_eq!(viridis(1, 3), VIRIDIS[4]);
        assert_eq!(viridis(0, 1), VIRIDIS[0]);
    }

    #[test]
    fn test_axis_ranges_ignore_non_positive_sizes() {
        let series = vec![Series {
            label: "Naive".to_string(),
            color: TAB10[0],
            line: LineStyle::Solid,
            marker: Marker::Circle,
            points: vec![(0.0, 100.0), (4.0, 1.0), (16.0, 3.0)],
        }];
        let ((x_min, x_max), (y_min, y_max)) = axis_ranges(&series);
        assert!(x_min > 0.0 && x_min < 4.0);
        assert!(x_max > 16.0);
        assert!(y_min < 1.0 && y_max > 3.0 && y_max < 100.0);
    }

    #[test]
    fn test_power_of_two_ticks() {
        assert_eq!(power_of_two_ticks(55.7, 147.0), vec![6.0, 7.0]);
        assert_eq!(power_of_two_ticks(3.5, 2400.0).first(), Some(&2.0));
        assert_eq!(power_of_two_ticks(3.5, 2400.0).last(), Some(&11.0));
        assert!(power_of_two_ticks(90.0, 110.0).is_empty());
    }

    #[test]
    fn test_power_of_two_label() {
        assert_eq!(power_of_two_label(6.0), "64");
        assert_eq!(power_of_two_label(7.0), "128");
        assert_eq!(power_of_two_label(0.0), "1");
        assert_eq!(power_of_two_label(6.3), "");
    }

    #[test]
    fn test_minor_ticks_subdivide_major_steps() {
        let minor = minor_ticks(&[0.0, 10.0, 20.0], 5);
        assert_eq!(minor, vec![2.0, 4.0, 6.0, 8.0, 12.0, 14.0, 16.0, 18.0]);
        assert!(minor_ticks(&[1.0], 5).is_empty());
    }

    #[test]
    fn test_legend_sample_shows_line_style() {
        let width = pt(LEGEND_SAMPLE_PT) as i32;
        let radius = pt(LEGEND_MARKER_PT) as i32;
        let mid = width / 2;

        let solid = legend_segments(LineStyle::Solid, width);
        assert!(solid.windows(2).all(|w| w[0].1 == w[1].0));
        assert_eq!((solid[0].0, solid[2].1), (0, width));

        let dashed = legend_segments(LineStyle::Dashed, width);
        let gaps: Vec<(i32, i32)> = dashed.windows(2).map(|w| (w[0].1, w[1].0)).collect();
        assert_eq!(gaps.len(), 2);
        for (start, end) in gaps {
            assert!(end > start);
            // the marker in the middle must not hide a gap
            assert!(end < mid - radius || start > mid + radius);
        }
    }

    #[test]
    fn test_legend_label_clears_sample() {
        let sample_end = pt(LEGEND_SAMPLE_PT);
        let label_start = pt(LEGEND_SAMPLE_PT + LEGEND_GAP_PT);
        assert!(label_start > sample_end);
        assert!(pt(LEGEND_WIDTH_PT) > label_start);
    }

    #[test]
    fn test_pixel_size_at_300_dpi() {
        assert_eq!(pixel_size(SCALING_FIGURE), (3600, 2100));
        assert_eq!(pixel_size(COMPARISON_FIGURE), (3600, 2400));
    }
}
