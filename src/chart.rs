use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;

use crate::models::SummaryRow;

pub const TITLE: &str = "Training Score Percentage by Executive and Quarter";
const SIZE: (u32, u32) = (1200, 800);
const GROUP_WIDTH: f64 = 0.8;
const FONT_FAMILY: &str = "sans-serif";
const FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

pub const Y_MAX: f64 = 100.0;
/// Tick count giving a label every 10 percentage points on 0..=100.
pub const Y_LABELS: usize = 11;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// One bar of the chart, positioned on the continuous x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub group: usize,
    pub quarter: usize,
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

/// Left and right edges of the bar for `quarter` inside group `group`.
pub fn bar_span(group: usize, quarter: usize, quarter_count: usize) -> (f64, f64) {
    let width = GROUP_WIDTH / quarter_count.max(1) as f64;
    let left = group as f64 - GROUP_WIDTH / 2.0 + quarter as f64 * width;
    (left, left + width)
}

/// Bars for every row, grand total included. Undefined percentages produce no bar.
pub fn layout_bars(quarter_count: usize, rows: &[SummaryRow]) -> Vec<Bar> {
    let mut bars = Vec::new();
    for (group, row) in rows.iter().enumerate() {
        for quarter in 0..quarter_count {
            let Some(height) = row.percentages.get(quarter).copied().flatten() else {
                continue;
            };
            let (left, right) = bar_span(group, quarter, quarter_count);
            bars.push(Bar {
                group,
                quarter,
                left,
                right,
                height,
            });
        }
    }
    bars
}

fn register_font() -> anyhow::Result<()> {
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, FONT)
        .map_err(|_| anyhow::anyhow!("embedded chart font could not be parsed"))
}

fn group_label(names: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    names
        .get(nearest as usize)
        .map(|name| name.to_string())
        .unwrap_or_default()
}

/// Renders a grouped bar chart, one group per row and one bar per quarter.
pub fn render_chart(quarters: &[String], rows: &[SummaryRow], path: &Path) -> anyhow::Result<()> {
    let names: Vec<&str> = rows.iter().map(|row| row.executive_head.as_str()).collect();
    let groups = rows.len().max(1);
    let bars = layout_bars(quarters.len(), rows);
    register_font()?;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT_FAMILY, 24))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), 0f64..Y_MAX)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&|x| group_label(&names, *x))
        .y_labels(Y_LABELS)
        .y_label_formatter(&|y| format!("{y:.0}"))
        .x_desc("Executive Head")
        .y_desc("Percentage")
        .draw()?;

    for (idx, quarter) in quarters.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let series = bars
            .iter()
            .filter(|bar| bar.quarter == idx)
            .map(|bar| Rectangle::new([(bar.left, 0.0), (bar.right, bar.height)], color.filled()));

        chart
            .draw_series(series)?
            .label(quarter.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write chart {}", path.display()))?;
    tracing::debug!(path = %path.display(), groups = rows.len(), "chart rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::coord::ranged1d::Ranged;
    use plotters::coord::types::RangedCoordf64;

    fn row(name: &str, percentages: Vec<Option<f64>>) -> SummaryRow {
        SummaryRow {
            executive_head: name.to_string(),
            total_members: 1,
            percentages,
        }
    }

    #[test]
    fn bars_tile_the_group_without_overlap() {
        let spans: Vec<(f64, f64)> = (0..4).map(|q| bar_span(2, q, 4)).collect();
        assert!((spans[0].0 - 1.6).abs() < 1e-9);
        assert!((spans[3].1 - 2.4).abs() < 1e-9);
        for pair in spans.windows(2) {
            assert!((pair[0].1 - pair[1].0).abs() < 1e-9);
        }
    }

    #[test]
    fn labels_only_at_group_centres() {
        let names = ["Exec1", "Grand Total"];
        assert_eq!(group_label(&names, 0.0), "Exec1");
        assert_eq!(group_label(&names, 1.0), "Grand Total");
        assert_eq!(group_label(&names, 0.5), "");
        assert_eq!(group_label(&names, -1.0), "");
        assert_eq!(group_label(&names, 4.0), "");
    }

    #[test]
    fn y_axis_ticks_every_ten_percent() {
        let axis: RangedCoordf64 = (0f64..Y_MAX).into();
        let ticks = axis.key_points(Y_LABELS);
        assert_eq!(ticks.len(), 11);
        for (idx, tick) in ticks.iter().enumerate() {
            assert!((tick - idx as f64 * 10.0).abs() < 1e-9, "tick {idx} was {tick}");
        }
    }

    #[test]
    fn one_group_per_row_including_grand_total() {
        let rows = vec![
            row("Exec1", vec![Some(100.0), Some(40.0)]),
            row("Exec2", vec![Some(0.0), Some(20.0)]),
            row("Grand Total", vec![Some(50.0), None]),
        ];

        let bars = layout_bars(2, &rows);
        assert_eq!(bars.len(), 5);
        let mut groups: Vec<usize> = bars.iter().map(|bar| bar.group).collect();
        groups.dedup();
        assert_eq!(groups, vec![0, 1, 2]);

        let total: Vec<&Bar> = bars.iter().filter(|bar| bar.group == 2).collect();
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].quarter, 0);
        assert_eq!(total[0].height, 50.0);
        // a zero percentage still gets a (flat) bar
        assert!(bars.iter().any(|bar| bar.group == 1 && bar.quarter == 0 && bar.height == 0.0));
    }

    #[test]
    fn executive_names_are_drawn() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let quarters = vec!["Q1".to_string()];
        let first = dir.path().join("alice.png");
        let second = dir.path().join("bob.png");

        render_chart(&quarters, &[row("Alice", vec![Some(50.0)])], &first).unwrap();
        render_chart(&quarters, &[row("Bob", vec![Some(50.0)])], &second).unwrap();

        let first = std::fs::read(&first).unwrap();
        let second = std::fs::read(&second).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn writes_png_including_undefined_bars() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("chart.png");
        let quarters = vec!["Q1".to_string(), "Q2".to_string()];
        let rows = vec![
            row("Exec1", vec![Some(100.0), Some(40.0)]),
            row("Grand Total", vec![Some(100.0), None]),
        ];

        render_chart(&quarters, &rows, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
