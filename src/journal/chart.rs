//! Balance chart rendered from the operation log.
//!
//! Output is a standalone SVG line chart of total value (quote + base marked at
//! the fill price) per logged operation, with a marker on every point.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TradingError, TradingResult};
use crate::journal::operation_log::{OperationLog, OperationRow};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct BalanceChart {
    path: PathBuf,
    base_asset: String,
    quote_asset: String,
}

impl BalanceChart {
    pub fn new<P: AsRef<Path>>(path: P, base_asset: &str, quote_asset: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            base_asset: base_asset.to_string(),
            quote_asset: quote_asset.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Regenerate the chart from `log`. Returns false, writing nothing, when
    /// the log has no rows yet.
    pub fn render_from_log(&self, log: &OperationLog) -> TradingResult<bool> {
        let rows = log.read_all()?;
        if rows.is_empty() {
            return Ok(false);
        }
        let svg = self.render(&rows)?;
        fs::write(&self.path, svg)?;
        Ok(true)
    }

    fn render(&self, rows: &[OperationRow]) -> TradingResult<String> {
        let values: Vec<f64> = rows.iter().map(OperationRow::total_value).collect();
        let xs = x_positions(rows);

        let (mut y_min, mut y_max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if (y_max - y_min).abs() < f64::EPSILON {
            y_min -= 1.0;
            y_max += 1.0;
        }

        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let to_px = |x: f64, y: f64| {
            (
                MARGIN_LEFT + x * plot_w,
                MARGIN_TOP + (1.0 - (y - y_min) / (y_max - y_min)) * plot_h,
            )
        };

        let points: Vec<(f64, f64)> = xs.iter().zip(&values).map(|(&x, &y)| to_px(x, y)).collect();

        let mut svg = String::new();
        self.write_svg(&mut svg, rows, &points, y_min, y_max, plot_w, plot_h)
            .map_err(|e| TradingError::Journal(format!("Failed to render chart: {}", e)))?;
        Ok(svg)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_svg(
        &self,
        svg: &mut String,
        rows: &[OperationRow],
        points: &[(f64, f64)],
        y_min: f64,
        y_max: f64,
        plot_w: f64,
        plot_h: f64,
    ) -> std::fmt::Result {
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = WIDTH,
            h = HEIGHT
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{}" y="28" text-anchor="middle" font-size="18">Balance over time ({} + {})</text>"#,
            WIDTH / 2.0,
            escape(&self.quote_asset),
            escape(&self.base_asset)
        )?;

        // Horizontal gridlines with value labels
        for step in 0..=4 {
            let frac = step as f64 / 4.0;
            let y = MARGIN_TOP + frac * plot_h;
            let value = y_max - frac * (y_max - y_min);
            writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#dddddd"/>"##,
                MARGIN_LEFT,
                y,
                MARGIN_LEFT + plot_w,
                y
            )?;
            writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{:.2}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                value
            )?;
        }

        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black"/>"#,
            MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h
        )?;

        let polyline: Vec<String> = points.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
        writeln!(
            svg,
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{}"/>"##,
            polyline.join(" ")
        )?;
        for (x, y) in points {
            writeln!(svg, r##"<circle cx="{:.1}" cy="{:.1}" r="3" fill="#1f77b4"/>"##, x, y)?;
        }

        if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
            let label_y = MARGIN_TOP + plot_h + 20.0;
            writeln!(
                svg,
                r#"<text x="{}" y="{:.1}" text-anchor="start" font-size="11">{}</text>"#,
                MARGIN_LEFT,
                label_y,
                escape(&first.timestamp)
            )?;
            writeln!(
                svg,
                r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="11">{}</text>"#,
                MARGIN_LEFT + plot_w,
                label_y,
                escape(&last.timestamp)
            )?;
        }
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="13">Time</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            HEIGHT - 15.0
        )?;
        writeln!(
            svg,
            r#"<text x="18" y="{}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {})">Total balance ({})</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape(&self.quote_asset)
        )?;
        writeln!(svg, "</svg>")
    }
}

/// Horizontal position in [0, 1] per row. Uses timestamps when they parse and
/// span a non-zero interval, otherwise spreads rows evenly.
fn x_positions(rows: &[OperationRow]) -> Vec<f64> {
    let times: Option<Vec<i64>> = rows
        .iter()
        .map(|row| row.parsed_timestamp().map(|t| t.and_utc().timestamp()))
        .collect();

    if let Some(times) = times {
        let (first, last) = (times[0], times[times.len() - 1]);
        if last > first {
            let span = (last - first) as f64;
            return times.iter().map(|&t| (t - first) as f64 / span).collect();
        }
    }

    if rows.len() == 1 {
        return vec![0.5];
    }
    let last = (rows.len() - 1) as f64;
    (0..rows.len()).map(|i| i as f64 / last).collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
