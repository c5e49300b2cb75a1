// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::api::normalize_ticker;
use crate::models::TimeSeriesTable;

pub const CHART_SIZE: (u32, u32) = (900, 500);

const COLOR_BLUE: RGBColor = RGBColor(59, 130, 246);
const COLOR_SLATE: RGBColor = RGBColor(100, 116, 139);
const COLOR_GRAY_LIGHT: RGBColor = RGBColor(243, 244, 246);

const TOOLTIP_SCRIPT: &str = r#"<script type="text/javascript">
(function () {
  var root = document.getElementById("__CHART_ID__");
  if (!root) { return; }
  var svg = root.querySelector("svg");
  var tip = root.querySelector(".chart-tooltip");
  var points = __POINTS__;
  var width = __WIDTH__, height = __HEIGHT__;
  svg.addEventListener("mousemove", function (ev) {
    var box = svg.getBoundingClientRect();
    var x = (ev.clientX - box.left) * width / box.width;
    var best = null, dist = Infinity;
    for (var i = 0; i < points.length; i++) {
      var d = Math.abs(points[i].x - x);
      if (d < dist) { dist = d; best = points[i]; }
    }
    if (!best) { return; }
    tip.textContent = best.date + ": " + best.value.toFixed(2);
    tip.style.left = (best.x * box.width / width + 8) + "px";
    tip.style.top = (best.y * box.height / height - 32) + "px";
    tip.style.display = "block";
  });
  svg.addEventListener("mouseleave", function () { tip.style.display = "none"; });
})();
</script>"#;

/// One rendered chart: `div` is the markup, `script` the hover behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFragment {
    pub script: String,
    pub div: String,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown column '{column}' (available: {})", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("column '{column}' has no values to plot")]
    NoData { column: String },

    #[error("failed to draw chart: {0}")]
    Draw(String),
}

/// Pixel position of a data point, handed to the tooltip script.
#[derive(Debug, Serialize)]
struct Marker {
    x: i32,
    y: i32,
    date: String,
    value: f64,
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Renders `column` of `table` as a dated line with point markers.
pub fn render_chart(
    table: &TimeSeriesTable,
    column: &str,
    ticker: &str,
) -> Result<ChartFragment, RenderError> {
    let selected = table
        .column(column)
        .ok_or_else(|| RenderError::UnknownColumn {
            column: column.to_string(),
            available: table.column_names().into_iter().map(String::from).collect(),
        })?;

    let mut points = table.points(selected);
    if points.is_empty() {
        return Err(RenderError::NoData {
            column: selected.name.clone(),
        });
    }
    points.sort_by_key(|(date, _)| *date);

    let ticker = normalize_ticker(ticker);
    let title = format!("{} price for {}", selected.name, ticker);
    let (x_range, y_range) = axis_ranges(&points);

    let mut svg = String::new();
    let mut markers = Vec::with_capacity(points.len());
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&COLOR_GRAY_LIGHT).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 26).into_font().color(&BLACK))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price ($)")
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v: &f64| format!("{:.2}", v))
            .axis_desc_style(("sans-serif", 18))
            .label_style(("sans-serif", 13).into_font().color(&COLOR_SLATE))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                COLOR_BLUE.stroke_width(2),
            ))
            .map_err(draw_err)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(date, value)| Circle::new((date, value), 4, COLOR_BLUE.filled())),
            )
            .map_err(draw_err)?;

        for &(date, value) in &points {
            let (x, y) = chart.backend_coord(&(date, value));
            markers.push(Marker {
                x,
                y,
                date: date.format("%Y-%m-%d").to_string(),
                value,
            });
        }

        root.present().map_err(draw_err)?;
    }

    let chart_id = format!("chart-{}-{}", slug(&ticker), slug(&selected.name));
    let points_json = serde_json::to_string(&markers).map_err(draw_err)?;

    let div = format!(
        concat!(
            r#"<div id="{id}" class="chart" style="position: relative; display: inline-block;">"#,
            "{svg}",
            r#"<div class="chart-tooltip" style="position: absolute; display: none; padding: 4px 8px; "#,
            r#"background: #1f2937; color: #fff; font: 12px sans-serif; border-radius: 4px; pointer-events: none;"></div>"#,
            "</div>"
        ),
        id = chart_id,
        svg = svg,
    );

    let script = TOOLTIP_SCRIPT
        .replace("__CHART_ID__", &chart_id)
        .replace("__POINTS__", &points_json)
        .replace("__WIDTH__", &CHART_SIZE.0.to_string())
        .replace("__HEIGHT__", &CHART_SIZE.1.to_string());

    Ok(ChartFragment { script, div })
}

/// Axis spans with some headroom. Degenerate spans are widened.
fn axis_ranges(
    points: &[(NaiveDate, f64)],
) -> (std::ops::Range<NaiveDate>, std::ops::Range<f64>) {
    let first = points[0].0;
    let last = points[points.len() - 1].0;
    let (x_start, x_end) = if first == last {
        (
            first.checked_sub_days(Days::new(1)).unwrap_or(first),
            last.checked_add_days(Days::new(1)).unwrap_or(last),
        )
    } else {
        (first, last)
    };

    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
            (lo.min(v), hi.max(v))
        });
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        (max.abs() * 0.05).max(1.0)
    };

    (x_start..x_end, (min - pad)..(max + pad))
}

fn slug(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
