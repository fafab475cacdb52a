// vega-lite chart specs from query results
// builds the json document only, rendering is left to a vega viewer

use serde_json::{Map, Value, json};
use std::fmt;
use std::path::Path;

const VEGA_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const TEMPORAL_COLUMNS: [&str; 6] = ["date", "time", "day", "month", "year", "timestamp"];

/// One result row, keys in column order.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Area => "area",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn columns(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn numeric_columns(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|row| {
            row.iter()
                .filter(|(_, v)| v.is_number())
                .map(|(k, _)| k.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn mentions(column: &str, keywords: &[&str]) -> bool {
    let column = column.to_lowercase();
    keywords.iter().any(|kw| column.contains(kw))
}

/// Picks a chart shape from the column names and the first row's values.
pub fn detect_chart_type(rows: &[Row]) -> ChartType {
    if rows.is_empty() {
        return ChartType::Bar;
    }

    let has_temporal = columns(rows)
        .iter()
        .any(|c| mentions(c, &TEMPORAL_COLUMNS));
    let numeric = numeric_columns(rows).len();

    if has_temporal && numeric >= 1 {
        ChartType::Line
    } else if numeric >= 2 {
        ChartType::Scatter
    } else if rows.len() <= 6 {
        ChartType::Pie
    } else {
        ChartType::Bar
    }
}

/// Builds the vega-lite document, `None` when there are no rows or fewer
/// than two columns to plot.
pub fn build_vega_spec(
    rows: &[Row],
    chart_type: ChartType,
    title: &str,
    width: u32,
    height: u32,
) -> Option<Value> {
    let cols = columns(rows);
    if cols.len() < 2 {
        return None;
    }
    let (first, second) = (cols[0], cols[1]);

    let (mark, encoding) = match chart_type {
        ChartType::Bar => (
            json!({ "type": "bar", "cornerRadiusEnd": 4 }),
            json!({
                "x": { "field": first, "type": "ordinal", "sort": "-y", "axis": { "labelAngle": -45 } },
                "y": { "field": second, "type": "quantitative" },
                "tooltip": [
                    { "field": first, "type": "ordinal" },
                    { "field": second, "type": "quantitative" }
                ]
            }),
        ),
        ChartType::Line => {
            let x_type = if mentions(first, &["date", "time", "day", "month"]) {
                "temporal"
            } else {
                "ordinal"
            };
            (
                json!({ "type": "line", "point": true, "interpolate": "monotone" }),
                json!({
                    "x": { "field": first, "type": x_type },
                    "y": { "field": second, "type": "quantitative" },
                    "tooltip": [
                        { "field": first, "type": x_type },
                        { "field": second, "type": "quantitative" }
                    ]
                }),
            )
        }
        ChartType::Pie => (
            json!({ "type": "arc", "innerRadius": 50 }),
            json!({
                "theta": { "field": second, "type": "quantitative" },
                "color": { "field": first, "type": "nominal" },
                "tooltip": [
                    { "field": first, "type": "nominal" },
                    { "field": second, "type": "quantitative" }
                ]
            }),
        ),
        ChartType::Scatter => {
            let numeric = numeric_columns(rows);
            let (x, y) = match numeric.as_slice() {
                [x, y, ..] => (*x, *y),
                _ => (first, second),
            };
            (
                json!("point"),
                json!({
                    "x": { "field": x, "type": "quantitative" },
                    "y": { "field": y, "type": "quantitative" },
                    "tooltip": [
                        { "field": x, "type": "quantitative" },
                        { "field": y, "type": "quantitative" }
                    ]
                }),
            )
        }
        ChartType::Area => {
            let x_type = if mentions(first, &["date", "time"]) {
                "temporal"
            } else {
                "ordinal"
            };
            (
                json!("area"),
                json!({
                    "x": { "field": first, "type": x_type },
                    "y": { "field": second, "type": "quantitative" }
                }),
            )
        }
    };

    Some(json!({
        "$schema": VEGA_SCHEMA,
        "title": title,
        "width": width,
        "height": height,
        "data": { "values": rows },
        "mark": mark,
        "encoding": encoding,
    }))
}

/// Title from an output path: `monthly-sales_report.png` -> `Monthly Sales Report`.
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    title_case(&stem.replace(['-', '_'], " "))
}

// upper-case a letter that follows a non-letter, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
