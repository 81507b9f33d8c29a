//! Chart specs and their SVG geometry.
//!
//! The backend sends Chart.js-shaped objects. They are parsed leniently:
//! unknown fields are ignored, non-numeric points become gaps.

use serde_json::Value;

use intellidash_shared::ChartCollection;

pub const VIEW_WIDTH: f64 = 480.0;
pub const VIEW_HEIGHT: f64 = 240.0;
pub const PADDING: f64 = 24.0;

/// Empty share of a category slot on each side of a bar group.
const BAR_SLOT_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

impl ChartKind {
    /// Missing type means line; any type other than "line" draws bars.
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("line") => ChartKind::Line,
            Some(_) => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSpec {
    pub fn from_value(title: &str, value: &Value) -> Self {
        let labels = value
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| labels.iter().map(label_text).collect())
            .unwrap_or_default();

        let datasets = value
            .get("datasets")
            .and_then(Value::as_array)
            .map(|sets| {
                sets.iter()
                    .enumerate()
                    .map(|(i, set)| Dataset {
                        label: set
                            .get("label")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Series {}", i + 1)),
                        data: set
                            .get("data")
                            .and_then(Value::as_array)
                            .map(|points| points.iter().map(Value::as_f64).collect())
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: title.to_string(),
            kind: ChartKind::parse(value.get("type").and_then(Value::as_str)),
            labels,
            datasets,
        }
    }

    pub fn collection(charts: &ChartCollection) -> Vec<Self> {
        charts
            .iter()
            .map(|(title, value)| Self::from_value(title, value))
            .collect()
    }

    /// Number of category slots on the x axis.
    pub fn slots(&self) -> usize {
        self.datasets
            .iter()
            .map(|d| d.data.len())
            .chain(std::iter::once(self.labels.len()))
            .max()
            .unwrap_or(0)
    }

    /// Largest value across all datasets, floored at zero.
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter().flatten())
            .fold(0.0, |acc: f64, v| acc.max(*v))
    }

    pub fn is_empty(&self) -> bool {
        self.slots() == 0
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesShape {
    /// Runs of consecutive points; a gap starts a new run.
    Line(Vec<Vec<Point>>),
    Bars(Vec<BarRect>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayout {
    pub label: String,
    pub shape: SeriesShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub x: f64,
    pub text: String,
}

/// View-box geometry for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    /// y of the zero line.
    pub baseline: f64,
    pub max: f64,
    pub series: Vec<SeriesLayout>,
    pub x_labels: Vec<AxisLabel>,
}

pub fn layout(spec: &ChartSpec, width: f64, height: f64) -> ChartLayout {
    let left = PADDING;
    let top = PADDING;
    let plot_width = (width - 2.0 * PADDING).max(0.0);
    let plot_height = (height - 2.0 * PADDING).max(0.0);
    let baseline = top + plot_height;

    let slots = spec.slots();
    let step = if slots == 0 {
        0.0
    } else {
        plot_width / slots as f64
    };
    let max = spec.max_value();
    let scale = if max > 0.0 { plot_height / max } else { 0.0 };
    let bar_height = |v: f64| v.max(0.0) * scale;
    let slot_center = |i: usize| left + (i as f64 + 0.5) * step;

    let group_count = spec.datasets.len().max(1) as f64;
    let group_offset = step * BAR_SLOT_MARGIN;
    let bar_width = (step - 2.0 * group_offset) / group_count;

    let series = spec
        .datasets
        .iter()
        .enumerate()
        .map(|(j, dataset)| {
            let shape = match spec.kind {
                ChartKind::Line => {
                    let mut runs: Vec<Vec<Point>> = Vec::new();
                    let mut current = Vec::new();
                    for (i, value) in dataset.data.iter().enumerate() {
                        match value {
                            Some(v) => current.push(Point {
                                x: slot_center(i),
                                y: baseline - bar_height(*v),
                            }),
                            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                            None => {}
                        }
                    }
                    if !current.is_empty() {
                        runs.push(current);
                    }
                    SeriesShape::Line(runs)
                }
                ChartKind::Bar => SeriesShape::Bars(
                    dataset
                        .data
                        .iter()
                        .enumerate()
                        .map(|(i, value)| {
                            let h = value.map(bar_height).unwrap_or(0.0);
                            BarRect {
                                x: left + i as f64 * step + group_offset + j as f64 * bar_width,
                                y: baseline - h,
                                width: bar_width,
                                height: h,
                            }
                        })
                        .collect(),
                ),
            };
            SeriesLayout {
                label: dataset.label.clone(),
                shape,
            }
        })
        .collect();

    let x_labels = spec
        .labels
        .iter()
        .enumerate()
        .map(|(i, text)| AxisLabel {
            x: slot_center(i),
            text: text.clone(),
        })
        .collect();

    ChartLayout {
        width,
        height,
        baseline,
        max,
        series,
        x_labels,
    }
}
