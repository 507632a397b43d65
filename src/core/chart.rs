//! Chart layout for a projection: scales, yearly samples, deviation lines, the goal
//! marker and pointer lookup. Coordinates are relative to the plot area (inside the
//! margins), with y growing downwards.

use serde::Serialize;

use super::format::format_axis_value;
use super::types::{MonthlyDataPoint, ProjectionSeries};

const HEADROOM: f64 = 1.1;
const GRID_FRACTIONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
const TICK_FRACTIONS: [f64; 3] = [0.0, 0.5, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 240.0,
            margin: Margin {
                top: 30.0,
                right: 60.0,
                bottom: 30.0,
                left: 60.0,
            },
        }
    }
}

impl ChartDimensions {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

/// A secondary projection drawn next to the primary one, e.g. at another rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationSeries {
    pub label: String,
    pub series: ProjectionSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub year: u32,
    pub data: MonthlyDataPoint,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationPath {
    pub label: String,
    pub points: Vec<ChartPoint>,
    pub path: String,
    pub last_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMarker {
    pub x: f64,
    pub y: f64,
    /// Fractional year of the first month at or above the goal.
    pub year: f64,
    pub data: MonthlyDataPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTick {
    pub y: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub point: ChartPoint,
    pub goal_reached: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub dimensions: ChartDimensions,
    pub total_years: f64,
    pub max_value: f64,
    pub goal_value: Option<f64>,
    pub goal_y: Option<f64>,
    pub points: Vec<ChartPoint>,
    pub path: String,
    pub deviations: Vec<DeviationPath>,
    pub goal_marker: Option<GoalMarker>,
    pub grid_lines: Vec<f64>,
    pub y_ticks: Vec<AxisTick>,
}

impl ChartLayout {
    pub fn empty(dimensions: ChartDimensions) -> Self {
        Self {
            dimensions,
            total_years: 0.0,
            max_value: 0.0,
            goal_value: None,
            goal_y: None,
            points: Vec::new(),
            path: String::new(),
            deviations: Vec::new(),
            goal_marker: None,
            grid_lines: Vec::new(),
            y_ticks: Vec::new(),
        }
    }

    pub fn build(
        series: &[MonthlyDataPoint],
        goal_value: Option<f64>,
        deviations: &[DeviationSeries],
        dimensions: ChartDimensions,
    ) -> Self {
        let Some(last) = series.last() else {
            return Self::empty(dimensions);
        };
        let goal_value = goal_value.filter(|goal| goal.is_finite() && *goal > 0.0);

        let mut highest = last.total_accumulated;
        for deviation in deviations {
            if let Some(point) = deviation.series.last() {
                highest = highest.max(point.total_accumulated);
            }
        }
        let max_value = highest.max(goal_value.unwrap_or(0.0)) * HEADROOM;

        let mut layout = Self {
            dimensions,
            total_years: (series.len() - 1) as f64 / 12.0,
            max_value,
            goal_value,
            goal_y: None,
            points: Vec::new(),
            path: String::new(),
            deviations: Vec::new(),
            goal_marker: None,
            grid_lines: Vec::new(),
            y_ticks: Vec::new(),
        };

        layout.points = layout.sample_yearly(series);
        layout.path = svg_path(&layout.points);
        layout.deviations = deviations
            .iter()
            .filter(|deviation| !deviation.series.is_empty())
            .map(|deviation| {
                let points = layout.sample_yearly(&deviation.series);
                let last_y = points.last().map(|p| p.y).unwrap_or(layout.y_for_value(0.0));
                DeviationPath {
                    label: deviation.label.clone(),
                    path: svg_path(&points),
                    points,
                    last_y,
                }
            })
            .collect();

        if let Some(goal) = goal_value {
            layout.goal_y = Some(layout.y_for_value(goal));
            layout.goal_marker = series
                .iter()
                .position(|p| p.total_accumulated >= goal)
                .map(|idx| {
                    let data = series[idx];
                    let year = idx as f64 / 12.0;
                    GoalMarker {
                        x: layout.x_for_year(year),
                        y: layout.y_for_value(data.total_accumulated),
                        year,
                        data,
                    }
                });
        }

        let inner_height = dimensions.inner_height();
        layout.grid_lines = GRID_FRACTIONS.iter().map(|f| inner_height * f).collect();
        layout.y_ticks = TICK_FRACTIONS
            .iter()
            .map(|f| AxisTick {
                y: inner_height * (1.0 - f),
                value: max_value * f,
                label: format_axis_value(max_value * f),
            })
            .collect();

        layout
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_for_year(&self, year: f64) -> f64 {
        if self.total_years <= 0.0 {
            return 0.0;
        }
        (year / self.total_years) * self.dimensions.inner_width()
    }

    pub fn y_for_value(&self, value: f64) -> f64 {
        let scale = if self.max_value > 0.0 {
            self.max_value
        } else {
            1.0
        };
        let inner_height = self.dimensions.inner_height();
        inner_height - (value / scale) * inner_height
    }

    /// Yearly sample closest to a horizontal pointer position in plot-area coordinates.
    pub fn nearest_point(&self, pointer_x: f64) -> Option<&ChartPoint> {
        let last = self.points.len().checked_sub(1)?;
        let inner_width = self.dimensions.inner_width();
        if inner_width <= 0.0 || !pointer_x.is_finite() {
            return self.points.first();
        }
        let year = ((pointer_x / inner_width) * self.total_years).round();
        let idx = if year <= 0.0 {
            0
        } else {
            (year as usize).min(last)
        };
        self.points.get(idx)
    }

    pub fn tooltip(&self, pointer_x: f64) -> Option<Tooltip> {
        self.nearest_point(pointer_x).map(|point| Tooltip {
            point: *point,
            goal_reached: self
                .goal_value
                .is_some_and(|goal| point.data.total_accumulated >= goal),
        })
    }

    fn sample_yearly(&self, series: &[MonthlyDataPoint]) -> Vec<ChartPoint> {
        let Some(last_index) = series.len().checked_sub(1) else {
            return Vec::new();
        };
        let whole_years = self.total_years.floor() as u32;
        (0..=whole_years)
            .map(|year| {
                let data = series[(year as usize * 12).min(last_index)];
                ChartPoint {
                    x: self.x_for_year(year as f64),
                    y: self.y_for_value(data.total_accumulated),
                    year,
                    data,
                }
            })
            .collect()
    }
}

/// `M x y L x y ...` path through the points.
pub fn svg_path(points: &[ChartPoint]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let command = if idx == 0 { 'M' } else { 'L' };
            format!("{command} {} {}", p.x, p.y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
