// Figure description domain models handed to a charting renderer
use super::series::Micros;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureSpec {
    pub panels: Vec<Panel>,
    pub x_axis: TimeAxis,
    pub legends: Vec<LegendSpec>,
    pub layout: LayoutOptions,
}

impl FigureSpec {
    pub fn panel(&self, row: usize) -> Option<&Panel> {
        self.panels.iter().find(|p| p.row == row)
    }

    pub fn panel_mut(&mut self, row: usize) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.row == row)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    /// 1-based row, top to bottom.
    pub row: usize,
    pub title: String,
    /// Share of the figure height, all panels sum to 1.
    pub height: f64,
    /// Vertical extent `(bottom, top)` in figure coordinates.
    pub domain: (f64, f64),
    pub y_axis: String,
    /// Lower bound of the y axis.
    pub y_min: u64,
    /// Y axis is not zoomable, only the shared time axis is.
    pub y_fixed: bool,
    pub legend: String,
    pub stacking: Stacking,
    pub traces: Vec<Trace>,
}

impl Panel {
    pub fn new(row: usize, title: impl Into<String>, height: f64, stacking: Stacking) -> Self {
        Self {
            row,
            title: title.into(),
            height,
            domain: (0.0, 1.0),
            y_axis: format!("y{}", row),
            y_min: 0,
            y_fixed: true,
            legend: format!("legend{}", row),
            stacking,
            traces: Vec::new(),
        }
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    /// Offsets in seconds from the figure anchor.
    pub x: Vec<i64>,
    pub y: Vec<u64>,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_width: Option<u32>,
    /// Bars start at their x value instead of being centered on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_offset: Option<i64>,
    /// Legend this trace is listed in, assigned from its panel.
    pub legend: String,
}

impl Trace {
    pub fn line(name: impl Into<String>, x: Vec<i64>, y: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            kind: TraceKind::Line,
            x,
            y,
            visibility: Visibility::Visible,
            bar_width: None,
            bar_offset: None,
            legend: String::new(),
        }
    }

    pub fn bar(name: impl Into<String>, x: Vec<i64>, y: Vec<u64>, width: u32) -> Self {
        Self {
            name: name.into(),
            kind: TraceKind::Bar,
            x,
            y,
            visibility: Visibility::Visible,
            bar_width: Some(width),
            bar_offset: Some(0),
            legend: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    /// Listed in the legend but not drawn until toggled.
    LegendOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stacking {
    Overlay,
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAxis {
    pub title: String,
    pub anchor: Micros,
    pub step_seconds: u32,
    pub points: usize,
    /// First tick offset; ticks then repeat every `tick_seconds`.
    pub tick0: i64,
    pub tick_seconds: u32,
    pub min_allowed: i64,
    pub max_allowed: i64,
    pub initial_range: (i64, i64),
    /// Tick caption per offset in seconds.
    pub captions: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub name: String,
    pub row: usize,
    /// Legends are top-anchored at their panel's upper edge.
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOptions {
    pub hover_mode: String,
    pub bar_mode: Stacking,
    pub vertical_spacing: f64,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}
