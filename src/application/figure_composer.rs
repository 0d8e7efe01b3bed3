// Figure composer - Lays out activity, emote and updater panels on one time axis
use crate::application::figure_updater::UpdaterRegistry;
use crate::domain::emotes::CategorySeries;
use crate::domain::figure::{
    FigureSpec, LayoutOptions, LegendSpec, Panel, Stacking, Theme, TimeAxis, Trace, Visibility,
};
use crate::domain::rolling::RollingSeries;
use crate::domain::series::{MICROS_PER_SECOND, Micros, NormalizedSeries};
use crate::domain::spikes::SpikeMarkers;
use crate::domain::time_axis::{SECONDS_PER_HOUR, build_captions};

pub const SPIKES_TRACE: &str = "spikes";

const ACTIVITY_HEIGHT: f64 = 0.6;
const EMOTES_HEIGHT: f64 = 0.4;
const VERTICAL_SPACING: f64 = 0.02;
const INITIAL_RANGE_SECONDS: i64 = 3 * SECONDS_PER_HOUR;

/// Series feeding one figure.
///
/// Offsets are measured from `anchor`; without one, the first activity (or
/// emote) series supplies it.
#[derive(Debug, Clone, Copy)]
pub struct FigureInputs<'a> {
    pub anchor: Option<Micros>,
    pub activity: &'a [RollingSeries],
    pub spikes: Option<&'a SpikeMarkers>,
    pub activity_step: u32,
    pub emotes: &'a [CategorySeries],
    pub emote_step: u32,
    pub axis_title: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct FigureComposer {
    theme: Theme,
}

impl FigureComposer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Builds the figure. Output depends only on the inputs.
    pub fn compose(&self, inputs: &FigureInputs<'_>, registry: &UpdaterRegistry) -> FigureSpec {
        let mut panels = vec![Panel::new(1, "Messages", ACTIVITY_HEIGHT, Stacking::Overlay)];

        let emotes_row = if inputs.emotes.is_empty() {
            None
        } else {
            panels.push(Panel::new(2, "Emoticons", EMOTES_HEIGHT, Stacking::Stack));
            Some(2)
        };

        let updater_rows: Vec<Vec<usize>> = registry
            .updaters()
            .iter()
            .map(|updater| {
                updater
                    .panel_heights()
                    .into_iter()
                    .map(|height| {
                        let row = panels.len() + 1;
                        panels.push(Panel::new(row, updater.name(), height, Stacking::Overlay));
                        row
                    })
                    .collect()
            })
            .collect();

        assign_domains(&mut panels);

        let legends = panels
            .iter()
            .map(|panel| LegendSpec {
                name: panel.legend.clone(),
                row: panel.row,
                y: panel.domain.1,
            })
            .collect();

        let reference = inputs
            .activity
            .first()
            .map(|rolling| &rolling.series)
            .or_else(|| inputs.emotes.first().map(|category| &category.series));
        let anchor = inputs
            .anchor
            .or_else(|| reference.map(NormalizedSeries::start))
            .unwrap_or_default();
        let min_step = inputs.activity_step.min(inputs.emote_step).max(1);

        // The axis covers the longest series, whichever panel it sits in.
        let span = inputs
            .activity
            .iter()
            .map(|rolling| &rolling.series)
            .chain(inputs.spikes.map(|spikes| &spikes.series))
            .chain(inputs.emotes.iter().map(|category| &category.series))
            .map(|series| (series.end() - anchor).max(0))
            .max()
            .unwrap_or(0);
        let step_micros = min_step as i64 * MICROS_PER_SECOND;
        let points = ((span + step_micros - 1) / step_micros) as usize;

        let mut figure = FigureSpec {
            panels,
            x_axis: build_time_axis(inputs.axis_title, anchor, points, min_step),
            legends,
            layout: LayoutOptions {
                hover_mode: "x unified".to_string(),
                bar_mode: Stacking::Stack,
                vertical_spacing: VERTICAL_SPACING,
                theme: self.theme,
            },
        };

        let activity = &mut figure.panels[0];
        for rolling in inputs.activity {
            activity.traces.push(Trace::line(
                rolling.label(),
                offsets(&rolling.series, anchor),
                rolling.series.counts().to_vec(),
            ));
        }
        if let Some(spikes) = inputs.spikes {
            activity.traces.push(Trace::line(
                SPIKES_TRACE,
                offsets(&spikes.series, anchor),
                spikes.series.counts().to_vec(),
            ));
        }

        if let Some(row) = emotes_row {
            let collapse_any = inputs.emotes.len() > 1;
            let traces = inputs.emotes.iter().map(|category| {
                let mut trace = Trace::bar(
                    category.name.clone(),
                    offsets(&category.series, anchor),
                    category.series.counts().to_vec(),
                    inputs.emote_step,
                );
                if collapse_any && category.is_any() {
                    trace.visibility = Visibility::LegendOnly;
                }
                trace
            });
            figure.panels[row - 1].traces.extend(traces);
        }

        for (updater, rows) in registry.updaters().iter().zip(&updater_rows) {
            updater.add_traces(&mut figure, rows);
        }

        // One legend per panel so unrelated trace sets stay apart.
        for panel in &mut figure.panels {
            for trace in &mut panel.traces {
                trace.legend = panel.legend.clone();
            }
        }

        for updater in registry.updaters() {
            updater.post_traces(&mut figure);
        }

        figure
    }
}

/// Normalizes panel heights and stacks the panels top to bottom.
fn assign_domains(panels: &mut [Panel]) {
    let total: f64 = panels.iter().map(|p| p.height).sum();
    if total <= 0.0 {
        return;
    }

    let gaps = panels.len().saturating_sub(1) as f64;
    let available = 1.0 - VERTICAL_SPACING * gaps;

    let mut top = 1.0;
    for panel in panels.iter_mut() {
        panel.height /= total;
        let bottom = (top - panel.height * available).max(0.0);
        panel.domain = (bottom, top);
        top = bottom - VERTICAL_SPACING;
    }
}

fn build_time_axis(title: &str, anchor: Micros, points: usize, step_seconds: u32) -> TimeAxis {
    let step = step_seconds as i64;
    let span = points as i64 * step;

    TimeAxis {
        title: title.to_string(),
        anchor,
        step_seconds,
        points,
        tick0: 0,
        tick_seconds: SECONDS_PER_HOUR as u32,
        min_allowed: -step,
        max_allowed: span,
        initial_range: (0, INITIAL_RANGE_SECONDS.min(span)),
        captions: build_captions(anchor, points, step_seconds),
    }
}

/// Bucket start offsets in seconds from the figure anchor.
fn offsets(series: &NormalizedSeries, anchor: Micros) -> Vec<i64> {
    let base = (series.start() - anchor).div_euclid(MICROS_PER_SECOND);
    let step = series.step_seconds() as i64;

    (0..series.len() as i64).map(|index| base + index * step).collect()
}
