// Figure updaters - caller-registered contributors of extra panels
use crate::domain::figure::{FigureSpec, Stacking, Trace};
use crate::domain::series::{MICROS_PER_SECOND, Micros};
use serde::Deserialize;

/// Adds panels or traces to a figure being composed.
///
/// The composer calls every registered updater; each one checks its own
/// `is_appropriate` and does nothing when it does not apply.
pub trait FigureUpdater: Send + Sync {
    /// Title of the panels this updater contributes.
    fn name(&self) -> &str;

    fn is_appropriate(&self) -> bool;

    /// Earliest instant this updater needs on the time axis.
    fn start_instant(&self) -> Option<Micros> {
        None
    }

    /// Relative heights of the rows this updater wants, one per row.
    fn panel_heights(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Fills the rows reserved for this updater. The time axis is already
    /// set, so offsets can be taken from `figure.x_axis.anchor`.
    fn add_traces(&self, figure: &mut FigureSpec, rows: &[usize]);

    /// Runs after every panel has its traces and the layout is final.
    fn post_traces(&self, _figure: &mut FigureSpec) {}
}

/// Ordered list of updaters, built per request by the caller.
#[derive(Default)]
pub struct UpdaterRegistry {
    updaters: Vec<Box<dyn FigureUpdater>>,
}

impl UpdaterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, updater: Box<dyn FigureUpdater>) {
        self.updaters.push(updater);
    }

    pub fn with(mut self, updater: impl FigureUpdater + 'static) -> Self {
        self.register(Box::new(updater));
        self
    }

    pub fn updaters(&self) -> &[Box<dyn FigureUpdater>] {
        &self.updaters
    }

    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }

    /// Common anchor: the first message or any updater's start, whichever
    /// comes first.
    pub fn earliest_start(&self, messages: &[Micros]) -> Option<Micros> {
        messages
            .iter()
            .copied()
            .chain(
                self.updaters
                    .iter()
                    .filter(|u| u.is_appropriate())
                    .filter_map(|u| u.start_instant()),
            )
            .min()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub start: Micros,
    pub end: Micros,
}

/// Contributes a panel with one bar per chapter, spanning its duration.
#[derive(Debug, Clone)]
pub struct ChapterMarkers {
    chapters: Vec<Chapter>,
}

impl ChapterMarkers {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }
}

impl FigureUpdater for ChapterMarkers {
    fn name(&self) -> &str {
        "Chapters"
    }

    fn is_appropriate(&self) -> bool {
        !self.chapters.is_empty()
    }

    fn start_instant(&self) -> Option<Micros> {
        self.chapters.iter().map(|c| c.start).min()
    }

    fn panel_heights(&self) -> Vec<f64> {
        if self.is_appropriate() { vec![0.1] } else { Vec::new() }
    }

    fn add_traces(&self, figure: &mut FigureSpec, rows: &[usize]) {
        if !self.is_appropriate() {
            return;
        }
        let Some(&row) = rows.first() else {
            return;
        };

        let anchor = figure.x_axis.anchor;
        let Some(panel) = figure.panel_mut(row) else {
            return;
        };
        panel.stacking = Stacking::Overlay;

        for chapter in &self.chapters {
            let offset = (chapter.start - anchor).div_euclid(MICROS_PER_SECOND);
            let width = ((chapter.end - chapter.start) / MICROS_PER_SECOND).max(1) as u32;
            panel
                .traces
                .push(Trace::bar(chapter.title.clone(), vec![offset], vec![1], width));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: i64 = MICROS_PER_SECOND;

    fn chapters() -> Vec<Chapter> {
        vec![
            Chapter {
                title: "Just Chatting".to_string(),
                start: 10 * S,
                end: 70 * S,
            },
            Chapter {
                title: "Speedrun".to_string(),
                start: 70 * S,
                end: 400 * S,
            },
        ]
    }

    #[test]
    fn test_earliest_start_includes_updaters() {
        let registry = UpdaterRegistry::new().with(ChapterMarkers::new(chapters()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.earliest_start(&[30 * S, 20 * S]), Some(10 * S));
        assert_eq!(registry.earliest_start(&[5 * S]), Some(5 * S));
        assert_eq!(registry.earliest_start(&[]), Some(10 * S));
    }

    #[test]
    fn test_inappropriate_updater_is_ignored() {
        let registry = UpdaterRegistry::new().with(ChapterMarkers::new(Vec::new()));

        assert_eq!(registry.earliest_start(&[]), None);
        assert!(registry.updaters().iter().all(|u| u.panel_heights().is_empty()));
    }
}
