// Chart service - Use case for building activity figures per source or combined
use crate::application::chat_repository::{ChatRepository, ChatSource};
use crate::application::figure_composer::{FigureComposer, FigureInputs};
use crate::application::figure_updater::{ChapterMarkers, UpdaterRegistry};
use crate::domain::combine::combine_series;
use crate::domain::emotes::{EmoteRanker, EmoteTimestamps, top_counts};
use crate::domain::figure::FigureSpec;
use crate::domain::rolling::rolling_sums;
use crate::domain::series::{Micros, NormalizedSeries};
use crate::domain::spikes::SpikeDetector;
use crate::error::AnalyzerError;
use crate::infrastructure::config::ChartConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct ChartOutput {
    pub figure: FigureSpec,
    /// Every qualifying emote with its count, ANY first.
    pub emote_top: Vec<(String, usize)>,
    /// Emotes that made it into the figure, in panel order.
    pub selected_emotes: Vec<String>,
}

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn ChatRepository>,
    chart_config: ChartConfig,
}

impl ChartService {
    pub fn new(repository: Arc<dyn ChatRepository>, chart_config: ChartConfig) -> Self {
        Self {
            repository,
            chart_config,
        }
    }

    pub async fn single_figure(&self, source_id: &str) -> anyhow::Result<ChartOutput> {
        let started = Instant::now();
        let source = self.repository.load_source(source_id).await?;

        let registry = UpdaterRegistry::new().with(ChapterMarkers::new(source.chapters.clone()));
        let (messages, anchor) = normalize_source(&source, &registry, self.chart_config.step_seconds);

        let output = self.render(
            &messages,
            &source.emotes,
            anchor,
            &registry,
            &self.chart_config.video_axis_title,
        );

        tracing::info!(
            "Built figure for {}: {} messages, {} emotes in {:?}",
            source_id,
            source.messages.len(),
            output.selected_emotes.len(),
            started.elapsed()
        );
        Ok(output)
    }

    /// One figure over several sources aligned to their earliest anchor.
    ///
    /// Each source is loaded and normalized on its own task; the message
    /// series are summed once all of them are done.
    pub async fn combined_figure(&self, source_ids: &[String]) -> anyhow::Result<ChartOutput> {
        if source_ids.is_empty() {
            return Err(AnalyzerError::NoSources.into());
        }

        let started = Instant::now();
        let step_seconds = self.chart_config.step_seconds;

        let handles: Vec<_> = source_ids
            .iter()
            .map(|source_id| {
                let repo = self.repository.clone();
                let source_id = source_id.clone();

                tokio::spawn(async move {
                    let source = repo.load_source(&source_id).await?;
                    let registry =
                        UpdaterRegistry::new().with(ChapterMarkers::new(source.chapters.clone()));
                    let (messages, anchor) = normalize_source(&source, &registry, step_seconds);

                    tracing::debug!(
                        "Normalized {}: {} buckets from {} messages",
                        source_id,
                        messages.len(),
                        source.messages.len()
                    );
                    anyhow::Ok((source.emotes, messages, anchor))
                })
            })
            .collect();

        let mut series = Vec::with_capacity(handles.len());
        let mut anchors = Vec::with_capacity(handles.len());
        let mut emotes = EmoteTimestamps::new();

        for handle in handles {
            let (source_emotes, messages, anchor) = handle.await??;
            series.push(messages);
            anchors.extend(anchor);
            for (name, timestamps) in source_emotes {
                emotes.entry(name).or_default().extend(timestamps);
            }
        }

        let messages = combine_series(&series)?.resample(step_seconds);
        let anchor = anchors.into_iter().min();

        let output = self.render(
            &messages,
            &emotes,
            anchor,
            &UpdaterRegistry::new(),
            &self.chart_config.combined_axis_title,
        );

        tracing::info!(
            "Built combined figure for {} sources in {:?}",
            source_ids.len(),
            started.elapsed()
        );
        Ok(output)
    }

    fn render(
        &self,
        messages: &NormalizedSeries,
        emotes: &EmoteTimestamps,
        anchor: Option<Micros>,
        registry: &UpdaterRegistry,
        axis_title: &str,
    ) -> ChartOutput {
        let config = &self.chart_config;

        let activity = rolling_sums(messages, &config.rolling_multipliers);
        let spikes = SpikeDetector {
            min_messages: config.spike_min_count,
            min_spike_power: config.spike_min_power,
            baseline_buckets: config.spike_baseline_buckets,
        }
        .detect(messages);

        let emote_top = top_counts(emotes, config.min_occurrences, None);
        let ranked = EmoteRanker {
            step_seconds: config.emote_step_seconds(),
            min_occurrences: config.min_occurrences,
            top_size: config.top_size,
            name_filter: config.name_filter.clone(),
        }
        .rank(emotes, anchor);

        let inputs = FigureInputs {
            anchor,
            activity: &activity,
            spikes: Some(&spikes),
            activity_step: config.step_seconds,
            emotes: &ranked,
            emote_step: config.emote_step_seconds(),
            axis_title,
        };
        let figure = FigureComposer::new(config.theme).compose(&inputs, registry);

        ChartOutput {
            figure,
            emote_top,
            selected_emotes: ranked.into_iter().map(|category| category.name).collect(),
        }
    }
}

/// Normalizes a source's messages against the earliest instant any part of
/// its figure needs: a message, an emote or an updater's start.
fn normalize_source(
    source: &ChatSource,
    registry: &UpdaterRegistry,
    step_seconds: u32,
) -> (NormalizedSeries, Option<Micros>) {
    let first_emote = source.emotes.values().flatten().copied().min();
    let anchor = registry
        .earliest_start(&source.messages)
        .into_iter()
        .chain(first_emote)
        .min();
    let messages = NormalizedSeries::from_timestamps(&source.messages, step_seconds, anchor);
    (messages, anchor)
}
