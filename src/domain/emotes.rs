// Emote categories: mining, frequency ranking and per-category series
use super::series::{Micros, NormalizedSeries};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Pseudo-category holding the union of every category's timestamps.
pub const ANY_EMOTE: &str = "ANY";

/// Category name to raw event timestamps.
pub type EmoteTimestamps = BTreeMap<String, Vec<Micros>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub name: String,
    pub occurrences: usize,
    pub series: NormalizedSeries,
}

impl CategorySeries {
    pub fn is_any(&self) -> bool {
        self.name == ANY_EMOTE
    }
}

/// Selects and normalizes the most frequent emote categories.
#[derive(Debug, Clone)]
pub struct EmoteRanker {
    pub step_seconds: u32,
    pub min_occurrences: usize,
    pub top_size: Option<usize>,
    pub name_filter: Vec<String>,
}

impl EmoteRanker {
    /// Ranked categories, ANY first when it qualifies.
    ///
    /// Categories below `min_occurrences` are dropped before the name filter
    /// is applied; the rest are ordered by occurrences (descending) and then
    /// by name. `top_size` limits the named categories only. A category whose
    /// events all precede `forced_start` yields no series.
    pub fn rank(&self, emotes: &EmoteTimestamps, forced_start: Option<Micros>) -> Vec<CategorySeries> {
        if emotes.is_empty() {
            return Vec::new();
        }

        let any: Vec<Micros> = emotes.values().flatten().copied().collect();

        let mut candidates: Vec<(&str, &[Micros])> = emotes
            .iter()
            .filter(|(name, _)| name.as_str() != ANY_EMOTE)
            .map(|(name, timestamps)| (name.as_str(), timestamps.as_slice()))
            .chain(std::iter::once((ANY_EMOTE, any.as_slice())))
            .filter(|(_, timestamps)| timestamps.len() >= self.min_occurrences)
            .filter(|(name, _)| {
                self.name_filter.is_empty() || self.name_filter.iter().any(|f| f == name)
            })
            .collect();

        candidates.sort_by_key(|&(name, timestamps)| (Reverse(timestamps.len()), name));

        let (any, mut named): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|(name, _)| *name == ANY_EMOTE);

        if let Some(top_size) = self.top_size {
            named.truncate(top_size);
        }

        any.into_iter()
            .chain(named)
            .filter_map(|(name, timestamps)| {
                let series =
                    NormalizedSeries::from_timestamps(timestamps, self.step_seconds, forced_start);
                (series.total() > 0).then(|| CategorySeries {
                    name: name.to_string(),
                    occurrences: timestamps.len(),
                    series,
                })
            })
            .collect()
    }
}

/// Occurrence table for every qualifying category, ANY first.
///
/// The ANY entry is the sum of the listed counts, so it shrinks along with
/// `top_size`.
pub fn top_counts(
    emotes: &EmoteTimestamps,
    min_occurrences: usize,
    top_size: Option<usize>,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = emotes
        .iter()
        .map(|(name, timestamps)| (name.clone(), timestamps.len()))
        .filter(|(_, count)| *count >= min_occurrences)
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if let Some(top_size) = top_size {
        counts.truncate(top_size);
    }

    let total = counts.iter().map(|(_, count)| count).sum();
    let mut result = Vec::with_capacity(counts.len() + 1);
    result.push((ANY_EMOTE.to_string(), total));
    result.extend(counts);
    result
}

/// Words of `message` that are known emote names.
pub fn mine_emotes(message: &str, known: &HashSet<String>) -> BTreeSet<String> {
    message
        .split(' ')
        .filter(|word| known.contains(*word))
        .map(str::to_string)
        .collect()
}

/// Builds the category map from `(timestamp, text)` pairs.
///
/// An emote repeated within one message counts once for that message.
pub fn collect_emote_timestamps<'a, I>(messages: I, known: &HashSet<String>) -> EmoteTimestamps
where
    I: IntoIterator<Item = (Micros, &'a str)>,
{
    let mut result = EmoteTimestamps::new();
    for (timestamp, text) in messages {
        for emote in mine_emotes(text, known) {
            result.entry(emote).or_default().push(timestamp);
        }
    }
    result
}
