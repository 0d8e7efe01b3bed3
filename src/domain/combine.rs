// Merges independently normalized sources onto one shared timeline
use super::series::NormalizedSeries;
use crate::error::AnalyzerError;

/// Point-wise sum of several series aligned to their earliest anchor.
///
/// Every source is shifted so that bucket 0 sits on the common anchor, then
/// summed over the longest shifted length. Empty sources only take part in
/// choosing the anchor when every source is empty. No event is lost or
/// counted twice.
pub fn combine_series(sources: &[NormalizedSeries]) -> Result<NormalizedSeries, AnalyzerError> {
    let first = sources.first().ok_or(AnalyzerError::NoSources)?;
    let step_seconds = first.step_seconds();

    if let Some(other) = sources.iter().find(|s| s.step_seconds() != step_seconds) {
        return Err(AnalyzerError::StepMismatch {
            expected: step_seconds,
            found: other.step_seconds(),
        });
    }

    let anchor = sources
        .iter()
        .filter(|s| !s.is_empty())
        .map(NormalizedSeries::start)
        .min()
        .unwrap_or_else(|| sources.iter().map(NormalizedSeries::start).min().unwrap_or(0));

    let step = first.step_micros();
    let shifted: Vec<(usize, &[u64])> = sources
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| (((s.start() - anchor) / step) as usize, s.counts()))
        .collect();

    let length = shifted
        .iter()
        .map(|(offset, counts)| offset + counts.len())
        .max()
        .unwrap_or(0);

    let mut counts = vec![0u64; length];
    for (offset, source) in shifted {
        for (index, count) in source.iter().enumerate() {
            counts[offset + index] += count;
        }
    }

    Ok(NormalizedSeries::new(anchor, step_seconds, counts))
}
