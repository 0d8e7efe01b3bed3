// Trailing rolling sums over a normalized series, one per window width
use super::series::NormalizedSeries;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub window_seconds: u64,
    pub series: NormalizedSeries,
}

impl RollingSeries {
    /// Legend label, e.g. "60s".
    pub fn label(&self) -> String {
        format!("{}s", self.window_seconds)
    }
}

/// Builds one trailing-sum series per window multiplier.
///
/// A multiplier `m` sums the current bucket and the `m - 1` before it; the
/// head of the series sums whatever shorter window is available. A zero
/// multiplier is treated as one, which is the identity transform.
pub fn rolling_sums(series: &NormalizedSeries, multipliers: &[u32]) -> Vec<RollingSeries> {
    multipliers
        .iter()
        .map(|&multiplier| {
            let width = multiplier.max(1);
            RollingSeries {
                window_seconds: width as u64 * series.step_seconds() as u64,
                series: series.with_counts(trailing_sum(series.counts(), width as usize)),
            }
        })
        .collect()
}

fn trailing_sum(counts: &[u64], width: usize) -> Vec<u64> {
    let mut result = Vec::with_capacity(counts.len());
    let mut running = 0u64;

    for (index, &count) in counts.iter().enumerate() {
        running += count;
        if index >= width {
            running -= counts[index - width];
        }
        result.push(running);
    }

    result
}
