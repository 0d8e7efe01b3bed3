// Ratio-over-baseline spike flags for a base-resolution series
use super::series::NormalizedSeries;

#[derive(Debug, Clone)]
pub struct SpikeDetector {
    /// Absolute floor a bucket must reach.
    pub min_messages: u64,
    /// Required relative rise over the baseline (0.4 = 40% above).
    pub min_spike_power: f64,
    /// Buckets preceding the current one that form the baseline.
    pub baseline_buckets: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeMarkers {
    pub flags: Vec<bool>,
    /// Bucket count where flagged, zero elsewhere.
    pub series: NormalizedSeries,
}

impl SpikeMarkers {
    pub fn flagged(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(index, &flag)| flag.then_some(index))
    }
}

impl SpikeDetector {
    /// Flags buckets standing out from the mean of the preceding buckets.
    ///
    /// The first bucket has no baseline and is never flagged, so a series of
    /// length one or zero yields no spikes.
    pub fn detect(&self, series: &NormalizedSeries) -> SpikeMarkers {
        let counts = series.counts();
        let window = self.baseline_buckets.max(1);

        let flags: Vec<bool> = counts
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                let previous = &counts[index.saturating_sub(window)..index];
                if previous.is_empty() || count < self.min_messages {
                    return false;
                }

                let baseline = previous.iter().sum::<u64>() as f64 / previous.len() as f64;
                (count as f64 - baseline) / baseline.max(1.0) >= self.min_spike_power
            })
            .collect();

        let marker_counts = counts
            .iter()
            .zip(&flags)
            .map(|(&count, &flag)| if flag { count } else { 0 })
            .collect();

        SpikeMarkers {
            series: series.with_counts(marker_counts),
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SpikeDetector {
        SpikeDetector {
            min_messages: 5,
            min_spike_power: 0.4,
            baseline_buckets: 4,
        }
    }

    #[test]
    fn test_flags_a_burst() {
        let series = NormalizedSeries::new(0, 15, vec![10, 10, 10, 10, 20, 10]);
        let markers = detector().detect(&series);

        assert_eq!(markers.flagged().collect::<Vec<_>>(), vec![4]);
        assert_eq!(markers.series.counts(), &[0, 0, 0, 0, 20, 0]);
        assert_eq!(markers.series.start(), series.start());
    }

    #[test]
    fn test_absolute_floor() {
        // 4 over a baseline of 1 is a 300% rise but below the floor of 5.
        let series = NormalizedSeries::new(0, 15, vec![1, 1, 1, 1, 4]);
        assert_eq!(detector().detect(&series).flagged().count(), 0);
    }

    #[test]
    fn test_flat_series_has_no_spikes() {
        let series = NormalizedSeries::new(0, 15, vec![50; 30]);
        assert!(detector().detect(&series).flags.iter().all(|f| !f));
    }

    #[test]
    fn test_short_series_degrades_to_no_spikes() {
        let empty = NormalizedSeries::empty(0, 15);
        assert!(detector().detect(&empty).flags.is_empty());

        let single = NormalizedSeries::new(0, 15, vec![100]);
        assert_eq!(detector().detect(&single).flags, vec![false]);
    }

    #[test]
    fn test_quiet_baseline_uses_unit_denominator() {
        // Baseline 0 after silence: rise is measured against 1.
        let series = NormalizedSeries::new(0, 15, vec![0, 0, 0, 5]);
        assert_eq!(detector().detect(&series).flagged().collect::<Vec<_>>(), vec![3]);
    }
}
