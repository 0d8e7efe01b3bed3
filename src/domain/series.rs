// Dense fixed-step count series built from raw event timestamps
use serde::Serialize;

/// Epoch timestamp in microseconds.
pub type Micros = i64;

pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Converts a raw JSON timestamp (integer or fractional microseconds).
pub fn micros_from_f64(value: f64) -> Micros {
    value.floor() as Micros
}

/// A gap-free run of bucket counts.
///
/// Bucket `i` covers `[start + i * step, start + (i + 1) * step)`. Every
/// index in `0..len()` is present, empty buckets hold zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSeries {
    start: Micros,
    step_seconds: u32,
    counts: Vec<u64>,
}

impl NormalizedSeries {
    pub fn new(start: Micros, step_seconds: u32, counts: Vec<u64>) -> Self {
        Self {
            start,
            step_seconds: step_seconds.max(1),
            counts,
        }
    }

    pub fn empty(start: Micros, step_seconds: u32) -> Self {
        Self::new(start, step_seconds, Vec::new())
    }

    /// Buckets raw timestamps into a dense series.
    ///
    /// The anchor is `forced_start` when given, otherwise the earliest
    /// timestamp. Timestamps before the anchor are dropped. Empty input gives
    /// an empty series anchored at `forced_start` (or zero).
    pub fn from_timestamps(
        timestamps: &[Micros],
        step_seconds: u32,
        forced_start: Option<Micros>,
    ) -> Self {
        let step_seconds = step_seconds.max(1);
        let step = step_seconds as i64 * MICROS_PER_SECOND;

        let start = match forced_start.or_else(|| timestamps.iter().copied().min()) {
            Some(start) => start,
            None => return Self::empty(0, step_seconds),
        };

        let mut counts: Vec<u64> = Vec::new();
        for &timestamp in timestamps {
            let offset = timestamp - start;
            if offset < 0 {
                continue;
            }

            let bucket = (offset / step) as usize;
            if bucket >= counts.len() {
                counts.resize(bucket + 1, 0);
            }
            counts[bucket] += 1;
        }

        Self {
            start,
            step_seconds,
            counts,
        }
    }

    pub fn start(&self) -> Micros {
        self.start
    }

    pub fn step_seconds(&self) -> u32 {
        self.step_seconds
    }

    pub fn step_micros(&self) -> i64 {
        self.step_seconds as i64 * MICROS_PER_SECOND
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn bucket_start(&self, index: usize) -> Micros {
        self.start + index as i64 * self.step_micros()
    }

    /// Instant just past the last bucket.
    pub fn end(&self) -> Micros {
        self.bucket_start(self.len())
    }

    /// Regroups the buckets into a new step, keeping the same anchor.
    ///
    /// Each old bucket lands in the new bucket containing its start instant,
    /// so resampling at the current step is the identity.
    pub fn resample(&self, step_seconds: u32) -> Self {
        let step_seconds = step_seconds.max(1);
        if step_seconds == self.step_seconds {
            return self.clone();
        }
        if self.counts.is_empty() {
            return Self::empty(self.start, step_seconds);
        }

        let old = self.step_seconds as u64;
        let new = step_seconds as u64;
        let length = ((self.counts.len() as u64 - 1) * old / new + 1) as usize;

        let mut counts = vec![0u64; length];
        for (index, count) in self.counts.iter().enumerate() {
            counts[(index as u64 * old / new) as usize] += count;
        }

        Self {
            start: self.start,
            step_seconds,
            counts,
        }
    }

    /// Expands the series back into one bucket-start timestamp per event.
    pub fn events(&self) -> Vec<Micros> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(index, &count)| {
                std::iter::repeat_n(self.bucket_start(index), count as usize)
            })
            .collect()
    }

    /// Copy of this series with the counts replaced, anchor and step kept.
    pub fn with_counts(&self, counts: Vec<u64>) -> Self {
        Self {
            start: self.start,
            step_seconds: self.step_seconds,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: i64 = MICROS_PER_SECOND;

    #[test]
    fn test_buckets_per_second() {
        let series = NormalizedSeries::from_timestamps(&[0, S, S, 61 * S], 1, None);

        assert_eq!(series.len(), 62);
        assert_eq!(series.counts()[0], 1);
        assert_eq!(series.counts()[1], 2);
        assert_eq!(series.counts()[61], 1);
        assert_eq!(series.counts()[2..61].iter().sum::<u64>(), 0);
    }

    #[test]
    fn test_unsorted_input_with_offset_anchor() {
        let base = 1_700_000_000 * S;
        let series =
            NormalizedSeries::from_timestamps(&[base + 31 * S, base, base + 14 * S], 15, None);

        assert_eq!(series.start(), base);
        assert_eq!(series.counts(), &[2, 0, 1]);
    }

    #[test]
    fn test_empty_input() {
        let series = NormalizedSeries::from_timestamps(&[], 15, None);
        assert!(series.is_empty());
        assert_eq!(series.total(), 0);

        let forced = NormalizedSeries::from_timestamps(&[], 15, Some(42));
        assert!(forced.is_empty());
        assert_eq!(forced.start(), 42);
    }

    #[test]
    fn test_events_before_forced_start_are_dropped() {
        let series = NormalizedSeries::from_timestamps(&[0, 5 * S, 10 * S, 12 * S], 5, Some(5 * S));

        assert_eq!(series.start(), 5 * S);
        assert_eq!(series.counts(), &[1, 2]);

        let all_before = NormalizedSeries::from_timestamps(&[0, S], 5, Some(10 * S));
        assert!(all_before.is_empty());
    }

    #[test]
    fn test_fractional_timestamps() {
        assert_eq!(micros_from_f64(1_500_000.75), 1_500_000);
        assert_eq!(micros_from_f64(-0.5), -1);
    }

    #[test]
    fn test_renormalizing_a_dense_series_is_identity() {
        let series = NormalizedSeries::from_timestamps(&[0, S, 7 * S, 7 * S, 44 * S], 3, None);

        let again = NormalizedSeries::from_timestamps(&series.events(), 3, Some(series.start()));
        assert_eq!(again, series);
        assert_eq!(series.resample(3), series);
    }

    #[test]
    fn test_resample_to_coarser_step() {
        let series = NormalizedSeries::new(0, 15, vec![1, 2, 3, 4, 5]);
        let coarse = series.resample(60);

        assert_eq!(coarse.step_seconds(), 60);
        assert_eq!(coarse.counts(), &[10, 5]);
        assert_eq!(coarse.total(), series.total());
    }

    #[test]
    fn test_bucket_boundaries() {
        let series = NormalizedSeries::new(10 * S, 15, vec![0, 0, 1]);
        assert_eq!(series.bucket_start(2), 40 * S);
        assert_eq!(series.end(), 55 * S);
    }
}
