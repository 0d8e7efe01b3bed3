// Human-readable captions for the shared time axis
use super::series::{MICROS_PER_SECOND, Micros};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub const SECONDS_PER_HOUR: i64 = 3600;

/// Formats an offset as `HH:MM:SS`, with a leading `-` when negative.
pub fn humanize_offset(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let abs = total_seconds.unsigned_abs();
    let (hours, remainder) = (abs / 3600, abs % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);

    format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
}

/// One caption per step offset; whole hours also carry the UTC date and time.
pub fn build_captions(anchor: Micros, points: usize, step_seconds: u32) -> BTreeMap<i64, String> {
    let step = step_seconds.max(1) as i64;

    (0..points as i64)
        .map(|index| {
            let offset = index * step;
            let short = humanize_offset(offset);

            let caption = if offset % SECONDS_PER_HOUR == 0 {
                match DateTime::<Utc>::from_timestamp_micros(anchor + offset * MICROS_PER_SECOND) {
                    Some(instant) => format!(
                        "{}<br>{}<br>{}",
                        short,
                        instant.format("%Y-%m-%d"),
                        instant.format("%H:%M:%S")
                    ),
                    None => short,
                }
            } else {
                short
            };

            (offset, caption)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_offset() {
        assert_eq!(humanize_offset(0), "00:00:00");
        assert_eq!(humanize_offset(75), "00:01:15");
        assert_eq!(humanize_offset(3 * 3600 + 62), "03:01:02");
        assert_eq!(humanize_offset(-90), "-00:01:30");
        assert_eq!(humanize_offset(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_hour_boundaries_carry_wall_time() {
        // 2024-01-02 10:30:00 UTC
        let anchor = 1_704_191_400 * MICROS_PER_SECOND;
        let captions = build_captions(anchor, 241, 15);

        assert_eq!(captions.len(), 241);
        assert_eq!(captions[&0], "00:00:00<br>2024-01-02<br>10:30:00");
        assert_eq!(captions[&15], "00:00:15");
        assert_eq!(captions[&3600], "01:00:00<br>2024-01-02<br>11:30:00");
        assert!(!captions.contains_key(&3615));
    }

    #[test]
    fn test_no_points() {
        assert!(build_captions(0, 0, 15).is_empty());
    }
}
