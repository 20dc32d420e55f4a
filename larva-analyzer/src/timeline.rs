//! Delta-encoded occupancy timelines
//!
//! Token lifecycles are sparse start/end pairs. To know how many tokens were alive
//! at each second, every start adds +1 and every end adds -1 to a per-second delta
//! array; a running sum over that array yields the occupancy.
//!
//! Window bounds and token times are rounded to whole seconds. Offsets outside the
//! window are clamped to its first or last second. A token with no end time stays
//! alive until the window closes.

use crate::types::TokenLifecycle;
use serde::Serialize;

/// Longest window an occupancy is built for: one week of game time
pub const MAX_WINDOW_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Counts of clamped inputs, kept for verification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimelineDiagnostics {
    /// Offsets that fell outside the window
    pub clamped_offsets: usize,
    /// Intervals whose end preceded their start
    pub inverted_intervals: usize,
}

/// Per-second count of concurrently alive tokens
#[derive(Debug, Clone, PartialEq)]
pub struct Occupancy {
    /// Rounded second at which the window opens
    pub window_start: i64,
    counts: Vec<i64>,
    pub diagnostics: TimelineDiagnostics,
}

/// One sample of the whole-player timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineSample {
    /// Seconds since game start
    pub second: u32,
    /// Tokens alive at that second
    pub count: i64,
}

impl Occupancy {
    /// Build the occupancy of `tokens` over `[window_start, window_end)`
    ///
    /// Returns `None` when the rounded window is empty or longer than
    /// [`MAX_WINDOW_SECONDS`].
    pub fn build<'a, I>(tokens: I, window_start: f64, window_end: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TokenLifecycle>,
    {
        let start = round_seconds(window_start);
        let length = round_seconds(window_end) - start;
        if length <= 0 {
            return None;
        }
        if length > MAX_WINDOW_SECONDS {
            log::warn!(
                "Skipping {}s occupancy window starting at {}s (limit {}s)",
                length,
                start,
                MAX_WINDOW_SECONDS
            );
            return None;
        }

        let mut diagnostics = TimelineDiagnostics::default();
        let mut delta = vec![0i64; length as usize];

        for token in tokens {
            let start_offset = clamp_offset(token.start_time, start, length, &mut diagnostics);
            delta[start_offset] += 1;

            if let Some(end_time) = token.end_time {
                let mut end_offset = clamp_offset(end_time, start, length, &mut diagnostics);
                if end_offset < start_offset {
                    diagnostics.inverted_intervals += 1;
                    end_offset = start_offset;
                }
                delta[end_offset] -= 1;
            }
        }

        let counts = delta
            .into_iter()
            .scan(0i64, |alive, change| {
                *alive += change;
                Some(*alive)
            })
            .collect();

        Some(Self {
            window_start: start,
            counts,
            diagnostics,
        })
    }

    /// Tokens alive at each second of the window
    pub fn counts(&self) -> &[i64] {
        &self.counts
    }

    /// Window length in seconds (always at least 1)
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Seconds during which at least `cap` tokens were alive
    pub fn seconds_at_or_above(&self, cap: u32) -> usize {
        self.counts.iter().filter(|&&count| count >= i64::from(cap)).count()
    }

    /// Sample every `bucket` seconds, starting at the window's first second
    pub fn sample(&self, bucket: u32) -> Vec<TimelineSample> {
        let step = bucket.max(1) as usize;
        self.counts
            .iter()
            .enumerate()
            .step_by(step)
            .map(|(offset, &count)| TimelineSample {
                second: (self.window_start + offset as i64).max(0) as u32,
                count,
            })
            .collect()
    }
}

/// Concurrent tokens over the whole game, sampled every `bucket_size_seconds`
///
/// The window runs from second 0 to `observation_end`.
pub fn whole_player_timeline<'a, I>(
    tokens: I,
    observation_end: f64,
    bucket_size_seconds: u32,
) -> Vec<TimelineSample>
where
    I: IntoIterator<Item = &'a TokenLifecycle>,
{
    match Occupancy::build(tokens, 0.0, observation_end) {
        Some(occupancy) => {
            log::debug!(
                "Whole-player timeline: {}s window, {:?}",
                occupancy.len(),
                occupancy.diagnostics
            );
            occupancy.sample(bucket_size_seconds)
        }
        None => Vec::new(),
    }
}

/// Round to the nearest whole second (halves away from zero)
pub(crate) fn round_seconds(seconds: f64) -> i64 {
    seconds.round() as i64
}

fn clamp_offset(
    time: f64,
    window_start: i64,
    length: i64,
    diagnostics: &mut TimelineDiagnostics,
) -> usize {
    let offset = round_seconds(time) - window_start;
    if offset < 0 || offset >= length {
        diagnostics.clamped_offsets += 1;
    }
    offset.clamp(0, length - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn token(start: f64, end: Option<f64>) -> TokenLifecycle {
        TokenLifecycle {
            id: 0,
            spawn_location: Point::default(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_delta_sum_with_open_token() {
        let tokens = [
            token(0.0, Some(5.0)),
            token(2.0, None),
            token(3.0, Some(4.0)),
        ];
        let occupancy = Occupancy::build(&tokens, 0.0, 10.0).unwrap();

        assert_eq!(occupancy.counts(), &[1, 1, 2, 3, 2, 1, 1, 1, 1, 1]);
        assert_eq!(occupancy.seconds_at_or_above(3), 1);
        assert_eq!(occupancy.diagnostics, TimelineDiagnostics::default());
    }

    #[test]
    fn test_early_start_clamps_to_zero() {
        let tokens = [token(40.0, Some(105.0))];
        let occupancy = Occupancy::build(&tokens, 100.0, 110.0).unwrap();

        assert_eq!(occupancy.counts()[0], 1);
        assert_eq!(occupancy.counts()[5], 0);
        assert_eq!(occupancy.diagnostics.clamped_offsets, 1);
    }

    #[test]
    fn test_late_end_clamps_to_last_second() {
        let tokens = [token(1.0, Some(50.0))];
        let occupancy = Occupancy::build(&tokens, 0.0, 4.0).unwrap();

        assert_eq!(occupancy.counts(), &[0, 1, 1, 0]);
        assert_eq!(occupancy.diagnostics.clamped_offsets, 1);
    }

    #[test]
    fn test_inverted_interval_is_clamped() {
        let tokens = [token(6.0, Some(2.0))];
        let occupancy = Occupancy::build(&tokens, 0.0, 8.0).unwrap();

        assert!(occupancy.counts().iter().all(|&count| count == 0));
        assert_eq!(occupancy.diagnostics.inverted_intervals, 1);
    }

    #[test]
    fn test_empty_window() {
        let tokens = [token(0.0, None)];
        assert!(Occupancy::build(&tokens, 30.0, 30.2).is_none());
        assert!(Occupancy::build(&tokens, 30.0, 12.0).is_none());
    }

    #[test]
    fn test_oversized_window_is_refused() {
        let tokens = [token(0.0, None)];
        let limit = MAX_WINDOW_SECONDS as f64;

        assert!(Occupancy::build(&tokens, 0.0, f64::MAX).is_none());
        assert!(Occupancy::build(&tokens, 0.0, limit + 1.0).is_none());
        let longest = Occupancy::build(&tokens, 10.0, limit + 10.0).unwrap();
        assert_eq!(longest.len(), MAX_WINDOW_SECONDS as usize);
    }

    #[test]
    fn test_whole_player_sampling() {
        let tokens = [token(0.0, Some(6.0)), token(4.6, None)];
        let samples = whole_player_timeline(&tokens, 12.0, 5);

        assert_eq!(
            samples,
            vec![
                TimelineSample { second: 0, count: 1 },
                TimelineSample { second: 5, count: 2 },
                TimelineSample { second: 10, count: 1 },
            ]
        );
    }

    #[test]
    fn test_whole_player_timeline_without_window() {
        let tokens: [TokenLifecycle; 0] = [];
        assert!(whole_player_timeline(&tokens, 0.0, 5).is_empty());
        assert!(whole_player_timeline(&[token(0.0, None)], 0.4, 5).is_empty());
    }
}
