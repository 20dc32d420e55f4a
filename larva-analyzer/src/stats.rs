//! Aggregate statistics over token lifecycles
//!
//! Per-producer cap-time statistics and the average token lifetime. Empty inputs
//! are a normal outcome: they yield `None` or an empty list, never a NaN.

use crate::attribution::{AttributedProducer, Attribution};
use crate::config::GameRules;
use crate::timeline::{round_seconds, Occupancy, TimelineDiagnostics};
use crate::types::{TokenLifecycle, UnitId};
use serde::Serialize;

/// Cap-time statistics of one producer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducerStats {
    pub producer_id: UnitId,
    /// Seconds at which the producer finished construction
    pub active_from: f64,
    /// Seconds at which the producer died, if it did
    pub active_until: Option<f64>,
    /// Length of the observed window in whole seconds
    pub window_seconds: usize,
    /// Tokens attributed to this producer
    pub total_tokens: usize,
    /// Seconds spent holding the token cap
    pub capped_seconds: usize,
    /// `capped_seconds / window_seconds`
    pub fraction_time_capped: f64,
    /// Production estimated lost while capped (`capped_seconds / seconds_per_token`, floored)
    pub estimated_tokens_lost: usize,
    pub diagnostics: TimelineDiagnostics,
}

impl ProducerStats {
    /// Completion time rounded to whole seconds, as shown in reports
    pub fn completed_at_second(&self) -> i64 {
        round_seconds(self.active_from)
    }
}

/// Statistics for one producer over its observed window
///
/// The window runs from `active_from` to the producer's death, or to `window_end`
/// if it survived. Returns `None` for an empty window.
pub fn producer_stats(
    attributed: &AttributedProducer<'_>,
    window_end: f64,
    rules: &GameRules,
) -> Option<ProducerStats> {
    let producer = attributed.producer;
    let observation_end = producer.observation_end(window_end);
    let occupancy = Occupancy::build(
        attributed.tokens.iter().copied(),
        producer.active_from,
        observation_end,
    )?;

    let window_seconds = occupancy.len();
    let capped_seconds = occupancy.seconds_at_or_above(rules.token_cap);

    Some(ProducerStats {
        producer_id: producer.id,
        active_from: producer.active_from,
        active_until: producer.active_until,
        window_seconds,
        total_tokens: attributed.tokens.len(),
        capped_seconds,
        fraction_time_capped: capped_seconds as f64 / window_seconds as f64,
        estimated_tokens_lost: capped_seconds / rules.seconds_per_token.max(1) as usize,
        diagnostics: occupancy.diagnostics,
    })
}

/// Statistics for every producer with a non-empty window, ordered by completion time
pub fn per_producer_stats(
    attribution: &Attribution<'_>,
    observation_end: f64,
    rules: &GameRules,
) -> Vec<ProducerStats> {
    let mut stats: Vec<ProducerStats> = attribution
        .producers
        .values()
        .filter_map(|attributed| {
            let result = producer_stats(attributed, observation_end, rules);
            if result.is_none() {
                log::debug!(
                    "Producer {} has an empty window, skipping",
                    attributed.producer.id
                );
            }
            result
        })
        .collect();

    stats.sort_by(|a, b| {
        a.active_from
            .total_cmp(&b.active_from)
            .then(a.producer_id.cmp(&b.producer_id))
    });
    stats
}

/// Mean lifetime of converted tokens, in seconds rounded to one decimal
///
/// Each lifetime is rounded to whole seconds before averaging. Open tokens are
/// excluded. Returns `None` when no token was converted.
pub fn average_lifetime<'a, I>(tokens: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a TokenLifecycle>,
{
    let (sum, count) = tokens
        .into_iter()
        .filter_map(TokenLifecycle::lifetime)
        .fold((0i64, 0usize), |(sum, count), lifetime| {
            (sum + round_seconds(lifetime), count + 1)
        });

    if count == 0 {
        return None;
    }

    let mean = sum as f64 / count as f64;
    Some((mean * 10.0).round() / 10.0)
}
