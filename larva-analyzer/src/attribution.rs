//! Spatial attribution of tokens to producers
//!
//! Every token is claimed by the producer whose spawn point lies closest to where
//! the token appeared. There is no distance threshold, so a far-away producer can
//! claim an orphaned token when nothing closer exists.

use crate::types::{ProducerLifecycle, TokenLifecycle, UnitId};
use std::collections::BTreeMap;

/// A producer together with the tokens attributed to it
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedProducer<'a> {
    pub producer: &'a ProducerLifecycle,
    pub tokens: Vec<&'a TokenLifecycle>,
}

/// Result of attributing a token set
#[derive(Debug, Clone, Default)]
pub struct Attribution<'a> {
    /// Producer id → producer with its tokens (every producer appears, even with none)
    pub producers: BTreeMap<UnitId, AttributedProducer<'a>>,
    /// Tokens that could not be attributed because there were no producers
    pub unattributed: usize,
}

/// Find the producer nearest to `token`; equal distances resolve to the lowest id
pub fn nearest_producer<'a>(
    token: &TokenLifecycle,
    producers: &'a BTreeMap<UnitId, ProducerLifecycle>,
) -> Option<&'a ProducerLifecycle> {
    let mut best: Option<(&ProducerLifecycle, f64)> = None;

    // BTreeMap iterates in ascending id order, so strict `<` keeps the lowest id on ties.
    for producer in producers.values() {
        let distance = token.spawn_location.distance_to(&producer.spawn_point);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((producer, distance)),
        }
    }

    best.map(|(producer, _)| producer)
}

/// Attribute every token to its nearest producer
pub fn attribute<'a>(
    tokens: &'a BTreeMap<UnitId, TokenLifecycle>,
    producers: &'a BTreeMap<UnitId, ProducerLifecycle>,
) -> Attribution<'a> {
    let mut attribution = Attribution {
        producers: producers
            .iter()
            .map(|(id, producer)| {
                (
                    *id,
                    AttributedProducer {
                        producer,
                        tokens: Vec::new(),
                    },
                )
            })
            .collect(),
        unattributed: 0,
    };

    for token in tokens.values() {
        match nearest_producer(token, producers) {
            Some(producer) => {
                if let Some(entry) = attribution.producers.get_mut(&producer.id) {
                    entry.tokens.push(token);
                }
            }
            None => attribution.unattributed += 1,
        }
    }

    if attribution.unattributed > 0 {
        log::warn!(
            "{} tokens could not be attributed: no producers found",
            attribution.unattributed
        );
    }

    attribution
}
