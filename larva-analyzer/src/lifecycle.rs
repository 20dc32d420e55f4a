//! Lifecycle extraction
//!
//! Turns the raw tracker event stream into producer and token lifecycles for one
//! player. Each event is classified exactly once by its kind; the classified
//! buckets are then folded into lifecycle maps.
//!
//! Inconsistent input (conversions of unknown tokens, conversions that precede the
//! token's birth) is skipped and counted in [`ExtractionDiagnostics`] rather than
//! failing the run.

use crate::clock::GameClock;
use crate::timeline::round_seconds;
use crate::types::{
    EventKind, Frame, GameEvent, PlayerId, Point, ProducerLifecycle, TokenLifecycle, UnitId,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// What the extractor looks for
#[derive(Debug, Clone, Copy)]
pub struct ExtractionTarget<'a> {
    pub player: PlayerId,
    pub token_type: &'a str,
    pub producer_types: &'a [String],
    pub spawn_offset: Point,
}

/// Counts of input records the extractor recovered from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionDiagnostics {
    /// Type-change events for a token that was never born
    pub unknown_token_conversions: usize,
    /// Type-change events earlier than the token's birth
    pub inverted_conversions: usize,
    /// Producers whose death precedes their completion
    pub inverted_producers: usize,
}

impl ExtractionDiagnostics {
    pub fn total(&self) -> usize {
        self.unknown_token_conversions + self.inverted_conversions + self.inverted_producers
    }
}

/// Output of one extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lifecycles {
    pub producers: BTreeMap<UnitId, ProducerLifecycle>,
    pub tokens: BTreeMap<UnitId, TokenLifecycle>,
    pub diagnostics: ExtractionDiagnostics,
}

/// Relevant events, bucketed by role
#[derive(Default)]
struct ClassifiedEvents<'e> {
    producer_sightings: Vec<&'e GameEvent>,
    token_births: Vec<&'e GameEvent>,
    token_conversions: Vec<&'e GameEvent>,
}

impl<'e> ClassifiedEvents<'e> {
    fn classify(events: &'e [GameEvent], target: &ExtractionTarget<'_>) -> Self {
        let mut classified = Self::default();

        for event in events {
            let unit = &event.unit;
            if unit.owner != Some(target.player) {
                continue;
            }

            let is_token = unit.type_name == target.token_type;
            let is_producer = unit.matches(target.player, target.producer_types);

            match event.kind {
                EventKind::UnitBorn | EventKind::UnitDone | EventKind::UnitDied
                    if is_producer =>
                {
                    classified.producer_sightings.push(event)
                }
                EventKind::UnitBorn if is_token => classified.token_births.push(event),
                EventKind::UnitTypeChange if is_token => {
                    classified.token_conversions.push(event)
                }
                _ => {}
            }
        }

        log::trace!(
            "Classified events: {} producer, {} token births, {} conversions",
            classified.producer_sightings.len(),
            classified.token_births.len(),
            classified.token_conversions.len()
        );
        classified
    }
}

/// Everything the event stream says about one producer
///
/// Each event carries its own copy of the unit's facts, and a structure's birth
/// copy usually predates its completion, so facts are merged across sightings.
struct ProducerSightings {
    location: Point,
    finished_at: Option<Frame>,
    done_frame: Option<Frame>,
    born_frame: Option<Frame>,
    died_at: Option<Frame>,
}

impl ProducerSightings {
    fn new(location: Point) -> Self {
        Self {
            location,
            finished_at: None,
            done_frame: None,
            born_frame: None,
            died_at: None,
        }
    }

    fn record(&mut self, event: &GameEvent) {
        let unit = &event.unit;
        self.finished_at = earliest(self.finished_at, unit.finished_at);
        self.died_at = earliest(self.died_at, unit.died_at);

        match event.kind {
            EventKind::UnitBorn => self.born_frame = earliest(self.born_frame, Some(event.frame)),
            EventKind::UnitDone => self.done_frame = earliest(self.done_frame, Some(event.frame)),
            EventKind::UnitDied => self.died_at = earliest(self.died_at, Some(event.frame)),
            _ => {}
        }
    }

    /// Recorded finish frame, else the Done event, else the birth
    fn finished_frame(&self) -> Option<Frame> {
        self.finished_at.or(self.done_frame).or(self.born_frame)
    }
}

fn earliest(current: Option<Frame>, candidate: Option<Frame>) -> Option<Frame> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Extract producer and token lifecycles for one player
pub fn extract(events: &[GameEvent], target: &ExtractionTarget<'_>, clock: &GameClock) -> Lifecycles {
    let classified = ClassifiedEvents::classify(events, target);
    let mut lifecycles = Lifecycles::default();

    let mut sightings: BTreeMap<UnitId, ProducerSightings> = BTreeMap::new();
    for event in classified.producer_sightings {
        sightings
            .entry(event.unit.id)
            .or_insert_with(|| ProducerSightings::new(event.unit.location))
            .record(event);
    }

    for (id, seen) in sightings {
        // Completion, not construction start: build time is not active time.
        let Some(finished) = seen.finished_frame() else {
            log::trace!("Producer {} only seen dying, skipping", id);
            continue;
        };
        let active_from = clock.seconds(finished);
        let active_until = seen.died_at.map(|frame| {
            let died = clock.seconds(frame);
            if died < active_from {
                lifecycles.diagnostics.inverted_producers += 1;
                active_from
            } else {
                died
            }
        });

        lifecycles.producers.insert(
            id,
            ProducerLifecycle {
                id,
                spawn_point: seen.location.offset_by(&target.spawn_offset),
                active_from,
                active_until,
            },
        );
    }

    for event in classified.token_births {
        let unit = &event.unit;
        lifecycles.tokens.entry(unit.id).or_insert_with(|| TokenLifecycle {
            id: unit.id,
            spawn_location: unit.location,
            start_time: clock.seconds(unit.started_at.unwrap_or(event.frame)),
            end_time: None,
        });
    }

    for event in classified.token_conversions {
        let Some(token) = lifecycles.tokens.get_mut(&event.unit.id) else {
            log::trace!("Ignoring conversion of unknown token {}", event.unit.id);
            lifecycles.diagnostics.unknown_token_conversions += 1;
            continue;
        };

        let converted = clock.seconds(event.frame);
        if converted < token.start_time {
            lifecycles.diagnostics.inverted_conversions += 1;
            continue;
        }
        // Conversions resolve to whole seconds; never before the birth itself.
        let candidate = (round_seconds(converted) as f64).max(token.start_time);

        match token.end_time {
            Some(current) if current <= candidate => {}
            _ => token.end_time = Some(candidate),
        }
    }

    if lifecycles.diagnostics.total() > 0 {
        log::warn!(
            "Player {}: skipped {} inconsistent records ({:?})",
            target.player,
            lifecycles.diagnostics.total(),
            lifecycles.diagnostics
        );
    }
    log::debug!(
        "Player {}: extracted {} producers, {} tokens",
        target.player,
        lifecycles.producers.len(),
        lifecycles.tokens.len()
    );

    lifecycles
}

/// Count units of the given types the player had born before `cutoff` seconds
pub fn count_born_before(
    events: &[GameEvent],
    player: PlayerId,
    type_names: &[String],
    cutoff: f64,
    clock: &GameClock,
) -> usize {
    let mut seen = BTreeSet::new();
    for event in events {
        if event.kind != EventKind::UnitBorn || !event.unit.matches(player, type_names) {
            continue;
        }
        let born = clock.seconds(event.unit.started_at.unwrap_or(event.frame));
        if born < cutoff {
            seen.insert(event.unit.id);
        }
    }
    seen.len()
}
