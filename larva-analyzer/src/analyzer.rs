//! Main analyzer API
//!
//! The Analyzer ties the pipeline together for one replay:
//! events → lifecycles → attribution → per-producer timelines → report data.
//! Each call is an independent run; nothing is cached between replays.

use crate::attribution::attribute;
use crate::clock::GameClock;
use crate::config::AnalyzerConfig;
use crate::lifecycle::{self, ExtractionDiagnostics, ExtractionTarget};
use crate::replay::ReplayLog;
use crate::stats::{average_lifetime, per_producer_stats, ProducerStats};
use crate::timeline::{round_seconds, whole_player_timeline, TimelineSample};
use crate::types::{PlayerInfo, Result};
use serde::Serialize;

/// Everything the report layer needs for one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub player: PlayerInfo,
    /// Creep tumours born before `creep_cutoff_seconds`
    pub creep_tumors: usize,
    pub creep_cutoff_seconds: f64,
    /// Mean lifetime of converted tokens (None = no converted tokens)
    pub average_token_lifetime: Option<f64>,
    pub total_tokens: usize,
    /// Tokens with no producer to attribute them to
    pub unattributed_tokens: usize,
    /// Per-producer statistics ordered by completion time
    pub producers: Vec<ProducerStats>,
    /// Whole-player token timeline
    pub timeline: Vec<TimelineSample>,
    pub timeline_bucket_seconds: u32,
    pub diagnostics: ExtractionDiagnostics,
}

/// The analyzer - entry point for all analysis operations
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer, rejecting invalid configuration up front
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Clock for a replay, using its frame rate and the configured speed
    pub fn clock_for(&self, replay: &ReplayLog) -> Result<GameClock> {
        GameClock::new(replay.metadata.fps, self.config.speed_multiplier)
    }

    /// Analyze every player of the configured race, in replay order
    ///
    /// # Example
    /// ```no_run
    /// use larva_analyzer::{Analyzer, AnalyzerConfig, ReplayLog};
    /// use std::path::Path;
    ///
    /// let replay = ReplayLog::from_json_file(Path::new("game.json")).unwrap();
    /// let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
    /// for report in analyzer.analyze(&replay).unwrap() {
    ///     println!("{}: {:?}", report.player, report.average_token_lifetime);
    /// }
    /// ```
    pub fn analyze(&self, replay: &ReplayLog) -> Result<Vec<PlayerReport>> {
        log::info!("Analyzing replay: {}", replay.name);
        let clock = self.clock_for(replay)?;

        let reports: Vec<PlayerReport> = replay
            .players
            .iter()
            .filter(|player| self.config.should_analyze_race(&player.race))
            .map(|player| self.analyze_with_clock(replay, player, &clock))
            .collect();

        if reports.is_empty() {
            log::info!("No {} players in replay {}", self.config.race, replay.name);
        }
        Ok(reports)
    }

    /// Analyze a single player regardless of race
    pub fn analyze_player(&self, replay: &ReplayLog, player: &PlayerInfo) -> Result<PlayerReport> {
        let clock = self.clock_for(replay)?;
        Ok(self.analyze_with_clock(replay, player, &clock))
    }

    fn analyze_with_clock(
        &self,
        replay: &ReplayLog,
        player: &PlayerInfo,
        clock: &GameClock,
    ) -> PlayerReport {
        let config = &self.config;
        let game_seconds = clock.seconds(replay.metadata.frames);

        let target = ExtractionTarget {
            player: player.id,
            token_type: &config.token_type,
            producer_types: &config.producer_types,
            spawn_offset: config.spawn_offset,
        };
        let lifecycles = lifecycle::extract(&replay.events, &target, clock);

        let attribution = attribute(&lifecycles.tokens, &lifecycles.producers);
        let producers = per_producer_stats(&attribution, game_seconds, &config.rules);

        let timeline_end = round_seconds(game_seconds).min(i64::from(config.timeline_max_seconds));
        let timeline = whole_player_timeline(
            lifecycles.tokens.values(),
            timeline_end as f64,
            config.timeline_bucket_seconds,
        );

        let creep_tumors = lifecycle::count_born_before(
            &replay.events,
            player.id,
            &config.creep_tumor_types,
            config.creep_cutoff_seconds,
            clock,
        );

        log::debug!(
            "{}: {} tokens, {} producers with statistics",
            player,
            lifecycles.tokens.len(),
            producers.len()
        );

        PlayerReport {
            player: player.clone(),
            creep_tumors,
            creep_cutoff_seconds: config.creep_cutoff_seconds,
            average_token_lifetime: average_lifetime(lifecycles.tokens.values()),
            total_tokens: lifecycles.tokens.len(),
            unattributed_tokens: attribution.unattributed,
            producers,
            timeline,
            timeline_bucket_seconds: config.timeline_bucket_seconds,
            diagnostics: lifecycles.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayMetadata;
    use crate::types::{AnalyzerError, EventKind, GameEvent, Point, UnitFacts};

    fn replay(fps: f64) -> ReplayLog {
        let hatch = UnitFacts {
            id: 1,
            owner: Some(1),
            type_name: "Hatchery".to_string(),
            location: Point::new(50.0, 50.0),
            started_at: Some(0),
            finished_at: Some(0),
            died_at: None,
        };
        let larva = UnitFacts {
            id: 2,
            owner: Some(1),
            type_name: "Larva".to_string(),
            location: Point::new(50.0, 47.0),
            started_at: Some(0),
            finished_at: None,
            died_at: None,
        };

        ReplayLog {
            name: "unit-test".to_string(),
            metadata: ReplayMetadata {
                frames: 1000,
                fps,
                map_name: None,
            },
            players: vec![
                PlayerInfo {
                    id: 1,
                    name: "zerg".to_string(),
                    race: "Zerg".to_string(),
                },
                PlayerInfo {
                    id: 2,
                    name: "protoss".to_string(),
                    race: "Protoss".to_string(),
                },
            ],
            events: vec![
                GameEvent::new(EventKind::UnitBorn, 0, hatch),
                GameEvent::new(EventKind::UnitBorn, 0, larva.clone()),
                GameEvent::new(EventKind::UnitTypeChange, 224, larva),
            ],
        }
    }

    #[test]
    fn test_only_target_race_is_analyzed() {
        let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
        let reports = analyzer.analyze(&replay(16.0)).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].player.id, 1);
        assert_eq!(reports[0].total_tokens, 1);
        assert_eq!(reports[0].average_token_lifetime, Some(10.0));
        assert_eq!(reports[0].producers.len(), 1);
    }

    #[test]
    fn test_zero_fps_is_fatal() {
        let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
        let result = analyzer.analyze(&replay(0.0));
        assert!(matches!(result, Err(AnalyzerError::InvalidFrameRate(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalyzerConfig::default().with_speed_multiplier(-1.0);
        assert!(Analyzer::new(config).is_err());
    }

    #[test]
    fn test_player_without_units_gets_empty_report() {
        let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
        let replay = replay(16.0);
        let protoss = replay.player(2).unwrap().clone();

        let report = analyzer.analyze_player(&replay, &protoss).unwrap();
        assert_eq!(report.total_tokens, 0);
        assert_eq!(report.average_token_lifetime, None);
        assert!(report.producers.is_empty());
        assert!(report.timeline.iter().all(|sample| sample.count == 0));
    }
}
