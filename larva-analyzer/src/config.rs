//! Analyzer configuration types
//!
//! Game-rule constants and modeling approximations live here instead of being
//! baked into the algorithms, so analyses can be run against rule variants.

use crate::clock::FASTER_SPEED_MULTIPLIER;
use crate::types::{AnalyzerError, Point, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the analyzer library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Unit type name of the production token
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Unit type names of the producer structure, one per upgrade tier
    #[serde(default = "default_producer_types")]
    pub producer_types: Vec<String>,

    /// Offset from a producer's location to where its tokens spawn
    #[serde(default = "default_spawn_offset")]
    pub spawn_offset: Point,

    /// Game-speed multiplier applied on top of the replay frame rate
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,

    /// Production rules of the game
    #[serde(default)]
    pub rules: GameRules,

    /// Sampling interval of the whole-player timeline
    #[serde(default = "default_bucket_seconds")]
    pub timeline_bucket_seconds: u32,

    /// Upper bound on the whole-player timeline length
    #[serde(default = "default_timeline_max_seconds")]
    pub timeline_max_seconds: u32,

    /// Only players of this race are analyzed
    #[serde(default = "default_race")]
    pub race: String,

    /// Unit type names counted as creep tumours
    #[serde(default = "default_creep_tumor_types")]
    pub creep_tumor_types: Vec<String>,

    /// Creep tumours born before this second are counted
    #[serde(default = "default_creep_cutoff")]
    pub creep_cutoff_seconds: f64,
}

/// Production rule constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Maximum number of tokens a producer holds at once
    #[serde(default = "default_token_cap")]
    pub token_cap: u32,

    /// Empirical average interval between two productions at the natural rate.
    /// Used to estimate production lost while capped; a heuristic, not a derived value.
    #[serde(default = "default_seconds_per_token")]
    pub seconds_per_token: u32,
}

fn default_token_type() -> String {
    "Larva".to_string()
}

fn default_producer_types() -> Vec<String> {
    vec!["Hatchery".to_string(), "Lair".to_string(), "Hive".to_string()]
}

// Larvae spawn just below the hatchery.
fn default_spawn_offset() -> Point {
    Point::new(0.0, -3.0)
}

fn default_speed_multiplier() -> f64 {
    FASTER_SPEED_MULTIPLIER
}

fn default_bucket_seconds() -> u32 {
    5
}

fn default_timeline_max_seconds() -> u32 {
    900
}

fn default_race() -> String {
    "Zerg".to_string()
}

fn default_creep_tumor_types() -> Vec<String> {
    vec![
        "CreepTumor".to_string(),
        "CreepTumorQueen".to_string(),
        "CreepTumorBurrowed".to_string(),
    ]
}

fn default_creep_cutoff() -> f64 {
    600.0
}

fn default_token_cap() -> u32 {
    3
}

fn default_seconds_per_token() -> u32 {
    11
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            token_cap: default_token_cap(),
            seconds_per_token: default_seconds_per_token(),
        }
    }
}

impl GameRules {
    pub fn new(token_cap: u32, seconds_per_token: u32) -> Self {
        Self {
            token_cap,
            seconds_per_token,
        }
    }

    /// Reject rule variants the timeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.token_cap == 0 {
            return Err(AnalyzerError::InvalidRules(
                "token_cap must be at least 1".to_string(),
            ));
        }
        if self.seconds_per_token == 0 {
            return Err(AnalyzerError::InvalidRules(
                "seconds_per_token must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            token_type: default_token_type(),
            producer_types: default_producer_types(),
            spawn_offset: default_spawn_offset(),
            speed_multiplier: default_speed_multiplier(),
            rules: GameRules::default(),
            timeline_bucket_seconds: default_bucket_seconds(),
            timeline_max_seconds: default_timeline_max_seconds(),
            race: default_race(),
            creep_tumor_types: default_creep_tumor_types(),
            creep_cutoff_seconds: default_creep_cutoff(),
        }
    }
}

impl AnalyzerConfig {
    /// Create a new analyzer configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the game-speed multiplier
    pub fn with_speed_multiplier(mut self, multiplier: f64) -> Self {
        self.speed_multiplier = multiplier;
        self
    }

    /// Builder method: set the spawn offset
    pub fn with_spawn_offset(mut self, x: f64, y: f64) -> Self {
        self.spawn_offset = Point::new(x, y);
        self
    }

    /// Builder method: set the production rules
    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    /// Builder method: set the token type name
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Builder method: add a producer type name
    pub fn add_producer_type(mut self, producer_type: impl Into<String>) -> Self {
        self.producer_types.push(producer_type.into());
        self
    }

    /// Builder method: set the timeline sampling interval
    pub fn with_timeline_bucket(mut self, seconds: u32) -> Self {
        self.timeline_bucket_seconds = seconds;
        self
    }

    /// Builder method: set the timeline length bound
    pub fn with_timeline_max(mut self, seconds: u32) -> Self {
        self.timeline_max_seconds = seconds;
        self
    }

    /// Builder method: set the analyzed race
    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    /// Check that the configuration can drive an analysis
    pub fn validate(&self) -> Result<()> {
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            return Err(AnalyzerError::InvalidSpeedMultiplier(self.speed_multiplier));
        }
        self.rules.validate()?;

        if self.token_type.is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "token_type must not be empty".to_string(),
            ));
        }
        if self.producer_types.is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "at least one producer type is required".to_string(),
            ));
        }
        if self.timeline_bucket_seconds == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "timeline_bucket_seconds must be at least 1".to_string(),
            ));
        }
        if !self.spawn_offset.x.is_finite() || !self.spawn_offset.y.is_finite() {
            return Err(AnalyzerError::InvalidConfig(format!(
                "spawn_offset must be finite, got {}",
                self.spawn_offset
            )));
        }
        Ok(())
    }

    /// Check if a race should be analyzed
    pub fn should_analyze_race(&self, race: &str) -> bool {
        self.race.eq_ignore_ascii_case(race)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_config_builder() {
        let config = AnalyzerConfig::new()
            .with_speed_multiplier(1.0)
            .with_spawn_offset(1.0, -2.5)
            .with_rules(GameRules::new(4, 8))
            .add_producer_type("Nest")
            .with_timeline_bucket(10);

        assert_eq!(config.speed_multiplier, 1.0);
        assert_eq!(config.spawn_offset, Point::new(1.0, -2.5));
        assert_eq!(config.rules.token_cap, 4);
        assert_eq!(config.producer_types.len(), 4);
        assert_eq!(config.timeline_bucket_seconds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.token_type, "Larva");
        assert_eq!(config.rules, GameRules::new(3, 11));
        assert_eq!(config.spawn_offset, Point::new(0.0, -3.0));
        assert!(config.should_analyze_race("zerg"));
        assert!(!config.should_analyze_race("Terran"));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "speed_multiplier": 1.2, "rules": { "token_cap": 5 } }"#)
                .unwrap();

        assert_eq!(config.speed_multiplier, 1.2);
        assert_eq!(config.rules.token_cap, 5);
        assert_eq!(config.rules.seconds_per_token, 11);
        assert_eq!(config.timeline_max_seconds, 900);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_speed = AnalyzerConfig::new().with_speed_multiplier(0.0);
        assert!(matches!(
            zero_speed.validate(),
            Err(AnalyzerError::InvalidSpeedMultiplier(_))
        ));

        let zero_cap = AnalyzerConfig::new().with_rules(GameRules::new(0, 11));
        assert!(matches!(zero_cap.validate(), Err(AnalyzerError::InvalidRules(_))));

        let zero_bucket = AnalyzerConfig::new().with_timeline_bucket(0);
        assert!(zero_bucket.validate().unwrap_err().is_configuration_error());
    }
}
