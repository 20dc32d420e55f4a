//! Core types for the larva analyzer library
//!
//! This module defines the event model supplied by the replay-parsing collaborator
//! and the lifecycle records the analyzer derives from it. Events are read-only input;
//! lifecycle records are built once per analysis run and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Game loop counter as recorded in the replay
pub type Frame = u64;

/// Player identity as assigned by the replay (1-based player slot)
pub type PlayerId = u32;

/// Unit identity, unique within one replay
pub type UnitId = u64;

/// Errors that can occur during analysis
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Invalid frame rate: {0} (must be a positive, finite number)")]
    InvalidFrameRate(f64),

    #[error("Invalid speed multiplier: {0} (must be a positive, finite number)")]
    InvalidSpeedMultiplier(f64),

    #[error("Invalid game rules: {0}")]
    InvalidRules(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse replay dump: {0}")]
    ReplayParseError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalyzerError {
    /// True for the fatal configuration class (bad frame rate, multiplier or rules)
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::InvalidFrameRate(_)
                | AnalyzerError::InvalidSpeedMultiplier(_)
                | AnalyzerError::InvalidRules(_)
                | AnalyzerError::InvalidConfig(_)
        )
    }
}

/// A 2D map position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// This point shifted by `offset`
    pub fn offset_by(&self, offset: &Point) -> Point {
        Point::new(self.x + offset.x, self.y + offset.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Kind of a tracker event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A unit came into existence (or started construction)
    UnitBorn,
    /// A structure finished construction
    UnitDone,
    /// A unit morphed into another unit type
    UnitTypeChange,
    /// A unit died
    UnitDied,
    /// Anything else the collaborator chooses to forward
    #[serde(other)]
    Other,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::UnitBorn => write!(f, "UnitBorn"),
            EventKind::UnitDone => write!(f, "UnitDone"),
            EventKind::UnitTypeChange => write!(f, "UnitTypeChange"),
            EventKind::UnitDied => write!(f, "UnitDied"),
            EventKind::Other => write!(f, "Other"),
        }
    }
}

/// Static facts about a unit, as reported by the replay parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFacts {
    /// Unit identity
    pub id: UnitId,
    /// Owning player (None for neutral units)
    #[serde(default)]
    pub owner: Option<PlayerId>,
    /// Unit type name (e.g. "Larva", "Hatchery")
    pub type_name: String,
    /// Location at creation
    pub location: Point,
    /// Frame the unit started to exist (construction start for structures)
    #[serde(default)]
    pub started_at: Option<Frame>,
    /// Frame the unit finished construction
    #[serde(default)]
    pub finished_at: Option<Frame>,
    /// Frame the unit died, if it died during the replay
    #[serde(default)]
    pub died_at: Option<Frame>,
}

impl UnitFacts {
    /// Check if this unit is owned by `player` and has one of the given type names
    pub fn matches<S: AsRef<str>>(&self, player: PlayerId, type_names: &[S]) -> bool {
        self.owner == Some(player) && type_names.iter().any(|name| name.as_ref() == self.type_name)
    }
}

/// A single timestamped tracker event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Event kind
    pub kind: EventKind,
    /// Frame at which the event occurred
    pub frame: Frame,
    /// The affected unit
    pub unit: UnitFacts,
}

impl GameEvent {
    pub fn new(kind: EventKind, frame: Frame, unit: UnitFacts) -> Self {
        Self { kind, frame, unit }
    }
}

/// Player entry from the replay header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    /// Race actually played (e.g. "Zerg")
    pub race: String,
}

impl fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {} - {} ({})", self.id, self.name, self.race)
    }
}

/// Lifetime of one producer structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducerLifecycle {
    pub id: UnitId,
    /// Where this producer's tokens appear
    pub spawn_point: Point,
    /// Seconds at which construction finished
    pub active_from: f64,
    /// Seconds at which the producer died (None = alive through the observed window)
    pub active_until: Option<f64>,
}

impl ProducerLifecycle {
    /// End of the observed window for this producer
    pub fn observation_end(&self, window_end: f64) -> f64 {
        self.active_until.unwrap_or(window_end)
    }
}

/// Lifetime of one production token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenLifecycle {
    pub id: UnitId,
    pub spawn_location: Point,
    /// Seconds at which the token was first observed
    pub start_time: f64,
    /// Seconds of the earliest conversion (None = never converted in the observed window)
    pub end_time: Option<f64>,
}

impl TokenLifecycle {
    /// Lifetime in seconds, if the token was converted
    pub fn lifetime(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.offset_by(&Point::new(0.0, -3.0)), Point::new(3.0, 1.0));
    }

    #[test]
    fn test_unit_matching() {
        let unit = UnitFacts {
            id: 7,
            owner: Some(1),
            type_name: "Lair".to_string(),
            location: Point::default(),
            started_at: None,
            finished_at: None,
            died_at: None,
        };

        assert!(unit.matches(1, &["Hatchery", "Lair", "Hive"]));
        assert!(!unit.matches(2, &["Lair"]));
        assert!(!unit.matches(1, &["Larva"]));
    }

    #[test]
    fn test_event_kind_deserialization() {
        let kind: EventKind = serde_json::from_str("\"unit_type_change\"").unwrap();
        assert_eq!(kind, EventKind::UnitTypeChange);

        let unknown: EventKind = serde_json::from_str("\"upgrade_complete\"").unwrap();
        assert_eq!(unknown, EventKind::Other);
    }

    #[test]
    fn test_configuration_error_class() {
        assert!(AnalyzerError::InvalidFrameRate(0.0).is_configuration_error());
        assert!(!AnalyzerError::ReplayParseError("bad".into()).is_configuration_error());
    }
}
