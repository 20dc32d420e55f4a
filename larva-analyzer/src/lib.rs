//! Larva Analyzer Library
//!
//! Measures how efficiently a Zerg player uses larva production, from the tracker
//! event stream of a recorded game.
//!
//! # Architecture
//!
//! The analysis is a forward-only pipeline:
//! - Frames are normalized to seconds ([`GameClock`])
//! - Events are folded into producer and token lifecycles ([`lifecycle`])
//! - Tokens are attributed to the nearest producer spawn point ([`attribution`])
//! - Per-second occupancy is rebuilt by delta accumulation ([`timeline`])
//! - Cap time and lifetime statistics are derived from it ([`stats`])
//!
//! The library does NOT:
//! - Decode the binary replay format (it reads a JSON dump produced by a replay parser)
//! - Locate replay files on disk
//! - Format reports
//!
//! Those live in the application layer (larva-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use larva_analyzer::{Analyzer, AnalyzerConfig, GameRules, ReplayLog};
//! use std::path::Path;
//!
//! let replay = ReplayLog::from_json_file(Path::new("game.json")).unwrap();
//!
//! let config = AnalyzerConfig::new()
//!     .with_speed_multiplier(1.4)
//!     .with_rules(GameRules::new(3, 11));
//! let analyzer = Analyzer::new(config).unwrap();
//!
//! for report in analyzer.analyze(&replay).unwrap() {
//!     for producer in &report.producers {
//!         println!(
//!             "Hatchery {}: capped {:.1}% of the time",
//!             producer.producer_id,
//!             producer.fraction_time_capped * 100.0
//!         );
//!     }
//! }
//! ```

// Public modules
pub mod analyzer;
pub mod attribution;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod replay;
pub mod stats;
pub mod timeline;
pub mod types;

// Re-export main types for convenience
pub use analyzer::{Analyzer, PlayerReport};
pub use clock::{GameClock, FASTER_SPEED_MULTIPLIER};
pub use config::{AnalyzerConfig, GameRules};
pub use lifecycle::{ExtractionDiagnostics, Lifecycles};
pub use replay::{ReplayLog, ReplayMetadata, MAX_REPLAY_FRAMES};
pub use stats::{average_lifetime, per_producer_stats, ProducerStats};
pub use timeline::{whole_player_timeline, TimelineSample};
pub use types::{
    AnalyzerError, EventKind, Frame, GameEvent, PlayerId, PlayerInfo, Point,
    ProducerLifecycle, Result, TokenLifecycle, UnitFacts, UnitId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: the default configuration builds an analyzer
        let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
        assert_eq!(analyzer.config().rules.token_cap, 3);
        assert!(!VERSION.is_empty());
    }
}
