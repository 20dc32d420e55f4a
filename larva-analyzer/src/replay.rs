//! Replay dump loading
//!
//! Replays are decoded by an external parser that dumps the header and the tracker
//! event stream as JSON. This module only reads that dump; it never touches the
//! binary replay format.

use crate::types::{AnalyzerError, Frame, GameEvent, PlayerId, PlayerInfo, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Replay-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    /// Total number of frames in the replay
    pub frames: u64,
    /// Frames per second of game time
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Map name, for display only
    #[serde(default)]
    pub map_name: Option<String>,
}

/// Upper bound on any frame number in a dump: 24 hours at 22.4 frames per second
pub const MAX_REPLAY_FRAMES: Frame = 24 * 60 * 60 * 224 / 10;

fn default_fps() -> f64 {
    16.0
}

/// A fully loaded replay: header plus the ordered tracker event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Display name (usually the replay file name)
    #[serde(default)]
    pub name: String,
    pub metadata: ReplayMetadata,
    pub players: Vec<PlayerInfo>,
    pub events: Vec<GameEvent>,
}

impl ReplayLog {
    /// Parse a replay dump from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let replay: ReplayLog = serde_json::from_str(json)?;
        replay.check()?;
        Ok(replay)
    }

    /// Load a replay dump from a JSON file
    ///
    /// The replay name defaults to the file name when the dump does not carry one.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        log::info!("Loading replay dump: {:?}", path);

        let reader = BufReader::new(File::open(path)?);
        let mut replay: ReplayLog = serde_json::from_reader(reader)?;
        replay.check()?;

        if replay.name.is_empty() {
            replay.name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        log::debug!(
            "Loaded replay '{}': {} players, {} events, {} frames",
            replay.name,
            replay.players.len(),
            replay.events.len(),
            replay.metadata.frames
        );
        Ok(replay)
    }

    /// Look up a player by id
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.iter().find(|player| player.id == id)
    }

    fn check(&self) -> Result<()> {
        let mut ids: Vec<PlayerId> = self.players.iter().map(|player| player.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(AnalyzerError::ReplayParseError(format!(
                "duplicate player id {}",
                pair[0]
            )));
        }

        check_frame("metadata.frames", self.metadata.frames)?;
        for event in &self.events {
            let unit = &event.unit;
            let frames = [Some(event.frame), unit.started_at, unit.finished_at, unit.died_at];
            for frame in frames.into_iter().flatten() {
                check_frame("frame", frame)?;
            }
        }
        Ok(())
    }
}

fn check_frame(field: &str, frame: Frame) -> Result<()> {
    if frame > MAX_REPLAY_FRAMES {
        return Err(AnalyzerError::ReplayParseError(format!(
            "{} {} exceeds the {} frame limit",
            field, frame, MAX_REPLAY_FRAMES
        )));
    }
    Ok(())
}
