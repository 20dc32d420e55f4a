//! Frame to wall-clock conversion
//!
//! Replays count game loops at a fixed rate that runs faster than real time on
//! the "Faster" game speed. All analysis works in real seconds.

use crate::types::{AnalyzerError, Frame, Result};

/// Game-speed multiplier of the "Faster" ladder setting
pub const FASTER_SPEED_MULTIPLIER: f64 = 1.4;

/// Converts replay frames into seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameClock {
    frames_per_second: f64,
    speed_multiplier: f64,
}

impl GameClock {
    /// Create a clock, rejecting zero, negative or non-finite rates
    pub fn new(frames_per_second: f64, speed_multiplier: f64) -> Result<Self> {
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(AnalyzerError::InvalidFrameRate(frames_per_second));
        }
        if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 {
            return Err(AnalyzerError::InvalidSpeedMultiplier(speed_multiplier));
        }

        Ok(Self {
            frames_per_second,
            speed_multiplier,
        })
    }

    /// Clock for the "Faster" game speed
    pub fn faster(frames_per_second: f64) -> Result<Self> {
        Self::new(frames_per_second, FASTER_SPEED_MULTIPLIER)
    }

    pub fn seconds(&self, frame: Frame) -> f64 {
        frame as f64 / (self.speed_multiplier * self.frames_per_second)
    }
}
