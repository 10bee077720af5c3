//! Lane field (racer)
//!
//! Three lanes, rows of two words descending, the car sits in a fixed band
//! near the bottom.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::first_lane_hit;
use super::field::Playfield;
use super::state::{Projectile, Word};
use crate::consts::LANE_COUNT;
use crate::settings::{LaneSettings, Settings, SpeedRamp};

/// Lane index plus vertical position (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanePos {
    pub lane: u8,
    pub y: f32,
}

/// Discrete steering input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneCommand {
    Left,
    Right,
}

impl LaneCommand {
    /// Keyboard mapping (`KeyboardEvent.key`)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(LaneCommand::Left),
            "ArrowRight" => Some(LaneCommand::Right),
            _ => None,
        }
    }

    /// Touch zones: left half steers left, right half steers right
    pub fn from_touch(x: f32, field_width: f32) -> Self {
        if x < field_width / 2.0 {
            LaneCommand::Left
        } else {
            LaneCommand::Right
        }
    }

    /// Resulting lane, clamped to the road
    pub fn apply(self, lane: u8) -> u8 {
        match self {
            LaneCommand::Left => lane.saturating_sub(1),
            LaneCommand::Right => (lane + 1).min(LANE_COUNT - 1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaneField {
    pub settings: LaneSettings,
}

impl Playfield for LaneField {
    type Player = u8;
    type Pos = LanePos;

    const NAME: &'static str = "racer";

    fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.lane.clone(),
        }
    }

    fn initial_player(&self) -> u8 {
        LANE_COUNT / 2
    }

    fn ramp(&self) -> SpeedRamp {
        self.settings.ramp
    }

    fn spawn_interval_ms(&self) -> f64 {
        self.settings.spawn_interval_ms
    }

    fn first_spawn_immediate(&self) -> bool {
        self.settings.first_spawn_immediate
    }

    /// One correct word and one distractor in two different lanes, so one
    /// lane is always free to dodge into.
    fn spawn_layout<R: Rng>(&self, rng: &mut R) -> Vec<(LanePos, bool)> {
        let correct_lane = rng.random_range(0..LANE_COUNT);
        let distractor_lane = (correct_lane + rng.random_range(1..LANE_COUNT)) % LANE_COUNT;
        let y = self.settings.spawn_y;
        vec![
            (LanePos { lane: correct_lane, y }, true),
            (LanePos { lane: distractor_lane, y }, false),
        ]
    }

    fn advance(&self, pos: &mut LanePos, speed: f32) {
        pos.y += speed;
    }

    fn out_of_bounds(&self, pos: &LanePos) -> bool {
        pos.y >= self.settings.exit_y
    }

    fn detect_hits(
        &self,
        player: &u8,
        words: &[Word<LanePos>],
        _projectiles: &mut [Projectile],
    ) -> Vec<usize> {
        first_lane_hit(
            words,
            *player,
            self.settings.hit_band_top,
            self.settings.hit_band_bottom,
        )
        .into_iter()
        .collect()
    }

    fn correct_phrase(&self) -> Option<&str> {
        self.settings.correct_phrase.as_deref()
    }

    fn incorrect_phrase(&self) -> &str {
        &self.settings.incorrect_phrase
    }
}
