//! Game tuning and speech preferences
//!
//! Supplied by the host page as JSON; nothing here is persisted between sessions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ArcadeError;

/// Linear speed ramp: bumped once per spawn interval, capped at `max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRamp {
    /// Units per frame at round start
    pub initial: f32,
    /// Added at every spawn event
    pub increment: f32,
    /// Ceiling
    pub max: f32,
}

impl SpeedRamp {
    /// Next speed after one spawn interval
    pub fn step(&self, speed: f32) -> f32 {
        (speed + self.increment).min(self.max)
    }

    fn validate(&self, name: &str) -> Result<(), ArcadeError> {
        if self.initial < 0.0 || self.increment < 0.0 {
            return Err(ArcadeError::invalid(format!("{name}: ramp must not decrease")));
        }
        if self.max < self.initial {
            return Err(ArcadeError::invalid(format!(
                "{name}: ramp ceiling {} below initial speed {}",
                self.max, self.initial
            )));
        }
        Ok(())
    }
}

/// Racer ramp: starts very slow for young players
const LANE_RAMP: SpeedRamp = SpeedRamp {
    initial: 0.4,
    increment: 0.02,
    max: 1.5,
};

const FREE_AIM_RAMP: SpeedRamp = SpeedRamp {
    initial: 0.5,
    increment: 0.02,
    max: 1.2,
};

/// A ramp as written in settings JSON; missing keys keep the game's default
#[derive(Deserialize)]
struct RampOverride {
    initial: Option<f32>,
    increment: Option<f32>,
    max: Option<f32>,
}

impl RampOverride {
    fn over(self, base: SpeedRamp) -> SpeedRamp {
        SpeedRamp {
            initial: self.initial.unwrap_or(base.initial),
            increment: self.increment.unwrap_or(base.increment),
            max: self.max.unwrap_or(base.max),
        }
    }
}

fn lane_ramp<'de, D: Deserializer<'de>>(d: D) -> Result<SpeedRamp, D::Error> {
    RampOverride::deserialize(d).map(|r| r.over(LANE_RAMP))
}

fn free_aim_ramp<'de, D: Deserializer<'de>>(d: D) -> Result<SpeedRamp, D::Error> {
    RampOverride::deserialize(d).map(|r| r.over(FREE_AIM_RAMP))
}

/// Lane (racer) tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSettings {
    /// Visible road height; the car band lies inside it, the exit line at or below it
    pub field_height: f32,
    /// Rows appear here, above the visible road
    pub spawn_y: f32,
    /// Obstacles at or past this y are gone
    pub exit_y: f32,
    /// Car footprint, exclusive bounds
    pub hit_band_top: f32,
    pub hit_band_bottom: f32,
    pub spawn_interval_ms: f64,
    pub first_spawn_immediate: bool,
    #[serde(deserialize_with = "lane_ramp")]
    pub ramp: SpeedRamp,
    pub correct_phrase: Option<String>,
    pub incorrect_phrase: String,
}

impl Default for LaneSettings {
    fn default() -> Self {
        Self {
            field_height: 500.0,
            spawn_y: -80.0,
            exit_y: 600.0,
            hit_band_top: 380.0,
            hit_band_bottom: 480.0,
            spawn_interval_ms: 3500.0,
            first_spawn_immediate: false,
            ramp: LANE_RAMP,
            correct_phrase: Some("Good job!".to_string()),
            incorrect_phrase: "Try again".to_string(),
        }
    }
}

/// Free-aim (shooter) tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeAimSettings {
    pub width: f32,
    pub height: f32,
    pub spawn_y: f32,
    /// Half the widest word, kept clear of both canvas edges
    pub spawn_margin: f32,
    pub player_half_width: f32,
    /// Projectiles launch this far above the bottom edge
    pub muzzle_offset: f32,
    pub projectile_speed: f32,
    /// Horizontal hit tolerance (text is wide)
    pub hit_dx: f32,
    /// Vertical hit tolerance
    pub hit_dy: f32,
    pub spawn_interval_ms: f64,
    pub first_spawn_immediate: bool,
    #[serde(deserialize_with = "free_aim_ramp")]
    pub ramp: SpeedRamp,
    /// `None` speaks the word that was hit
    pub correct_phrase: Option<String>,
    pub incorrect_phrase: String,
}

impl Default for FreeAimSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            spawn_y: -30.0,
            spawn_margin: 50.0,
            player_half_width: 25.0,
            muzzle_offset: 50.0,
            projectile_speed: 8.0,
            hit_dx: 50.0,
            hit_dy: 30.0,
            spawn_interval_ms: 3000.0,
            first_spawn_immediate: true,
            ramp: FREE_AIM_RAMP,
            correct_phrase: None,
            incorrect_phrase: "Oh no".to_string(),
        }
    }
}

/// Speech/audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub locale: String,
    /// Slightly slower than normal for learners
    pub rate: f32,
    pub pitch: f32,
    pub muted: bool,
    /// Play a short tone alongside spoken feedback
    pub chimes: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            rate: 0.9,
            pitch: 1.0,
            muted: false,
            chimes: true,
        }
    }
}

/// All tuning for both games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lane: LaneSettings,
    pub free_aim: FreeAimSettings,
    pub speech: SpeechSettings,
    /// How long a hit word stays frozen on screen before removal
    pub hit_display_ms: f64,
    pub round_start_phrase: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lane: LaneSettings::default(),
            free_aim: FreeAimSettings::default(),
            speech: SpeechSettings::default(),
            hit_display_ms: 1000.0,
            round_start_phrase: Some("Let's go!".to_string()),
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ArcadeError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ArcadeError> {
        let lane = &self.lane;
        if lane.field_height <= 0.0 {
            return Err(ArcadeError::invalid("lane: road height must be positive"));
        }
        if lane.hit_band_top >= lane.hit_band_bottom {
            return Err(ArcadeError::invalid("lane: hit band top must be above its bottom"));
        }
        if lane.hit_band_bottom > lane.field_height {
            return Err(ArcadeError::invalid("lane: hit band runs past the bottom of the road"));
        }
        if lane.exit_y < lane.field_height {
            return Err(ArcadeError::invalid("lane: exit line must not be inside the visible road"));
        }
        if lane.spawn_y >= lane.exit_y {
            return Err(ArcadeError::invalid("lane: spawn row must be above the exit line"));
        }
        if lane.spawn_interval_ms <= 0.0 {
            return Err(ArcadeError::invalid("lane: spawn interval must be positive"));
        }
        lane.ramp.validate("lane")?;

        let aim = &self.free_aim;
        if aim.width <= 2.0 * aim.spawn_margin || aim.width <= 2.0 * aim.player_half_width {
            return Err(ArcadeError::invalid("free aim: canvas narrower than its margins"));
        }
        if aim.height <= 0.0 || aim.muzzle_offset >= aim.height {
            return Err(ArcadeError::invalid("free aim: muzzle outside the canvas"));
        }
        if aim.hit_dx <= 0.0 || aim.hit_dy <= 0.0 {
            return Err(ArcadeError::invalid("free aim: hit tolerances must be positive"));
        }
        if aim.spawn_interval_ms <= 0.0 {
            return Err(ArcadeError::invalid("free aim: spawn interval must be positive"));
        }
        aim.ramp.validate("free aim")?;

        if self.hit_display_ms < 0.0 {
            return Err(ArcadeError::invalid("hit display window must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings =
            Settings::from_json(r#"{"lane":{"spawn_interval_ms":2000},"speech":{"muted":true}}"#)
                .unwrap();
        assert_eq!(settings.lane.spawn_interval_ms, 2000.0);
        assert_eq!(settings.lane.hit_band_top, 380.0);
        assert!(settings.speech.muted);
        assert_eq!(settings.free_aim.hit_dx, 50.0);
    }

    #[test]
    fn test_inverted_hit_band_rejected() {
        let err = Settings::from_json(r#"{"lane":{"hit_band_top":500,"hit_band_bottom":400}}"#)
            .unwrap_err();
        assert!(matches!(err, ArcadeError::InvalidSettings(_)));
    }

    #[test]
    fn test_partial_ramp_keeps_game_defaults() {
        let settings = Settings::from_json(
            r#"{"lane":{"ramp":{"max":2}},"free_aim":{"ramp":{"increment":0.05}}}"#,
        )
        .unwrap();
        assert_eq!(settings.lane.ramp.initial, 0.4);
        assert_eq!(settings.lane.ramp.increment, 0.02);
        assert_eq!(settings.lane.ramp.max, 2.0);
        assert_eq!(settings.free_aim.ramp.initial, 0.5);
        assert_eq!(settings.free_aim.ramp.increment, 0.05);
        assert_eq!(settings.free_aim.ramp.max, 1.2);
    }

    #[test]
    fn test_lane_geometry_checked_against_road_height() {
        let mut settings = Settings::default();
        settings.lane.field_height = 450.0;
        assert!(matches!(
            settings.validate(),
            Err(ArcadeError::InvalidSettings(_))
        ));

        let mut settings = Settings::default();
        settings.lane.field_height = 700.0;
        assert!(settings.validate().is_err());

        let settings = Settings::from_json(r#"{"lane":{"field_height":560}}"#).unwrap();
        assert_eq!(settings.lane.field_height, 560.0);
    }

    #[test]
    fn test_ramp_ceiling_below_initial_rejected() {
        let mut settings = Settings::default();
        settings.free_aim.ramp.max = 0.1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_ramp_step_caps() {
        let ramp = SpeedRamp {
            initial: 0.4,
            increment: 0.5,
            max: 1.0,
        };
        assert!((ramp.step(0.4) - 0.9).abs() < 1e-6);
        assert_eq!(ramp.step(0.9), 1.0);
        assert_eq!(ramp.step(1.0), 1.0);
    }
}
