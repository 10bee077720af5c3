//! Free-aim field (shooter)
//!
//! Words fall one at a time at random x positions; the player slides along
//! the bottom edge and fires straight up.

use glam::Vec2;
use rand::Rng;

use super::collision::projectile_hits;
use super::field::Playfield;
use super::state::{Projectile, Word};
use crate::settings::{FreeAimSettings, Settings, SpeedRamp};

#[derive(Debug, Clone)]
pub struct FreeAimField {
    pub settings: FreeAimSettings,
}

impl FreeAimField {
    /// Keep the player sprite fully on the canvas
    pub fn clamp_player(&self, x: f32) -> f32 {
        let half = self.settings.player_half_width;
        x.clamp(half, self.settings.width - half)
    }

    /// Where a shot fired from `player_x` starts
    pub fn muzzle(&self, player_x: f32) -> Vec2 {
        Vec2::new(player_x, self.settings.height - self.settings.muzzle_offset)
    }

    pub fn hit_tolerance(&self) -> Vec2 {
        Vec2::new(self.settings.hit_dx, self.settings.hit_dy)
    }
}

impl Playfield for FreeAimField {
    type Player = f32;
    type Pos = Vec2;

    const NAME: &'static str = "shooter";

    fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.free_aim.clone(),
        }
    }

    fn initial_player(&self) -> f32 {
        self.settings.width / 2.0
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

    /// One word, coin flip for correct vs distractor
    fn spawn_layout<R: Rng>(&self, rng: &mut R) -> Vec<(Vec2, bool)> {
        let is_correct = rng.random_bool(0.5);
        let margin = self.settings.spawn_margin;
        let x = rng.random_range(margin..self.settings.width - margin);
        vec![(Vec2::new(x, self.settings.spawn_y), is_correct)]
    }

    fn advance(&self, pos: &mut Vec2, speed: f32) {
        pos.y += speed;
    }

    fn advance_projectiles(&self, projectiles: &mut [Projectile]) {
        for shot in projectiles.iter_mut().filter(|p| p.active) {
            shot.pos.y -= self.settings.projectile_speed;
            if shot.pos.y < 0.0 {
                shot.active = false;
            }
        }
    }

    fn out_of_bounds(&self, pos: &Vec2) -> bool {
        pos.y > self.settings.height
    }

    fn detect_hits(
        &self,
        _player: &f32,
        words: &[Word<Vec2>],
        projectiles: &mut [Projectile],
    ) -> Vec<usize> {
        projectile_hits(words, projectiles, self.hit_tolerance())
    }

    fn correct_phrase(&self) -> Option<&str> {
        self.settings.correct_phrase.as_deref()
    }

    fn incorrect_phrase(&self) -> &str {
        &self.settings.incorrect_phrase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> FreeAimField {
        FreeAimField::from_settings(&Settings::default())
    }

    #[test]
    fn test_player_clamped_to_canvas() {
        let field = field();
        assert_eq!(field.clamp_player(-40.0), 25.0);
        assert_eq!(field.clamp_player(900.0), 775.0);
        assert_eq!(field.clamp_player(300.0), 300.0);
        assert_eq!(field.initial_player(), 400.0);
    }

    #[test]
    fn test_spawn_inside_margins() {
        let field = field();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut correct = 0;
        for _ in 0..1000 {
            let row = field.spawn_layout(&mut rng);
            assert_eq!(row.len(), 1);
            let (pos, is_correct) = row[0];
            assert!(pos.x >= 50.0 && pos.x < 750.0);
            assert_eq!(pos.y, -30.0);
            if is_correct {
                correct += 1;
            }
        }
        // Coin flip, loosely
        assert!((400..600).contains(&correct), "correct = {correct}");
    }

    #[test]
    fn test_projectiles_climb_and_retire() {
        let field = field();
        let mut shots = vec![
            Projectile {
                id: 1,
                pos: Vec2::new(100.0, 450.0),
                active: true,
            },
            Projectile {
                id: 2,
                pos: Vec2::new(100.0, 5.0),
                active: true,
            },
        ];
        field.advance_projectiles(&mut shots);
        assert_eq!(shots[0].pos.y, 442.0);
        assert!(shots[0].active);
        assert!(!shots[1].active);
    }

    #[test]
    fn test_muzzle_above_bottom_edge() {
        assert_eq!(field().muzzle(120.0), Vec2::new(120.0, 450.0));
    }
}
