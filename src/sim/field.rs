//! Playfield capability shared by both games
//!
//! The engine in `tick` is generic over this trait: the racer and the shooter
//! differ only in position space, spawn layout, motion and hit test.

use std::fmt::Debug;

use rand::Rng;
use serde::Serialize;

use super::state::{Projectile, Word};
use crate::settings::{Settings, SpeedRamp};

pub trait Playfield: Sized {
    /// Player position (lane index or x coordinate)
    type Player: Copy + Debug + PartialEq + Serialize;
    /// Word position
    type Pos: Copy + Debug + PartialEq + Serialize;

    /// Used in logs
    const NAME: &'static str;

    fn from_settings(settings: &Settings) -> Self;

    fn initial_player(&self) -> Self::Player;

    fn ramp(&self) -> SpeedRamp;

    fn spawn_interval_ms(&self) -> f64;

    /// Spawn on the very first frame instead of one interval in
    fn first_spawn_immediate(&self) -> bool;

    /// Positions for one spawn event, each flagged correct (`true`) or distractor
    fn spawn_layout<R: Rng>(&self, rng: &mut R) -> Vec<(Self::Pos, bool)>;

    /// Move a live word by `speed`
    fn advance(&self, pos: &mut Self::Pos, speed: f32);

    /// Move projectiles and retire the ones that left the field
    fn advance_projectiles(&self, _projectiles: &mut [Projectile]) {}

    /// The word has left the visible field
    fn out_of_bounds(&self, pos: &Self::Pos) -> bool;

    /// Indices of words hit this frame, in spawn order. May consume projectiles.
    fn detect_hits(
        &self,
        player: &Self::Player,
        words: &[Word<Self::Pos>],
        projectiles: &mut [Projectile],
    ) -> Vec<usize>;

    /// Spoken on a correct hit; `None` speaks the word itself
    fn correct_phrase(&self) -> Option<&str>;

    fn incorrect_phrase(&self) -> &str;
}
