//! Idle/demo mode - the computer plays
//!
//! Produces the same commands a player would, so demo rounds exercise the
//! real input paths.

use glam::Vec2;

use super::lane::{LaneCommand, LanePos};
use super::state::{Projectile, Word};
use crate::consts::LANE_COUNT;

/// Next steering command for the racer, if any.
///
/// Heads for the lane of the nearest live correct word; otherwise slides out
/// of a lane holding an approaching distractor.
pub fn steer_lane(player: u8, words: &[Word<LanePos>], band_bottom: f32) -> Option<LaneCommand> {
    let ahead = |w: &&Word<LanePos>| w.is_live() && w.pos.y < band_bottom;

    let goal = words
        .iter()
        .filter(ahead)
        .filter(|w| w.is_correct)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|w| w.pos.lane)
        .or_else(|| {
            let blocked = words
                .iter()
                .filter(ahead)
                .any(|w| !w.is_correct && w.pos.lane == player);
            if !blocked {
                return None;
            }
            // Nearest lane with no distractor coming
            (0..LANE_COUNT)
                .filter(|&lane| {
                    !words
                        .iter()
                        .filter(ahead)
                        .any(|w| !w.is_correct && w.pos.lane == lane)
                })
                .min_by_key(|&lane| lane.abs_diff(player))
        })?;

    match goal.cmp(&player) {
        std::cmp::Ordering::Less => Some(LaneCommand::Left),
        std::cmp::Ordering::Greater => Some(LaneCommand::Right),
        std::cmp::Ordering::Equal => None,
    }
}

/// Aim decision for the shooter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimCommand {
    pub x: f32,
    pub fire: bool,
}

/// Track the lowest live correct word and fire once lined up, one shot in
/// flight at a time.
pub fn aim_free(
    player_x: f32,
    words: &[Word<Vec2>],
    projectiles: &[Projectile],
    tolerance_x: f32,
) -> Option<AimCommand> {
    let goal = words
        .iter()
        .filter(|w| w.is_live() && w.is_correct)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;

    let aligned = (goal.pos.x - player_x).abs() < tolerance_x * 0.5;
    let in_flight = projectiles.iter().any(|p| p.active);
    Some(AimCommand {
        x: goal.pos.x,
        fire: aligned && !in_flight,
    })
}
