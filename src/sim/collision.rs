//! Hit tests for both playfields
//!
//! The racer uses lane equality plus a vertical band; the shooter uses a
//! per-axis tolerance box (text is much wider than it is tall, so a single
//! radius would be wrong on one axis or the other).

use glam::Vec2;

use super::lane::LanePos;
use super::state::{Projectile, Word};

/// Strictly inside the open band `(top, bottom)`
#[inline]
pub fn in_hit_band(y: f32, top: f32, bottom: f32) -> bool {
    y > top && y < bottom
}

/// Per-axis distance strictly below `tolerance`
#[inline]
pub fn within_tolerance(a: Vec2, b: Vec2, tolerance: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < tolerance.x && d.y < tolerance.y
}

/// First live word in `lane` inside the band, in spawn order.
///
/// At most one hit per frame; any other overlapping word waits for the next
/// frame.
pub fn first_lane_hit(words: &[Word<LanePos>], lane: u8, top: f32, bottom: f32) -> Option<usize> {
    words
        .iter()
        .position(|w| w.is_live() && w.pos.lane == lane && in_hit_band(w.pos.y, top, bottom))
}

/// Pair live words with active projectiles.
///
/// Words are scanned in spawn order and each takes the first active
/// projectile within tolerance. The projectile is consumed immediately so it
/// cannot score twice. Returns the indices of the words that were hit.
pub fn projectile_hits(
    words: &[Word<Vec2>],
    projectiles: &mut [Projectile],
    tolerance: Vec2,
) -> Vec<usize> {
    let mut hits = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        if !word.is_live() {
            continue;
        }
        let shot = projectiles
            .iter_mut()
            .find(|p| p.active && within_tolerance(p.pos, word.pos, tolerance));
        if let Some(shot) = shot {
            shot.active = false;
            hits.push(idx);
        }
    }
    hits
}
