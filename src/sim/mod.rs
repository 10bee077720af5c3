//! Game simulation
//!
//! Everything that decides what happens in a round lives here, with no
//! platform dependencies:
//! - Wall-clock spawning and a capped linear speed ramp
//! - Hit detection per field (lane band, projectile tolerance box)
//! - Scoring, retargeting and spoken cues through an injected announcer
//! - Randomness only through the injected RNG

pub mod autopilot;
pub mod collision;
pub mod field;
pub mod free_aim;
pub mod lane;
pub mod select;
pub mod state;
pub mod tick;

pub use autopilot::{AimCommand, aim_free, steer_lane};
pub use field::Playfield;
pub use free_aim::FreeAimField;
pub use lane::{LaneCommand, LaneField, LanePos};
pub use select::{pick_distractor, pick_target};
pub use state::{
    EntityId, GameEvent, Hit, HitOutcome, Projectile, SimulationState, Snapshot, Target, Word,
};
pub use tick::Simulation;
