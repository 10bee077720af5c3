//! Simulation state and entity types
//!
//! One `SimulationState` per running round. The view layer never touches it
//! directly; it reads [`Snapshot`] copies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::vocab::VocabularyEntry;

pub type EntityId = u32;

/// How a word was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitOutcome {
    Correct,
    Incorrect,
}

/// Sticky hit record; once set the word never collides again
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub outcome: HitOutcome,
    /// Clock time of the hit (ms)
    pub at_ms: f64,
}

/// A falling/approaching word (obstacle in the racer, target in the shooter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word<P> {
    pub id: EntityId,
    pub pos: P,
    pub text: String,
    /// Fixed at spawn against the target current at that moment
    pub is_correct: bool,
    pub hit: Option<Hit>,
}

impl<P> Word<P> {
    /// Not yet hit: moves and collides
    pub fn is_live(&self) -> bool {
        self.hit.is_none()
    }

    /// Post-hit freeze window has elapsed
    pub fn display_expired(&self, now_ms: f64, window_ms: f64) -> bool {
        self.hit.is_some_and(|hit| now_ms - hit.at_ms > window_ms)
    }
}

/// A shot fired upward from the free-aim player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    /// Cleared when consumed by a hit or off screen; pruned at frame end
    pub active: bool,
}

/// The word the learner currently has to find
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub entry: VocabularyEntry,
    /// Bumped on every fresh pick, even if the same word comes up again
    pub serial: u32,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// One spawn event's words
    RowSpawned { ids: Vec<EntityId> },
    /// A word was hit
    Hit {
        id: EntityId,
        outcome: HitOutcome,
        score: u32,
    },
    /// New target after a correct hit
    TargetChanged { serial: u32, english: String },
    /// Speed bumped at a spawn interval
    SpeedRamped { speed: f32 },
    /// Words that left the field or finished their hit display
    Pruned { count: usize },
}

/// Authoritative mutable record for one round
#[derive(Debug, Clone)]
pub struct SimulationState<Pl, P> {
    pub player: Pl,
    /// Insertion order is spawn order
    pub words: Vec<Word<P>>,
    pub projectiles: Vec<Projectile>,
    pub target: Target,
    pub score: u32,
    /// Units per frame
    pub speed: f32,
    pub last_spawn_ms: f64,
    /// Clock time of the last tick
    pub now_ms: f64,
    pub frame_count: u64,
    terminated: bool,
    next_id: EntityId,
}

impl<Pl, P> SimulationState<Pl, P> {
    pub fn new(player: Pl, target: VocabularyEntry, speed: f32, start_ms: f64) -> Self {
        Self {
            player,
            words: Vec::new(),
            projectiles: Vec::new(),
            target: Target {
                entry: target,
                serial: 0,
            },
            score: 0,
            speed,
            last_spawn_ms: start_ms,
            now_ms: start_ms,
            frame_count: 0,
            terminated: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Flip to terminated. Returns false if it already was.
    pub(crate) fn mark_terminated(&mut self) -> bool {
        !std::mem::replace(&mut self.terminated, true)
    }

    /// Append a word in spawn order
    pub fn push_word(&mut self, pos: P, text: impl Into<String>, is_correct: bool) -> EntityId {
        let id = self.next_entity_id();
        self.words.push(Word {
            id,
            pos,
            text: text.into(),
            is_correct,
            hit: None,
        });
        id
    }

    pub fn word(&self, id: EntityId) -> Option<&Word<P>> {
        self.words.iter().find(|w| w.id == id)
    }

    /// Replace the target with a fresh pick
    pub(crate) fn replace_target(&mut self, entry: VocabularyEntry) -> &Target {
        self.target = Target {
            entry,
            serial: self.target.serial + 1,
        };
        &self.target
    }

    /// Add points for a correct hit
    pub(crate) fn reward(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Deduct points for a wrong hit, never below zero
    pub(crate) fn penalize(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_sub(points);
        self.score
    }
}

impl<Pl: Copy, P: Copy> SimulationState<Pl, P> {
    /// Immutable copy for the view layer
    pub fn snapshot(&self) -> Snapshot<Pl, P> {
        Snapshot {
            player: self.player,
            words: self.words.clone(),
            projectiles: self.projectiles.clone(),
            target: self.target.clone(),
            score: self.score,
            speed: self.speed,
            frame: self.frame_count,
            terminated: self.terminated,
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<Pl, P> {
    pub player: Pl,
    pub words: Vec<Word<P>>,
    pub projectiles: Vec<Projectile>,
    pub target: Target,
    pub score: u32,
    pub speed: f32,
    pub frame: u64,
    pub terminated: bool,
}
