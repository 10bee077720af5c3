//! Per-frame simulation step
//!
//! [`Simulation`] owns one round's authoritative state and advances it in a
//! fixed order every frame: spawn, move, collide/score, prune.

use std::rc::Rc;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::field::Playfield;
use super::free_aim::FreeAimField;
use super::lane::{LaneCommand, LaneField};
use super::select::{pick_distractor, pick_target};
use super::state::{EntityId, GameEvent, Hit, HitOutcome, Projectile, SimulationState, Snapshot};
use crate::audio::{Announcer, Cue};
use crate::consts::{CORRECT_POINTS, INCORRECT_PENALTY};
use crate::error::ArcadeError;
use crate::settings::Settings;
use crate::vocab::Vocabulary;

/// One running round of either game
pub struct Simulation<F: Playfield, R: Rng = Pcg32> {
    field: F,
    vocab: Rc<Vocabulary>,
    rng: R,
    announcer: Rc<dyn Announcer>,
    locale: String,
    hit_display_ms: f64,
    state: SimulationState<F::Player, F::Pos>,
}

impl<F: Playfield, R: Rng> Simulation<F, R> {
    /// Start a round at clock time `start_ms`.
    ///
    /// Fails if the settings are inconsistent or there is nothing to ask.
    pub fn new(
        vocab: Rc<Vocabulary>,
        settings: &Settings,
        mut rng: R,
        announcer: Rc<dyn Announcer>,
        start_ms: f64,
    ) -> Result<Self, ArcadeError> {
        settings.validate()?;
        if vocab.is_empty() {
            return Err(ArcadeError::EmptyVocabulary);
        }

        let field = F::from_settings(settings);
        let target = pick_target(&vocab, &mut rng).clone();
        let mut state =
            SimulationState::new(field.initial_player(), target, field.ramp().initial, start_ms);
        if field.first_spawn_immediate() {
            state.last_spawn_ms = f64::NEG_INFINITY;
        }

        log::info!(
            "{} round started: target '{}' ({})",
            F::NAME,
            state.target.entry.english,
            state.target.entry.translation
        );

        let locale = settings.speech.locale.clone();
        if let Some(phrase) = &settings.round_start_phrase {
            announcer.announce(phrase, &locale);
        }
        announcer.chime(Cue::RoundStart);

        Ok(Self {
            field,
            vocab,
            rng,
            announcer,
            locale,
            hit_display_ms: settings.hit_display_ms,
            state,
        })
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn state(&self) -> &SimulationState<F::Player, F::Pos> {
        &self.state
    }

    /// Direct access for hosts and tests that script entity positions
    pub fn state_mut(&mut self) -> &mut SimulationState<F::Player, F::Pos> {
        &mut self.state
    }

    pub fn snapshot(&self) -> Snapshot<F::Player, F::Pos> {
        self.state.snapshot()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// End the round. Safe to call any number of times; returns true only
    /// for the call that actually ended it.
    pub fn terminate(&mut self) -> bool {
        let ended = self.state.mark_terminated();
        if ended {
            log::info!(
                "{} round ended after {} frames, score {}",
                F::NAME,
                self.state.frame_count,
                self.state.score
            );
        }
        ended
    }

    /// Advance one frame at clock time `now_ms`.
    ///
    /// A no-op once terminated.
    pub fn tick(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.state.is_terminated() {
            return events;
        }

        self.state.now_ms = now_ms;
        self.state.frame_count += 1;

        // 1. Spawn on wall-clock interval, independent of frame rate
        if now_ms - self.state.last_spawn_ms > self.field.spawn_interval_ms() {
            self.spawn_row(&mut events);
            self.state.last_spawn_ms = now_ms;

            let ramped = self.field.ramp().step(self.state.speed);
            if ramped > self.state.speed {
                self.state.speed = ramped;
                events.push(GameEvent::SpeedRamped { speed: ramped });
            }
        }

        // 2. Move; hit words stay frozen for their feedback window
        let speed = self.state.speed;
        for word in self.state.words.iter_mut().filter(|w| w.is_live()) {
            self.field.advance(&mut word.pos, speed);
        }
        self.field.advance_projectiles(&mut self.state.projectiles);

        // 3. Collide and score
        let hits = self.field.detect_hits(
            &self.state.player,
            &self.state.words,
            &mut self.state.projectiles,
        );
        for idx in hits {
            self.resolve_hit(idx, now_ms, &mut events);
        }

        // 4. Prune
        let before = self.state.words.len();
        let field = &self.field;
        let window = self.hit_display_ms;
        self.state
            .words
            .retain(|w| !field.out_of_bounds(&w.pos) && !w.display_expired(now_ms, window));
        let pruned = before - self.state.words.len();
        if pruned > 0 {
            events.push(GameEvent::Pruned { count: pruned });
        }
        self.state.projectiles.retain(|p| p.active);

        events
    }

    fn spawn_row(&mut self, events: &mut Vec<GameEvent>) {
        let layout = self.field.spawn_layout(&mut self.rng);
        let mut ids = Vec::with_capacity(layout.len());
        for (pos, is_correct) in layout {
            let text = if is_correct {
                self.state.target.entry.english.clone()
            } else {
                pick_distractor(&self.vocab, &self.state.target.entry, &mut self.rng)
                    .english
                    .clone()
            };
            ids.push(self.state.push_word(pos, text, is_correct));
        }
        log::trace!("{} spawned {:?} at {:.0}ms", F::NAME, ids, self.state.now_ms);
        events.push(GameEvent::RowSpawned { ids });
    }

    fn resolve_hit(&mut self, idx: usize, now_ms: f64, events: &mut Vec<GameEvent>) {
        let word = &mut self.state.words[idx];
        if !word.is_live() {
            return;
        }
        let outcome = if word.is_correct {
            HitOutcome::Correct
        } else {
            HitOutcome::Incorrect
        };
        word.hit = Some(Hit {
            outcome,
            at_ms: now_ms,
        });
        let id = word.id;
        let text = word.text.clone();

        match outcome {
            HitOutcome::Correct => {
                let score = self.state.reward(CORRECT_POINTS);
                events.push(GameEvent::Hit { id, outcome, score });

                let next = pick_target(&self.vocab, &mut self.rng).clone();
                let target = self.state.replace_target(next);
                events.push(GameEvent::TargetChanged {
                    serial: target.serial,
                    english: target.entry.english.clone(),
                });
                log::debug!(
                    "{} correct '{}' -> score {}, next '{}'",
                    F::NAME,
                    text,
                    score,
                    target.entry.english
                );

                let phrase = self.field.correct_phrase().unwrap_or(&text);
                self.announcer.announce(phrase, &self.locale);
                self.announcer.chime(Cue::Correct);
            }
            HitOutcome::Incorrect => {
                let score = self.state.penalize(INCORRECT_PENALTY);
                events.push(GameEvent::Hit { id, outcome, score });
                log::debug!("{} wrong '{}' -> score {}", F::NAME, text, score);

                self.announcer
                    .announce(self.field.incorrect_phrase(), &self.locale);
                self.announcer.chime(Cue::Incorrect);
            }
        }
    }
}

impl<R: Rng> Simulation<LaneField, R> {
    /// Change lane immediately. Ignored once the round is over.
    ///
    /// Returns true if the car actually moved (not at a road edge, not ended).
    pub fn steer(&mut self, command: LaneCommand) -> bool {
        if self.state.is_terminated() {
            return false;
        }
        let lane = command.apply(self.state.player);
        let moved = lane != self.state.player;
        self.state.player = lane;
        moved
    }
}

impl<R: Rng> Simulation<FreeAimField, R> {
    /// Move the shooter to pointer `x` (canvas-relative), clamped to the canvas
    pub fn aim(&mut self, x: f32) -> f32 {
        if !self.state.is_terminated() {
            self.state.player = self.field.clamp_player(x);
        }
        self.state.player
    }

    /// Launch a projectile from the current position
    pub fn fire(&mut self) -> Option<EntityId> {
        if self.state.is_terminated() {
            return None;
        }
        let id = self.state.next_entity_id();
        let pos: Vec2 = self.field.muzzle(self.state.player);
        self.state.projectiles.push(Projectile {
            id,
            pos,
            active: true,
        });
        Some(id)
    }
}
