//! Frame scheduling and session lifecycle
//!
//! Handles the platform side of the game loop:
//! - `FrameScheduler`: "call me next frame" / "never mind" (animation frames
//!   in the browser, an explicit clock natively and in tests)
//! - `FrameLoop`: exactly one self-rescheduling loop per round
//! - `GameSession`: restart/exit handling around those loops

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manual::ManualScheduler;

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::Announcer;
use crate::error::ArcadeError;
use crate::settings::Settings;
use crate::sim::{GameEvent, Playfield, Simulation, Snapshot};
use crate::vocab::Vocabulary;

/// Callback run on the next frame with the frame's clock time (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Platform per-frame callback source
pub trait FrameScheduler {
    type Handle: Copy + Eq + Debug;

    /// Queue `callback` for the next frame. `None` if the platform refused.
    fn request(&self, callback: FrameCallback) -> Option<Self::Handle>;

    /// Drop a queued callback. Unknown or already-run handles are ignored.
    fn cancel(&self, handle: Self::Handle);
}

/// Called after every tick with a copy of the round and that tick's events.
///
/// Runs with the loop unlocked, so it may steer, terminate or restart.
pub type FrameObserver<F> =
    Rc<dyn Fn(&Snapshot<<F as Playfield>::Player, <F as Playfield>::Pos>, &[GameEvent])>;

#[derive(Debug, Clone, Copy)]
struct Pending<H> {
    handle: H,
    generation: u64,
}

struct LoopState<F: Playfield, H> {
    sim: Simulation<F>,
    pending: Option<Pending<H>>,
    generation: u64,
    observer: Option<FrameObserver<F>>,
}

/// The single authoritative loop driving one round.
///
/// Every frame callback carries the generation it was scheduled under and
/// is ignored unless it is still the pending one, so a callback that fires
/// after cancellation (or after a restart) can never tick or reschedule.
pub struct FrameLoop<F: Playfield, S: FrameScheduler> {
    inner: Rc<RefCell<LoopState<F, S::Handle>>>,
    scheduler: Rc<S>,
}

impl<F: Playfield + 'static, S: FrameScheduler + 'static> FrameLoop<F, S> {
    /// Take ownership of `sim` and schedule its first frame
    pub fn start(sim: Simulation<F>, scheduler: Rc<S>, observer: Option<FrameObserver<F>>) -> Self {
        let inner = Rc::new(RefCell::new(LoopState {
            sim,
            pending: None,
            generation: 0,
            observer,
        }));
        schedule_next(&inner, &scheduler);
        Self { inner, scheduler }
    }

    /// A frame is queued
    pub fn is_scheduled(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.borrow().sim.is_terminated()
    }

    /// Run `f` against the round (input handlers)
    pub fn with_sim<T>(&self, f: impl FnOnce(&mut Simulation<F>) -> T) -> T {
        f(&mut self.inner.borrow_mut().sim)
    }

    /// Read-only access
    pub fn peek<T>(&self, f: impl FnOnce(&Simulation<F>) -> T) -> T {
        f(&self.inner.borrow().sim)
    }
}

impl<F: Playfield, S: FrameScheduler> FrameLoop<F, S> {
    /// Stop the round: cancel the queued frame synchronously, then mark the
    /// simulation terminated. Idempotent.
    pub fn terminate(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some(pending) = inner.pending.take() {
            self.scheduler.cancel(pending.handle);
        }
        inner.sim.terminate();
    }
}

fn schedule_next<F, S>(inner: &Rc<RefCell<LoopState<F, S::Handle>>>, scheduler: &Rc<S>)
where
    F: Playfield + 'static,
    S: FrameScheduler + 'static,
{
    let generation = inner.borrow().generation + 1;
    let weak_inner = Rc::downgrade(inner);
    let weak_scheduler = Rc::downgrade(scheduler);
    let callback: FrameCallback =
        Box::new(move |now_ms| run_frame(&weak_inner, &weak_scheduler, generation, now_ms));

    match scheduler.request(callback) {
        Some(handle) => {
            let mut state = inner.borrow_mut();
            state.generation = generation;
            state.pending = Some(Pending { handle, generation });
        }
        None => log::warn!("{} frame request refused; loop halted", F::NAME),
    }
}

fn run_frame<F, S>(
    inner: &Weak<RefCell<LoopState<F, S::Handle>>>,
    scheduler: &Weak<S>,
    generation: u64,
    now_ms: f64,
) where
    F: Playfield + 'static,
    S: FrameScheduler + 'static,
{
    // Loop torn down while the callback was queued
    let (Some(inner), Some(scheduler)) = (inner.upgrade(), scheduler.upgrade()) else {
        return;
    };

    let (events, notify) = {
        let mut guard = inner.borrow_mut();
        if guard.pending.map(|p| p.generation) != Some(generation) {
            log::debug!("{} stale frame {} ignored", F::NAME, generation);
            return;
        }
        guard.pending = None;
        if guard.sim.is_terminated() {
            return;
        }

        let events = guard.sim.tick(now_ms);
        let notify = guard
            .observer
            .clone()
            .map(|observer| (observer, guard.sim.snapshot()));
        (events, notify)
    };

    // Loop unlocked: the observer may call back into it
    if let Some((observer, snapshot)) = notify {
        observer(&snapshot, &events);
    }

    {
        let guard = inner.borrow();
        if guard.sim.is_terminated() || guard.pending.is_some() {
            return;
        }
    }
    schedule_next(&inner, &scheduler);
}

/// One game screen: owns at most one running round at a time.
///
/// Starting a new round always cancels the previous loop first, and builds a
/// fresh simulation rather than resetting the old one.
pub struct GameSession<F: Playfield, S: FrameScheduler> {
    vocab: Rc<Vocabulary>,
    settings: Settings,
    scheduler: Rc<S>,
    announcer: Rc<dyn Announcer>,
    observer: Option<FrameObserver<F>>,
    on_exit: Option<Box<dyn FnMut()>>,
    current: Option<FrameLoop<F, S>>,
}

impl<F: Playfield + 'static, S: FrameScheduler + 'static> GameSession<F, S> {
    pub fn new(
        vocab: Rc<Vocabulary>,
        settings: Settings,
        scheduler: Rc<S>,
        announcer: Rc<dyn Announcer>,
    ) -> Result<Self, ArcadeError> {
        settings.validate()?;
        Ok(Self {
            vocab,
            settings,
            scheduler,
            announcer,
            observer: None,
            on_exit: None,
            current: None,
        })
    }

    /// Notified after every tick of every round
    pub fn set_observer(&mut self, observer: FrameObserver<F>) {
        self.observer = Some(observer);
    }

    /// Navigation back to the menu
    pub fn set_on_exit(&mut self, on_exit: impl FnMut() + 'static) {
        self.on_exit = Some(Box::new(on_exit));
    }

    /// Begin a new round at clock time `now_ms`
    pub fn start_round(&mut self, now_ms: f64, seed: u64) -> Result<(), ArcadeError> {
        self.stop();
        let sim = Simulation::new(
            Rc::clone(&self.vocab),
            &self.settings,
            Pcg32::seed_from_u64(seed),
            Rc::clone(&self.announcer),
            now_ms,
        )?;
        log::info!("{} session: new round (seed {})", F::NAME, seed);
        self.current = Some(FrameLoop::start(
            sim,
            Rc::clone(&self.scheduler),
            self.observer.clone(),
        ));
        Ok(())
    }

    /// Terminate the running round, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(current) = &self.current {
            current.terminate();
        }
    }

    /// Leave to the menu: the loop is cancelled before navigation runs
    pub fn exit(&mut self) {
        self.stop();
        self.current = None;
        if let Some(on_exit) = self.on_exit.as_mut() {
            on_exit();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|c| !c.is_terminated())
    }

    /// Run `f` against the current round, if one exists
    pub fn with_round<T>(&self, f: impl FnOnce(&mut Simulation<F>) -> T) -> Option<T> {
        self.current.as_ref().map(|c| c.with_sim(f))
    }

    pub fn peek_round<T>(&self, f: impl FnOnce(&Simulation<F>) -> T) -> Option<T> {
        self.current.as_ref().map(|c| c.peek(f))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl<F: Playfield, S: FrameScheduler> Drop for GameSession<F, S> {
    fn drop(&mut self) {
        // Teardown must not leave a frame queued
        if let Some(current) = self.current.take() {
            current.terminate();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::audio::SilentAnnouncer;
    use crate::sim::{FreeAimField, LaneCommand, LaneField, LanePos};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn lane_sim(seed: u64) -> Simulation<LaneField> {
        Simulation::new(
            Rc::new(Vocabulary::builtin()),
            &Settings::default(),
            Pcg32::seed_from_u64(seed),
            Rc::new(SilentAnnouncer),
            0.0,
        )
        .unwrap()
    }

    fn session<F: Playfield + 'static>(
        scheduler: &Rc<ManualScheduler>,
    ) -> GameSession<F, ManualScheduler> {
        GameSession::new(
            Rc::new(Vocabulary::builtin()),
            Settings::default(),
            Rc::clone(scheduler),
            Rc::new(SilentAnnouncer),
        )
        .unwrap()
    }

    #[test]
    fn test_loop_reschedules_every_frame() {
        let scheduler = Rc::new(ManualScheduler::new());
        let frames = FrameLoop::start(lane_sim(1), Rc::clone(&scheduler), None);
        assert_eq!(scheduler.pending(), 1);
        for i in 1..=10 {
            assert_eq!(scheduler.run_frame(i as f64 * FRAME_MS), 1);
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(frames.with_sim(|sim| sim.state().frame_count), 10);
    }

    #[test]
    fn test_terminate_cancels_pending_frame() {
        let scheduler = Rc::new(ManualScheduler::new());
        let frames = FrameLoop::start(lane_sim(2), Rc::clone(&scheduler), None);
        let mut now = 0.0;
        // Past the first spawn so there are words on the road
        while now < 4000.0 {
            now += FRAME_MS;
            scheduler.run_frame(now);
        }
        let words = frames.with_sim(|sim| sim.state().words.len());
        let ticks = frames.with_sim(|sim| sim.state().frame_count);
        assert!(words > 0);

        frames.terminate();
        assert_eq!(scheduler.pending(), 0);
        assert!(!frames.is_scheduled());

        // One more spawn interval: nothing runs
        assert_eq!(scheduler.run_frame(now + 3600.0), 0);
        assert_eq!(frames.with_sim(|sim| sim.state().words.len()), words);
        assert_eq!(frames.with_sim(|sim| sim.state().frame_count), ticks);

        frames.terminate();
        assert!(frames.is_terminated());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_frame_already_dequeued_is_stale_after_terminate() {
        // Platform hands the callback over, then the game is torn down
        // before it runs
        let scheduler = Rc::new(ManualScheduler::new());
        let frames = FrameLoop::start(lane_sim(3), Rc::clone(&scheduler), None);
        let callbacks = scheduler.take_due();
        frames.terminate();
        for callback in callbacks {
            callback(10.0);
        }
        assert_eq!(frames.with_sim(|sim| sim.state().frame_count), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_refused_request_halts_quietly() {
        let scheduler = Rc::new(ManualScheduler::new());
        scheduler.refuse_after(3);
        let frames = FrameLoop::start(lane_sim(4), Rc::clone(&scheduler), None);
        for i in 1..=10 {
            scheduler.run_frame(i as f64 * FRAME_MS);
        }
        // Three requests granted: the start plus two reschedules
        assert_eq!(frames.peek(|sim| sim.state().frame_count), 3);
        assert!(!frames.is_scheduled());
        assert!(!frames.is_terminated());
    }

    #[test]
    fn test_observer_sees_every_tick() {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(Cell::new(0u64));
        let seen_in = Rc::clone(&seen);
        let observer: FrameObserver<LaneField> =
            Rc::new(move |snap: &Snapshot<u8, LanePos>, _events: &[GameEvent]| {
                seen_in.set(snap.frame);
            });
        let _frames = FrameLoop::start(lane_sim(5), Rc::clone(&scheduler), Some(observer));
        for i in 1..=4 {
            scheduler.run_frame(i as f64 * FRAME_MS);
        }
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn test_observer_may_terminate_and_steer() {
        let scheduler = Rc::new(ManualScheduler::new());
        let slot: Rc<RefCell<Option<FrameLoop<LaneField, ManualScheduler>>>> =
            Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&slot);
        let observer: FrameObserver<LaneField> =
            Rc::new(move |_snap: &Snapshot<u8, LanePos>, _events: &[GameEvent]| {
                let Some(slot) = weak.upgrade() else { return };
                if let Some(frames) = slot.borrow().as_ref() {
                    frames.terminate();
                    frames.with_sim(|sim| sim.steer(LaneCommand::Left));
                }
            });
        *slot.borrow_mut() = Some(FrameLoop::start(
            lane_sim(6),
            Rc::clone(&scheduler),
            Some(observer),
        ));

        assert_eq!(scheduler.run_frame(FRAME_MS), 1);

        let slot = slot.borrow();
        let frames = slot.as_ref().unwrap();
        assert!(frames.is_terminated());
        assert!(!frames.is_scheduled());
        assert_eq!(scheduler.pending(), 0);
        // Steering after termination is ignored
        assert_eq!(
            frames.peek(|sim| (sim.state().frame_count, sim.state().player)),
            (1, 1)
        );
        assert_eq!(scheduler.run_frame(2.0 * FRAME_MS), 0);
    }

    #[test]
    fn test_observer_may_restart_session() {
        let scheduler = Rc::new(ManualScheduler::new());
        let session = Rc::new(RefCell::new(session::<LaneField>(&scheduler)));
        let weak = Rc::downgrade(&session);
        let restarts = Rc::new(Cell::new(0));
        let restarts_in = Rc::clone(&restarts);
        session.borrow_mut().set_observer(Rc::new(
            move |snap: &Snapshot<u8, LanePos>, _events: &[GameEvent]| {
                if snap.frame != 3 {
                    return;
                }
                if let Some(session) = weak.upgrade() {
                    session.borrow_mut().start_round(100.0, 42).unwrap();
                    restarts_in.set(restarts_in.get() + 1);
                }
            },
        ));
        session.borrow_mut().start_round(0.0, 1).unwrap();

        for i in 1..=5 {
            scheduler.run_frame(i as f64 * FRAME_MS);
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(restarts.get(), 1);
        // Fresh round has ticked on frames 4 and 5 only
        assert_eq!(
            session.borrow().with_round(|sim| sim.state().frame_count),
            Some(2)
        );
    }

    #[test]
    fn test_restart_replaces_round_and_keeps_one_loop() {
        let scheduler = Rc::new(ManualScheduler::new());
        let mut session = session::<LaneField>(&scheduler);
        session.start_round(0.0, 1).unwrap();
        for i in 1..=30 {
            scheduler.run_frame(i as f64 * FRAME_MS);
        }
        session.with_round(|sim| sim.steer(LaneCommand::Left));

        session.start_round(500.0, 2).unwrap();
        assert_eq!(scheduler.pending(), 1);
        let (frames, lane, score) = session
            .with_round(|sim| {
                (
                    sim.state().frame_count,
                    sim.state().player,
                    sim.score(),
                )
            })
            .unwrap();
        assert_eq!((frames, lane, score), (0, 1, 0));

        // Only the new loop ticks, once per frame
        scheduler.run_frame(600.0);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(session.with_round(|sim| sim.state().frame_count), Some(1));
    }

    #[test]
    fn test_exit_cancels_before_navigation() {
        let scheduler = Rc::new(ManualScheduler::new());
        let mut session = session::<FreeAimField>(&scheduler);
        let pending_at_exit = Rc::new(Cell::new(usize::MAX));
        let seen_pending = Rc::clone(&pending_at_exit);
        let sched = Rc::clone(&scheduler);
        session.set_on_exit(move || seen_pending.set(sched.pending()));

        session.start_round(0.0, 9).unwrap();
        scheduler.run_frame(FRAME_MS);
        assert!(session.is_running());

        session.exit();
        assert_eq!(pending_at_exit.get(), 0);
        assert!(!session.is_running());
        assert!(session.with_round(|sim| sim.score()).is_none());
        session.exit();
    }

    #[test]
    fn test_dropping_session_cancels_frame() {
        let scheduler = Rc::new(ManualScheduler::new());
        {
            let mut session = session::<LaneField>(&scheduler);
            session.start_round(0.0, 3).unwrap();
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.run_frame(100.0), 0);
    }
}
