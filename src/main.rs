//! Word Arcade entry point
//!
//! In the browser the JavaScript view layer drives the exported
//! `LaneGame`/`ShooterGame` handles; this only installs logging. Natively it
//! plays a headless demo round of each game on autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by another module instance
        return;
    }
    log::info!("Word Arcade ready");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Word Arcade (native) - headless autopilot demo");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);

    if let Err(e) = demo::run(seed) {
        log::error!("demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::rc::Rc;

    use word_arcade::audio::LogAnnouncer;
    use word_arcade::platform::{GameSession, ManualScheduler};
    use word_arcade::sim::{FreeAimField, LaneField, aim_free, steer_lane};
    use word_arcade::{ArcadeError, Settings, Vocabulary};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const ROUND_MS: f64 = 60_000.0;

    pub fn run(seed: u64) -> Result<(), ArcadeError> {
        let vocab = Rc::new(Vocabulary::builtin());
        let settings = Settings::default();
        let scheduler = Rc::new(ManualScheduler::new());

        let racer = play_racer(&vocab, &settings, &scheduler, seed)?;
        let shooter = play_shooter(&vocab, &settings, &scheduler, seed)?;
        log::info!("demo finished: racer {} / shooter {}", racer, shooter);
        Ok(())
    }

    fn play_racer(
        vocab: &Rc<Vocabulary>,
        settings: &Settings,
        scheduler: &Rc<ManualScheduler>,
        seed: u64,
    ) -> Result<u32, ArcadeError> {
        let mut session: GameSession<LaneField, _> = GameSession::new(
            Rc::clone(vocab),
            settings.clone(),
            Rc::clone(scheduler),
            Rc::new(LogAnnouncer),
        )?;
        session.start_round(0.0, seed)?;

        let band_bottom = settings.lane.hit_band_bottom;
        let mut now = 0.0;
        while now < ROUND_MS {
            session.with_round(|sim| {
                let state = sim.state();
                if let Some(command) = steer_lane(state.player, &state.words, band_bottom) {
                    sim.steer(command);
                }
            });
            now += FRAME_MS;
            scheduler.run_frame(now);
        }

        let score = session.peek_round(|sim| sim.score()).unwrap_or(0);
        session.exit();
        Ok(score)
    }

    fn play_shooter(
        vocab: &Rc<Vocabulary>,
        settings: &Settings,
        scheduler: &Rc<ManualScheduler>,
        seed: u64,
    ) -> Result<u32, ArcadeError> {
        let mut session: GameSession<FreeAimField, _> = GameSession::new(
            Rc::clone(vocab),
            settings.clone(),
            Rc::clone(scheduler),
            Rc::new(LogAnnouncer),
        )?;
        session.start_round(0.0, seed)?;

        let tolerance = settings.free_aim.hit_dx;
        let mut now = 0.0;
        while now < ROUND_MS {
            session.with_round(|sim| {
                let state = sim.state();
                let Some(command) =
                    aim_free(state.player, &state.words, &state.projectiles, tolerance)
                else {
                    return;
                };
                sim.aim(command.x);
                if command.fire {
                    sim.fire();
                }
            });
            now += FRAME_MS;
            scheduler.run_frame(now);
        }

        let score = session.peek_round(|sim| sim.score()).unwrap_or(0);
        session.exit();
        Ok(score)
    }
}
