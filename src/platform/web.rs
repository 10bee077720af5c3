//! Browser platform
//!
//! `requestAnimationFrame` scheduling plus the handles the JavaScript view
//! layer constructs, feeds input into, and tears down on navigation.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{FrameCallback, FrameObserver, FrameScheduler, GameSession};
use crate::audio::SpeechAnnouncer;
use crate::error::ArcadeError;
use crate::settings::Settings;
use crate::sim::{FreeAimField, GameEvent, LaneCommand, LaneField, Playfield, Snapshot};
use crate::vocab::Vocabulary;

/// Animation-frame scheduler
#[derive(Debug, Default)]
pub struct AnimationFrames;

impl FrameScheduler for AnimationFrames {
    type Handle = i32;

    fn request(&self, callback: FrameCallback) -> Option<i32> {
        let window = web_sys::window()?;
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        window
            .request_animation_frame(closure.unchecked_ref())
            .map_err(|e| log::warn!("requestAnimationFrame failed: {:?}", e))
            .ok()
    }

    fn cancel(&self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

/// Current `performance.now()`, in ms
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn to_js(err: ArcadeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn build_session<F: Playfield + 'static>(
    settings_json: Option<String>,
    vocab_json: Option<String>,
    on_exit: js_sys::Function,
    on_frame: Option<js_sys::Function>,
) -> Result<GameSession<F, AnimationFrames>, JsValue> {
    let settings = match settings_json {
        Some(json) => Settings::from_json(&json).map_err(to_js)?,
        None => Settings::default(),
    };
    let vocab = match vocab_json {
        Some(json) => Vocabulary::from_json(&json).map_err(to_js)?,
        None => Vocabulary::builtin(),
    };
    let announcer = Rc::new(SpeechAnnouncer::new(&settings.speech));

    let mut session = GameSession::new(
        Rc::new(vocab),
        settings,
        Rc::new(AnimationFrames),
        announcer,
    )
    .map_err(to_js)?;

    if let Some(on_frame) = on_frame {
        let observer: FrameObserver<F> = Rc::new(
            move |snapshot: &Snapshot<F::Player, F::Pos>, _events: &[GameEvent]| {
                match serde_json::to_string(snapshot) {
                    Ok(json) => {
                        if let Err(e) = on_frame.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                            log::warn!("frame callback threw: {:?}", e);
                        }
                    }
                    Err(e) => log::error!("snapshot encode failed: {}", e),
                }
            },
        );
        session.set_observer(observer);
    }
    session.set_on_exit(move || {
        if let Err(e) = on_exit.call0(&JsValue::NULL) {
            log::warn!("exit callback threw: {:?}", e);
        }
    });
    Ok(session)
}

fn snapshot_json<F: Playfield + 'static>(session: &GameSession<F, AnimationFrames>) -> String {
    session
        .peek_round(|sim| serde_json::to_string(&sim.snapshot()).unwrap_or_default())
        .unwrap_or_default()
}

/// Lane racer handle
#[wasm_bindgen]
pub struct LaneGame {
    session: GameSession<LaneField, AnimationFrames>,
}

#[wasm_bindgen]
impl LaneGame {
    /// `settings` and `vocabulary` are optional JSON documents; `on_exit`
    /// navigates back to the menu, `on_frame` receives a JSON snapshot
    /// after every tick.
    #[wasm_bindgen(constructor)]
    pub fn new(
        settings: Option<String>,
        vocabulary: Option<String>,
        on_exit: js_sys::Function,
        on_frame: Option<js_sys::Function>,
    ) -> Result<LaneGame, JsValue> {
        Ok(Self {
            session: build_session(settings, vocabulary, on_exit, on_frame)?,
        })
    }

    /// Start (or restart) a round
    pub fn start(&mut self) -> Result<(), JsValue> {
        self.session
            .start_round(now_ms(), rand::random())
            .map_err(to_js)
    }

    /// Returns true if the key moved the car to another lane
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(command) = LaneCommand::from_key(key) else {
            return false;
        };
        self.session
            .with_round(|sim| sim.steer(command))
            .unwrap_or(false)
    }

    pub fn touch(&mut self, x: f32, field_width: f32) {
        let command = LaneCommand::from_touch(x, field_width);
        self.session.with_round(|sim| sim.steer(command));
    }

    pub fn snapshot(&self) -> String {
        snapshot_json(&self.session)
    }

    pub fn score(&self) -> u32 {
        self.session.peek_round(|sim| sim.score()).unwrap_or(0)
    }

    pub fn exit(&mut self) {
        self.session.exit();
    }
}

/// Word shooter handle
#[wasm_bindgen]
pub struct ShooterGame {
    session: GameSession<FreeAimField, AnimationFrames>,
}

#[wasm_bindgen]
impl ShooterGame {
    #[wasm_bindgen(constructor)]
    pub fn new(
        settings: Option<String>,
        vocabulary: Option<String>,
        on_exit: js_sys::Function,
        on_frame: Option<js_sys::Function>,
    ) -> Result<ShooterGame, JsValue> {
        Ok(Self {
            session: build_session(settings, vocabulary, on_exit, on_frame)?,
        })
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.session
            .start_round(now_ms(), rand::random())
            .map_err(to_js)
    }

    /// Pointer x in canvas coordinates
    pub fn pointer_move(&mut self, x: f32) {
        self.session.with_round(|sim| sim.aim(x));
    }

    /// Returns true if a shot left the muzzle
    pub fn fire(&mut self) -> bool {
        self.session
            .with_round(|sim| sim.fire())
            .flatten()
            .is_some()
    }

    pub fn snapshot(&self) -> String {
        snapshot_json(&self.session)
    }

    pub fn score(&self) -> u32 {
        self.session.peek_round(|sim| sim.score()).unwrap_or(0)
    }

    pub fn exit(&mut self) {
        self.session.exit();
    }
}
