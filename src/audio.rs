//! Spoken and audible feedback
//!
//! The simulation only knows the [`Announcer`] seam. On the web it is backed
//! by the Speech Synthesis API plus procedurally generated Web Audio tones;
//! natively it logs.

/// Moments the games give feedback on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A round just started
    RoundStart,
    /// The learner hit the right word
    Correct,
    /// The learner hit a distractor
    Incorrect,
}

/// Fire-and-forget feedback sink
pub trait Announcer {
    /// Speak `text` in `locale` (e.g. "en-US"). Never blocks, never reports back.
    fn announce(&self, text: &str, locale: &str);

    /// Play a short non-verbal tone for `cue`
    fn chime(&self, _cue: Cue) {}
}

/// Swallows everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&self, _text: &str, _locale: &str) {}
}

/// Writes feedback to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, text: &str, locale: &str) {
        log::info!("say [{}]: {}", locale, text);
    }

    fn chime(&self, cue: Cue) {
        log::debug!("chime: {:?}", cue);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{ChimePlayer, SpeechAnnouncer};

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioContext, GainNode, OscillatorNode, OscillatorType, SpeechSynthesis,
        SpeechSynthesisUtterance,
    };

    use super::{Announcer, Cue};
    use crate::settings::SpeechSettings;

    /// Web Speech API announcer with optional tones
    pub struct SpeechAnnouncer {
        synth: Option<SpeechSynthesis>,
        chimes: Option<ChimePlayer>,
        rate: f32,
        pitch: f32,
        muted: bool,
    }

    impl SpeechAnnouncer {
        pub fn new(settings: &SpeechSettings) -> Self {
            let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
            if synth.is_none() {
                log::warn!("speechSynthesis unavailable - spoken feedback disabled");
            }
            let chimes = settings.chimes.then(ChimePlayer::new);
            Self {
                synth,
                chimes,
                rate: settings.rate,
                pitch: settings.pitch,
                muted: settings.muted,
            }
        }
    }

    impl Announcer for SpeechAnnouncer {
        fn announce(&self, text: &str, locale: &str) {
            if self.muted {
                return;
            }
            let Some(synth) = &self.synth else { return };

            // Drop anything still queued so feedback stays in sync with play
            synth.cancel();

            let Ok(utterance) = SpeechSynthesisUtterance::new_with_text(text) else {
                return;
            };
            utterance.set_lang(locale);
            utterance.set_rate(self.rate);
            utterance.set_pitch(self.pitch);
            synth.speak(&utterance);
        }

        fn chime(&self, cue: Cue) {
            if self.muted {
                return;
            }
            if let Some(chimes) = &self.chimes {
                chimes.play(cue);
            }
        }
    }

    /// Procedural feedback tones - no audio files needed
    pub struct ChimePlayer {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl ChimePlayer {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - chimes disabled");
            }
            Self { ctx, volume: 0.6 }
        }

        pub fn play(&self, cue: Cue) {
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::RoundStart => self.play_arpeggio(ctx, &[400.0, 500.0, 600.0], 0.1),
                Cue::Correct => self.play_arpeggio(ctx, &[600.0, 800.0, 1000.0], 0.08),
                Cue::Incorrect => self.play_buzz(ctx),
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Rising notes
        fn play_arpeggio(&self, ctx: &AudioContext, freqs: &[f32], spacing: f64) {
            for (i, freq) in freqs.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * spacing;
                gain.gain().set_value_at_time(self.volume * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }

        /// Low descending buzz
        fn play_buzz(&self, ctx: &AudioContext) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(self.volume * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(110.0, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }
    }

    impl Default for ChimePlayer {
        fn default() -> Self {
            Self::new()
        }
    }
}
