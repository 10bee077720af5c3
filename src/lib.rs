//! Word Arcade - real-time vocabulary mini-games
//!
//! Core modules:
//! - `sim`: Round simulation (spawning, movement, hits, scoring)
//! - `platform`: Frame scheduling, session lifecycle, browser bindings
//! - `audio`: Spoken feedback and chimes
//! - `vocab`: Vocabulary entries and word selection input
//! - `settings`: Data-driven tuning for both games

pub mod audio;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod vocab;

pub use error::ArcadeError;
pub use settings::Settings;
pub use vocab::{Vocabulary, VocabularyEntry};

/// Game rule constants
pub mod consts {
    /// Points for hitting the word that matches the target
    pub const CORRECT_POINTS: u32 = 10;
    /// Points lost for a distractor (score floors at zero)
    pub const INCORRECT_PENALTY: u32 = 5;
    /// Lanes on the racer road
    pub const LANE_COUNT: u8 = 3;
}
