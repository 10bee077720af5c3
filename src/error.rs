use thiserror::Error;

/// Failures raised while building a game round.
///
/// Nothing inside a running round returns an error: post-termination ticks and
/// stale frame callbacks are no-ops instead.
#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ArcadeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ArcadeError::InvalidSettings(reason.into())
    }
}
