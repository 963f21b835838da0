/// Error types for the fallible edges of the crate.
///
/// The per-frame tick never fails; everything here belongs to loading
/// configuration, decoding question payloads and talking to the outside
/// collaborators.
use thiserror::Error;

/// A game profile that cannot drive a simulation.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("max_hostiles must be at least 1")]
    NoHostileSlots,
    #[error("spawn band is empty: inner radius {inner} must be below outer radius {outer}")]
    EmptySpawnBand { inner: f32, outer: f32 },
    #[error("spawn inner radius {inner} would place hostiles inside the contact radius {contact}")]
    SpawnInsideContact { inner: f32, contact: f32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be at least 1 when set")]
    ZeroCount { field: &'static str },
    #[error("profile file could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A question payload that cannot be normalised.
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question {prompt:?} has no options")]
    NoOptions { prompt: String },
    #[error("question {prompt:?} marks option {index} as correct but only has {len} options")]
    CorrectOutOfRange {
        prompt: String,
        index: usize,
        len: usize,
    },
    #[error("question payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("question source unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Payload(#[from] QuestionError),
    #[error("{0} worker has shut down")]
    Disconnected(&'static str),
}

/// The session token threading the mini-games together is missing.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session found; complete the emotion check-in first")]
    Missing,
}

/// Top-level error surfaced by the terminal demo.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
