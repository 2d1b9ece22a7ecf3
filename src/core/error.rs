//! Engine error taxonomy
//!
//! Three failure families with distinct propagation rules:
//! - validation errors (`TransitionError`, `SubmissionError`) reject the
//!   offending request without mutating state,
//! - resolution faults are logged and the event is dropped as a no-op,
//! - session faults are fatal: the session parks in `Faulted` and stops
//!   applying events.

use thiserror::Error;

use crate::catalog::ActionId;
use crate::core::types::{ActorId, Btu};

/// Time base conversion failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    #[error("duration must not be negative: {0} ms")]
    InvalidDuration(i64),

    #[error("speed factor must be positive: {0}")]
    InvalidSpeed(f32),
}

/// Action catalog configuration failures
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("action {0:?} has zero duration")]
    ZeroDuration(ActionId),

    #[error("unknown action id in overrides: {0}")]
    UnknownAction(String),

    #[error("timing: {0}")]
    Timing(#[from] TimingError),

    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Illegal action-phase transitions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: crate::combat::ActionPhase,
        to: crate::combat::ActionPhase,
    },

    #[error("{actor} lacks stamina for {action:?}: needs {required}, has {available}")]
    InsufficientStamina {
        actor: ActorId,
        action: ActionId,
        required: u32,
        available: u32,
    },

    #[error("{0} already has an action in flight")]
    ActorBusy(ActorId),
}

/// Rejected action submissions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("session is not accepting actions")]
    SessionNotRunning,

    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),

    #[error("unknown action: {0:?}")]
    UnknownAction(ActionId),

    #[error("attack requires a target")]
    MissingTarget(ActionId),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Recoverable faults during event resolution; the event is dropped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFault {
    #[error("target {0} is not a live actor in this session")]
    UnknownTarget(ActorId),

    #[error("stale event for {owner} (generation {event_generation})")]
    StaleAction {
        owner: ActorId,
        event_generation: u64,
    },
}

/// Fatal session faults; the session stops applying events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionFault {
    #[error("resolver produced a corrupt delta for {actor}: {reason}")]
    CorruptDelta { actor: ActorId, reason: String },

    #[error("session is faulted at clock {0} and cannot continue")]
    Faulted(Btu),

    #[error("roster is full: a duel supports exactly two actors")]
    RosterFull,

    #[error("actors can only join before the session starts")]
    AlreadyStarted,

    #[error("invalid actor spec: {0}")]
    InvalidActorSpec(String),

    #[error("session needs two actors before starting")]
    RosterIncomplete,
}

/// Umbrella error for callers that do not care which family failed
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Timing(#[from] TimingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Session(#[from] SessionFault),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
