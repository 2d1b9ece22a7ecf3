//! Combat engine
//!
//! Combat is pressure and timing, not turns. Every action moves through the
//! four-phase lifecycle (feint, commit, release, recovery) on a shared
//! discrete clock; the scheduler orders phase completions deterministically
//! and the resolver turns release completions into state deltas that the
//! session applies atomically.

pub mod action;
pub mod actor;
pub mod delta;
pub mod log;
pub mod resolver;
pub mod scheduler;
pub mod session;

pub use action::{validate_transition, ActionPhase, InFlightAction, RecoveryKind};
pub use actor::{ActorSnapshot, ActorSpec, ActorState, InFlightSnapshot};
pub use delta::{ActorPatch, StateDelta};
pub use log::{LogEntry, ResultLog};
pub use resolver::Outcome;
pub use scheduler::{EventQueue, ScheduledEvent};
pub use session::{CombatSession, RoundReport, SessionOutcome, SessionPhase, SessionView};
