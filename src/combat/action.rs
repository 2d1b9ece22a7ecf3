//! Action lifecycle state machine
//!
//! A single in-flight action moves feint -> commit -> release -> recovery.
//! Feints are cheap to abandon, commits can only be abandoned when the
//! definition allows it (at a penalty), releases always run to resolution.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionDefinition, ActionId};
use crate::combat::actor::ActorState;
use crate::core::error::TransitionError;
use crate::core::types::{ActorId, Btu};

/// Phase of an in-flight action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Telegraphing; cancellable for free
    Feint,
    /// Locked in; cancellable only if the definition permits, at a penalty
    Commit,
    /// Executing; runs to resolution unconditionally
    Release,
    /// Winding down; the actor becomes eligible again when this elapses
    Recovery,
}

impl ActionPhase {
    /// Phases this phase may transition into
    pub fn allowed_next(&self) -> &'static [ActionPhase] {
        match self {
            ActionPhase::Feint => &[ActionPhase::Commit, ActionPhase::Recovery],
            ActionPhase::Commit => &[ActionPhase::Release, ActionPhase::Recovery],
            ActionPhase::Release => &[ActionPhase::Recovery],
            ActionPhase::Recovery => &[],
        }
    }
}

/// How an action ended up in its recovery phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryKind {
    /// Ordinary wind-down; stamina regenerates on completion
    Reset,
    /// Punitive: longer, and no stamina regen (failed or countered attack)
    OffBalance,
    /// The actor backed out before release
    Cancelled,
}

/// A single action instance in flight for one actor
///
/// Exactly one per actor at any time, or none. Replaced wholesale on each
/// phase transition; cleared when recovery completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InFlightAction {
    pub action: ActionId,
    pub phase: ActionPhase,
    /// Set when the phase reaches Recovery
    pub recovery: Option<RecoveryKind>,
    /// Clock value when the action was submitted
    pub start_time: Btu,
    /// Clock value when the current phase completes
    pub phase_ends_at: Btu,
    pub target: Option<ActorId>,
    /// Stale-event guard: bumped every time a new completion is scheduled
    pub generation: u64,
}

/// Validate a phase transition against the machine and the actor's resources
///
/// Checks only; the caller deducts costs atomically with the phase change so
/// a rejected transition never mutates state.
pub fn validate_transition(
    current: ActionPhase,
    requested: ActionPhase,
    actor: &ActorState,
    def: &ActionDefinition,
) -> Result<(), TransitionError> {
    if !current.allowed_next().contains(&requested) {
        return Err(TransitionError::IllegalTransition {
            from: current,
            to: requested,
        });
    }

    // Commit-phase cancels are gated by the definition, not by stamina: the
    // penalty is punitive and clamps at zero.
    if current == ActionPhase::Commit
        && requested == ActionPhase::Recovery
        && !def.cancellable_commit
    {
        return Err(TransitionError::IllegalTransition {
            from: current,
            to: requested,
        });
    }

    let cost = transition_cost(current, requested, def);
    if cost > 0 && actor.stamina < cost {
        return Err(TransitionError::InsufficientStamina {
            actor: actor.id,
            action: def.id,
            required: cost,
            available: actor.stamina,
        });
    }

    Ok(())
}

/// Incremental stamina cost of a transition
///
/// The feint cost is charged at submission; the remainder lands on commit.
/// Cancel penalties are handled by the caller because they clamp rather than
/// gate.
pub fn transition_cost(current: ActionPhase, requested: ActionPhase, def: &ActionDefinition) -> u32 {
    match (current, requested) {
        (ActionPhase::Feint, ActionPhase::Commit) => def.commit_cost(),
        _ => 0,
    }
}
