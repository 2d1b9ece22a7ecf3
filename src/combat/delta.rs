//! Transactional state deltas
//!
//! The resolver never mutates actors; it emits a [`StateDelta`] of absolute
//! post-resolution values. The session validates the whole delta against the
//! actor invariants and applies it all-or-nothing, so a resolver bug can
//! never leave shared state half-updated.

use serde::{Deserialize, Serialize};

use crate::combat::action::RecoveryKind;
use crate::core::types::{ActorId, Facing};

/// Prescribed changes for one actor
///
/// `None` fields are untouched. Values are absolute (already clamped by the
/// resolver); the session rejects any value outside [0, max] as corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorPatch {
    pub actor: ActorId,
    pub health: Option<u32>,
    pub stamina: Option<u32>,
    pub blocking_power: Option<u32>,
    pub position: Option<f32>,
    pub facing: Option<Facing>,
    /// Force the actor's in-flight action into recovery with this kind
    /// (interrupting it if it has not released yet). No-op for idle actors.
    pub recovery: Option<RecoveryKind>,
}

impl ActorPatch {
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            health: None,
            stamina: None,
            blocking_power: None,
            position: None,
            facing: None,
            recovery: None,
        }
    }

    pub fn with_recovery(actor: ActorId, kind: RecoveryKind) -> Self {
        Self {
            recovery: Some(kind),
            ..Self::new(actor)
        }
    }
}

/// The complete, atomic result of resolving one event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateDelta {
    pub patches: Vec<ActorPatch>,
}

impl StateDelta {
    pub fn single(patch: ActorPatch) -> Self {
        Self {
            patches: vec![patch],
        }
    }

    pub fn pair(a: ActorPatch, b: ActorPatch) -> Self {
        Self {
            patches: vec![a, b],
        }
    }
}
