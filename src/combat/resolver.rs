//! Release resolution
//!
//! Converts a release-phase completion into an outcome and a state delta.
//! Resolution is pure: it reads live actor state and produces absolute
//! post-resolution values; the session applies them atomically.
//!
//! Attack precedence is fixed and must not be reordered — range gates
//! everything, evasion beats blocking, blocking beats a clean hit. That
//! hierarchy is the game's tactical grammar, not an implementation choice.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionCategory, ActionDefinition, ActionId};
use crate::combat::action::{ActionPhase, RecoveryKind};
use crate::combat::actor::ActorState;
use crate::combat::delta::{ActorPatch, StateDelta};
use crate::core::types::Facing;

/// What a completed release amounted to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Attack connected with no active defense in the way
    Hit { damage: u32 },
    /// Attack fully absorbed by the target's guard
    Blocked { absorbed: u32 },
    /// Attack overwhelmed the guard; the overflow passed through
    Breached { overflow: u32 },
    /// Target's evasion window was open
    Evaded,
    /// Target out of range or attacker facing the wrong way
    Missed,
    /// Movement completed
    Moved { from: f32, to: f32 },
    /// Facing flipped
    TurnedAround { facing: Facing },
    /// Guard window elapsed without absorbing anything
    GuardHeld,
    /// Evasion window elapsed without being tested
    EvasionSpent,
    /// Breather completed; resources restored
    Recovered { stamina: u32, guard: u32 },
}

/// Is this in-flight action an open evasion window?
fn evasion_active(target: &ActorState, catalog_category: impl Fn(ActionId) -> Option<ActionCategory>) -> bool {
    target
        .current_action
        .filter(|a| a.phase == ActionPhase::Release)
        .and_then(|a| catalog_category(a.action))
        .map(|c| c == ActionCategory::Evasion)
        .unwrap_or(false)
}

/// Is this in-flight action an active guard?
fn defense_active(target: &ActorState, catalog_category: impl Fn(ActionId) -> Option<ActionCategory>) -> bool {
    target
        .current_action
        .filter(|a| a.phase == ActionPhase::Release)
        .and_then(|a| catalog_category(a.action))
        .map(|c| c == ActionCategory::Defense)
        .unwrap_or(false)
}

/// Resolve an attack release against the live target state
///
/// Precedence: range -> evasion -> block -> breach -> hit. All resource
/// results clamp at zero.
pub fn resolve_attack(
    def: &ActionDefinition,
    attacker: &ActorState,
    target: &ActorState,
    category_of: impl Fn(ActionId) -> Option<ActionCategory>,
) -> (Outcome, StateDelta) {
    let damage = (attacker.attack_power as f32 * def.damage_factor).trunc() as u32;

    // 1. Range and facing. A whiff leaves the attacker off balance and the
    //    target untouched.
    if !attacker.in_attack_range(target.position) || !attacker.is_facing(target.position) {
        return (
            Outcome::Missed,
            StateDelta::single(ActorPatch::with_recovery(
                attacker.id,
                RecoveryKind::OffBalance,
            )),
        );
    }

    // 2. An open evasion window beats everything else.
    if evasion_active(target, &category_of) {
        return (
            Outcome::Evaded,
            StateDelta::pair(
                ActorPatch::with_recovery(target.id, RecoveryKind::Reset),
                ActorPatch::with_recovery(attacker.id, RecoveryKind::OffBalance),
            ),
        );
    }

    // 3/4. An active guard absorbs up to its blocking power.
    if defense_active(target, &category_of) {
        if target.blocking_power >= damage {
            let target_patch = ActorPatch {
                blocking_power: Some(target.blocking_power - damage),
                ..ActorPatch::with_recovery(target.id, RecoveryKind::Reset)
            };
            return (
                Outcome::Blocked { absorbed: damage },
                StateDelta::pair(
                    target_patch,
                    ActorPatch::with_recovery(attacker.id, RecoveryKind::OffBalance),
                ),
            );
        }

        let overflow = damage - target.blocking_power;
        let target_patch = ActorPatch {
            blocking_power: Some(0),
            health: Some(target.health.saturating_sub(overflow)),
            ..ActorPatch::with_recovery(target.id, RecoveryKind::Reset)
        };
        return (
            Outcome::Breached { overflow },
            StateDelta::pair(
                target_patch,
                ActorPatch::with_recovery(attacker.id, RecoveryKind::Reset),
            ),
        );
    }

    // 5. Clean hit; interrupts whatever the target was doing.
    let target_patch = ActorPatch {
        health: Some(target.health.saturating_sub(damage)),
        ..ActorPatch::with_recovery(target.id, RecoveryKind::Reset)
    };
    (
        Outcome::Hit { damage },
        StateDelta::pair(
            target_patch,
            ActorPatch::with_recovery(attacker.id, RecoveryKind::Reset),
        ),
    )
}

/// Resolve a non-attack release
///
/// Deterministic, no branching on the opponent: movement shifts position
/// along the facing axis, recovery restores resources, guard and evasion
/// windows simply close.
pub fn resolve_self(def: &ActionDefinition, owner: &ActorState, max_distance: f32) -> (Outcome, StateDelta) {
    let reset = ActorPatch::with_recovery(owner.id, RecoveryKind::Reset);

    match def.id {
        ActionId::Advance | ActionId::Retreat => {
            let step = match (def.id, owner.facing) {
                (ActionId::Advance, Facing::Right) | (ActionId::Retreat, Facing::Left) => {
                    owner.mobility
                }
                _ => -owner.mobility,
            };
            let to = (owner.position + step).clamp(0.0, max_distance);
            (
                Outcome::Moved {
                    from: owner.position,
                    to,
                },
                StateDelta::single(ActorPatch {
                    position: Some(to),
                    ..reset
                }),
            )
        }
        ActionId::TurnAround => {
            let facing = owner.facing.flipped();
            (
                Outcome::TurnedAround { facing },
                StateDelta::single(ActorPatch {
                    facing: Some(facing),
                    ..reset
                }),
            )
        }
        ActionId::Recover => {
            let stamina = (owner.stamina + def.stamina_restore).min(owner.max_stamina);
            let guard = (owner.blocking_power + def.guard_restore).min(owner.max_blocking_power);
            (
                Outcome::Recovered {
                    stamina: stamina - owner.stamina,
                    guard: guard - owner.blocking_power,
                },
                StateDelta::single(ActorPatch {
                    stamina: Some(stamina),
                    blocking_power: Some(guard),
                    ..reset
                }),
            )
        }
        ActionId::Block | ActionId::Parry => (Outcome::GuardHeld, StateDelta::single(reset)),
        ActionId::Evade => (Outcome::EvasionSpent, StateDelta::single(reset)),
        // Attacks are resolved by resolve_attack; reaching here with one is a
        // session dispatch bug surfaced by the delta validator.
        ActionId::QuickAttack | ActionId::HeavyAttack => {
            (Outcome::Missed, StateDelta::single(reset))
        }
    }
}
