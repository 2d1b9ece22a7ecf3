//! Action catalog
//!
//! Static registry of every action the engine knows how to resolve. The
//! catalog is built once at startup (defaults in code, optional TOML
//! overrides) and treated as read-only for the lifetime of the process.

pub mod loader;
pub mod schema;

use serde::{Deserialize, Serialize};

use crate::combat::ActionPhase;
use crate::core::error::CatalogError;
use crate::core::types::Btu;

/// Unique action identifier
///
/// A closed set: dispatch is on the tagged variant, while the numbers that
/// drive each action (duration, cost, damage) stay data-driven through the
/// catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    QuickAttack,
    HeavyAttack,
    Block,
    Parry,
    Evade,
    Advance,
    Retreat,
    TurnAround,
    Recover,
}

impl ActionId {
    pub const ALL: [ActionId; 9] = [
        ActionId::QuickAttack,
        ActionId::HeavyAttack,
        ActionId::Block,
        ActionId::Parry,
        ActionId::Evade,
        ActionId::Advance,
        ActionId::Retreat,
        ActionId::TurnAround,
        ActionId::Recover,
    ];

    /// Catalog key as it appears in TOML files
    pub fn name(&self) -> &'static str {
        match self {
            ActionId::QuickAttack => "quick_attack",
            ActionId::HeavyAttack => "heavy_attack",
            ActionId::Block => "block",
            ActionId::Parry => "parry",
            ActionId::Evade => "evade",
            ActionId::Advance => "advance",
            ActionId::Retreat => "retreat",
            ActionId::TurnAround => "turn_around",
            ActionId::Recover => "recover",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad class of an action, used for resolution precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Neutral,
    Movement,
    Defense,
    Evasion,
    Attack,
}

impl ActionCategory {
    /// Resolution priority among events due at the same BTU
    ///
    /// Lower resolves first: attacks land before defenses settle, defenses
    /// before evasions, and so on. This ordering is a correctness rule, not a
    /// tuning knob.
    pub fn base_priority(&self) -> u8 {
        match self {
            ActionCategory::Attack => 0,
            ActionCategory::Defense => 1,
            ActionCategory::Evasion => 2,
            ActionCategory::Movement => 3,
            ActionCategory::Neutral => 4,
        }
    }
}

/// Immutable definition of a single action
///
/// Durations are whole BTUs; the phase split is derived (see
/// [`ActionDefinition::phase_duration`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub category: ActionCategory,
    /// Total duration across all four phases (BTU, > 0)
    pub duration: Btu,
    /// Full stamina cost of carrying the action through to release
    pub stamina_cost: u32,
    /// Tie-break rank among simultaneous completions (lower first)
    pub priority: u8,
    /// May the actor still back out after committing?
    pub cancellable_commit: bool,
    /// Extra stamina charged for a commit-phase cancel
    pub cancel_penalty: u32,
    /// Multiplier on the attacker's attack_power (attacks only)
    pub damage_factor: f32,
    /// Stamina restored on completion (recover only)
    pub stamina_restore: u32,
    /// Blocking power restored on completion (recover only)
    pub guard_restore: u32,
}

// Share of the total duration spent in each phase.
const FEINT_SHARE: f64 = 0.25;
const COMMIT_SHARE: f64 = 0.25;
const RELEASE_SHARE: f64 = 0.30;
const RECOVERY_SHARE: f64 = 0.20;

impl ActionDefinition {
    /// Duration of one phase of this action
    ///
    /// Every phase lasts at least 1 BTU so phase completions are always
    /// strictly later than their scheduling point.
    pub fn phase_duration(&self, phase: ActionPhase) -> Btu {
        let share = match phase {
            ActionPhase::Feint => FEINT_SHARE,
            ActionPhase::Commit => COMMIT_SHARE,
            ActionPhase::Release => RELEASE_SHARE,
            ActionPhase::Recovery => RECOVERY_SHARE,
        };
        (((self.duration as f64) * share).trunc() as Btu).max(1)
    }

    /// Recovery duration when the actor ends up off balance
    ///
    /// Punitive: half again as long as an ordinary recovery.
    pub fn off_balance_duration(&self) -> Btu {
        self.phase_duration(ActionPhase::Recovery) * 3 / 2
    }

    /// Stamina deducted when the feint begins
    ///
    /// Attacks telegraph half their cost up front; everything else is free to
    /// feint and pays on commit.
    pub fn feint_cost(&self) -> u32 {
        match self.category {
            ActionCategory::Attack => self.stamina_cost / 2,
            _ => 0,
        }
    }

    /// Remainder deducted on the feint -> commit transition
    pub fn commit_cost(&self) -> u32 {
        self.stamina_cost - self.feint_cost()
    }

    pub fn is_attack(&self) -> bool {
        self.category == ActionCategory::Attack
    }
}

/// Read-only lookup table of action definitions
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    entries: ahash::AHashMap<ActionId, ActionDefinition>,
}

impl ActionCatalog {
    /// The built-in catalog
    ///
    /// Durations are nominal wall-clock tunings (800 ms quick attack, 1.5 s
    /// heavy attack, ...) converted to BTU.
    pub fn builtin() -> Self {
        let defs = [
            ActionDefinition {
                id: ActionId::QuickAttack,
                category: ActionCategory::Attack,
                duration: 80,
                stamina_cost: 15,
                priority: ActionCategory::Attack.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 7,
                damage_factor: 0.8,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::HeavyAttack,
                category: ActionCategory::Attack,
                duration: 150,
                stamina_cost: 30,
                priority: ActionCategory::Attack.base_priority(),
                // A heavy swing is full commitment: no backing out
                cancellable_commit: false,
                cancel_penalty: 0,
                damage_factor: 1.5,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::Block,
                category: ActionCategory::Defense,
                duration: 100,
                stamina_cost: 10,
                priority: ActionCategory::Defense.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                // Shorter guard window than block, at a steeper price
                id: ActionId::Parry,
                category: ActionCategory::Defense,
                duration: 50,
                stamina_cost: 20,
                priority: ActionCategory::Defense.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::Evade,
                category: ActionCategory::Evasion,
                duration: 40,
                stamina_cost: 15,
                priority: ActionCategory::Evasion.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::Advance,
                category: ActionCategory::Movement,
                duration: 50,
                stamina_cost: 5,
                priority: ActionCategory::Movement.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::Retreat,
                category: ActionCategory::Movement,
                duration: 60,
                stamina_cost: 5,
                priority: ActionCategory::Movement.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::TurnAround,
                category: ActionCategory::Movement,
                duration: 30,
                stamina_cost: 3,
                priority: ActionCategory::Movement.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 0,
                guard_restore: 0,
            },
            ActionDefinition {
                id: ActionId::Recover,
                category: ActionCategory::Neutral,
                duration: 150,
                stamina_cost: 0,
                priority: ActionCategory::Neutral.base_priority(),
                cancellable_commit: true,
                cancel_penalty: 0,
                damage_factor: 0.0,
                stamina_restore: 20,
                guard_restore: 10,
            },
        ];

        let entries = defs.into_iter().map(|d| (d.id, d)).collect();
        Self { entries }
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDefinition> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.entries.values()
    }

    /// Replace an entry, validating its invariants
    pub(crate) fn insert(&mut self, def: ActionDefinition) -> Result<(), CatalogError> {
        if def.duration == 0 {
            return Err(CatalogError::ZeroDuration(def.id));
        }
        self.entries.insert(def.id, def);
        Ok(())
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_complete() {
        let catalog = ActionCatalog::builtin();
        for id in ActionId::ALL {
            let def = catalog.get(id).expect("builtin entry missing");
            assert!(def.duration > 0);
        }
    }

    #[test]
    fn test_phase_durations_cover_action() {
        let catalog = ActionCatalog::builtin();
        let quick = catalog.get(ActionId::QuickAttack).unwrap();
        assert_eq!(quick.phase_duration(ActionPhase::Feint), 20);
        assert_eq!(quick.phase_duration(ActionPhase::Commit), 20);
        assert_eq!(quick.phase_duration(ActionPhase::Release), 24);
        assert_eq!(quick.phase_duration(ActionPhase::Recovery), 16);
    }

    #[test]
    fn test_phase_duration_floors_at_one() {
        let mut def = ActionCatalog::builtin()
            .get(ActionId::TurnAround)
            .unwrap()
            .clone();
        def.duration = 2;
        for phase in [
            ActionPhase::Feint,
            ActionPhase::Commit,
            ActionPhase::Release,
            ActionPhase::Recovery,
        ] {
            assert!(def.phase_duration(phase) >= 1);
        }
    }

    #[test]
    fn test_parry_is_a_short_costly_guard() {
        let catalog = ActionCatalog::builtin();
        let parry = catalog.get(ActionId::Parry).unwrap();
        let block = catalog.get(ActionId::Block).unwrap();
        assert_eq!(parry.category, ActionCategory::Defense);
        assert_eq!(parry.duration, 50);
        assert_eq!(parry.stamina_cost, 20);
        assert!(parry.duration < block.duration);
    }

    #[test]
    fn test_attack_splits_cost_between_feint_and_commit() {
        let catalog = ActionCatalog::builtin();
        let heavy = catalog.get(ActionId::HeavyAttack).unwrap();
        assert_eq!(heavy.feint_cost() + heavy.commit_cost(), heavy.stamina_cost);
        assert_eq!(heavy.feint_cost(), 15);

        let block = catalog.get(ActionId::Block).unwrap();
        assert_eq!(block.feint_cost(), 0);
        assert_eq!(block.commit_cost(), block.stamina_cost);
    }

    #[test]
    fn test_category_priority_ordering() {
        assert!(ActionCategory::Attack.base_priority() < ActionCategory::Defense.base_priority());
        assert!(ActionCategory::Defense.base_priority() < ActionCategory::Evasion.base_priority());
        assert!(ActionCategory::Evasion.base_priority() < ActionCategory::Movement.base_priority());
        assert!(ActionCategory::Movement.base_priority() < ActionCategory::Neutral.base_priority());
    }
}
