//! Per-combatant state
//!
//! Mutable resource state for one actor. All mutation is routed through the
//! session's apply-delta function or the phase machine; external observers
//! only ever see immutable snapshots.

use serde::{Deserialize, Serialize};

use crate::combat::action::{ActionPhase, InFlightAction};
use crate::core::types::{ActorId, Btu, Facing, Team};

/// Everything needed to add a combatant to a session
///
/// Team, starting position and facing are assigned by the session from the
/// join order; the spec only carries the combatant's own numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub name: String,
    pub max_health: u32,
    pub max_stamina: u32,
    pub max_blocking_power: u32,
    /// Stamina restored when an ordinary recovery completes
    pub stamina_regen: u32,
    pub attack_power: u32,
    /// Distance covered by one movement action
    pub mobility: f32,
    /// Inclusive distance band inside which this actor's attacks connect
    pub attack_range: (f32, f32),
    /// Action speed factor; phase durations are divided by this
    pub speed: f32,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_health: 100,
            max_stamina: 100,
            max_blocking_power: 30,
            stamina_regen: 10,
            attack_power: 25,
            mobility: 5.0,
            attack_range: (0.0, 10.0),
            speed: 1.0,
        }
    }
}

/// Live state of one combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    pub name: String,
    pub team: Team,
    pub health: u32,
    pub max_health: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub blocking_power: u32,
    pub max_blocking_power: u32,
    pub stamina_regen: u32,
    pub attack_power: u32,
    pub mobility: f32,
    pub attack_range: (f32, f32),
    pub speed: f32,
    /// Scalar coordinate on the duel line, within [0, max_distance]
    pub position: f32,
    pub facing: Facing,
    pub current_action: Option<InFlightAction>,
}

impl ActorState {
    pub fn from_spec(id: ActorId, team: Team, position: f32, facing: Facing, spec: ActorSpec) -> Self {
        Self {
            id,
            name: spec.name,
            team,
            health: spec.max_health,
            max_health: spec.max_health,
            stamina: spec.max_stamina,
            max_stamina: spec.max_stamina,
            blocking_power: spec.max_blocking_power,
            max_blocking_power: spec.max_blocking_power,
            stamina_regen: spec.stamina_regen,
            attack_power: spec.attack_power,
            mobility: spec.mobility,
            attack_range: spec.attack_range,
            speed: spec.speed,
            position,
            facing,
            current_action: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Eligible to submit a brand-new action?
    pub fn is_idle(&self) -> bool {
        self.current_action.is_none()
    }

    /// Is this actor's current action in the given phase?
    pub fn in_phase(&self, phase: ActionPhase) -> bool {
        self.current_action.map(|a| a.phase) == Some(phase)
    }

    /// Does the actor's facing point toward the given coordinate?
    pub fn is_facing(&self, target_position: f32) -> bool {
        match self.facing {
            Facing::Right => target_position >= self.position,
            Facing::Left => target_position <= self.position,
        }
    }

    /// Is the given coordinate inside this actor's attack band?
    pub fn in_attack_range(&self, target_position: f32) -> bool {
        let distance = (target_position - self.position).abs();
        self.attack_range.0 <= distance && distance <= self.attack_range.1
    }

    /// Deduct stamina, clamping at zero
    pub fn spend_stamina(&mut self, amount: u32) {
        self.stamina = self.stamina.saturating_sub(amount);
    }

    /// Restore stamina up to the maximum
    pub fn restore_stamina(&mut self, amount: u32) {
        self.stamina = (self.stamina + amount).min(self.max_stamina);
    }

    /// Immutable copy for external observers
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            health: self.health,
            max_health: self.max_health,
            stamina: self.stamina,
            max_stamina: self.max_stamina,
            blocking_power: self.blocking_power,
            max_blocking_power: self.max_blocking_power,
            attack_range: self.attack_range,
            mobility: self.mobility,
            position: self.position,
            facing: self.facing,
            current_action: self.current_action.map(|a| InFlightSnapshot {
                action: a.action,
                phase: a.phase,
                recovery: a.recovery,
                phase_ends_at: a.phase_ends_at,
                target: a.target,
            }),
        }
    }
}

/// Read-only view of an in-flight action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InFlightSnapshot {
    pub action: crate::catalog::ActionId,
    pub phase: ActionPhase,
    pub recovery: Option<crate::combat::action::RecoveryKind>,
    pub phase_ends_at: Btu,
    pub target: Option<ActorId>,
}

/// Read-only view of one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub team: Team,
    pub health: u32,
    pub max_health: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub blocking_power: u32,
    pub max_blocking_power: u32,
    pub attack_range: (f32, f32),
    pub mobility: f32,
    pub position: f32,
    pub facing: Facing,
    pub current_action: Option<InFlightSnapshot>,
}


#[cfg(test)]
mod tests {
    use super::test_support::test_actor;
    use super::*;

    #[test]
    fn test_stamina_clamps_at_bounds() {
        let mut actor = test_actor(0);
        actor.stamina = 10;
        actor.spend_stamina(25);
        assert_eq!(actor.stamina, 0);
        actor.restore_stamina(actor.max_stamina + 50);
        assert_eq!(actor.stamina, actor.max_stamina);
    }

    #[test]
    fn test_facing_checks() {
        let mut actor = test_actor(0);
        actor.position = 50.0;
        actor.facing = Facing::Right;
        assert!(actor.is_facing(80.0));
        assert!(!actor.is_facing(20.0));
        actor.facing = Facing::Left;
        assert!(actor.is_facing(20.0));
    }

    #[test]
    fn test_attack_range_band() {
        let mut actor = test_actor(0);
        actor.attack_range = (2.0, 10.0);
        actor.position = 40.0;
        assert!(!actor.in_attack_range(41.0)); // too close
        assert!(actor.in_attack_range(45.0));
        assert!(actor.in_attack_range(30.0)); // band is symmetric
        assert!(!actor.in_attack_range(60.0)); // too far
    }
}
