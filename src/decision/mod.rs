//! Decision providers
//!
//! The session never decides anything on its own; something outside has to
//! submit actions. A [`DecisionProvider`] is that something: given a read-only
//! view it names the next action for one actor. [`drive`] wires providers to a
//! session and runs the encounter to completion, declaring a timeout if both
//! sides go quiet.

use std::collections::VecDeque;

use crate::catalog::ActionId;
use crate::combat::{CombatSession, RoundReport, SessionOutcome, SessionView};
use crate::core::error::SessionFault;
use crate::core::types::{ActorId, Facing};

/// One desired submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionRequest {
    pub action: ActionId,
    pub target: Option<ActorId>,
}

impl ActionRequest {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            target: None,
        }
    }

    pub fn aimed(action: ActionId, target: ActorId) -> Self {
        Self {
            action,
            target: Some(target),
        }
    }
}

/// Chooses the next action for an actor whenever it goes idle
pub trait DecisionProvider {
    /// `None` means the actor deliberately waits this round
    fn decide(&mut self, view: &SessionView, actor: ActorId) -> Option<ActionRequest>;
}

/// Replays a fixed list of requests, then goes quiet
///
/// Useful for tests and for reproducing a recorded encounter: the provider
/// ignores the view entirely, so identical scripts give identical sessions.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: VecDeque<ActionRequest>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = ActionRequest>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DecisionProvider for ScriptedProvider {
    fn decide(&mut self, _view: &SessionView, _actor: ActorId) -> Option<ActionRequest> {
        self.script.pop_front()
    }
}

/// Reference duelist policy
///
/// Face the opponent, catch breath when winded, attack when in range,
/// otherwise close the distance. Deliberately greedy; it exists to exercise
/// the engine, not to win tournaments.
#[derive(Debug)]
pub struct BaselineProvider {
    /// Recover once stamina drops below this
    pub winded_threshold: u32,
    /// Prefer the heavy attack at or above this much stamina
    pub heavy_threshold: u32,
}

impl BaselineProvider {
    pub fn new() -> Self {
        Self {
            winded_threshold: 30,
            heavy_threshold: 60,
        }
    }
}

impl Default for BaselineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for BaselineProvider {
    fn decide(&mut self, view: &SessionView, actor: ActorId) -> Option<ActionRequest> {
        let me = view.actor(actor)?;
        let foe = view.opponent_of(actor)?;

        let facing_foe = match me.facing {
            Facing::Right => foe.position >= me.position,
            Facing::Left => foe.position <= me.position,
        };
        if !facing_foe {
            return Some(ActionRequest::new(ActionId::TurnAround));
        }

        if me.stamina < self.winded_threshold {
            return Some(ActionRequest::new(ActionId::Recover));
        }

        let distance = (foe.position - me.position).abs();
        let (near, far) = me.attack_range;
        if distance >= near && distance <= far {
            let action = if me.stamina >= self.heavy_threshold {
                ActionId::HeavyAttack
            } else {
                ActionId::QuickAttack
            };
            return Some(ActionRequest::aimed(action, foe.id));
        }
        if distance > far {
            Some(ActionRequest::new(ActionId::Advance))
        } else {
            Some(ActionRequest::new(ActionId::Retreat))
        }
    }
}

/// Run a session to completion under the given providers
///
/// Each pass offers every idle actor a decision, then drains the event queue.
/// If the queue runs dry and nobody submitted anything, the encounter is
/// declared a timeout rather than spinning forever.
pub fn drive(
    session: &mut CombatSession,
    providers: &mut [(ActorId, &mut dyn DecisionProvider)],
) -> Result<SessionOutcome, SessionFault> {
    loop {
        let view = session.snapshot();
        let mut submitted = false;
        for (actor, provider) in providers.iter_mut() {
            if !session.actor_is_idle(*actor) {
                continue;
            }
            if let Some(request) = provider.decide(&view, *actor) {
                if session
                    .submit_action(*actor, request.action, request.target)
                    .is_ok()
                {
                    submitted = true;
                }
            }
        }

        match session.run_pending()? {
            RoundReport::Terminated(outcome) => return Ok(outcome),
            RoundReport::Idle if !submitted => {
                if let RoundReport::Terminated(outcome) = session.force_timeout()? {
                    return Ok(outcome);
                }
            }
            RoundReport::Idle | RoundReport::Advanced { .. } => {}
        }
    }
}
