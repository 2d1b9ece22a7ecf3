//! Property tests over random submission streams
//!
//! Whatever garbage the decision layer throws at a session, the engine
//! invariants must hold after every processed event: resources stay within
//! [0, max], positions stay inside the arena, and the session never faults.

use duelcore::catalog::{ActionCatalog, ActionId};
use duelcore::combat::{ActorSpec, CombatSession, LogEntry, SessionPhase};
use duelcore::core::config::SessionConfig;
use duelcore::core::types::ActorId;
use proptest::prelude::*;

/// (actor index, action index, process rounds before next submission)
fn arbitrary_script() -> impl Strategy<Value = Vec<(bool, u8, u8)>> {
    let actions = ActionId::ALL.len() as u8;
    prop::collection::vec((any::<bool>(), 0u8..actions, 0u8..6), 0..40)
}

fn new_session(starting_distance: f32) -> (CombatSession, [ActorId; 2]) {
    let config = SessionConfig {
        starting_distance,
        ..SessionConfig::default()
    };
    let mut session = CombatSession::new(config, ActionCatalog::builtin());
    let a = session
        .add_actor(ActorSpec {
            name: "left".into(),
            ..ActorSpec::default()
        })
        .unwrap();
    let b = session
        .add_actor(ActorSpec {
            name: "right".into(),
            ..ActorSpec::default()
        })
        .unwrap();
    session.start().unwrap();
    (session, [a, b])
}

fn check_invariants(session: &CombatSession) -> Result<(), TestCaseError> {
    prop_assert_ne!(session.phase(), SessionPhase::Faulted);
    for id in session.roster().to_vec() {
        let snap = session.actor_snapshot(id).unwrap();
        prop_assert!(snap.health <= snap.max_health);
        prop_assert!(snap.stamina <= snap.max_stamina);
        prop_assert!(snap.blocking_power <= snap.max_blocking_power);
        prop_assert!(snap.position.is_finite());
        prop_assert!(snap.position >= 0.0);
        prop_assert!(snap.position <= session.config().max_distance);
    }
    Ok(())
}

fn run_script(
    script: &[(bool, u8, u8)],
    starting_distance: f32,
) -> Result<CombatSession, TestCaseError> {
    let (mut session, actors) = new_session(starting_distance);
    for (first, action_idx, rounds) in script {
        let actor = actors[usize::from(!*first)];
        let foe = actors[usize::from(*first)];
        let action = ActionId::ALL[*action_idx as usize];
        let target = matches!(action, ActionId::QuickAttack | ActionId::HeavyAttack)
            .then_some(foe);
        // Rejections are part of the contract; only faults would matter.
        let _ = session.submit_action(actor, action, target);
        for _ in 0..*rounds {
            session.process_round().map_err(|fault| {
                TestCaseError::fail(format!("session faulted: {fault}"))
            })?;
            check_invariants(&session)?;
        }
    }
    session.run_pending().map_err(|fault| {
        TestCaseError::fail(format!("session faulted at drain: {fault}"))
    })?;
    check_invariants(&session)?;
    Ok(session)
}

#[test]
fn random_scripts_never_violate_actor_invariants() {
    proptest!(|(script in arbitrary_script(), distance in 0.0f32..100.0)| {
        run_script(&script, distance)?;
    });
}

#[test]
fn cancelled_actions_never_resolve() {
    proptest!(|(rounds in 0u8..3)| {
        let (mut session, [a, b]) = new_session(5.0);
        session.submit_action(a, ActionId::QuickAttack, Some(b)).unwrap();
        for _ in 0..rounds {
            session.process_round().unwrap();
        }
        // A quick attack is cancellable through feint and commit; its release
        // starts only after two completions.
        if session.cancel_action(a).is_ok() {
            session.run_pending().unwrap();
            let resolved_by_a = session.log().iter().any(|e| {
                matches!(e, LogEntry::Resolved { actor, .. } if *actor == a)
            });
            prop_assert!(!resolved_by_a);
        }
    });
}

#[test]
fn clock_is_monotonic() {
    proptest!(|(script in arbitrary_script())| {
        let (mut session, actors) = new_session(10.0);
        let mut last = session.clock();
        for (first, action_idx, rounds) in &script {
            let actor = actors[usize::from(!*first)];
            let foe = actors[usize::from(*first)];
            let action = ActionId::ALL[*action_idx as usize];
            let target = matches!(action, ActionId::QuickAttack | ActionId::HeavyAttack)
                .then_some(foe);
            let _ = session.submit_action(actor, action, target);
            for _ in 0..*rounds {
                session.process_round().unwrap();
                prop_assert!(session.clock() >= last);
                last = session.clock();
            }
        }
    });
}
