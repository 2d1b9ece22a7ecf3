//! Determinism guarantees
//!
//! Identical inputs must yield identical sessions. The serialized log is the
//! strongest observable: if two runs agree byte for byte, every intermediate
//! resolution agreed too.

use duelcore::catalog::{ActionCatalog, ActionId};
use duelcore::combat::{ActorSpec, CombatSession, SessionOutcome};
use duelcore::core::config::SessionConfig;
use duelcore::core::types::ActorId;
use duelcore::decision::{drive, ActionRequest, BaselineProvider, DecisionProvider, ScriptedProvider};

fn new_session() -> (CombatSession, ActorId, ActorId) {
    let config = SessionConfig {
        starting_distance: 8.0,
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
    (session, a, b)
}

fn duel_script(me: ActorId, foe: ActorId) -> ScriptedProvider {
    ScriptedProvider::new([
        ActionRequest::aimed(ActionId::QuickAttack, foe),
        ActionRequest::new(ActionId::Block),
        ActionRequest::aimed(ActionId::HeavyAttack, foe),
        ActionRequest::new(ActionId::Evade),
        ActionRequest::new(ActionId::Recover),
        ActionRequest::aimed(ActionId::QuickAttack, foe),
        ActionRequest::new(if me < foe { ActionId::Advance } else { ActionId::Retreat }),
    ])
}

fn run_scripted() -> (SessionOutcome, u64, String) {
    let (mut session, a, b) = new_session();
    let mut left = duel_script(a, b);
    let mut right = duel_script(b, a);
    let outcome = drive(
        &mut session,
        &mut [(a, &mut left as &mut dyn DecisionProvider), (b, &mut right)],
    )
    .unwrap();
    let log = serde_json::to_string(&session.log().entries()).unwrap();
    (outcome, session.clock(), log)
}

#[test]
fn test_scripted_runs_are_byte_identical() {
    let (outcome_1, clock_1, log_1) = run_scripted();
    let (outcome_2, clock_2, log_2) = run_scripted();
    assert_eq!(outcome_1, outcome_2);
    assert_eq!(clock_1, clock_2);
    assert_eq!(log_1, log_2);
}

#[test]
fn test_baseline_duels_are_reproducible() {
    let run = || {
        let (mut session, a, b) = new_session();
        let mut left = BaselineProvider::new();
        let mut right = BaselineProvider::new();
        let outcome = drive(
            &mut session,
            &mut [(a, &mut left as &mut dyn DecisionProvider), (b, &mut right)],
        )
        .unwrap();
        let log = serde_json::to_string(&session.log().entries()).unwrap();
        (outcome, session.clock(), log)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_log_survives_serde_round_trip() {
    let (mut session, a, b) = new_session();
    session.submit_action(a, ActionId::QuickAttack, Some(b)).unwrap();
    session.submit_action(b, ActionId::Block, None).unwrap();
    session.run_pending().unwrap();

    let entries = session.log().entries();
    let json = serde_json::to_string(&entries).unwrap();
    let back: Vec<duelcore::combat::LogEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(entries, back);
}
