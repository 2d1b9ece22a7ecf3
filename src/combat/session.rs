//! Combat session orchestration
//!
//! The session is the single writer: it owns the actor states, the event
//! queue and the result log, and every mutation flows through it. External
//! callers submit actions and read snapshots; the event loop itself is
//! synchronous and deterministic — identical submissions always produce an
//! identical log.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionCatalog, ActionDefinition, ActionId};
use crate::combat::action::{validate_transition, ActionPhase, InFlightAction, RecoveryKind};
use crate::combat::actor::{ActorSnapshot, ActorSpec, ActorState};
use crate::combat::delta::StateDelta;
use crate::combat::log::{LogEntry, ResultLog};
use crate::combat::resolver;
use crate::combat::scheduler::EventQueue;
use crate::core::config::SessionConfig;
use crate::core::error::{ResolutionFault, SessionFault, SubmissionError, TransitionError};
use crate::core::types::{ActorId, Btu, Facing, SessionId, Team};
use crate::timing;

/// Lifecycle of the whole encounter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Actors are being added
    Initializing,
    /// Event loop active
    Running,
    /// Victory, draw or timeout
    Terminated(SessionOutcome),
    /// An engine invariant was violated; no further events are applied
    Faulted,
}

/// How a terminated encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SessionOutcome {
    Victory { winner: ActorId },
    Draw,
    Timeout,
}

/// What a single `process_round` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundReport {
    /// Nothing due: the queue is empty and the session waits for submissions
    Idle,
    /// One event was consumed; the clock now stands at `time`
    Advanced { time: Btu },
    /// The session is terminal
    Terminated(SessionOutcome),
}

/// Immutable view of the whole session for observers and decision providers
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: SessionId,
    pub clock: Btu,
    pub phase: SessionPhase,
    pub distance: f32,
    pub max_distance: f32,
    pub actors: Vec<ActorSnapshot>,
}

impl SessionView {
    pub fn actor(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// The other combatant, from `id`'s point of view
    pub fn opponent_of(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|a| a.id != id)
    }
}

/// Top-level orchestrator for one bounded encounter
pub struct CombatSession {
    id: SessionId,
    config: SessionConfig,
    catalog: ActionCatalog,
    clock: Btu,
    actors: ahash::AHashMap<ActorId, ActorState>,
    /// Join order; deterministic iteration where the map would not be
    roster: Vec<ActorId>,
    queue: EventQueue,
    log: ResultLog,
    phase: SessionPhase,
    /// Stale-event guard; bumped for every scheduled completion
    next_generation: u64,
}

impl CombatSession {
    pub fn new(config: SessionConfig, catalog: ActionCatalog) -> Self {
        let config = config.normalized();
        let log = ResultLog::new(config.log_capacity);
        Self {
            id: SessionId::new(),
            config,
            catalog,
            clock: 0,
            actors: ahash::AHashMap::default(),
            roster: Vec::new(),
            queue: EventQueue::new(),
            log,
            phase: SessionPhase::Initializing,
            next_generation: 0,
        }
    }

    // === ROSTER ===

    /// Add a combatant; the first joins as challenger, the second as defender
    pub fn add_actor(&mut self, spec: ActorSpec) -> Result<ActorId, SessionFault> {
        if self.phase != SessionPhase::Initializing {
            return Err(SessionFault::AlreadyStarted);
        }
        if self.roster.len() >= 2 {
            return Err(SessionFault::RosterFull);
        }
        if !(spec.speed > 0.0) || !spec.speed.is_finite() {
            return Err(SessionFault::InvalidActorSpec(format!(
                "speed must be positive and finite, got {}",
                spec.speed
            )));
        }
        if !spec.mobility.is_finite() || spec.mobility < 0.0 {
            return Err(SessionFault::InvalidActorSpec(format!(
                "mobility must be non-negative, got {}",
                spec.mobility
            )));
        }

        let id = ActorId(self.roster.len() as u32);
        let (team, position, facing) = if self.roster.is_empty() {
            (Team::Challenger, 0.0, Facing::Right)
        } else {
            (Team::Defender, self.config.starting_distance, Facing::Left)
        };
        let state = ActorState::from_spec(id, team, position, facing, spec);
        self.actors.insert(id, state);
        self.roster.push(id);
        Ok(id)
    }

    /// Begin the encounter; requires a full roster
    pub fn start(&mut self) -> Result<(), SessionFault> {
        if self.phase != SessionPhase::Initializing {
            return Err(SessionFault::AlreadyStarted);
        }
        if self.roster.len() != 2 {
            return Err(SessionFault::RosterIncomplete);
        }
        self.phase = SessionPhase::Running;
        tracing::debug!(session = %self.id.0, "combat session running");
        Ok(())
    }

    // === DECISION INPUT ===

    /// Submit a new action for an actor
    ///
    /// Valid only when the actor is idle or its current action is still in a
    /// cancellable phase — in which case the old action is cancelled (with
    /// any commit penalty) and replaced. Rejections are recorded in the log
    /// and never mutate state.
    pub fn submit_action(
        &mut self,
        actor: ActorId,
        action: ActionId,
        target: Option<ActorId>,
    ) -> Result<(), SubmissionError> {
        match self.try_submit(actor, action, target) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(%actor, %action, %err, "submission rejected");
                self.log.push(LogEntry::Rejected {
                    time: self.clock,
                    actor,
                    action,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn try_submit(
        &mut self,
        actor_id: ActorId,
        action: ActionId,
        target: Option<ActorId>,
    ) -> Result<(), SubmissionError> {
        if self.phase != SessionPhase::Running {
            return Err(SubmissionError::SessionNotRunning);
        }
        let def = self
            .catalog
            .get(action)
            .cloned()
            .ok_or(SubmissionError::UnknownAction(action))?;
        let actor = self
            .actors
            .get(&actor_id)
            .ok_or(SubmissionError::UnknownActor(actor_id))?;

        if def.is_attack() {
            let target_id = target.ok_or(SubmissionError::MissingTarget(action))?;
            let live = self
                .actors
                .get(&target_id)
                .map(|t| t.is_alive())
                .unwrap_or(false);
            if target_id == actor_id || !live {
                return Err(SubmissionError::UnknownActor(target_id));
            }
        }

        let stamina = actor.stamina;
        let replaced = actor.current_action;

        // Replacement path: a feint is free to drop, a commit only if the
        // definition allows (penalty applies). Anything later is busy.
        let penalty = match replaced {
            None => 0,
            Some(current) => match current.phase {
                ActionPhase::Feint => 0,
                ActionPhase::Commit => {
                    let current_def = self.definition(current.action);
                    if !current_def.cancellable_commit {
                        return Err(TransitionError::ActorBusy(actor_id).into());
                    }
                    current_def.cancel_penalty
                }
                ActionPhase::Release | ActionPhase::Recovery => {
                    return Err(TransitionError::ActorBusy(actor_id).into());
                }
            },
        };

        // The cancel penalty comes out before the new feint is paid for, so
        // the affordability check is against what would actually remain.
        let feint_cost = def.feint_cost();
        if stamina.saturating_sub(penalty) < feint_cost {
            return Err(TransitionError::InsufficientStamina {
                actor: actor_id,
                action,
                required: feint_cost,
                available: stamina.saturating_sub(penalty),
            }
            .into());
        }

        // Past this point nothing can fail: cancel the old action (if any)
        // and start the new feint.
        if let Some(current) = replaced {
            self.log.push(LogEntry::Cancelled {
                time: self.clock,
                actor: actor_id,
                action: current.action,
                from_phase: current.phase,
            });
            if let Some(state) = self.actors.get_mut(&actor_id) {
                state.spend_stamina(penalty);
                state.current_action = None;
            }
        }

        let generation = self.fresh_generation();
        let Some(state) = self.actors.get_mut(&actor_id) else {
            return Err(SubmissionError::UnknownActor(actor_id));
        };
        state.spend_stamina(feint_cost);
        let ends_at = self.clock + scaled_duration(&def, ActionPhase::Feint, state.speed, false);
        state.current_action = Some(InFlightAction {
            action,
            phase: ActionPhase::Feint,
            recovery: None,
            start_time: self.clock,
            phase_ends_at: ends_at,
            target,
            generation,
        });
        self.queue.schedule(
            actor_id,
            action,
            ActionPhase::Feint,
            generation,
            ends_at,
            def.priority,
        );
        Ok(())
    }

    /// Cancel an actor's in-flight action without replacing it
    ///
    /// The action drops into its recovery phase; a commit-phase cancel pays
    /// the definition's penalty. A cancelled action never resolves.
    pub fn cancel_action(&mut self, actor_id: ActorId) -> Result<(), SubmissionError> {
        if self.phase != SessionPhase::Running {
            return Err(SubmissionError::SessionNotRunning);
        }
        let actor = self
            .actors
            .get(&actor_id)
            .ok_or(SubmissionError::UnknownActor(actor_id))?;
        let current = actor
            .current_action
            .ok_or(TransitionError::ActorBusy(actor_id))?;
        let def = self.definition(current.action);

        // A release runs to resolution unconditionally.
        if current.phase == ActionPhase::Release {
            return Err(TransitionError::ActorBusy(actor_id).into());
        }
        validate_transition(current.phase, ActionPhase::Recovery, actor, &def)?;

        let penalty = match current.phase {
            ActionPhase::Commit => def.cancel_penalty,
            _ => 0,
        };
        self.log.push(LogEntry::Cancelled {
            time: self.clock,
            actor: actor_id,
            action: current.action,
            from_phase: current.phase,
        });
        if let Some(state) = self.actors.get_mut(&actor_id) {
            state.spend_stamina(penalty);
        }
        self.enter_recovery(actor_id, &def, RecoveryKind::Cancelled);
        Ok(())
    }

    // === EVENT LOOP ===

    /// Consume the next due event and apply its consequences
    ///
    /// The clock only ever moves forward, and every resolved event is
    /// appended to the log before the next one is popped.
    pub fn process_round(&mut self) -> Result<RoundReport, SessionFault> {
        match self.phase {
            SessionPhase::Faulted => return Err(SessionFault::Faulted(self.clock)),
            SessionPhase::Terminated(outcome) => return Ok(RoundReport::Terminated(outcome)),
            SessionPhase::Initializing => return Ok(RoundReport::Idle),
            SessionPhase::Running => {}
        }

        let event = match self.queue.pop_next_before(self.config.duration_cap) {
            Some(event) => event,
            None => {
                // Anything still queued lies beyond the cap
                if self.queue.peek_due_time().is_some() || self.clock >= self.config.duration_cap {
                    self.clock = self.clock.max(self.config.duration_cap);
                    return Ok(self.terminate(SessionOutcome::Timeout));
                }
                return Ok(RoundReport::Idle);
            }
        };

        self.clock = self.clock.max(event.due_time);

        // Stale guard: cancelled/replaced/interrupted actions leave their old
        // completions in the heap; drop them here as recorded no-ops.
        let owner = match self.actors.get(&event.owner) {
            Some(owner) => owner,
            None => return Ok(RoundReport::Advanced { time: self.clock }),
        };
        let current_generation = owner.current_action.map(|a| a.generation);
        if current_generation != Some(event.generation) {
            let fault = ResolutionFault::StaleAction {
                owner: event.owner,
                event_generation: event.generation,
            };
            tracing::debug!(%fault, "dropping stale event");
            self.log.push(LogEntry::Dropped {
                time: self.clock,
                actor: event.owner,
                action: event.action,
                reason: fault.to_string(),
            });
            return Ok(RoundReport::Advanced { time: self.clock });
        }
        if !owner.is_alive() {
            self.log.push(LogEntry::Dropped {
                time: self.clock,
                actor: event.owner,
                action: event.action,
                reason: "owner defeated".to_string(),
            });
            return Ok(RoundReport::Advanced { time: self.clock });
        }

        match event.phase {
            ActionPhase::Feint => self.complete_feint(event.owner),
            ActionPhase::Commit => self.complete_commit(event.owner),
            ActionPhase::Release => self.complete_release(event.owner)?,
            ActionPhase::Recovery => self.complete_recovery(event.owner),
        }

        if let Some(outcome) = self.evaluate_termination() {
            return Ok(self.terminate(outcome));
        }
        Ok(RoundReport::Advanced { time: self.clock })
    }

    /// Feint elapsed: lock the action in, or fold if the stamina is gone
    fn complete_feint(&mut self, actor_id: ActorId) {
        let Some(actor) = self.actors.get(&actor_id) else { return };
        let Some(current) = actor.current_action else { return };
        let def = self.definition(current.action);

        match validate_transition(ActionPhase::Feint, ActionPhase::Commit, actor, &def) {
            Ok(()) => {
                let generation = self.fresh_generation();
                let state = self.actors.get_mut(&actor_id).expect("present");
                state.spend_stamina(def.commit_cost());
                let ends_at =
                    self.clock + scaled_duration(&def, ActionPhase::Commit, state.speed, false);
                if let Some(action) = state.current_action.as_mut() {
                    action.phase = ActionPhase::Commit;
                    action.phase_ends_at = ends_at;
                    action.generation = generation;
                }
                self.queue.schedule(
                    actor_id,
                    def.id,
                    ActionPhase::Commit,
                    generation,
                    ends_at,
                    def.priority,
                );
                if def.is_attack() {
                    self.log.push(LogEntry::PhaseAdvanced {
                        time: self.clock,
                        actor: actor_id,
                        action: def.id,
                        phase: ActionPhase::Commit,
                    });
                }
            }
            Err(err) => {
                self.log.push(LogEntry::Rejected {
                    time: self.clock,
                    actor: actor_id,
                    action: def.id,
                    reason: err.to_string(),
                });
                self.enter_recovery(actor_id, &def, RecoveryKind::Cancelled);
            }
        }
    }

    /// Commit elapsed: the action releases
    fn complete_commit(&mut self, actor_id: ActorId) {
        let Some(actor) = self.actors.get(&actor_id) else { return };
        let Some(current) = actor.current_action else { return };
        let def = self.definition(current.action);

        let generation = self.fresh_generation();
        let state = self.actors.get_mut(&actor_id).expect("present");
        let ends_at = self.clock + scaled_duration(&def, ActionPhase::Release, state.speed, false);
        if let Some(action) = state.current_action.as_mut() {
            action.phase = ActionPhase::Release;
            action.phase_ends_at = ends_at;
            action.generation = generation;
        }
        self.queue.schedule(
            actor_id,
            def.id,
            ActionPhase::Release,
            generation,
            ends_at,
            def.priority,
        );
        if def.is_attack() {
            self.log.push(LogEntry::PhaseAdvanced {
                time: self.clock,
                actor: actor_id,
                action: def.id,
                phase: ActionPhase::Release,
            });
        }
    }

    /// Release elapsed: resolve the action against live state
    fn complete_release(&mut self, actor_id: ActorId) -> Result<(), SessionFault> {
        let Some(actor) = self.actors.get(&actor_id) else { return Ok(()) };
        let Some(current) = actor.current_action else { return Ok(()) };
        let def = self.definition(current.action);

        let (outcome, delta) = if def.is_attack() {
            let target = current
                .target
                .and_then(|t| self.actors.get(&t))
                .filter(|t| t.is_alive());
            let Some(target) = target else {
                let fault = ResolutionFault::UnknownTarget(
                    current.target.unwrap_or(actor_id),
                );
                tracing::warn!(%fault, "attack release dropped");
                self.log.push(LogEntry::Dropped {
                    time: self.clock,
                    actor: actor_id,
                    action: def.id,
                    reason: fault.to_string(),
                });
                self.enter_recovery(actor_id, &def, RecoveryKind::Reset);
                return Ok(());
            };
            let catalog = &self.catalog;
            resolver::resolve_attack(&def, actor, target, |id| {
                catalog.get(id).map(|d| d.category)
            })
        } else {
            resolver::resolve_self(&def, actor, self.config.max_distance)
        };

        if let Err(fault) = self.apply_delta(&delta) {
            tracing::error!(%fault, "corrupt delta; session faulted");
            self.phase = SessionPhase::Faulted;
            return Err(fault);
        }
        self.apply_recoveries(&delta, actor_id, &def);

        self.log.push(LogEntry::Resolved {
            time: self.clock,
            actor: actor_id,
            action: def.id,
            target: current.target,
            outcome,
        });
        Ok(())
    }

    /// Recovery elapsed: the actor becomes eligible again
    fn complete_recovery(&mut self, actor_id: ActorId) {
        let Some(state) = self.actors.get_mut(&actor_id) else { return };
        let kind = state
            .current_action
            .and_then(|a| a.recovery)
            .unwrap_or(RecoveryKind::Reset);
        state.current_action = None;
        // Off balance is punitive: no breath caught this phase
        if kind != RecoveryKind::OffBalance {
            let regen = state.stamina_regen;
            state.restore_stamina(regen);
        }
    }

    // === DELTA APPLICATION ===

    /// Validate and apply a resolver delta as one atomic unit
    ///
    /// All patches are checked against the actor invariants before any field
    /// is written; a single bad value rejects the whole delta.
    fn apply_delta(&mut self, delta: &StateDelta) -> Result<(), SessionFault> {
        for patch in &delta.patches {
            let actor = self.actors.get(&patch.actor).ok_or_else(|| {
                SessionFault::CorruptDelta {
                    actor: patch.actor,
                    reason: "patch references an actor outside the session".to_string(),
                }
            })?;
            let corrupt = |reason: String| SessionFault::CorruptDelta {
                actor: patch.actor,
                reason,
            };
            if let Some(health) = patch.health {
                if health > actor.max_health {
                    return Err(corrupt(format!(
                        "health {health} above max {}",
                        actor.max_health
                    )));
                }
            }
            if let Some(stamina) = patch.stamina {
                if stamina > actor.max_stamina {
                    return Err(corrupt(format!(
                        "stamina {stamina} above max {}",
                        actor.max_stamina
                    )));
                }
            }
            if let Some(blocking) = patch.blocking_power {
                if blocking > actor.max_blocking_power {
                    return Err(corrupt(format!(
                        "blocking power {blocking} above max {}",
                        actor.max_blocking_power
                    )));
                }
            }
            if let Some(position) = patch.position {
                if !position.is_finite()
                    || position < 0.0
                    || position > self.config.max_distance
                {
                    return Err(corrupt(format!("position {position} outside the arena")));
                }
            }
        }

        for patch in &delta.patches {
            let state = self.actors.get_mut(&patch.actor).expect("validated above");
            if let Some(health) = patch.health {
                state.health = health;
            }
            if let Some(stamina) = patch.stamina {
                state.stamina = stamina;
            }
            if let Some(blocking) = patch.blocking_power {
                state.blocking_power = blocking;
            }
            if let Some(position) = patch.position {
                state.position = position;
            }
            if let Some(facing) = patch.facing {
                state.facing = facing;
            }
        }
        Ok(())
    }

    /// Move actors named by the delta into their prescribed recovery phases
    fn apply_recoveries(&mut self, delta: &StateDelta, release_owner: ActorId, owner_def: &ActionDefinition) {
        for patch in &delta.patches {
            let Some(kind) = patch.recovery else { continue };
            if patch.actor == release_owner {
                self.enter_recovery(release_owner, owner_def, kind);
                continue;
            }
            // Interruption: the other actor's in-flight action (if any, and
            // not already recovering) is knocked into recovery.
            let Some(state) = self.actors.get(&patch.actor) else { continue };
            if !state.is_alive() {
                if let Some(state) = self.actors.get_mut(&patch.actor) {
                    state.current_action = None;
                }
                continue;
            }
            let Some(current) = state.current_action else { continue };
            if current.phase == ActionPhase::Recovery {
                continue;
            }
            let def = self.definition(current.action);
            self.enter_recovery(patch.actor, &def, kind);
        }
    }

    /// Put an actor's current action into recovery and schedule its end
    fn enter_recovery(&mut self, actor_id: ActorId, def: &ActionDefinition, kind: RecoveryKind) {
        let generation = self.fresh_generation();
        let Some(state) = self.actors.get_mut(&actor_id) else { return };
        let off_balance = kind == RecoveryKind::OffBalance;
        let ends_at =
            self.clock + scaled_duration(def, ActionPhase::Recovery, state.speed, off_balance);
        if let Some(action) = state.current_action.as_mut() {
            action.phase = ActionPhase::Recovery;
            action.recovery = Some(kind);
            action.phase_ends_at = ends_at;
            action.generation = generation;
        } else {
            return;
        }
        self.queue.schedule(
            actor_id,
            def.id,
            ActionPhase::Recovery,
            generation,
            ends_at,
            def.priority,
        );
    }

    // === TERMINATION ===

    fn evaluate_termination(&self) -> Option<SessionOutcome> {
        if self.clock >= self.config.duration_cap {
            return Some(SessionOutcome::Timeout);
        }
        let alive: Vec<ActorId> = self
            .roster
            .iter()
            .copied()
            .filter(|id| self.actors.get(id).map(|a| a.is_alive()).unwrap_or(false))
            .collect();
        match alive.len() {
            0 => Some(SessionOutcome::Draw),
            1 => Some(SessionOutcome::Victory { winner: alive[0] }),
            _ => None,
        }
    }

    fn terminate(&mut self, outcome: SessionOutcome) -> RoundReport {
        tracing::debug!(session = %self.id.0, ?outcome, clock = self.clock, "session terminated");
        self.phase = SessionPhase::Terminated(outcome);
        self.log.push(LogEntry::Terminated {
            time: self.clock,
            outcome,
        });
        self.queue.clear();
        RoundReport::Terminated(outcome)
    }

    /// Declare a timeout now (used by drivers when both sides go quiet)
    ///
    /// A faulted session stays faulted; nothing can talk it back into a
    /// terminal outcome.
    pub fn force_timeout(&mut self) -> Result<RoundReport, SessionFault> {
        match self.phase {
            SessionPhase::Faulted => Err(SessionFault::Faulted(self.clock)),
            SessionPhase::Terminated(outcome) => Ok(RoundReport::Terminated(outcome)),
            _ => {
                self.clock = self.clock.max(self.config.duration_cap);
                Ok(self.terminate(SessionOutcome::Timeout))
            }
        }
    }

    // === OBSERVATION ===

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn clock(&self) -> Btu {
        self.clock
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.phase {
            SessionPhase::Terminated(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn roster(&self) -> &[ActorId] {
        &self.roster
    }

    /// Current separation between the two combatants
    pub fn distance(&self) -> f32 {
        match self.roster.as_slice() {
            [a, b] => {
                let pa = self.actors.get(a).map(|s| s.position).unwrap_or(0.0);
                let pb = self.actors.get(b).map(|s| s.position).unwrap_or(0.0);
                (pa - pb).abs()
            }
            _ => 0.0,
        }
    }

    pub fn actor_is_idle(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .map(|a| a.is_alive() && a.is_idle())
            .unwrap_or(false)
    }

    /// Immutable copy of one actor's state
    pub fn actor_snapshot(&self, id: ActorId) -> Option<ActorSnapshot> {
        self.actors.get(&id).map(|a| a.snapshot())
    }

    /// Immutable view of the whole session
    pub fn snapshot(&self) -> SessionView {
        SessionView {
            session: self.id,
            clock: self.clock,
            phase: self.phase,
            distance: self.distance(),
            max_distance: self.config.max_distance,
            actors: self
                .roster
                .iter()
                .filter_map(|id| self.actors.get(id).map(|a| a.snapshot()))
                .collect(),
        }
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // === INTERNAL ===

    fn definition(&self, id: ActionId) -> ActionDefinition {
        // The catalog is closed over ActionId, so every id resolves.
        self.catalog
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("catalog is missing builtin action {id}"))
    }

    fn fresh_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Drive rounds until the session is terminal or stalls waiting for input
    pub fn run_pending(&mut self) -> Result<RoundReport, SessionFault> {
        loop {
            match self.process_round()? {
                RoundReport::Advanced { .. } => continue,
                report => return Ok(report),
            }
        }
    }
}

/// Phase duration adjusted for actor speed (off-balance recoveries stretched)
fn scaled_duration(
    def: &ActionDefinition,
    phase: ActionPhase,
    speed: f32,
    off_balance: bool,
) -> Btu {
    let base = if off_balance {
        def.off_balance_duration()
    } else {
        def.phase_duration(phase)
    };
    // Speed is validated positive at add_actor, so this cannot fail.
    timing::apply_speed(base, speed).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faulted_session() -> CombatSession {
        let mut session = CombatSession::new(SessionConfig::default(), ActionCatalog::builtin());
        session.add_actor(ActorSpec::default()).unwrap();
        session.add_actor(ActorSpec::default()).unwrap();
        session.start().unwrap();
        session.phase = SessionPhase::Faulted;
        session
    }

    #[test]
    fn test_force_timeout_cannot_unfault() {
        let mut session = faulted_session();
        assert!(session.force_timeout().is_err());
        assert_eq!(session.phase(), SessionPhase::Faulted);
        assert_eq!(session.outcome(), None);
        assert!(!session
            .log
            .iter()
            .any(|e| matches!(e, LogEntry::Terminated { .. })));
    }

    #[test]
    fn test_faulted_session_rejects_everything() {
        let mut session = faulted_session();
        assert!(session.process_round().is_err());
        assert!(session
            .submit_action(ActorId(0), ActionId::QuickAttack, Some(ActorId(1)))
            .is_err());
    }
}
