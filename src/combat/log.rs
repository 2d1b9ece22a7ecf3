//! Bounded result log
//!
//! Ordered record of everything observable that happened in a session:
//! resolutions, rejections, drops, cancels, attack telegraphs, termination.
//! Nothing is dropped silently — a rejected submission or a stale event is
//! as much a part of the record as a landed hit.
//!
//! The log is a bounded ring: external archival collaborators can tail it
//! and use `total_recorded` to detect gaps once old entries rotate out.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::ActionId;
use crate::combat::action::ActionPhase;
use crate::combat::resolver::Outcome;
use crate::combat::session::SessionOutcome;
use crate::core::types::{ActorId, Btu};

/// One observable event in session order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum LogEntry {
    /// A release completed and was resolved
    Resolved {
        time: Btu,
        actor: ActorId,
        action: ActionId,
        target: Option<ActorId>,
        outcome: Outcome,
    },
    /// A submission or auto-advance was rejected (no state change)
    Rejected {
        time: Btu,
        actor: ActorId,
        action: ActionId,
        reason: String,
    },
    /// A queued event was dropped as a no-op (stale or unresolvable)
    Dropped {
        time: Btu,
        actor: ActorId,
        action: ActionId,
        reason: String,
    },
    /// An actor backed out of an action before release
    Cancelled {
        time: Btu,
        actor: ActorId,
        action: ActionId,
        from_phase: ActionPhase,
    },
    /// An attack telegraph: the action advanced a phase
    PhaseAdvanced {
        time: Btu,
        actor: ActorId,
        action: ActionId,
        phase: ActionPhase,
    },
    /// The session reached a terminal state
    Terminated { time: Btu, outcome: SessionOutcome },
}

/// Bounded, ordered log of resolved outcomes
#[derive(Debug, Clone)]
pub struct ResultLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    total: u64,
}

impl ResultLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Append an entry, rotating out the oldest when full
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.total += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of entries ever recorded, including rotated-out ones
    pub fn total_recorded(&self) -> u64 {
        self.total
    }

    /// Entries currently retained, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}
