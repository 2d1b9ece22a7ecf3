//! Deterministic event scheduling
//!
//! A synchronous priority queue of pending phase completions. Two actors'
//! phases can complete at the exact same BTU, so the ordering key is fixed:
//! (due_time, action priority, submission sequence). Without it, whether a
//! block settled before the attack landed would be ambiguous.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::catalog::ActionId;
use crate::combat::action::ActionPhase;
use crate::core::types::{ActorId, Btu};

/// A pending phase completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub owner: ActorId,
    pub action: ActionId,
    /// The phase that completes at `due_time`
    pub phase: ActionPhase,
    /// Must match the owner's in-flight generation or the event is stale
    pub generation: u64,
    pub due_time: Btu,
    /// From the action definition; lower resolves first
    pub priority: u8,
    /// Session-wide scheduling counter; the final deterministic tie-break
    pub seq: u64,
}

impl ScheduledEvent {
    fn key(&self) -> (Btu, u8, u64) {
        (self.due_time, self.priority, self.seq)
    }
}

// Ordering is exactly the resolution key; seq is unique per queue so the
// order is total.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-ordered queue of pending events
///
/// Pure data structure: no I/O, no blocking, single-threaded. Cancelled
/// actions are invalidated lazily — the session drops popped events whose
/// generation no longer matches the owner's in-flight action.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a phase completion, stamping it with the next sequence number
    pub fn schedule(
        &mut self,
        owner: ActorId,
        action: ActionId,
        phase: ActionPhase,
        generation: u64,
        due_time: Btu,
        priority: u8,
    ) -> ScheduledEvent {
        let event = ScheduledEvent {
            owner,
            action,
            phase,
            generation,
            due_time,
            priority,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(event));
        event
    }

    /// Remove and return the earliest event
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop().map(|Reverse(e)| e)
    }

    /// Remove and return the earliest event, unless it lies beyond `cap`
    pub fn pop_next_before(&mut self, cap: Btu) -> Option<ScheduledEvent> {
        match self.peek_due_time() {
            Some(due) if due <= cap => self.pop_next(),
            _ => None,
        }
    }

    /// When the next event is due, if any
    pub fn peek_due_time(&self) -> Option<Btu> {
        self.heap.peek().map(|Reverse(e)| e.due_time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(events: &[(u32, ActionPhase, Btu, u8)]) -> EventQueue {
        let mut queue = EventQueue::new();
        for &(owner, phase, due, priority) in events {
            queue.schedule(ActorId(owner), ActionId::QuickAttack, phase, 0, due, priority);
        }
        queue
    }

    #[test]
    fn test_pops_in_time_order() {
        let mut queue = queue_with(&[
            (0, ActionPhase::Feint, 30, 0),
            (1, ActionPhase::Feint, 10, 0),
            (0, ActionPhase::Commit, 20, 0),
        ]);
        let times: Vec<Btu> = std::iter::from_fn(|| queue.pop_next().map(|e| e.due_time)).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn test_priority_breaks_time_ties() {
        let mut queue = EventQueue::new();
        // Movement (3) scheduled before attack (0), both due at 50
        queue.schedule(ActorId(0), ActionId::Advance, ActionPhase::Release, 0, 50, 3);
        queue.schedule(ActorId(1), ActionId::QuickAttack, ActionPhase::Release, 0, 50, 0);

        assert_eq!(queue.pop_next().unwrap().owner, ActorId(1));
        assert_eq!(queue.pop_next().unwrap().owner, ActorId(0));
    }

    #[test]
    fn test_sequence_breaks_full_ties() {
        let mut queue = EventQueue::new();
        let first = queue.schedule(ActorId(0), ActionId::Block, ActionPhase::Release, 0, 50, 1);
        let second = queue.schedule(ActorId(1), ActionId::Block, ActionPhase::Release, 0, 50, 1);
        assert!(first.seq < second.seq);

        assert_eq!(queue.pop_next().unwrap().owner, ActorId(0));
        assert_eq!(queue.pop_next().unwrap().owner, ActorId(1));
    }

    #[test]
    fn test_pop_next_before_respects_cap() {
        let mut queue = queue_with(&[(0, ActionPhase::Feint, 100, 0)]);
        assert!(queue.pop_next_before(99).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_next_before(100).is_some());
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop_next().is_none());
        assert!(queue.peek_due_time().is_none());
    }
}
