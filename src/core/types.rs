//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a combat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Dense identifier for an actor within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor-{}", self.0)
    }
}

/// Base time unit counter (simulation time)
///
/// All durations and timestamps are integer BTUs. One BTU is 10 milliseconds
/// of nominal combat time; see [`crate::timing`] for conversions.
pub type Btu = u64;

/// Side of the encounter an actor fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Challenger,
    Defender,
}

/// Which direction along the distance line an actor is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}
