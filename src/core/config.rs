//! Session configuration with documented constants
//!
//! All tunable encounter parameters are collected here with explanations of
//! their purpose and how they interact with each other.

use serde::{Deserialize, Serialize};

use crate::core::types::Btu;

/// Configuration for a single combat session
///
/// These values bound the encounter; they are fixed at construction and never
/// change while the session runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    // === TIME ===
    /// Hard cap on the session clock (BTU)
    ///
    /// When the next due event lies beyond this cap the session terminates
    /// with a Timeout outcome. Expressed purely in simulation time, so
    /// correctness is independent of host scheduling jitter.
    pub duration_cap: Btu,

    // === SPACE ===
    /// Separation between the two actors when the session starts
    ///
    /// Must be within [0, max_distance].
    pub starting_distance: f32,

    /// Width of the strip the duel is fought on
    ///
    /// Positions are clamped to [0, max_distance]; retreating past an edge
    /// simply pins the actor against it.
    pub max_distance: f32,

    // === OBSERVABILITY ===
    /// Maximum number of entries retained in the result log
    ///
    /// The log is a bounded ring: once full, the oldest entry is dropped for
    /// each new one. The total count of entries ever recorded is kept so
    /// external archival collaborators can detect gaps.
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // 10_000 BTU = 100 seconds of combat, enough for a decisive duel
            duration_cap: 10_000,
            starting_distance: 60.0,
            max_distance: 100.0,
            log_capacity: 1024,
        }
    }
}

impl SessionConfig {
    /// Clamp the starting distance into the arena bounds
    pub fn normalized(mut self) -> Self {
        self.starting_distance = self.starting_distance.clamp(0.0, self.max_distance);
        self
    }
}
