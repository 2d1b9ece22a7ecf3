//! Catalog override schema for TOML deserialization
//!
//! An override file adjusts the numbers of built-in actions; it cannot add
//! new action kinds (the id set is closed).
//!
//! ```toml
//! [actions.quick_attack]
//! duration_ms = 700
//! stamina_cost = 12
//! ```

use serde::Deserialize;
use std::collections::HashMap;

/// Top-level override file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub actions: HashMap<String, ActionOverride>,
}

/// Per-action tuning overrides; absent fields keep the built-in value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionOverride {
    /// Total duration in milliseconds (converted to BTU on load)
    pub duration_ms: Option<i64>,
    pub stamina_cost: Option<u32>,
    pub damage_factor: Option<f32>,
    pub cancellable_commit: Option<bool>,
    pub cancel_penalty: Option<u32>,
    pub stamina_restore: Option<u32>,
    pub guard_restore: Option<u32>,
}
