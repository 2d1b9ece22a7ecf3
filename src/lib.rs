//! Duelcore - Deterministic Tactical Duel Engine

pub mod catalog;
pub mod combat;
pub mod core;
pub mod decision;
pub mod timing;
