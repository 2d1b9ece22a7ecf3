pub mod config;
pub mod error;
pub mod types;

pub use config::SessionConfig;
pub use error::{EngineError, Result};
pub use types::{ActorId, Btu, Facing, SessionId, Team};
