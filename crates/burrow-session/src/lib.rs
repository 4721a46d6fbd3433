//! In-memory login sessions with absolute expiry and background reclamation.

pub mod config;
pub mod error;
pub mod reaper;
pub mod session;
pub mod store;
pub mod token;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use reaper::spawn_reaper;
pub use session::{Session, SessionStart};
pub use store::SessionStore;
