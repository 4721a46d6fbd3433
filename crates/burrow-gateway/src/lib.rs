//! HTTP surface of the Burrow URL shortener.
//!
//! Serves redirects, a Basic-auth JSON API for creating short links, and a
//! session-cookie protected admin API for managing them. All state lives in
//! the record and session stores handed in through [`AppState`].

pub mod app;
pub mod auth;
pub mod cookie;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use auth::{Authenticator, StaticCredentials};
pub use error::{AppError, Result};
pub use state::AppState;
