//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the record model, the repository contract and the
//! small runtime pieces (clock, periodic task) shared by the record store,
//! the session store and the HTTP gateway.

pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod task;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use repository::{validate_target_url, Repository, UrlParams, UrlRecord};
pub use shortcode::ShortCode;
pub use task::PeriodicTask;
