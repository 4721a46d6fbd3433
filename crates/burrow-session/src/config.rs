use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_COOKIE_NAME: &str = "session_id";
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Configuration for a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, TypedBuilder)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    #[builder(default = DEFAULT_COOKIE_NAME.to_string(), setter(into))]
    pub cookie_name: String,
    /// How long a session stays valid after it was started or last renewed.
    #[builder(default = DEFAULT_MAX_LIFETIME)]
    pub max_lifetime: Duration,
    /// How often the reaper evicts expired sessions.
    #[builder(default = DEFAULT_GC_INTERVAL)]
    pub gc_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
