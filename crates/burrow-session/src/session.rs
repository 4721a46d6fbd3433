use jiff::Timestamp;

/// An authenticated (or not yet authenticated) visitor session.
///
/// Values handed out by the store are copies; only the store changes
/// `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// The logged-in user, once the session has been authenticated.
    pub username: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Session {
    pub(crate) fn new(id: String, created_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            id,
            username: None,
            created_at,
            expires_at,
        }
    }

    /// A session is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.username().is_some()
    }
}

/// Outcome of [`SessionStore::start`](crate::SessionStore::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub session: Session,
    /// `true` when a new session was created and the caller must hand
    /// `session.id` back to the client.
    pub issued: bool,
}
