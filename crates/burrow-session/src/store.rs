use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::session::{Session, SessionStart};
use crate::token::generate_session_id;
use burrow_core::{Clock, SystemClock};
use jiff::{SignedDuration, Timestamp};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Thread-safe table of login sessions.
///
/// Sessions expire `max_lifetime` after they were started or last renewed by
/// [`SessionStore::start`]. Expired sessions are evicted when they are next
/// presented and in bulk by [`SessionStore::gc`].
///
/// Lookups take the shared lock; everything that changes the table, including
/// the eviction done by [`SessionStore::get`], takes the exclusive lock.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    config: SessionConfig,
    lifetime: SignedDuration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .field("sessions", &self.len())
            .finish()
    }
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: SessionConfig, clock: impl Clock) -> Self {
        let lifetime = SignedDuration::try_from(config.max_lifetime).unwrap_or(SignedDuration::MAX);
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            lifetime,
            clock: Arc::new(clock),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn expiry_from(&self, now: Timestamp) -> Timestamp {
        now.checked_add(self.lifetime).unwrap_or(Timestamp::MAX)
    }

    /// Resumes the session named by `token`, or starts a new one.
    ///
    /// A valid session has its expiry pushed to `now + max_lifetime` and is
    /// returned with `issued == false`. A missing, unknown or expired token
    /// yields a brand new session with `issued == true`; an expired one is
    /// evicted on the way.
    pub fn start(&self, token: Option<&str>) -> SessionStart {
        let now = self.clock.now();
        let expires_at = self.expiry_from(now);
        let mut sessions = self.sessions.write();

        if let Some(token) = token {
            if let Some(session) = sessions.get_mut(token).filter(|s| s.is_valid_at(now)) {
                session.expires_at = expires_at;
                trace!(expires_at = %expires_at, "renewed session");
                return SessionStart {
                    session: session.clone(),
                    issued: false,
                };
            }
            if sessions.remove(token).is_some() {
                debug!("evicted expired session presented to start");
            }
        }

        let session = Session::new(generate_session_id(), now, expires_at);
        sessions.insert(session.id.clone(), session.clone());
        debug!(expires_at = %expires_at, sessions = sessions.len(), "issued new session");

        SessionStart {
            session,
            issued: true,
        }
    }

    /// Looks up the session named by `token` without renewing it.
    ///
    /// Fails with [`SessionError::NotExist`] for a missing or unknown token and
    /// with [`SessionError::Expired`] for an expired one, which is evicted.
    pub fn get(&self, token: Option<&str>) -> Result<Session> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::NotExist)?;
        let now = self.clock.now();

        {
            let sessions = self.sessions.read();
            let session = sessions.get(token).ok_or(SessionError::NotExist)?;
            if session.is_valid_at(now) {
                return Ok(session.clone());
            }
        }

        let mut sessions = self.sessions.write();
        // The session may have been renewed or removed while the lock was released.
        let expired = match sessions.get(token) {
            Some(session) if session.is_valid_at(now) => return Ok(session.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(token);
            debug!("evicted expired session");
        }
        Err(SessionError::Expired)
    }

    /// Records `username` as the identity of a valid session.
    pub fn set_username(&self, id: &str, username: impl Into<String>) -> Result<Session> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();

        let expired = match sessions.get_mut(id) {
            Some(session) if session.is_valid_at(now) => {
                session.username = Some(username.into());
                return Ok(session.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(id);
            return Err(SessionError::Expired);
        }
        Err(SessionError::NotExist)
    }

    /// Removes the session named by `token`, returning it if it existed.
    ///
    /// Destroying an unknown session is not an error.
    pub fn destroy(&self, token: Option<&str>) -> Option<Session> {
        let token = token?;
        let removed = self.sessions.write().remove(token);
        if let Some(session) = &removed {
            debug!(username = ?session.username(), "destroyed session");
        }
        removed
    }

    /// Evicts every session whose expiry has passed and returns how many were removed.
    pub fn gc(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_valid_at(now));
        let removed = before - sessions.len();

        if removed > 0 {
            info!(removed, remaining = sessions.len(), "reclaimed expired sessions");
        } else {
            trace!(remaining = sessions.len(), "no expired sessions to reclaim");
        }
        removed
    }

    /// Number of sessions held, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
