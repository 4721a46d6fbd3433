use thiserror::Error;

/// Type alias for session results.
pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session does not exist")]
    NotExist,
    #[error("session has expired")]
    Expired,
}
