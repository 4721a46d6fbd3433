use crate::auth::Authenticator;
use crate::error::{AppError, Result};
use burrow_core::Repository;
use burrow_generator::Generator;
use burrow_session::SessionStore;
use std::sync::Arc;
use typed_builder::TypedBuilder;

/// Shared handles every handler works with.
#[derive(Clone, TypedBuilder)]
pub struct AppState {
    repository: Arc<dyn Repository>,
    sessions: Arc<SessionStore>,
    generator: Arc<dyn Generator>,
    authenticator: Arc<dyn Authenticator>,
    /// Public origin used to build short URLs. When unset, the request's
    /// `Host` header is used instead.
    #[builder(default)]
    base_url: Option<String>,
    /// Adds the `Secure` attribute to session cookies.
    #[builder(default)]
    secure_cookies: bool,
}

impl AppState {
    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Runs `f` against the repository on the blocking pool.
    ///
    /// Mutations flush the record file before returning, so they must not run
    /// on the async workers.
    pub async fn with_repository<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Repository) -> burrow_core::Result<T> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || f(repository.as_ref()))
            .await
            .map_err(|e| AppError::Internal(format!("repository task failed: {e}")))?
            .map_err(AppError::from)
    }
}
