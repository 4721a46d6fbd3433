use crate::cookie::read_cookie;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use burrow_session::Session;
use base64::Engine;
use subtle::ConstantTimeEq;
use tracing::debug;

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

const BASIC_REALM: &str = "Basic realm=\"Authorization Required\"";

/// Checks a username and password pair.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// A single configured username and password.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether these are the built-in `admin`/`admin` credentials.
    pub fn is_default(&self) -> bool {
        self.username == DEFAULT_USERNAME && self.password == DEFAULT_PASSWORD
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        // Both halves are always compared.
        let user_ok = constant_time_eq(username, &self.username);
        let pass_ok = constant_time_eq(password, &self.password);
        user_ok & pass_ok
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Extracts the username and password of an HTTP Basic `Authorization` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Username of the logged-in admin, inserted by [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Rejects requests without valid HTTP Basic credentials.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = basic_credentials(request.headers())
        .is_some_and(|(user, pass)| state.authenticator().authenticate(&user, &pass));
    if authorized {
        return next.run(request).await;
    }

    debug!(path = %request.uri().path(), "rejected basic auth");
    let mut response = AppError::Unauthorized("invalid credentials".to_string()).into_response();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
    response
}

/// Rejects requests without a logged-in session and exposes the username as
/// a [`CurrentUser`] extension, next to the [`Session`] itself.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let sessions = state.sessions();
    let token = read_cookie(request.headers(), &sessions.config().cookie_name);
    let session = sessions.get(token.as_deref())?;
    let username = session
        .username()
        .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?
        .to_string();

    request.extensions_mut().insert(CurrentUser(username));
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
