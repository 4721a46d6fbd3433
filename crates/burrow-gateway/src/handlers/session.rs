use crate::cookie::{expired_cookie, read_cookie, session_cookie};
use crate::error::{AppError, Result};
use crate::model::{LoginRequest, SessionResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".to_string(),
        ));
    }
    if !state
        .authenticator()
        .authenticate(&request.username, &request.password)
    {
        warn!(username = %request.username, "failed login attempt");
        return Err(AppError::Unauthorized(
            "invalid username or password".to_string(),
        ));
    }

    let sessions = state.sessions();
    let config = sessions.config();
    let token = read_cookie(&headers, &config.cookie_name);
    let start = sessions.start(token.as_deref());
    let session = sessions.set_username(&start.session.id, request.username)?;
    info!(username = ?session.username(), issued = start.issued, "logged in");

    let cookie = session_cookie(
        &config.cookie_name,
        &session.id,
        config.max_lifetime,
        state.secure_cookies(),
    );
    let body = SessionResponse {
        username: session.username().unwrap_or_default().to_string(),
        expires_at: session.expires_at,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sessions = state.sessions();
    let cookie_name = &sessions.config().cookie_name;
    let token = read_cookie(&headers, cookie_name);
    if let Some(session) = sessions.destroy(token.as_deref()) {
        info!(username = ?session.username(), "logged out");
    }

    let cookie = expired_cookie(cookie_name, state.secure_cookies());
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response()
}
