use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{require_basic_auth, require_session};
use crate::handlers::{
    create_url_handler, delete_url_handler, get_url_handler, health_handler, list_urls_handler,
    login_handler, logout_handler, me_handler, redirect_handler, shorten_handler,
    update_url_handler,
};
use crate::state::AppState;

/// Top-level paths served by the router itself. A short code equal to one of
/// these could never be reached through `GET /{code}`.
pub const RESERVED_CODES: &[&str] = &["health", "login", "logout"];

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let api = Router::new()
            .route("/shorten", post(shorten_handler))
            .route_layer(from_fn_with_state(state.clone(), require_basic_auth));

        let admin = Router::new()
            .route("/me", get(me_handler))
            .route("/urls", get(list_urls_handler).post(create_url_handler))
            .route(
                "/urls/{code}",
                get(get_url_handler)
                    .put(update_url_handler)
                    .delete(delete_url_handler),
            )
            .route_layer(from_fn_with_state(state.clone(), require_session));

        Router::new()
            .route("/health", get(health_handler))
            .route("/login", post(login_handler))
            .route("/logout", post(logout_handler))
            .nest("/api", api)
            .nest("/admin", admin)
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
