use crate::error::Result;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let record = state
        .with_repository(move |repo| repo.get_url_by_code(&code))
        .await?;
    debug!(code = %record.short_code, target = %record.target_url, "redirecting");
    Ok((StatusCode::FOUND, [(LOCATION, record.target_url)]).into_response())
}
