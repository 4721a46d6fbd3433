use super::url::create_record;
use crate::error::Result;
use crate::model::{CreateUrlRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateUrlRequest>,
) -> Result<Json<ShortenResponse>> {
    let record = create_record(&state, request).await?;
    info!(code = %record.short_code, target = %record.target_url, "shortened url");

    let short_url = record.short_code.to_url(&public_base_url(&state, &headers));
    Ok(Json(ShortenResponse {
        short_code: record.short_code.to_string(),
        target_url: record.target_url,
        short_url,
        remark: record.remark,
    }))
}

fn public_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base_url) = state.base_url() {
        return base_url.to_string();
    }
    headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default()
}
