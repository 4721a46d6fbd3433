use super::url::create_record;
use crate::auth::CurrentUser;
use crate::error::Result;
use crate::model::{
    CreateUrlRequest, SessionResponse, UpdateUrlRequest, UrlListResponse, UrlResponse,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use burrow_core::{ShortCode, UrlParams};
use burrow_session::Session;
use std::cmp::Reverse;
use tracing::info;

/// Lists every record, newest first.
pub async fn list_urls_handler(State(state): State<AppState>) -> Result<Json<UrlListResponse>> {
    let mut records = state.with_repository(|repo| repo.get_all_urls()).await?;
    records.sort_by_key(|record| (Reverse(record.create_time), record.short_code.clone()));

    let urls: Vec<UrlResponse> = records.into_iter().map(UrlResponse::from).collect();
    Ok(Json(UrlListResponse {
        total: urls.len(),
        urls,
    }))
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let record = create_record(&state, request).await?;
    info!(user = %user, code = %record.short_code, "created url");
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn get_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlResponse>> {
    let record = state
        .with_repository(move |repo| repo.get_url_by_code(&code))
        .await?;
    Ok(Json(record.into()))
}

pub async fn update_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateUrlRequest>,
) -> Result<Json<UrlResponse>> {
    // Existing codes may predate the current format rules.
    let params =
        UrlParams::new(ShortCode::new_unchecked(code), request.target_url).with_remark(request.remark);
    let record = state
        .with_repository(move |repo| repo.update_url(params))
        .await?;
    info!(user = %user, code = %record.short_code, "updated url");
    Ok(Json(record.into()))
}

pub async fn delete_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode> {
    let deleted = code.clone();
    state
        .with_repository(move |repo| repo.delete_url(&deleted))
        .await?;
    info!(user = %user, code = %code, "deleted url");
    Ok(StatusCode::NO_CONTENT)
}

/// Describes the current admin session.
pub async fn me_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: user,
        expires_at: session.expires_at,
    })
}
