use crate::app::RESERVED_CODES;
use crate::error::Result;
use crate::model::CreateUrlRequest;
use crate::state::AppState;
use burrow_core::{Repository, ShortCode, StoreError, UrlParams, UrlRecord};
use burrow_generator::Generator;
use std::sync::Arc;
use tracing::warn;

/// How many generated codes are tried before giving up with `Conflict`.
pub const GENERATE_ATTEMPTS: usize = 5;

/// Creates a record under a freshly generated short code, drawing a new code
/// whenever the previous one is already taken.
pub fn create_with_generated_code(
    repository: &dyn Repository,
    generator: &dyn Generator,
    target_url: &str,
    remark: &str,
) -> burrow_core::Result<UrlRecord> {
    let mut last_conflict = String::new();
    for attempt in 1..=GENERATE_ATTEMPTS {
        let code = generator.generate();
        if is_reserved(code.as_str()) {
            warn!(code = %code, attempt, "generated short code shadows a route");
            last_conflict = code.to_string();
            continue;
        }
        let params = UrlParams::new(code, target_url).with_remark(remark);
        match repository.create_url(params) {
            Err(StoreError::Conflict(code)) => {
                warn!(code = %code, attempt, "generated short code already taken");
                last_conflict = code;
            }
            other => return other,
        }
    }
    Err(StoreError::Conflict(last_conflict))
}

/// Creates a record under the requested code, or a generated one when none
/// was asked for.
pub(crate) async fn create_record(
    state: &AppState,
    request: CreateUrlRequest,
) -> Result<UrlRecord> {
    let code = request.requested_code().map(ShortCode::new).transpose()?;
    if let Some(code) = code.as_ref().filter(|code| is_reserved(code.as_str())) {
        return Err(StoreError::Validation(format!("short code is reserved: {code}")).into());
    }
    let remark = request.remark.unwrap_or_default();
    let target_url = request.target_url;

    match code {
        Some(code) => {
            let params = UrlParams::new(code, target_url).with_remark(remark);
            state.with_repository(move |repo| repo.create_url(params)).await
        }
        None => {
            let generator = Arc::clone(state.generator());
            state
                .with_repository(move |repo| {
                    create_with_generated_code(repo, generator.as_ref(), &target_url, &remark)
                })
                .await
        }
    }
}

fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}
