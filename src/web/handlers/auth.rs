//! # Identity Registration Handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{Identity, NewIdentity};
use crate::utils::serde::deserialize_optional_identity;
use crate::web::errors::ApiResult;
use crate::web::extractors::ApiJson;
use crate::web::state::AppState;

/// Body of `POST /api/auth`. The snake_case aliases are what the mini app's
/// SDK sends.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default, alias = "tg_id", deserialize_with = "deserialize_optional_identity")]
    pub external_id: Option<String>,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default, alias = "username")]
    pub handle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Identity,
}

/// Register the caller if unknown: POST /api/auth
pub async fn authenticate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let verified = state
        .verifier
        .verify(request.external_id.as_deref())
        .await?;

    let user = Identity::register(
        &state.pool,
        NewIdentity {
            external_id: verified.into_external_id(),
            first_name: request.first_name,
            last_name: request.last_name,
            handle: request.handle,
        },
        state.clock.now(),
    )
    .await?;

    Ok(Json(AuthResponse { user }))
}
