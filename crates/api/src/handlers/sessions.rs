use actix_web::{web, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use streamrich_domain::model::{NewSession, SessionToken};
use streamrich_domain::storage::{SessionStore, UserStore};

use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct MintSessionRequest {
    pub user_id: i64,
    pub ttl_secs: Option<u64>,
}

/// The raw token appears here once and is never persisted or logged.
#[derive(Debug, Serialize, Deserialize)]
pub struct MintSessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Internal-listener endpoint: the surrounding system exchanges an
/// authenticated user id for a bearer session token.
pub async fn mint_session_handler(
    state: web::Data<AppState>,
    payload: web::Json<MintSessionRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .storage()
        .find_user(payload.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let token = SessionToken::generate().map_err(|err| ApiError::Internal(err.to_string()))?;
    let now = Utc::now();
    let ttl_secs = payload.ttl_secs.unwrap_or_else(|| state.session_ttl_secs());
    let expires_at = now + Duration::seconds(ttl_secs.min(i64::MAX as u64) as i64);

    state
        .storage()
        .insert_session(NewSession {
            fingerprint: token.fingerprint(),
            user_id: user.id,
            issued_at: now,
            expires_at,
        })
        .await?;
    counter!("api_sessions_minted_total").increment(1);

    Ok(HttpResponse::Created().json(MintSessionResponse {
        token: token.into_inner(),
        expires_at,
    }))
}
