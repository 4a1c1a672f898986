use std::future::Future;
use std::pin::Pin;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use metrics::counter;
use streamrich_domain::auth::{allow, Action};
use streamrich_domain::model::{Role, SessionIdentity, SessionToken};
use streamrich_domain::storage::SessionStore;

use crate::handlers::ApiError;
use crate::state::AppState;

/// Caller identity resolved from the `Authorization: Bearer` header before the
/// handler body runs. Handlers receive it as an explicit argument; nothing is
/// looked up ambiently.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: SessionIdentity,
}

impl SessionContext {
    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Single policy gate used by every protected handler.
    pub fn require(&self, action: Action) -> Result<(), ApiError> {
        if allow(self.identity.role, action) {
            Ok(())
        } else {
            let role_tag = self.identity.role.as_ref().to_owned();
            counter!("api_authz_denials_total", "role" => role_tag).increment(1);
            Err(ApiError::Forbidden)
        }
    }

    #[cfg(test)]
    pub fn for_identity(identity: SessionIdentity) -> Self {
        Self { identity }
    }
}

impl FromRequest for SessionContext {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or(ApiError::Unauthorized)?;
            let raw = header
                .as_deref()
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .ok_or_else(|| {
                    counter!("api_session_rejections_total", "reason" => "missing_header")
                        .increment(1);
                    ApiError::Unauthorized
                })?;
            let token = SessionToken::parse(raw).map_err(|_| {
                counter!("api_session_rejections_total", "reason" => "malformed_token")
                    .increment(1);
                ApiError::Unauthorized
            })?;
            let identity = state
                .storage()
                .resolve_session(&token.fingerprint(), Utc::now())
                .await?
                .ok_or_else(|| {
                    counter!("api_session_rejections_total", "reason" => "unknown_or_expired")
                        .increment(1);
                    ApiError::Unauthorized
                })?;
            Ok(SessionContext { identity })
        })
    }
}
