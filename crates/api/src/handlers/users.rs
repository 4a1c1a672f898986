use actix_web::{web, HttpResponse};
use metrics::counter;
use serde::{Deserialize, Serialize};

use streamrich_domain::auth::Action;
use streamrich_domain::model::{Role, WithdrawOutcome};
use streamrich_domain::storage::UserStore;

use crate::auth::SessionContext;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub reference: String,
    pub amount: i64,
    pub remaining_balance: i64,
}

pub async fn update_role_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    payload: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::ManageUsers)?;

    let updated = state
        .storage()
        .update_role(payload.user_id, payload.role)
        .await?
        .ok_or(ApiError::NotFound)?;
    let role_tag = updated.role.as_ref().to_owned();
    counter!("api_user_requests_total", "endpoint" => "role", "role" => role_tag).increment(1);

    Ok(HttpResponse::Ok().json(UserBody {
        id: updated.id,
        email: updated.email,
        display_name: updated.display_name,
        role: updated.role,
    }))
}

pub async fn withdraw_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    payload: web::Json<WithdrawRequest>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::Withdraw)?;

    if payload.amount <= 0 {
        return Err(ApiError::validation("withdrawal amount must be positive"));
    }

    let outcome = state
        .storage()
        .withdraw(session.user_id(), payload.amount)
        .await?;
    match outcome {
        WithdrawOutcome::Accepted {
            remaining_balance,
            transaction,
        } => {
            counter!("api_user_requests_total", "endpoint" => "withdraw", "status" => "accepted")
                .increment(1);
            Ok(HttpResponse::Ok().json(WithdrawResponse {
                reference: transaction.reference.into_inner(),
                amount: transaction.amount,
                remaining_balance,
            }))
        }
        WithdrawOutcome::InsufficientBalance => {
            counter!("api_user_requests_total", "endpoint" => "withdraw", "status" => "insufficient")
                .increment(1);
            Err(ApiError::validation("insufficient balance"))
        }
        WithdrawOutcome::NoProfile => Err(ApiError::NotFound),
    }
}
