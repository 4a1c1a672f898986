use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use streamrich_domain::auth::Action;
use streamrich_domain::model::{
    GatewayVerdict, NewPayment, PaymentStatus, Reference, VerifyOutcome,
};
use streamrich_domain::storage::{PaymentStore, ProductStore};
use streamrich_gateway::{InitializeRequest, TransactionMetadata};

use crate::auth::SessionContext;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct InitializePaymentRequest {
    pub product_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitializePaymentResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub reference: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub status: PaymentStatus,
    pub reference: String,
    pub amount: i64,
    pub paid_at: Option<DateTime<Utc>>,
}

pub async fn initialize_payment_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    payload: web::Json<InitializePaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::Purchase)?;

    let product = state
        .storage()
        .find_product(payload.product_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if !product.in_stock {
        counter!("api_payment_requests_total", "endpoint" => "initialize", "status" => "out_of_stock")
            .increment(1);
        return Err(ApiError::validation("product is out of stock"));
    }

    let now = Utc::now();
    let reference =
        Reference::generate(now).map_err(|err| ApiError::Internal(err.to_string()))?;
    let metadata = TransactionMetadata {
        product_id: product.id,
        user_id: session.user_id(),
        product_name: product.name.clone(),
    };

    // The gateway call happens first: if it fails, nothing is written locally.
    let initialized = state
        .gateway()
        .initialize(InitializeRequest {
            email: session.email().to_owned(),
            amount: product.price,
            reference: reference.as_str().to_owned(),
            metadata: metadata.clone(),
        })
        .await
        .inspect_err(|_| {
            counter!("api_payment_requests_total", "endpoint" => "initialize", "status" => "gateway_error")
                .increment(1);
        })?;

    let metadata_json =
        serde_json::to_string(&metadata).map_err(|err| ApiError::Internal(err.to_string()))?;
    state
        .storage()
        .create_pending_payment(NewPayment {
            reference,
            user_id: session.user_id(),
            product_id: product.id,
            amount: product.price,
            metadata: Some(metadata_json),
            created_at: now,
        })
        .await?;

    counter!("api_payment_requests_total", "endpoint" => "initialize", "status" => "pending")
        .increment(1);
    Ok(HttpResponse::Ok().json(InitializePaymentResponse {
        authorization_url: initialized.authorization_url,
        access_code: initialized.access_code,
        reference: initialized.reference,
    }))
}

pub async fn verify_payment_handler(
    state: web::Data<AppState>,
    _session: SessionContext,
    query: web::Query<VerifyQuery>,
) -> Result<HttpResponse, ApiError> {
    let reference = Reference::parse(&query.reference)
        .map_err(|err| ApiError::validation(err.to_string()))?;

    let verified = state.gateway().verify(reference.as_str()).await?;
    let verdict = GatewayVerdict {
        success: verified.is_success(),
        paid_at: verified.paid_at,
        payload: verified.raw_payload(),
    };

    let outcome = state
        .storage()
        .finalize_payment(&reference, verdict)
        .await?
        .ok_or(ApiError::NotFound)?;

    let result_tag = match &outcome {
        VerifyOutcome::Finalized {
            purchase_created, ..
        } => {
            if *purchase_created {
                // purchase_count moved, so the cached catalog is stale
                state.product_cache().invalidate();
            }
            "finalized"
        }
        VerifyOutcome::AlreadyFinalized { .. } => "replayed",
    };
    let payment = outcome.payment();
    let status_tag = payment.status.as_ref().to_owned();
    counter!("api_payment_requests_total", "endpoint" => "verify", "result" => result_tag, "status" => status_tag)
        .increment(1);

    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        status: payment.status,
        reference: payment.reference.as_str().to_owned(),
        amount: payment.amount,
        paid_at: payment.paid_at,
    }))
}
