pub mod catalog;
pub mod content;
pub mod metrics;
pub mod payments;
pub mod sessions;
pub mod users;

pub use catalog::{list_plans_handler, list_products_handler};
pub use content::{
    delete_content_handler, list_content_handler, moderate_content_handler,
    submit_content_handler,
};
pub use metrics::metrics_handler;
pub use payments::{initialize_payment_handler, verify_payment_handler};
pub use sessions::mint_session_handler;
pub use users::{update_role_handler, withdraw_handler};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use streamrich_domain::storage::StorageError;
use streamrich_gateway::GatewayError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid session token")]
    Unauthorized,
    #[error("insufficient role for this action")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("resource not found")]
    NotFound,
    #[error("content already moderated")]
    AlreadyModerated,
    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::AlreadyModerated => StatusCode::CONFLICT,
            // A gateway-level rejection is a caller problem; everything else
            // reaching the gateway is ours.
            ApiError::Gateway(GatewayError::Rejected(_)) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
