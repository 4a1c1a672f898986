//! Payment gateway adapter: a thin, stateless wrapper around the gateway's
//! transaction-initialize and transaction-verify REST endpoints. No retry, no
//! backoff; callers see every failure synchronously.

mod client;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::PaystackClient;
pub use types::{
    InitializeRequest, InitializedTransaction, TransactionMetadata, VerifiedTransaction,
};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered but refused the request at the envelope level
    /// (distinct from a declined payment, which is recorded, not rejected).
    #[error("gateway rejected request: {0}")]
    Rejected(String),
    /// Transport-level failure reaching the gateway.
    #[error("gateway unreachable: {0}")]
    Transport(String),
    /// The gateway answered with a payload we could not decode.
    #[error("gateway response malformed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// Outbound contract of the payment gateway, kept behind a trait so the API
/// crate can substitute a mock in tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a remote transaction and returns the redirect target the
    /// caller should be sent to.
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializedTransaction, GatewayError>;

    /// Fetches the authoritative state of a transaction by reference.
    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError>;
}
