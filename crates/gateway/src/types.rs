use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata attached to the remote transaction so gateway dashboards and
/// webhooks can be correlated back to local rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionMetadata {
    pub product_id: i64,
    pub user_id: i64,
    pub product_name: String,
}

/// Adapter-level initialize input. `amount` is in major units; scaling to the
/// gateway's minor unit happens inside the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeRequest {
    pub email: String,
    pub amount: i64,
    pub reference: String,
    pub metadata: TransactionMetadata,
}

/// Gateway response envelope: `status` reports whether the request was
/// accepted at all, independent of any payment outcome.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InitializeBody<'a> {
    pub email: &'a str,
    pub amount: i64,
    pub reference: &'a str,
    pub callback_url: &'a str,
    pub metadata: &'a TransactionMetadata,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyData {
    pub status: String,
    pub reference: String,
    pub amount: i64,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Authoritative transaction state as reported by the gateway. `raw` carries
/// the untouched payload for opaque persistence on the local payment row.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedTransaction {
    pub status: String,
    pub reference: String,
    pub amount: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    pub fn raw_payload(&self) -> String {
        self.raw.to_string()
    }
}
