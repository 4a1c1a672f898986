//! Data structures shared across the storage, gateway and API crates.

use chrono::{DateTime, Utc};
use hex::encode as hex_encode;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use strum_macros::AsRefStr;
use thiserror::Error;

/// Coarse-grained permission tag carried by every user.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Streamer,
    Creator,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    Youtube,
    Spotify,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum ContentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Withdrawal,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Raised when system randomness is unavailable while minting references or
/// session tokens.
#[derive(Debug, Error)]
#[error("system randomness unavailable: {0}")]
pub struct RandomnessError(String);

/// Prefix carried by every locally generated payment reference.
pub const REFERENCE_PREFIX: &str = "STRM";

/// Errors emitted when an externally supplied reference fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceFormatError {
    #[error("payment reference must start with `{REFERENCE_PREFIX}-`")]
    MissingPrefix,
    #[error("payment reference is malformed")]
    Malformed,
}

/// Caller-generated string correlating a local Payment/Transaction pair with
/// the gateway's transaction record. Shape: `STRM-<unix millis>-<0..999>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference(String);

impl Reference {
    pub fn parse(raw: &str) -> Result<Self, ReferenceFormatError> {
        let rest = raw
            .strip_prefix(REFERENCE_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or(ReferenceFormatError::MissingPrefix)?;
        let mut parts = rest.split('-');
        let millis = parts.next().ok_or(ReferenceFormatError::Malformed)?;
        let suffix = parts.next().ok_or(ReferenceFormatError::Malformed)?;
        if parts.next().is_some() {
            return Err(ReferenceFormatError::Malformed);
        }
        let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !numeric(millis) || !numeric(suffix) || suffix.len() > 3 {
            return Err(ReferenceFormatError::Malformed);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Mints a fresh reference for the given instant. Uniqueness rests on the
    /// millisecond timestamp plus a random suffix and is ultimately enforced
    /// by the unique column in storage.
    pub fn generate(now: DateTime<Utc>) -> Result<Self, RandomnessError> {
        let mut seed = [0u8; 2];
        getrandom::getrandom(&mut seed).map_err(|err| RandomnessError(err.to_string()))?;
        let suffix = u16::from_le_bytes(seed) % 1000;
        Ok(Self(format!(
            "{REFERENCE_PREFIX}-{}-{suffix}",
            now.timestamp_millis()
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Required length (in hex characters) of a raw bearer session token.
pub const SESSION_TOKEN_LENGTH: usize = 64;

/// Errors emitted when a bearer session token fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token must be exactly {SESSION_TOKEN_LENGTH} hex characters")]
    WrongLength,
    #[error("session token contains non-hex characters")]
    NonHex,
}

/// Opaque bearer credential handed out by the internal session endpoint.
/// Only its SHA3-256 fingerprint is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn parse(raw: &str) -> Result<Self, SessionTokenError> {
        if raw.len() != SESSION_TOKEN_LENGTH {
            return Err(SessionTokenError::WrongLength);
        }
        if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SessionTokenError::NonHex);
        }
        let mut owned = raw.to_owned();
        owned.make_ascii_lowercase();
        Ok(Self(owned))
    }

    pub fn generate() -> Result<Self, RandomnessError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|err| RandomnessError(err.to_string()))?;
        Ok(Self(hex_encode(seed)))
    }

    /// Deterministic SHA3-256 fingerprint used as the storage key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.0.as_bytes());
        hex_encode(hasher.finalize())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub user_id: i64,
    pub balance: i64,
    pub payout_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub creator_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub url: String,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub approved_by: Option<i64>,
    pub creator_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerateContent {
    pub id: i64,
    pub status: ContentStatus,
    pub notes: Option<String>,
    pub moderator_id: i64,
}

/// Minimal creator fields joined onto content listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorSummary {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentListItem {
    pub content: ContentRecord,
    pub creator: Option<CreatorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPage {
    pub items: Vec<ContentListItem>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
}

/// Normalized listing parameters. `page` is 1-based; `limit` is clamped so a
/// caller cannot request an unbounded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFilter {
    pub status: ContentStatus,
    pub page: u64,
    pub limit: u64,
}

impl ContentFilter {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;

    pub fn new(status: ContentStatus, page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            status,
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub in_stock: bool,
    pub purchase_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: i64,
    pub reference: Reference,
    pub user_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub status: PaymentStatus,
    pub payment_data: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for the initialize flow: one PENDING payment plus its PENDING
/// purchase transaction, written atomically under the same reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub reference: Reference,
    pub user_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub payment_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: i64,
    pub reference: Reference,
    pub user_id: i64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub payment_id: Option<i64>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Authoritative answer from the gateway, as consumed by the finalize step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayVerdict {
    pub success: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payload: String,
}

/// Result of finalizing a payment against a gateway verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// This call moved the payment out of PENDING.
    Finalized {
        payment: PaymentRecord,
        purchase_created: bool,
    },
    /// The payment was already terminal; nothing was written.
    AlreadyFinalized { payment: PaymentRecord },
}

impl VerifyOutcome {
    pub fn payment(&self) -> &PaymentRecord {
        match self {
            VerifyOutcome::Finalized { payment, .. } => payment,
            VerifyOutcome::AlreadyFinalized { payment } => payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Accepted {
        remaining_balance: i64,
        transaction: TransactionRecord,
    },
    InsufficientBalance,
    NoProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRecord {
    pub id: i64,
    pub name: String,
    pub amount: i64,
    pub interval: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub name: String,
    pub amount: i64,
    pub interval: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub fingerprint: String,
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The session joined with its owning user, as handlers consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}
