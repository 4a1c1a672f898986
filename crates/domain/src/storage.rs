//! Trait contracts the persistence layer must satisfy, kept free of any ORM
//! types so stores can be mocked in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    ContentFilter, ContentPage, ContentRecord, GatewayVerdict, ModerateContent, NewContent,
    NewPayment, NewPlan, NewProduct, NewSession, NewUser, PaymentRecord, PlanRecord,
    ProductRecord, ProfileRecord, PurchaseRecord, Reference, Role, SessionIdentity, UserRecord,
    VerifyOutcome, WithdrawOutcome,
};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, content: NewContent) -> StorageResult<ContentRecord>;
    async fn list_content(&self, filter: ContentFilter) -> StorageResult<ContentPage>;
    async fn find_content(&self, id: i64) -> StorageResult<Option<ContentRecord>>;
    /// Applies the PENDING -> APPROVED/REJECTED transition. Returns `None`
    /// when the row is missing or no longer PENDING.
    async fn moderate_content(
        &self,
        request: ModerateContent,
    ) -> StorageResult<Option<ContentRecord>>;
    /// Hard delete; returns whether a row was removed.
    async fn delete_content(&self, id: i64) -> StorageResult<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: NewProduct) -> StorageResult<ProductRecord>;
    async fn list_products(&self) -> StorageResult<Vec<ProductRecord>>;
    async fn find_product(&self, id: i64) -> StorageResult<Option<ProductRecord>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Writes the PENDING payment and its PENDING purchase transaction under
    /// one database transaction.
    async fn create_pending_payment(&self, payment: NewPayment) -> StorageResult<PaymentRecord>;
    async fn find_payment(&self, reference: &Reference) -> StorageResult<Option<PaymentRecord>>;
    /// Applies the gateway verdict atomically: status flip, purchase insert
    /// and product counter increment all commit or none do. Idempotent for
    /// already-finalized references. `None` means no payment row exists.
    async fn finalize_payment(
        &self,
        reference: &Reference,
        verdict: GatewayVerdict,
    ) -> StorageResult<Option<VerifyOutcome>>;
    async fn find_purchase_by_payment(
        &self,
        payment_id: i64,
    ) -> StorageResult<Option<PurchaseRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user and its 1:1 profile together.
    async fn insert_user(&self, user: NewUser) -> StorageResult<UserRecord>;
    async fn find_user(&self, id: i64) -> StorageResult<Option<UserRecord>>;
    async fn update_role(&self, user_id: i64, role: Role) -> StorageResult<Option<UserRecord>>;
    async fn find_profile(&self, user_id: i64) -> StorageResult<Option<ProfileRecord>>;
    /// Adds earnings to a profile balance; returns the updated profile.
    async fn credit_balance(
        &self,
        user_id: i64,
        amount: i64,
    ) -> StorageResult<Option<ProfileRecord>>;
    /// Guarded balance decrement plus a PENDING withdrawal transaction.
    async fn withdraw(&self, user_id: i64, amount: i64) -> StorageResult<WithdrawOutcome>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: NewSession) -> StorageResult<()>;
    /// Looks up a live session by token fingerprint and joins the owning
    /// user. Expired sessions resolve to `None`.
    async fn resolve_session(
        &self,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<SessionIdentity>>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert_plan(&self, plan: NewPlan) -> StorageResult<PlanRecord>;
    async fn list_plans(&self) -> StorageResult<Vec<PlanRecord>>;
}
