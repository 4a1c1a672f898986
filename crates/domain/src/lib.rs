//! Domain-level building blocks shared by the StreamRich storage, gateway and
//! API crates: the entity model, the authorization policy, configuration
//! loading and the storage trait contracts.

pub mod auth;
pub mod config;
pub mod model;
pub mod services;
pub mod storage;

pub use storage::{
    ContentStore, PaymentStore, PlanStore, ProductStore, SessionStore, StorageError,
    StorageResult, UserStore,
};
