//! SeaORM-backed storage adapters that satisfy the domain storage traits
//! while keeping the database backend swappable (SQLite by default,
//! PostgreSQL via feature flag).

mod builder;
mod content_store;
mod entity;
mod errors;
mod migration;
mod payment_store;
mod plan_store;
mod product_store;
mod session_store;
mod user_store;

use std::sync::Arc;

use builder::StorageBuilder;
use errors::StorageError;
use migration::run_migrations;
use sea_orm::sea_query::{PostgresQueryBuilder, SqliteQueryBuilder, UpdateStatement};
use sea_orm::{Database, DatabaseBackend, DatabaseConnection, Statement};
use streamrich_domain::storage::StorageResult;

/// Shared storage handle used by the HTTP API.
#[derive(Clone, Debug)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is
    /// present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub(crate) fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

/// Builds a backend-specific statement for the guarded `UPDATE .. RETURNING`
/// queries the stores rely on for their state transitions.
pub(crate) fn build_update(backend: DatabaseBackend, query: &UpdateStatement) -> Statement {
    let (sql, values) = match backend {
        DatabaseBackend::Sqlite => query.build(SqliteQueryBuilder),
        DatabaseBackend::Postgres => query.build(PostgresQueryBuilder),
        DatabaseBackend::MySql => unreachable!("mysql backend is not supported"),
    };
    Statement::from_sql_and_values(backend, sql, values)
}
