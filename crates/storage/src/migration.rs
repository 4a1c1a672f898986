use sea_orm::sea_query::{ColumnDef, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::{
    contents, payments, plans, products, profiles, purchases, sessions, transactions, users,
};
use streamrich_domain::storage::StorageResult;

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let users_table = Table::create()
        .if_not_exists()
        .table(users::Entity)
        .col(
            ColumnDef::new(users::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(users::Column::Email)
                .string_len(255)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(users::Column::DisplayName)
                .string_len(255)
                .not_null(),
        )
        .col(ColumnDef::new(users::Column::Role).string_len(16).not_null())
        .col(
            ColumnDef::new(users::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, users_table).await?;

    let profiles_table = Table::create()
        .if_not_exists()
        .table(profiles::Entity)
        .col(
            ColumnDef::new(profiles::Column::UserId)
                .big_integer()
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(profiles::Column::Balance)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(profiles::Column::PayoutDetails)
                .text()
                .null(),
        )
        .col(
            ColumnDef::new(profiles::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, profiles_table).await?;

    let contents_table = Table::create()
        .if_not_exists()
        .table(contents::Entity)
        .col(
            ColumnDef::new(contents::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(contents::Column::Title)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(contents::Column::Url)
                .string_len(1024)
                .not_null(),
        )
        .col(
            ColumnDef::new(contents::Column::Kind)
                .string_len(16)
                .not_null(),
        )
        .col(
            ColumnDef::new(contents::Column::Status)
                .string_len(16)
                .not_null(),
        )
        .col(ColumnDef::new(contents::Column::ReviewNotes).text().null())
        .col(
            ColumnDef::new(contents::Column::SubmittedAt)
                .date_time()
                .not_null(),
        )
        .col(
            ColumnDef::new(contents::Column::ApprovedAt)
                .date_time()
                .null(),
        )
        .col(
            ColumnDef::new(contents::Column::ApprovedBy)
                .big_integer()
                .null(),
        )
        .col(
            ColumnDef::new(contents::Column::CreatorId)
                .big_integer()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, contents_table).await?;

    let products_table = Table::create()
        .if_not_exists()
        .table(products::Entity)
        .col(
            ColumnDef::new(products::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(products::Column::Name)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(products::Column::Price)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(products::Column::InStock)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(products::Column::PurchaseCount)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(products::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, products_table).await?;

    let payments_table = Table::create()
        .if_not_exists()
        .table(payments::Entity)
        .col(
            ColumnDef::new(payments::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(payments::Column::Reference)
                .string_len(64)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(payments::Column::UserId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(payments::Column::ProductId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(payments::Column::Amount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(payments::Column::Status)
                .string_len(16)
                .not_null(),
        )
        .col(ColumnDef::new(payments::Column::PaymentData).text().null())
        .col(ColumnDef::new(payments::Column::PaidAt).date_time().null())
        .col(
            ColumnDef::new(payments::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, payments_table).await?;

    // The unique key on payment_id is what makes finalization idempotent.
    let purchases_table = Table::create()
        .if_not_exists()
        .table(purchases::Entity)
        .col(
            ColumnDef::new(purchases::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(purchases::Column::UserId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(purchases::Column::ProductId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(purchases::Column::Amount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(purchases::Column::PaymentId)
                .big_integer()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(purchases::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, purchases_table).await?;

    let transactions_table = Table::create()
        .if_not_exists()
        .table(transactions::Entity)
        .col(
            ColumnDef::new(transactions::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(transactions::Column::Reference)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::UserId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Amount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Kind)
                .string_len(16)
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::Status)
                .string_len(16)
                .not_null(),
        )
        .col(
            ColumnDef::new(transactions::Column::PaymentId)
                .big_integer()
                .null(),
        )
        .col(ColumnDef::new(transactions::Column::Metadata).text().null())
        .col(
            ColumnDef::new(transactions::Column::CreatedAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, transactions_table).await?;

    let plans_table = Table::create()
        .if_not_exists()
        .table(plans::Entity)
        .col(
            ColumnDef::new(plans::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(plans::Column::Name)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(plans::Column::Amount)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(plans::Column::Interval)
                .string_len(32)
                .not_null(),
        )
        .col(ColumnDef::new(plans::Column::Description).text().null())
        .to_owned();
    create_table(db, backend, plans_table).await?;

    let sessions_table = Table::create()
        .if_not_exists()
        .table(sessions::Entity)
        .col(
            ColumnDef::new(sessions::Column::Fingerprint)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(sessions::Column::UserId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(sessions::Column::IssuedAt)
                .date_time()
                .not_null(),
        )
        .col(
            ColumnDef::new(sessions::Column::ExpiresAt)
                .date_time()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, sessions_table).await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(crate::errors::StorageError::from_source)?;
    Ok(())
}
