use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, Set,
    TransactionTrait,
};
use streamrich_domain::model::{
    NewUser, ProfileRecord, Reference, Role, TransactionRecord, UserRecord, WithdrawOutcome,
};
use streamrich_domain::storage::{StorageResult, UserStore};

use crate::entity::transactions::{self, TransactionKindDb, TransactionStatusDb};
use crate::entity::users::RoleDb;
use crate::entity::{profiles, users};
use crate::errors::StorageError;
use crate::{build_update, SeaOrmStorage};

#[async_trait::async_trait]
impl UserStore for SeaOrmStorage {
    async fn insert_user(&self, user: NewUser) -> StorageResult<UserRecord> {
        let now = Utc::now();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        let created = users::ActiveModel {
            email: Set(user.email),
            display_name: Set(user.display_name),
            role: Set(user.role.into()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(StorageError::from_source)?;

        profiles::ActiveModel {
            user_id: Set(created.id),
            balance: Set(0),
            payout_details: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;
        Ok(user_to_record(created))
    }

    async fn find_user(&self, id: i64) -> StorageResult<Option<UserRecord>> {
        let maybe = users::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(user_to_record))
    }

    async fn update_role(&self, user_id: i64, role: Role) -> StorageResult<Option<UserRecord>> {
        let Some(existing) = users::Entity::find_by_id(user_id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = existing.into();
        active.role = Set(RoleDb::from(role));
        let updated = active
            .update(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(Some(user_to_record(updated)))
    }

    async fn find_profile(&self, user_id: i64) -> StorageResult<Option<ProfileRecord>> {
        let maybe = profiles::Entity::find_by_id(user_id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(profile_to_record))
    }

    async fn credit_balance(
        &self,
        user_id: i64,
        amount: i64,
    ) -> StorageResult<Option<ProfileRecord>> {
        let backend = self.connection().get_database_backend();

        let mut query = Query::update();
        query.table(profiles::Entity);
        query.value(
            profiles::Column::Balance,
            Expr::col(profiles::Column::Balance).add(amount),
        );
        query.and_where(profiles::Column::UserId.eq(user_id));
        query.returning_all();

        let maybe_row = self
            .connection()
            .query_one(build_update(backend, &query))
            .await
            .map_err(StorageError::from_source)?;
        let Some(row) = maybe_row else {
            return Ok(None);
        };
        let updated =
            profiles::Model::from_query_result(&row, "").map_err(StorageError::from_source)?;
        Ok(Some(profile_to_record(updated)))
    }

    async fn withdraw(&self, user_id: i64, amount: i64) -> StorageResult<WithdrawOutcome> {
        let now = Utc::now();
        let backend = self.connection().get_database_backend();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        // Guarded decrement; overdrawing matches zero rows.
        let mut query = Query::update();
        query.table(profiles::Entity);
        query.value(
            profiles::Column::Balance,
            Expr::col(profiles::Column::Balance).sub(amount),
        );
        query.and_where(profiles::Column::UserId.eq(user_id));
        query.and_where(profiles::Column::Balance.gte(amount));
        query.returning_all();

        let maybe_row = txn
            .query_one(build_update(backend, &query))
            .await
            .map_err(StorageError::from_source)?;

        let Some(row) = maybe_row else {
            txn.rollback().await.map_err(StorageError::from_source)?;
            return Ok(match self.find_profile(user_id).await? {
                Some(_) => WithdrawOutcome::InsufficientBalance,
                None => WithdrawOutcome::NoProfile,
            });
        };
        let profile =
            profiles::Model::from_query_result(&row, "").map_err(StorageError::from_source)?;

        let reference = Reference::generate(now).map_err(StorageError::from_source)?;
        let created = transactions::ActiveModel {
            reference: Set(reference.as_str().to_owned()),
            user_id: Set(user_id),
            amount: Set(amount),
            kind: Set(TransactionKindDb::Withdrawal),
            status: Set(TransactionStatusDb::Pending),
            payment_id: Set(None),
            metadata: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        Ok(WithdrawOutcome::Accepted {
            remaining_balance: profile.balance,
            transaction: transaction_to_record(created)?,
        })
    }
}

fn user_to_record(model: users::Model) -> UserRecord {
    UserRecord {
        id: model.id,
        email: model.email,
        display_name: model.display_name,
        role: model.role.into(),
        created_at: model.created_at,
    }
}

fn profile_to_record(model: profiles::Model) -> ProfileRecord {
    ProfileRecord {
        user_id: model.user_id,
        balance: model.balance,
        payout_details: model.payout_details,
        created_at: model.created_at,
    }
}

pub(crate) fn transaction_to_record(
    model: transactions::Model,
) -> StorageResult<TransactionRecord> {
    let reference = Reference::parse(&model.reference)
        .map_err(|err| StorageError::Database(err.to_string()))?;
    Ok(TransactionRecord {
        id: model.id,
        reference,
        user_id: model.user_id,
        amount: model.amount,
        kind: model.kind.into(),
        status: model.status.into(),
        payment_id: model.payment_id,
        metadata: model.metadata,
        created_at: model.created_at,
    })
}
