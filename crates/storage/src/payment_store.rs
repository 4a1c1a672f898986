use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::ActiveEnum;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    Set, TransactionTrait,
};
use streamrich_domain::model::{
    GatewayVerdict, NewPayment, PaymentRecord, PurchaseRecord, Reference, VerifyOutcome,
};
use streamrich_domain::storage::{PaymentStore, StorageResult};

use crate::entity::payments::{self, PaymentStatusDb};
use crate::entity::transactions::{self, TransactionKindDb, TransactionStatusDb};
use crate::entity::{products, purchases};
use crate::errors::StorageError;
use crate::{build_update, SeaOrmStorage};

#[async_trait::async_trait]
impl PaymentStore for SeaOrmStorage {
    async fn create_pending_payment(&self, payment: NewPayment) -> StorageResult<PaymentRecord> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        let model = payments::ActiveModel {
            reference: Set(payment.reference.as_str().to_owned()),
            user_id: Set(payment.user_id),
            product_id: Set(payment.product_id),
            amount: Set(payment.amount),
            status: Set(PaymentStatusDb::Pending),
            payment_data: Set(None),
            paid_at: Set(None),
            created_at: Set(payment.created_at),
            ..Default::default()
        };
        let created = model.insert(&txn).await.map_err(StorageError::from_source)?;

        let intent = transactions::ActiveModel {
            reference: Set(payment.reference.as_str().to_owned()),
            user_id: Set(payment.user_id),
            amount: Set(payment.amount),
            kind: Set(TransactionKindDb::Purchase),
            status: Set(TransactionStatusDb::Pending),
            payment_id: Set(Some(created.id)),
            metadata: Set(payment.metadata),
            created_at: Set(payment.created_at),
            ..Default::default()
        };
        intent
            .insert(&txn)
            .await
            .map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;
        payment_to_record(created)
    }

    async fn find_payment(&self, reference: &Reference) -> StorageResult<Option<PaymentRecord>> {
        let maybe = payments::Entity::find()
            .filter(payments::Column::Reference.eq(reference.as_str()))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        maybe.map(payment_to_record).transpose()
    }

    async fn finalize_payment(
        &self,
        reference: &Reference,
        verdict: GatewayVerdict,
    ) -> StorageResult<Option<VerifyOutcome>> {
        let now = Utc::now();
        let backend = self.connection().get_database_backend();
        let target = if verdict.success {
            PaymentStatusDb::Completed
        } else {
            PaymentStatusDb::Failed
        };

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        // Guarded flip out of PENDING; a second verify matches zero rows.
        let mut query = Query::update();
        query.table(payments::Entity);
        query.value(payments::Column::Status, target.to_value());
        query.value(payments::Column::PaymentData, Some(verdict.payload));
        query.value(
            payments::Column::PaidAt,
            if verdict.success {
                verdict.paid_at.or(Some(now))
            } else {
                None
            },
        );
        query.and_where(payments::Column::Reference.eq(reference.as_str()));
        query.and_where(payments::Column::Status.eq(PaymentStatusDb::Pending));
        query.returning_all();

        let maybe_row = txn
            .query_one(build_update(backend, &query))
            .await
            .map_err(StorageError::from_source)?;

        let updated = match maybe_row {
            Some(row) => {
                payments::Model::from_query_result(&row, "").map_err(StorageError::from_source)?
            }
            None => {
                txn.rollback().await.map_err(StorageError::from_source)?;
                return Ok(self
                    .find_payment(reference)
                    .await?
                    .map(|payment| VerifyOutcome::AlreadyFinalized { payment }));
            }
        };

        let mut purchase_created = false;
        if verdict.success {
            purchases::Entity::insert(purchases::ActiveModel {
                user_id: Set(updated.user_id),
                product_id: Set(updated.product_id),
                amount: Set(updated.amount),
                payment_id: Set(updated.id),
                created_at: Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(purchases::Column::PaymentId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(StorageError::from_source)?;

            let mut bump = Query::update();
            bump.table(products::Entity);
            bump.value(
                products::Column::PurchaseCount,
                Expr::col(products::Column::PurchaseCount).add(1),
            );
            bump.and_where(products::Column::Id.eq(updated.product_id));
            txn.execute(build_update(backend, &bump))
                .await
                .map_err(StorageError::from_source)?;

            purchase_created = true;
        }

        // Settle the initialization transaction row to match the verdict.
        let settled = if verdict.success {
            TransactionStatusDb::Completed
        } else {
            TransactionStatusDb::Failed
        };
        let mut settle = Query::update();
        settle.table(transactions::Entity);
        settle.value(transactions::Column::Status, settled.to_value());
        settle.and_where(transactions::Column::Reference.eq(reference.as_str()));
        settle.and_where(transactions::Column::Status.eq(TransactionStatusDb::Pending));
        txn.execute(build_update(backend, &settle))
            .await
            .map_err(StorageError::from_source)?;

        txn.commit().await.map_err(StorageError::from_source)?;

        let payment = payment_to_record(updated)?;
        Ok(Some(VerifyOutcome::Finalized {
            payment,
            purchase_created,
        }))
    }

    async fn find_purchase_by_payment(
        &self,
        payment_id: i64,
    ) -> StorageResult<Option<PurchaseRecord>> {
        let maybe = purchases::Entity::find()
            .filter(purchases::Column::PaymentId.eq(payment_id))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(|model| PurchaseRecord {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            amount: model.amount,
            payment_id: model.payment_id,
            created_at: model.created_at,
        }))
    }
}

fn payment_to_record(model: payments::Model) -> StorageResult<PaymentRecord> {
    let reference = Reference::parse(&model.reference)
        .map_err(|err| StorageError::Database(err.to_string()))?;
    Ok(PaymentRecord {
        id: model.id,
        reference,
        user_id: model.user_id,
        product_id: model.product_id,
        amount: model.amount,
        status: model.status.into(),
        payment_data: model.payment_data,
        paid_at: model.paid_at,
        created_at: model.created_at,
    })
}
