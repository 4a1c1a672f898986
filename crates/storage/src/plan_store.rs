use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use streamrich_domain::model::{NewPlan, PlanRecord};
use streamrich_domain::storage::{PlanStore, StorageResult};

use crate::entity::plans;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl PlanStore for SeaOrmStorage {
    async fn insert_plan(&self, plan: NewPlan) -> StorageResult<PlanRecord> {
        let model = plans::ActiveModel {
            name: Set(plan.name),
            amount: Set(plan.amount),
            interval: Set(plan.interval),
            description: Set(plan.description),
            ..Default::default()
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(plan_to_record(created))
    }

    async fn list_plans(&self) -> StorageResult<Vec<PlanRecord>> {
        let rows = plans::Entity::find()
            .order_by_asc(plans::Column::Amount)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(rows.into_iter().map(plan_to_record).collect())
    }
}

fn plan_to_record(model: plans::Model) -> PlanRecord {
    PlanRecord {
        id: model.id,
        name: model.name,
        amount: model.amount,
        interval: model.interval,
        description: model.description,
    }
}
