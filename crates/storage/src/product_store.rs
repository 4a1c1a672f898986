use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use streamrich_domain::model::{NewProduct, ProductRecord};
use streamrich_domain::storage::{ProductStore, StorageResult};

use crate::entity::products;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl ProductStore for SeaOrmStorage {
    async fn insert_product(&self, product: NewProduct) -> StorageResult<ProductRecord> {
        let model = products::ActiveModel {
            name: Set(product.name),
            price: Set(product.price),
            in_stock: Set(product.in_stock),
            purchase_count: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(product_to_record(created))
    }

    async fn list_products(&self) -> StorageResult<Vec<ProductRecord>> {
        let rows = products::Entity::find()
            .filter(products::Column::InStock.eq(true))
            .order_by_asc(products::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(rows.into_iter().map(product_to_record).collect())
    }

    async fn find_product(&self, id: i64) -> StorageResult<Option<ProductRecord>> {
        let maybe = products::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(product_to_record))
    }
}

fn product_to_record(model: products::Model) -> ProductRecord {
    ProductRecord {
        id: model.id,
        name: model.name,
        price: model.price,
        in_stock: model.in_stock,
        purchase_count: model.purchase_count,
        created_at: model.created_at,
    }
}
