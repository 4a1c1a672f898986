use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::ActiveEnum;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use streamrich_domain::model::{
    ContentFilter, ContentListItem, ContentPage, ContentRecord, ContentStatus, CreatorSummary,
    ModerateContent, NewContent,
};
use streamrich_domain::storage::{ContentStore, StorageResult};

use crate::entity::contents::{self, ContentStatusDb};
use crate::entity::users;
use crate::errors::StorageError;
use crate::{build_update, SeaOrmStorage};

#[async_trait::async_trait]
impl ContentStore for SeaOrmStorage {
    async fn insert_content(&self, content: NewContent) -> StorageResult<ContentRecord> {
        let now = Utc::now();
        let approved = content.status == ContentStatus::Approved;
        let model = contents::ActiveModel {
            title: Set(content.title),
            url: Set(content.url),
            kind: Set(content.kind.into()),
            status: Set(content.status.into()),
            review_notes: Set(None),
            submitted_at: Set(now),
            approved_at: Set(approved.then_some(now)),
            approved_by: Set(if approved { content.approved_by } else { None }),
            creator_id: Set(content.creator_id),
            ..Default::default()
        };
        let created = model
            .insert(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(content_to_record(created))
    }

    async fn list_content(&self, filter: ContentFilter) -> StorageResult<ContentPage> {
        let status: ContentStatusDb = filter.status.into();
        let total = contents::Entity::find()
            .filter(contents::Column::Status.eq(status.clone()))
            .count(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let rows = contents::Entity::find()
            .filter(contents::Column::Status.eq(status))
            .order_by_desc(contents::Column::SubmittedAt)
            .find_also_related(users::Entity)
            .offset((filter.page - 1) * filter.limit)
            .limit(filter.limit)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let items = rows
            .into_iter()
            .map(|(content, creator)| ContentListItem {
                content: content_to_record(content),
                creator: creator.map(|user| CreatorSummary {
                    id: user.id,
                    email: user.email,
                    display_name: user.display_name,
                }),
            })
            .collect();

        Ok(ContentPage {
            items,
            total,
            page: filter.page,
            total_pages: total.div_ceil(filter.limit),
            limit: filter.limit,
        })
    }

    async fn find_content(&self, id: i64) -> StorageResult<Option<ContentRecord>> {
        let maybe = contents::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(content_to_record))
    }

    async fn moderate_content(
        &self,
        request: ModerateContent,
    ) -> StorageResult<Option<ContentRecord>> {
        let now = Utc::now();
        let approved = request.status == ContentStatus::Approved;
        let backend = self.connection().get_database_backend();

        // Guarded transition: only PENDING rows move, so APPROVED/REJECTED
        // stay terminal even under concurrent moderation.
        let mut query = Query::update();
        query.table(contents::Entity);
        query.value(
            contents::Column::Status,
            ContentStatusDb::from(request.status).to_value(),
        );
        query.value(contents::Column::ApprovedAt, approved.then_some(now));
        query.value(
            contents::Column::ApprovedBy,
            if approved {
                Some(request.moderator_id)
            } else {
                None
            },
        );
        query.value(contents::Column::ReviewNotes, request.notes.clone());
        query.and_where(contents::Column::Id.eq(request.id));
        query.and_where(contents::Column::Status.eq(ContentStatusDb::Pending));
        query.returning_all();

        let maybe_row = self
            .connection()
            .query_one(build_update(backend, &query))
            .await
            .map_err(StorageError::from_source)?;

        let updated = match maybe_row {
            Some(row) => {
                contents::Model::from_query_result(&row, "").map_err(StorageError::from_source)?
            }
            None => return Ok(None),
        };
        Ok(Some(content_to_record(updated)))
    }

    async fn delete_content(&self, id: i64) -> StorageResult<bool> {
        let result = contents::Entity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(result.rows_affected > 0)
    }
}

fn content_to_record(model: contents::Model) -> ContentRecord {
    ContentRecord {
        id: model.id,
        title: model.title,
        url: model.url,
        kind: model.kind.into(),
        status: model.status.into(),
        review_notes: model.review_notes,
        submitted_at: model.submitted_at,
        approved_at: model.approved_at,
        approved_by: model.approved_by,
        creator_id: model.creator_id,
    }
}
