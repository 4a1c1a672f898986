use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use streamrich_domain::model::{NewSession, SessionIdentity};
use streamrich_domain::storage::{SessionStore, StorageResult};

use crate::entity::{sessions, users};
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl SessionStore for SeaOrmStorage {
    async fn insert_session(&self, session: NewSession) -> StorageResult<()> {
        sessions::ActiveModel {
            fingerprint: Set(session.fingerprint),
            user_id: Set(session.user_id),
            issued_at: Set(session.issued_at),
            expires_at: Set(session.expires_at),
        }
        .insert(self.connection())
        .await
        .map_err(StorageError::from_source)?;
        Ok(())
    }

    async fn resolve_session(
        &self,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<SessionIdentity>> {
        let maybe = sessions::Entity::find_by_id(fingerprint.to_owned())
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        let Some(session) = maybe else {
            return Ok(None);
        };

        let maybe_user = users::Entity::find_by_id(session.user_id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe_user.map(|user| SessionIdentity {
            user_id: user.id,
            email: user.email,
            role: user.role.into(),
            expires_at: session.expires_at,
        }))
    }
}
