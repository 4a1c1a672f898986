use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use streamrich_domain::auth::Action;
use streamrich_domain::model::{
    ContentFilter, ContentKind, ContentListItem, ContentRecord, ContentStatus, ModerateContent,
    NewContent, Role,
};
use streamrich_domain::storage::ContentStore;

use crate::auth::SessionContext;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub status: Option<ContentStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatorBody {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentBody {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub creator_id: i64,
    pub creator: Option<CreatorBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentPageBody {
    pub items: Vec<ContentBody>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitContentRequest {
    pub title: String,
    pub url: String,
    pub kind: ContentKind,
    pub status: Option<ContentStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModerateContentRequest {
    pub status: ContentStatus,
    pub notes: Option<String>,
}

pub async fn list_content_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ContentQuery>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::ModerateContent)?;

    let filter = ContentFilter::new(
        query.status.unwrap_or(ContentStatus::Pending),
        query.page,
        query.limit,
    );
    let page = state.storage().list_content(filter).await?;
    counter!("api_content_requests_total", "endpoint" => "list").increment(1);

    Ok(HttpResponse::Ok().json(ContentPageBody {
        items: page.items.into_iter().map(item_body).collect(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
        limit: page.limit,
    }))
}

pub async fn submit_content_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    payload: web::Json<SubmitContentRequest>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::SubmitContent)?;
    let payload = payload.into_inner();

    // Admins may self-approve on submission; everyone else starts PENDING.
    let (status, approved_by) = match payload.status.unwrap_or(ContentStatus::Pending) {
        ContentStatus::Pending => (ContentStatus::Pending, None),
        ContentStatus::Approved if session.role() == Role::Admin => {
            (ContentStatus::Approved, Some(session.user_id()))
        }
        ContentStatus::Approved => return Err(ApiError::Forbidden),
        ContentStatus::Rejected => {
            return Err(ApiError::validation(
                "submitted content cannot start out rejected",
            ))
        }
    };

    let created = state
        .storage()
        .insert_content(NewContent {
            title: payload.title,
            url: payload.url,
            kind: payload.kind,
            status,
            approved_by,
            creator_id: session.user_id(),
        })
        .await?;
    let status_tag = created.status.as_ref().to_owned();
    counter!("api_content_requests_total", "endpoint" => "submit", "status" => status_tag)
        .increment(1);

    Ok(HttpResponse::Created().json(content_body(created, None)))
}

pub async fn moderate_content_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ModerateContentRequest>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::ModerateContent)?;
    let id = path.into_inner();

    if payload.status == ContentStatus::Pending {
        return Err(ApiError::validation(
            "moderation status must be APPROVED or REJECTED",
        ));
    }

    let updated = state
        .storage()
        .moderate_content(ModerateContent {
            id,
            status: payload.status,
            notes: payload.notes.clone(),
            moderator_id: session.user_id(),
        })
        .await?;

    let Some(updated) = updated else {
        // The guarded transition matched nothing: either the row is gone or
        // it already left PENDING.
        return match state.storage().find_content(id).await? {
            Some(_) => {
                counter!("api_content_requests_total", "endpoint" => "moderate", "status" => "conflict")
                    .increment(1);
                Err(ApiError::AlreadyModerated)
            }
            None => Err(ApiError::NotFound),
        };
    };

    let status_tag = updated.status.as_ref().to_owned();
    counter!("api_content_requests_total", "endpoint" => "moderate", "status" => status_tag)
        .increment(1);
    Ok(HttpResponse::Ok().json(content_body(updated, None)))
}

pub async fn delete_content_handler(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    session.require(Action::ModerateContent)?;

    if !state.storage().delete_content(path.into_inner()).await? {
        return Err(ApiError::NotFound);
    }
    counter!("api_content_requests_total", "endpoint" => "delete").increment(1);
    Ok(HttpResponse::NoContent().finish())
}

fn item_body(item: ContentListItem) -> ContentBody {
    let creator = item.creator.map(|creator| CreatorBody {
        id: creator.id,
        email: creator.email,
        display_name: creator.display_name,
    });
    content_body(item.content, creator)
}

fn content_body(record: ContentRecord, creator: Option<CreatorBody>) -> ContentBody {
    ContentBody {
        id: record.id,
        title: record.title,
        url: record.url,
        kind: record.kind,
        status: record.status,
        review_notes: record.review_notes,
        submitted_at: record.submitted_at,
        approved_at: record.approved_at,
        approved_by: record.approved_by,
        creator_id: record.creator_id,
        creator,
    }
}
