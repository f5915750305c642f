//! Tag catalogue and tag attachment handlers.

use actix_web::{HttpResponse, web};
use mentorhub_core::domain::Tag;
use mentorhub_core::error::{DomainError, RepoError};
use mentorhub_shared::dto::{CreateTagRequest, MessageResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub category: Option<String>,
}

/// GET /api/tags
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<TagQuery>,
) -> AppResult<HttpResponse> {
    let category = query.into_inner().category;
    let tags = state
        .tags
        .list(category.as_deref().filter(|c| !c.trim().is_empty()))
        .await?;

    Ok(HttpResponse::Ok().json(tags))
}

/// POST /api/tags
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateTagRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let tag = Tag::new(&req.name, req.category)?;

    let tag = state.tags.create(tag).await.map_err(|err| match err {
        RepoError::Constraint(_) => DomainError::Conflict("Tag already exists".to_string()),
        other => other.into(),
    })?;

    Ok(HttpResponse::Created().json(tag))
}

/// POST /api/user/tags
pub async fn attach_to_user(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Vec<Uuid>>,
) -> AppResult<HttpResponse> {
    let added = state
        .tags
        .attach_to_user(identity.user_id, &body.into_inner())
        .await?;

    tracing::debug!(user_id = %identity.user_id, added, "Tags attached to user");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Tags added successfully")))
}

/// POST /api/mentor/tags
pub async fn attach_to_mentor(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Vec<Uuid>>,
) -> AppResult<HttpResponse> {
    let added = state
        .tags
        .attach_to_mentor(identity.user_id, &body.into_inner())
        .await
        .map_err(|err| match err {
            RepoError::NotFound => DomainError::Missing("Mentor profile not found".to_string()),
            other => other.into(),
        })?;

    tracing::debug!(user_id = %identity.user_id, added, "Tags attached to mentor profile");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Tags added successfully")))
}
