//! Comment handlers.

use actix_web::{HttpResponse, web};
use mentorhub_core::error::DomainError;
use mentorhub_core::ports::BaseRepository;
use mentorhub_shared::dto::CommentRequest;
use uuid::Uuid;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
///
/// Top-level comments oldest first, each with its replies.
pub async fn list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state
        .posts
        .find_by_id(post_id)
        .await?
        .filter(|post| post.is_visible_to(viewer.user_id()))
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let threads = state.comments.threads(post_id).await?;
    Ok(HttpResponse::Ok().json(threads))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .engagement
        .comment(identity.user_id, path.into_inner(), body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// POST /api/comments/{id}/reply
pub async fn reply(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let reply = state
        .engagement
        .reply(identity.user_id, path.into_inner(), body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(reply))
}
