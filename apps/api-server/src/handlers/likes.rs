//! Like handlers.

use actix_web::{HttpResponse, web};
use mentorhub_shared::dto::MessageResponse;
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engagement
        .like_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post liked successfully")))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engagement
        .unlike_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post unliked successfully")))
}

/// GET /api/posts/{id}/likes
pub async fn likers(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let likers = state.engagement.likers(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(likers))
}
