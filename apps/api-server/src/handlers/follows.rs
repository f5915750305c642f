//! Follow graph handlers.

use actix_web::{HttpResponse, web};
use mentorhub_shared::dto::MessageResponse;
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/users/{id}/follow
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engagement
        .follow(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("Successfully followed user")))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engagement
        .unfollow(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully unfollowed user")))
}

/// GET /api/users/{id}/followers
pub async fn followers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let followers = state.engagement.followers(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(followers))
}

/// GET /api/users/{id}/following
pub async fn following(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let following = state.engagement.following(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(following))
}
