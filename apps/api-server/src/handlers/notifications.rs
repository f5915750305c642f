//! Notification handlers.

use actix_web::{HttpResponse, web};
use mentorhub_core::error::DomainError;
use mentorhub_shared::dto::{MarkAllReadResponse, MessageResponse};
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let notifications = state.notifications.list_for(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let notification = state
        .notifications
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::Missing("Notification not found".to_string()))?;

    identity.ensure_owner(notification.user_id, "read this notification")?;
    state.notifications.mark_read(id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Notification marked as read")))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let updated = state.notifications.mark_all_read(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(MarkAllReadResponse {
        message: "All notifications marked as read".to_string(),
        updated,
    }))
}
