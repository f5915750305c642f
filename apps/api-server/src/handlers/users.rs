//! Profile and public user handlers.

use actix_web::{HttpResponse, web};
use mentorhub_core::domain::{ProfileUpdate, User};
use mentorhub_core::error::{DomainError, RepoError};
use mentorhub_core::ports::BaseRepository;
use mentorhub_shared::dto::{
    ChangePasswordRequest, MessageResponse, PrivateProfileResponse, ProfileResponse,
    UpdateProfileRequest,
};
use uuid::Uuid;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn load_user(state: &AppState, id: Uuid) -> AppResult<User> {
    Ok(state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", id))?)
}

/// GET /api/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, identity.user_id).await?;
    let mentor_profile = state.mentors.find_details(user.id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        is_mentor: mentor_profile.is_some(),
        user,
        mentor_profile,
    }))
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let update = ProfileUpdate {
        name: req.name,
        bio: req.bio,
        avatar_url: req.avatar_url.filter(|url| !url.trim().is_empty()),
        is_private: req.is_private,
    };

    let user = state
        .users
        .update_profile(identity.user_id, update)
        .await
        .map_err(|err| match err {
            RepoError::NotFound => DomainError::not_found("User", identity.user_id),
            other => other.into(),
        })?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(HttpResponse::Ok().json(user))
}

/// PUT /api/profile/password
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state
        .auth
        .change_password(identity.user_id, &req.current_password, &req.new_password)
        .await?;

    tracing::info!(user_id = %identity.user_id, "Password changed");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}

/// GET /api/profile/saved-posts
pub async fn saved_posts(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.saved_by(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/profile/deactivate
pub async fn deactivate(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.users.deactivate(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Account deactivated successfully")))
}

/// GET /api/users/{id}
///
/// Private accounts expose only their id, name, avatar and privacy flag to
/// anyone but themselves. Deactivated accounts are not found.
pub async fn get_user(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;
    if !user.is_active {
        return Err(DomainError::not_found("User", user.id).into());
    }

    if user.is_private && viewer.user_id() != Some(user.id) {
        return Ok(HttpResponse::Ok().json(PrivateProfileResponse {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            is_private: true,
        }));
    }

    Ok(HttpResponse::Ok().json(user))
}
