//! Post handlers: feed, details, authoring, sharing, saving and deletion.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mentorhub_core::domain::{Post, PostFilter};
use mentorhub_core::error::DomainError;
use mentorhub_core::ports::BaseRepository;
use mentorhub_infra::jobs::media_cleanup_job;
use mentorhub_shared::dto::{
    CreatePostRequest, MessageResponse, PostAnalyticsResponse, SharePostRequest,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub tag: Option<String>,
    pub user: Option<Uuid>,
    /// Whitespace separated; every term must match.
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD`. A bare end date covers the
/// whole day.
fn parse_bound(name: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("{name} must be an RFC 3339 timestamp or YYYY-MM-DD"))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time).and_utc())
}

impl PostQuery {
    fn into_filter(self, viewer: Option<Uuid>) -> Result<PostFilter, AppError> {
        let start = self
            .start_date
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_bound("startDate", v.trim(), false))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_bound("endDate", v.trim(), true))
            .transpose()?;

        Ok(PostFilter {
            tag: self.tag.filter(|t| !t.trim().is_empty()),
            user_id: self.user,
            search_terms: self
                .search
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            start,
            end,
            viewer,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Load a post the caller owns: 404 when missing, 403 for anyone else.
async fn owned_post(state: &AppState, identity: Identity, id: Uuid, what: &str) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id))?;

    identity.ensure_owner(post.user_id, what)?;
    Ok(post)
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let filter = query.into_inner().into_filter(viewer.user_id())?;
    let posts = state.posts.list(filter).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
///
/// Counts a view. Private posts are not found for anyone but their owner.
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let viewer = viewer.user_id();

    let mut details = state
        .posts
        .find_details(id, viewer)
        .await?
        .filter(|details| details.post.is_visible_to(viewer))
        .ok_or_else(|| DomainError::not_found("Post", id))?;

    state.posts.record_view(id).await?;
    details.post.analytics.views += 1;

    Ok(HttpResponse::Ok().json(details))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }

    let media_urls = req
        .media_urls
        .into_iter()
        .filter(|url| !url.trim().is_empty())
        .collect();
    let post = state
        .posts
        .insert(Post::new(identity.user_id, req.content, media_urls, req.is_private))
        .await?;

    tracing::info!(user_id = %identity.user_id, post_id = %post.id, "Post created");
    Ok(HttpResponse::Created().json(post))
}

/// POST /api/posts/{id}/share
///
/// The body is optional.
pub async fn share(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: Option<web::Json<SharePostRequest>>,
) -> AppResult<HttpResponse> {
    let content = body.map(|b| b.into_inner().content).unwrap_or_default();
    let shared = state
        .engagement
        .share_post(identity.user_id, path.into_inner(), content)
        .await?;

    Ok(HttpResponse::Created().json(shared))
}

/// POST /api/posts/{id}/save
pub async fn save(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engagement
        .save_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post saved successfully")))
}

/// GET /api/posts/{id}/analytics
pub async fn analytics(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, identity, path.into_inner(), "view these analytics").await?;
    let counters = post.analytics;

    Ok(HttpResponse::Ok().json(PostAnalyticsResponse {
        views: counters.views,
        shares: counters.shares,
        saved_count: counters.saved_count,
        comment_count: counters.comment_count,
        likes: counters.likes,
        engagement_rate: counters.engagement_rate(),
    }))
}

/// POST /api/posts/{id}/tags
pub async fn attach_tags(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<Vec<Uuid>>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, identity, path.into_inner(), "tag this post").await?;
    let added = state.tags.attach_to_post(post.id, &body.into_inner()).await?;

    tracing::debug!(post_id = %post.id, added, "Tags attached to post");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Tags added successfully")))
}

/// DELETE /api/posts/{id}
///
/// Media cleanup is queued after the delete commits; its outcome never
/// affects this response.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .engagement
        .delete_post(identity.user_id, path.into_inner())
        .await?;

    if !post.media_urls.is_empty() {
        let job = media_cleanup_job(post.media_urls);
        let job_id = job.id.clone();
        match state.jobs.enqueue(job).await {
            Ok(()) => tracing::debug!(post_id = %post.id, job_id = %job_id, "Media cleanup queued"),
            Err(e) => tracing::error!(
                post_id = %post.id,
                job_id = %job_id,
                error = %e,
                "Failed to queue media cleanup"
            ),
        }
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}
