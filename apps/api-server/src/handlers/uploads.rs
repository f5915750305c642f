//! Media upload handler.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use mentorhub_core::ports::MediaUpload;
use mentorhub_shared::dto::UploadResponse;
use serde::Deserialize;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub const DEFAULT_FOLDER: &str = "mentorship";

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub folder: Option<String>,
}

/// Letters, digits, `-`, `_` and `/`-separated segments only.
fn folder_name(folder: Option<String>) -> Result<String, AppError> {
    let Some(folder) = folder.map(|f| f.trim().trim_matches('/').to_string()) else {
        return Ok(DEFAULT_FOLDER.to_string());
    };
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }

    let valid = folder.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    if !valid {
        return Err(AppError::BadRequest(format!("Invalid folder '{folder}'")));
    }
    Ok(folder)
}

/// POST /api/uploads?folder=<name>
///
/// The request body is the raw file.
pub async fn upload(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    }

    let folder = folder_name(query.into_inner().folder)?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let size = body.len();
    let url = state
        .media
        .upload(MediaUpload {
            bytes: body.to_vec(),
            folder,
            content_type,
        })
        .await?;

    tracing::info!(user_id = %identity.user_id, size, "Media uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}
