//! Mentor profile handlers.

use actix_web::{HttpResponse, web};
use mentorhub_core::domain::{Availability, MentorFilter, MentorProfile};
use mentorhub_core::error::{DomainError, RepoError};
use mentorhub_shared::dto::{AvailabilitySlot, MentorProfileRequest, MessageResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MentorQuery {
    pub skill: Option<String>,
    pub tag: Option<String>,
}

fn to_slots(slots: Vec<AvailabilitySlot>) -> Result<Vec<Availability>, DomainError> {
    let slots: Vec<Availability> = slots
        .into_iter()
        .map(|slot| Availability {
            day_of_week: slot.day_of_week,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_available: slot.is_available,
        })
        .collect();

    Availability::validate_all(&slots)?;
    Ok(slots)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/mentors
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<MentorQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let mentors = state
        .mentors
        .list(MentorFilter {
            skill: non_blank(query.skill),
            tag: non_blank(query.tag),
        })
        .await?;

    Ok(HttpResponse::Ok().json(mentors))
}

/// GET /api/mentors/{user_id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let mentor = state
        .mentors
        .find_details(path.into_inner())
        .await?
        .ok_or_else(|| DomainError::Missing("Mentor profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(mentor))
}

/// POST /api/mentor/profile
///
/// 201 when the profile is created, 200 when an existing one is replaced.
pub async fn upsert_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<MentorProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let availability = to_slots(req.availability)?;

    let profile = MentorProfile::new(
        identity.user_id,
        req.experience,
        req.skills,
        req.certifications,
        availability,
    );
    let (profile, created) = state.mentors.upsert(profile).await?;

    if created {
        Ok(HttpResponse::Created().json(profile))
    } else {
        Ok(HttpResponse::Ok().json(profile))
    }
}

/// PUT /api/mentor/availability
///
/// The body is the full list of slots; it replaces the stored one.
pub async fn set_availability(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Vec<AvailabilitySlot>>,
) -> AppResult<HttpResponse> {
    let availability = to_slots(body.into_inner())?;

    state
        .mentors
        .set_availability(identity.user_id, availability)
        .await
        .map_err(|err| match err {
            RepoError::NotFound => DomainError::Missing("Mentor profile not found".to_string()),
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Availability updated successfully")))
}
