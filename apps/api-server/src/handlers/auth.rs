//! Sign-in handlers: Firebase, password registration and login, refresh.

use actix_web::{HttpRequest, HttpResponse, web};
use mentorhub_core::domain::User;
use mentorhub_core::services::{AuthSession, Registration};
use mentorhub_shared::dto::{
    AuthResponse, FirebaseAuthRequest, LoginRequest, RegisterRequest, TokenResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub const REFRESH_TOKEN_HEADER: &str = "Refresh-Token";

fn session_response(session: AuthSession) -> AuthResponse<User> {
    AuthResponse {
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        expires_in: session.tokens.expires_in,
        user: session.user,
        is_mentor: session.is_mentor,
    }
}

/// POST /api/auth/firebase
pub async fn firebase(
    state: web::Data<AppState>,
    body: web::Json<FirebaseAuthRequest>,
) -> AppResult<HttpResponse> {
    let token = body.into_inner().firebase_token;
    if token.trim().is_empty() {
        return Err(AppError::BadRequest("firebaseToken is required".to_string()));
    }

    let session = state.auth.authenticate_external(token.trim()).await?;
    tracing::info!(user_id = %session.user.id, "Firebase sign-in");

    Ok(HttpResponse::Ok().json(session_response(session)))
}

/// POST /api/auth/refresh
pub async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let token = req
        .headers()
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Refresh token is required".to_string()))?;

    let tokens = state.auth.refresh(token)?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// POST /api/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .auth
        .register(Registration {
            email: req.email,
            password: req.password,
            name: req.name,
            phone_number: req.phone_number,
        })
        .await?;

    tracing::info!(user_id = %session.user.id, "User registered");
    Ok(HttpResponse::Created().json(session_response(session)))
}

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(session_response(session)))
}
