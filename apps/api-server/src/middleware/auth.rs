//! Authentication extractors.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use mentorhub_core::ports::{AuthError, TokenClaims, TokenKind};
use uuid::Uuid;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated caller, resolved from a Bearer access token.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

impl Identity {
    /// 403 unless the caller is `owner_id`.
    pub fn ensure_owner(&self, owner_id: Uuid, what: &str) -> Result<(), AppError> {
        if self.user_id != owner_id {
            return Err(AppError::Forbidden(format!("Not allowed to {what}")));
        }
        Ok(())
    }
}

impl TryFrom<TokenClaims> for Identity {
    type Error = AuthError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        if claims.kind != TokenKind::Access {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Access,
                actual: claims.kind,
            });
        }
        Ok(Self {
            user_id: claims.user_id,
        })
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AppError::Internal("Server configuration error".to_string()));
    };

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims = state.tokens.validate(token)?;
    Ok(Identity::try_from(claims)?)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
/// An invalid token is treated as no token.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
