//! Session token and password ports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub kind: TokenKind,
    /// Random per-token id. Not checked against any revocation list.
    pub token_id: Uuid,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Stateless session tokens.
///
/// Refreshing never revokes the presented refresh token: every refresh token
/// stays usable until it expires.
pub trait TokenService: Send + Sync {
    /// Issue an access and a refresh token for `user_id`.
    fn issue(&self, user_id: Uuid) -> Result<TokenPair, AuthError>;

    /// Verify signature, issuer and validity window of a token.
    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Exchange a refresh token for a new pair.
    fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Refresh,
                actual: claims.kind,
            });
        }
        self.issue(claims.user_id)
    }
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Expected a {expected:?} token, got a {actual:?} token")]
    WrongTokenKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Misconfigured authentication: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Every failure the caller can fix by presenting other credentials.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::ProviderUnavailable(_)
                | AuthError::HashingError(_)
                | AuthError::Configuration(_)
        )
    }
}
