//! JWT session token service.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mentorhub_core::ports::{AuthError, TokenClaims, TokenKind, TokenPair, TokenService};

pub const ACCESS_TOKEN_TTL: TimeDelta = TimeDelta::minutes(15);
pub const REFRESH_TOKEN_TTL: TimeDelta = TimeDelta::days(7);

/// Source of "now" for issuing and validating tokens.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
        }
    }
}

/// Wire claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "type")]
    kind: TokenKind,
    iat: i64,
    nbf: i64,
    exp: i64,
    jti: String,
    iss: String,
}

/// HS256 token service with an injectable clock.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
    clock: Clock,
}

impl JwtTokenService {
    /// Fails when the secret is empty.
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::Configuration(
                "JWT secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
            clock: Arc::new(Utc::now),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind, now: DateTime<Utc>) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let now = (self.clock)();
        Ok(TokenPair {
            access_token: self.sign(user_id, TokenKind::Access, now)?,
            refresh_token: self.sign(user_id, TokenKind::Refresh, now)?,
            expires_in: self.config.access_ttl.num_seconds(),
        })
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // The time window is checked below against the service clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        let now = (self.clock)().timestamp();
        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        if now < claims.nbf {
            return Err(AuthError::InvalidToken("token not yet valid".to_string()));
        }

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let token_id =
            Uuid::parse_str(&claims.jti).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            kind: claims.kind,
            token_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
