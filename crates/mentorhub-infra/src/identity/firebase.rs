//! Firebase ID token verification against Google's published signing keys.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use mentorhub_core::ports::{AuthError, ExternalIdentity, IdentityVerifier};

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Unknown `kid`s trigger at most one refetch per interval.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

fn unknown_kid(kid: &str) -> AuthError {
    AuthError::InvalidToken(format!("unknown signing key '{kid}'"))
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub jwks_url: String,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
        }
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }
}

/// Claims of a Firebase ID token that sign-in cares about.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    firebase: FirebaseInfo,
}

#[derive(Debug, Default, Deserialize)]
struct FirebaseInfo {
    sign_in_provider: Option<String>,
}

impl From<FirebaseClaims> for ExternalIdentity {
    fn from(claims: FirebaseClaims) -> Self {
        ExternalIdentity {
            subject: claims.sub,
            name: claims.name,
            email: claims.email,
            phone_number: claims.phone_number,
            picture: claims.picture,
            sign_in_provider: claims.firebase.sign_in_provider,
        }
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

enum KeySource {
    Remote(reqwest::Client),
    Fixed,
}

/// RS256 verifier for Firebase ID tokens.
///
/// Keys are cached for an hour and refetched early when a token names an
/// unknown `kid`, at most once a minute.
pub struct FirebaseVerifier {
    config: FirebaseConfig,
    source: KeySource,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            config,
            source: KeySource::Remote(reqwest::Client::new()),
            cache: RwLock::new(None),
        }
    }

    /// Verifier with a fixed key set that is never refetched.
    pub fn with_keys(config: FirebaseConfig, keys: HashMap<String, DecodingKey>) -> Self {
        Self {
            config,
            source: KeySource::Fixed,
            cache: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            })),
        }
    }

    /// Cached key for `kid`. `Err` when the cache already answers "no" and a
    /// refetch is not allowed yet.
    fn cached_key(
        &self,
        cached: &CachedKeys,
        kid: &str,
    ) -> Option<Result<DecodingKey, AuthError>> {
        let fixed = matches!(self.source, KeySource::Fixed);
        let age = cached.fetched_at.elapsed();

        match cached.keys.get(kid) {
            Some(key) if fixed || age < KEY_CACHE_TTL => Some(Ok(key.clone())),
            None if fixed || age < MIN_REFETCH_INTERVAL => Some(Err(unknown_kid(kid))),
            _ => None,
        }
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if let Some(found) = self.cached_key(cached, kid) {
                return found;
            }
        }

        let KeySource::Remote(client) = &self.source else {
            return Err(unknown_kid(kid));
        };

        // One fetch at a time; later waiters reuse its result.
        let mut cache = self.cache.write().await;
        if let Some(found) = cache.as_ref().and_then(|cached| self.cached_key(cached, kid)) {
            return found;
        }

        let keys = self.fetch_keys(client).await?;
        let key = keys.get(kid).cloned();
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| unknown_kid(kid))
    }

    async fn fetch_keys(
        &self,
        client: &reqwest::Client,
    ) -> Result<HashMap<String, DecodingKey>, AuthError> {
        tracing::debug!(url = %self.config.jwks_url, "Fetching Firebase signing keys");

        let set: JwkSet = client
            .get(&self.config.jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "Skipping unusable signing key"),
            }
        }

        tracing::info!(count = keys.len(), "Firebase signing keys refreshed");
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, AuthError> {
        let header = decode_header(id_token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let data = decode::<FirebaseClaims>(id_token, &key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const SIGNING_KEY: &str = include_str!("testdata/signing_key.pem");
    const SIGNING_KEY_PUB: &str = include_str!("testdata/signing_key.pub.pem");
    const FOREIGN_KEY: &str = include_str!("testdata/foreign_key.pem");

    const PROJECT: &str = "mentorhub-test";

    fn verifier() -> FirebaseVerifier {
        let key = DecodingKey::from_rsa_pem(SIGNING_KEY_PUB.as_bytes()).unwrap();
        FirebaseVerifier::with_keys(
            FirebaseConfig::new(PROJECT),
            HashMap::from([("key-1".to_string(), key)]),
        )
    }

    fn sign(private_pem: &str, kid: &str, claims: serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }

    fn claims(sub: &str) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "sub": sub,
            "aud": PROJECT,
            "iss": format!("https://securetoken.google.com/{PROJECT}"),
            "iat": now,
            "exp": now + 3600,
            "email": "grace@example.com",
            "firebase": { "sign_in_provider": "google.com" }
        })
    }

    #[tokio::test]
    async fn test_verifies_valid_token() {
        let token = sign(SIGNING_KEY, "key-1", claims("uid-42"));

        let identity = verifier().verify(&token).await.unwrap();

        assert_eq!(identity.subject, "uid-42");
        assert_eq!(identity.email.as_deref(), Some("grace@example.com"));
        assert_eq!(identity.sign_in_provider.as_deref(), Some("google.com"));
        assert_eq!(identity.name, None);
        assert_eq!(identity.display_name(), "User (google.com)");
    }

    #[tokio::test]
    async fn test_rejects_wrong_audience_and_issuer() {
        let mut wrong_aud = claims("uid-1");
        wrong_aud["aud"] = json!("someone-else");
        let token = sign(SIGNING_KEY, "key-1", wrong_aud);
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::InvalidToken(_))
        ));

        let mut wrong_iss = claims("uid-1");
        wrong_iss["iss"] = json!("https://evil.example.com");
        let token = sign(SIGNING_KEY, "key-1", wrong_iss);
        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature_and_unknown_kid() {
        let forged = sign(FOREIGN_KEY, "key-1", claims("uid-1"));
        assert!(verifier().verify(&forged).await.is_err());

        let unknown = sign(SIGNING_KEY, "key-2", claims("uid-1"));
        assert!(matches!(
            verifier().verify(&unknown).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    /// Remote verifier whose cache was filled `age` ago. The key URL refuses
    /// connections, so any fetch attempt surfaces as `ProviderUnavailable`.
    fn remote_verifier(age: Duration) -> FirebaseVerifier {
        let config = FirebaseConfig {
            jwks_url: "http://127.0.0.1:9/keys".to_string(),
            ..FirebaseConfig::new(PROJECT)
        };
        let key = DecodingKey::from_rsa_pem(SIGNING_KEY_PUB.as_bytes()).unwrap();
        FirebaseVerifier {
            config,
            source: KeySource::Remote(reqwest::Client::new()),
            cache: RwLock::new(Some(CachedKeys {
                keys: HashMap::from([("key-1".to_string(), key)]),
                fetched_at: Instant::now().checked_sub(age).unwrap(),
            })),
        }
    }

    #[tokio::test]
    async fn test_unknown_kid_refetch_is_throttled() {
        let unknown = sign(SIGNING_KEY, "key-2", claims("uid-1"));

        let recent = remote_verifier(Duration::from_secs(5));
        for _ in 0..3 {
            assert!(matches!(
                recent.verify(&unknown).await,
                Err(AuthError::InvalidToken(_))
            ));
        }
        let known = sign(SIGNING_KEY, "key-1", claims("uid-1"));
        assert!(recent.verify(&known).await.is_ok());

        let stale = remote_verifier(MIN_REFETCH_INTERVAL + Duration::from_secs(1));
        assert!(matches!(
            stale.verify(&unknown).await,
            Err(AuthError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_expired_and_empty_subject() {
        let mut expired = claims("uid-1");
        expired["exp"] = json!(Utc::now().timestamp() - 3600);
        let token = sign(SIGNING_KEY, "key-1", expired);
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::TokenExpired)
        ));

        let token = sign(SIGNING_KEY, "key-1", claims(""));
        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        assert!(matches!(
            verifier().verify("not-a-jwt").await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
