//! Authentication flows: external identity sign-in, password registration
//! and login, token refresh and password change.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{User, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, IdentityVerifier, MentorRepository, PasswordService, TokenPair, TokenService,
    UserRepository,
};

/// Shortest password accepted on registration and password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Outcome of every successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: User,
    pub is_mentor: bool,
}

/// Input of password registration.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepoError> for AuthServiceError {
    fn from(err: RepoError) -> Self {
        AuthServiceError::Domain(err.into())
    }
}

pub struct AuthService {
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    verifier: Arc<dyn IdentityVerifier>,
    users: Arc<dyn UserRepository>,
    mentors: Arc<dyn MentorRepository>,
}

impl AuthService {
    pub fn new(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        verifier: Arc<dyn IdentityVerifier>,
        users: Arc<dyn UserRepository>,
        mentors: Arc<dyn MentorRepository>,
    ) -> Self {
        Self {
            tokens,
            passwords,
            verifier,
            users,
            mentors,
        }
    }

    /// Sign in with an identity provider token, creating the local user on
    /// first sight. Existing users are not refreshed from the new claims and
    /// their last login time is left alone.
    pub async fn authenticate_external(
        &self,
        id_token: &str,
    ) -> Result<AuthSession, AuthServiceError> {
        let identity = self.verifier.verify(id_token).await?;

        let user = match self.users.find_by_external_id(&identity.subject).await? {
            Some(user) => user,
            None => match self.users.insert(identity.to_new_user()).await {
                Ok(user) => user,
                // Lost a race against a concurrent first sign-in, or the
                // email already belongs to another account.
                Err(RepoError::Constraint(msg)) => self
                    .users
                    .find_by_external_id(&identity.subject)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Internal(format!("Creating external user failed: {msg}"))
                    })?,
                Err(err) => return Err(DomainError::Internal(err.to_string()).into()),
            },
        };

        self.open_session(user).await
    }

    pub async fn register(&self, input: Registration) -> Result<AuthSession, AuthServiceError> {
        let email = normalize_email(&input.email);
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()).into());
        }
        validate_password(&input.password)?;

        let hash = self.passwords.hash(&input.password)?;
        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "User".to_string());

        let mut user = User::new(name).with_email(email).with_password_hash(hash);
        user.phone_number = input.phone_number.filter(|p| !p.trim().is_empty());

        let user = self.users.insert(user).await.map_err(|err| match err {
            RepoError::Constraint(_) => {
                DomainError::Conflict("Email already registered".to_string())
            }
            other => other.into(),
        })?;

        let tokens = self.tokens.issue(user.id)?;
        Ok(AuthSession {
            tokens,
            user,
            is_mentor: false,
        })
    }

    /// Password login. Every credential failure looks the same to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthServiceError> {
        let email = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.passwords.verify(password, hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        user.last_login_at = Some(now);

        self.open_session(user).await
    }

    /// Exchange a refresh token for a new pair. The presented token stays
    /// valid until it expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        Ok(self.tokens.refresh(refresh_token)?)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new: &str,
    ) -> Result<(), AuthServiceError> {
        validate_password(new)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.passwords.verify(current, hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let new_hash = self.passwords.hash(new)?;
        self.users.set_password_hash(user_id, &new_hash).await?;
        Ok(())
    }

    async fn open_session(&self, user: User) -> Result<AuthSession, AuthServiceError> {
        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }
        let is_mentor = self.mentors.exists(user.id).await?;
        let tokens = self.tokens.issue(user.id)?;
        Ok(AuthSession {
            tokens,
            user,
            is_mentor,
        })
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
