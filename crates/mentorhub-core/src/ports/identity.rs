//! External identity provider port.

use async_trait::async_trait;

use super::AuthError;
use crate::domain::{User, normalize_email};

/// A verified identity assertion from the external provider.
///
/// Every claim besides the subject is optional; see [`display_name`]
/// for how the local user name is derived.
///
/// [`display_name`]: ExternalIdentity::display_name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub picture: Option<String>,
    pub sign_in_provider: Option<String>,
}

impl ExternalIdentity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// `name` claim, else `"User (<provider>)"`, else `"User"`.
    pub fn display_name(&self) -> String {
        if let Some(name) = non_blank(&self.name) {
            return name.to_string();
        }
        match non_blank(&self.sign_in_provider) {
            Some(provider) => format!("User ({provider})"),
            None => "User".to_string(),
        }
    }

    /// Build the local user created on first sign-in.
    pub fn to_new_user(&self) -> User {
        let mut user = User::new(self.display_name());
        user.external_id = Some(self.subject.clone());
        user.email = non_blank(&self.email).map(normalize_email);
        user.phone_number = non_blank(&self.phone_number).map(str::to_string);
        user.avatar_url = non_blank(&self.picture).map(str::to_string);
        user
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Verifies opaque bearer tokens issued by the identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, AuthError>;
}
