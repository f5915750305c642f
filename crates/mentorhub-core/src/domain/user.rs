use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base role of an account. Mentorship is modelled by a separate
/// [`MentorProfile`](super::MentorProfile) record, never by a role value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }

    /// Unknown stored values fall back to the base role.
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Role::User,
            _ => Role::User,
        }
    }
}

/// User entity - the identity anchor of every other record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Subject id issued by the external identity provider (Firebase UID).
    pub external_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create an active user with generated ID and timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id: None,
            name: name.into(),
            email: None,
            phone_number: None,
            password_hash: None,
            role: Role::User,
            bio: String::new(),
            avatar_url: None,
            is_private: false,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The slice of a user embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Editable profile fields. An empty or missing name keeps the current one.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub is_private: bool,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            user.name = name;
        }
        user.bio = self.bio;
        user.avatar_url = self.avatar_url;
        user.is_private = self.is_private;
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_profile_update_keeps_name_when_blank() {
        let mut user = User::new("Ada");
        ProfileUpdate {
            name: Some("   ".to_string()),
            bio: "Mentor of engines".to_string(),
            avatar_url: None,
            is_private: true,
        }
        .apply(&mut user);

        assert_eq!(user.name, "Ada");
        assert_eq!(user.bio, "Mentor of engines");
        assert!(user.is_private);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("Ada").with_password_hash("$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "user");
    }
}
