use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Named category attached to users, mentor profiles and posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    /// e.g. "skill", "interest", "topic".
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: &str, category: Option<String>) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Tag name is required".to_string()));
        }
        if category.as_deref().is_some_and(|c| c.len() > 50) {
            return Err(DomainError::Validation(
                "Tag category must be at most 50 characters".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.filter(|c| !c.trim().is_empty()),
            created_at: now,
            updated_at: now,
        })
    }
}
