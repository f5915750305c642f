use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, UserSummary};
use crate::error::DomainError;

/// One weekly time window of a mentor's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// 0-6, Sunday first.
    pub day_of_week: u8,
    /// `HH:MM`, 24h clock.
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

impl Availability {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.day_of_week > 6 {
            return Err(DomainError::Validation(format!(
                "dayOfWeek must be between 0 and 6, got {}",
                self.day_of_week
            )));
        }

        let start = parse_clock(&self.start_time)?;
        let end = parse_clock(&self.end_time)?;
        if start >= end {
            return Err(DomainError::Validation(format!(
                "startTime {} must be before endTime {}",
                self.start_time, self.end_time
            )));
        }

        Ok(())
    }

    pub fn validate_all(slots: &[Availability]) -> Result<(), DomainError> {
        slots.iter().try_for_each(Availability::validate)
    }
}

fn parse_clock(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| DomainError::Validation(format!("invalid time '{value}', expected HH:MM")))
}

/// Mentor profile - a one-to-one extension of [`User`](super::User),
/// keyed by the same user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub user_id: Uuid,
    pub experience: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub availability: Vec<Availability>,
    pub rating: f64,
    pub reviews_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MentorProfile {
    pub fn new(
        user_id: Uuid,
        experience: String,
        skills: Vec<String>,
        certifications: Vec<String>,
        availability: Vec<Availability>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            experience,
            skills,
            certifications,
            availability,
            rating: 0.0,
            reviews_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s.eq_ignore_ascii_case(skill))
    }
}

/// Mentor listing filters; both are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    pub skill: Option<String>,
    pub tag: Option<String>,
}

/// A mentor profile with its user and tags loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorDetails {
    #[serde(flatten)]
    pub profile: MentorProfile,
    pub user: Option<UserSummary>,
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: u8, start: &str, end: &str) -> Availability {
        Availability {
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_available: true,
        }
    }

    #[test]
    fn test_valid_slot() {
        assert!(slot(1, "09:00", "17:30").validate().is_ok());
    }

    #[test]
    fn test_rejects_day_out_of_range() {
        assert!(matches!(
            slot(7, "09:00", "10:00").validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_or_inverted_times() {
        assert!(slot(2, "9am", "10:00").validate().is_err());
        assert!(slot(2, "11:00", "10:00").validate().is_err());
        assert!(slot(2, "10:00", "10:00").validate().is_err());
    }

    #[test]
    fn test_schedule_wire_format() {
        let json = serde_json::to_value(slot(0, "08:00", "09:00")).unwrap();
        assert_eq!(json["dayOfWeek"], 0);
        assert_eq!(json["startTime"], "08:00");
        assert_eq!(json["isAvailable"], true);
    }
}
