//! Mentor profile entity, keyed by the owning user's id.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::MentorProfile;

use super::json::{AvailabilityList, StringList};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mentor_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub experience: String,
    pub skills: StringList,
    pub certifications: StringList,
    pub availability: AvailabilityList,
    pub rating: f64,
    pub reviews_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MentorProfile {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            experience: model.experience,
            skills: model.skills.0,
            certifications: model.certifications.0,
            availability: model.availability.0,
            rating: model.rating,
            reviews_count: model.reviews_count,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<MentorProfile> for ActiveModel {
    fn from(profile: MentorProfile) -> Self {
        Self {
            user_id: Set(profile.user_id),
            experience: Set(profile.experience),
            skills: Set(StringList(profile.skills)),
            certifications: Set(StringList(profile.certifications)),
            availability: Set(AvailabilityList(profile.availability)),
            rating: Set(profile.rating),
            reviews_count: Set(profile.reviews_count),
            created_at: Set(profile.created_at.into()),
            updated_at: Set(profile.updated_at.into()),
        }
    }
}
