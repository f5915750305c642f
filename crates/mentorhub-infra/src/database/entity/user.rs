//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::{Role, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: Option<String>,
    pub name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            external_id: model.external_id,
            name: model.name,
            email: model.email,
            phone_number: model.phone_number,
            password_hash: model.password_hash,
            role: Role::parse(&model.role),
            bio: model.bio,
            avatar_url: model.avatar_url,
            is_private: model.is_private,
            is_active: model.is_active,
            last_login_at: model.last_login_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            deleted_at: model.deleted_at.map(Into::into),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            external_id: Set(user.external_id),
            name: Set(user.name),
            email: Set(user.email),
            phone_number: Set(user.phone_number),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            bio: Set(user.bio),
            avatar_url: Set(user.avatar_url),
            is_private: Set(user.is_private),
            is_active: Set(user.is_active),
            last_login_at: Set(user.last_login_at.map(Into::into)),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
            deleted_at: Set(user.deleted_at.map(Into::into)),
        }
    }
}
