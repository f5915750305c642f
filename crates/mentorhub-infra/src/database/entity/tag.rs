//! Tag entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::Tag;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Tag {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Tag> for ActiveModel {
    fn from(tag: Tag) -> Self {
        Self {
            id: Set(tag.id),
            name: Set(tag.name),
            category: Set(tag.category),
            created_at: Set(tag.created_at.into()),
            updated_at: Set(tag.updated_at.into()),
        }
    }
}
