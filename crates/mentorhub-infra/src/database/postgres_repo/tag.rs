use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use mentorhub_core::domain::Tag;
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::TagRepository;

use crate::database::entity::tag::{self, Entity as TagEntity};
use crate::database::entity::{mentor_profile, mentor_tag, post_tag, user_tag};
use crate::database::error::map_db_err;
use crate::database::postgres_base::PostgresBaseRepository;

/// Tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

impl PostgresTagRepository {
    /// The subset of `ids` naming existing tags.
    async fn known_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        TagEntity::find()
            .select_only()
            .column(tag::Column::Id)
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create(&self, tag: Tag) -> Result<Tag, RepoError> {
        TagEntity::insert(tag::ActiveModel::from(tag.clone()))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Tag>, RepoError> {
        let mut query = TagEntity::find();
        if let Some(category) = category {
            query = query.filter(tag::Column::Category.eq(category));
        }

        let tags = query
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(tags.into_iter().map(Into::into).collect())
    }

    async fn attach_to_user(&self, user_id: Uuid, tag_ids: &[Uuid]) -> Result<usize, RepoError> {
        let known = self.known_ids(tag_ids).await?;
        if known.is_empty() {
            return Ok(0);
        }

        let links = known.into_iter().map(|tag_id| user_tag::ActiveModel {
            user_id: Set(user_id),
            tag_id: Set(tag_id),
        });
        let added = user_tag::Entity::insert_many(links)
            .on_conflict(
                OnConflict::columns([user_tag::Column::UserId, user_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(added as usize)
    }

    async fn attach_to_mentor(
        &self,
        user_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<usize, RepoError> {
        let has_profile = mentor_profile::Entity::find_by_id(user_id)
            .count(&self.db)
            .await
            .map_err(map_db_err)?
            > 0;
        if !has_profile {
            return Err(RepoError::NotFound);
        }

        let known = self.known_ids(tag_ids).await?;
        if known.is_empty() {
            return Ok(0);
        }

        let links = known.into_iter().map(|tag_id| mentor_tag::ActiveModel {
            mentor_id: Set(user_id),
            tag_id: Set(tag_id),
        });
        let added = mentor_tag::Entity::insert_many(links)
            .on_conflict(
                OnConflict::columns([mentor_tag::Column::MentorId, mentor_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(added as usize)
    }

    async fn attach_to_post(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<usize, RepoError> {
        let known = self.known_ids(tag_ids).await?;
        if known.is_empty() {
            return Ok(0);
        }

        let links = known.into_iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        });
        let added = post_tag::Entity::insert_many(links)
            .on_conflict(
                OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(added as usize)
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::ports::MentorRepository;
    use mentorhub_core::domain::MentorProfile;

    use super::*;
    use crate::database::postgres_repo::PostgresMentorRepository;
    use crate::database::testing::{memory_db, seed_post, seed_user};

    #[tokio::test]
    async fn test_duplicate_name_is_a_constraint_violation() {
        let repo = PostgresTagRepository::new(memory_db().await);
        repo.create(Tag::new("rust", None).unwrap()).await.unwrap();

        let result = repo.create(Tag::new("rust", Some("skill".into())).unwrap()).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = PostgresTagRepository::new(memory_db().await);
        repo.create(Tag::new("rust", Some("skill".into())).unwrap())
            .await
            .unwrap();
        repo.create(Tag::new("hiking", Some("interest".into())).unwrap())
            .await
            .unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        let skills = repo.list(Some("skill")).await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "rust");
    }

    #[tokio::test]
    async fn test_attach_ignores_unknown_and_existing_links() {
        let db = memory_db().await;
        let user = seed_user(&db, "Ada").await;
        let post = seed_post(&db, user.id, "hello", false).await;
        let repo = PostgresTagRepository::new(db);
        let rust = repo.create(Tag::new("rust", None).unwrap()).await.unwrap();
        let go = repo.create(Tag::new("go", None).unwrap()).await.unwrap();

        let first = repo
            .attach_to_post(post.id, &[rust.id, Uuid::new_v4()])
            .await
            .unwrap();
        let second = repo.attach_to_post(post.id, &[rust.id, go.id]).await.unwrap();
        let user_links = repo.attach_to_user(user.id, &[go.id]).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(user_links, 1);
        assert_eq!(repo.attach_to_user(user.id, &[go.id]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_attach_to_mentor_requires_profile() {
        let db = memory_db().await;
        let user = seed_user(&db, "Ada").await;
        let repo = PostgresTagRepository::new(db.clone());
        let tag = repo.create(Tag::new("rust", None).unwrap()).await.unwrap();

        assert!(matches!(
            repo.attach_to_mentor(user.id, &[tag.id]).await,
            Err(RepoError::NotFound)
        ));

        PostgresMentorRepository::new(db)
            .upsert(MentorProfile::new(user.id, String::new(), vec![], vec![], vec![]))
            .await
            .unwrap();
        assert_eq!(repo.attach_to_mentor(user.id, &[tag.id]).await.unwrap(), 1);
    }
}
