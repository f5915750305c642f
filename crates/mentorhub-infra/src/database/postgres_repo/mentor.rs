use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use mentorhub_core::domain::{Availability, MentorDetails, MentorFilter, MentorProfile};
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::MentorRepository;

use crate::database::entity::json::{AvailabilityList, StringList};
use crate::database::entity::mentor_profile::{self, Entity as MentorEntity};
use crate::database::entity::{mentor_tag, tag};
use crate::database::error::map_db_err;
use crate::database::loaders;
use crate::database::postgres_base::PostgresBaseRepository;

/// Mentor profile repository.
pub type PostgresMentorRepository = PostgresBaseRepository<MentorEntity>;

impl PostgresMentorRepository {
    async fn with_details(
        &self,
        profiles: Vec<MentorProfile>,
    ) -> Result<Vec<MentorDetails>, RepoError> {
        let ids: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();
        let (users, mut tags) = futures::try_join!(
            loaders::user_summaries(&self.db, &ids),
            loaders::mentor_tags(&self.db, &ids),
        )?;

        Ok(profiles
            .into_iter()
            .map(|profile| MentorDetails {
                user: users.get(&profile.user_id).cloned(),
                tags: tags.remove(&profile.user_id).unwrap_or_default(),
                profile,
            })
            .collect())
    }
}

#[async_trait]
impl MentorRepository for PostgresMentorRepository {
    async fn exists(&self, user_id: Uuid) -> Result<bool, RepoError> {
        let count = MentorEntity::find_by_id(user_id)
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<MentorProfile>, RepoError> {
        let result = MentorEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_details(&self, user_id: Uuid) -> Result<Option<MentorDetails>, RepoError> {
        let Some(profile) = self.find(user_id).await? else {
            return Ok(None);
        };

        let mut details = self.with_details(vec![profile]).await?;
        Ok(details.pop())
    }

    async fn upsert(&self, profile: MentorProfile) -> Result<(MentorProfile, bool), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = MentorEntity::find_by_id(profile.user_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let outcome = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.experience = Set(profile.experience);
                active.skills = Set(StringList(profile.skills));
                active.certifications = Set(StringList(profile.certifications));
                active.availability = Set(AvailabilityList(profile.availability));
                active.updated_at = Set(Utc::now().into());

                let updated = active.update(&txn).await.map_err(map_db_err)?;
                (MentorProfile::from(updated), false)
            }
            None => {
                MentorEntity::insert(mentor_profile::ActiveModel::from(profile.clone()))
                    .exec_without_returning(&txn)
                    .await
                    .map_err(map_db_err)?;
                (profile, true)
            }
        };

        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            user_id = %outcome.0.user_id,
            created = outcome.1,
            "Mentor profile saved"
        );
        Ok(outcome)
    }

    async fn set_availability(
        &self,
        user_id: Uuid,
        availability: Vec<Availability>,
    ) -> Result<(), RepoError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = MentorEntity::update_many()
            .col_expr(
                mentor_profile::Column::Availability,
                Expr::value(AvailabilityList(availability)),
            )
            .col_expr(mentor_profile::Column::UpdatedAt, Expr::value(now))
            .filter(mentor_profile::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filter: MentorFilter) -> Result<Vec<MentorDetails>, RepoError> {
        let mut query = MentorEntity::find();

        if let Some(tag_name) = filter.tag.as_deref() {
            let tagged = mentor_tag::Entity::find()
                .select_only()
                .column(mentor_tag::Column::MentorId)
                .inner_join(tag::Entity)
                .filter(tag::Column::Name.eq(tag_name))
                .into_query();
            query = query.filter(mentor_profile::Column::UserId.in_subquery(tagged));
        }

        // Skills live in a JSON column, so the skill filter runs here.
        let profiles: Vec<MentorProfile> = query
            .order_by_desc(mentor_profile::Column::Rating)
            .order_by_desc(mentor_profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(MentorProfile::from)
            .filter(|profile| {
                filter
                    .skill
                    .as_deref()
                    .is_none_or(|skill| profile.has_skill(skill))
            })
            .collect();

        self.with_details(profiles).await
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::domain::Tag;
    use mentorhub_core::ports::TagRepository;

    use super::*;
    use crate::database::postgres_repo::PostgresTagRepository;
    use crate::database::testing::{memory_db, seed_user};

    fn profile(user_id: Uuid, skills: &[&str]) -> MentorProfile {
        MentorProfile::new(
            user_id,
            "10 years".to_string(),
            skills.iter().map(|s| s.to_string()).collect(),
            vec!["CKA".to_string()],
            vec![],
        )
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let db = memory_db().await;
        let user = seed_user(&db, "Mentor").await;
        let repo = PostgresMentorRepository::new(db);

        let (created, was_created) = repo.upsert(profile(user.id, &["rust"])).await.unwrap();
        assert!(was_created);
        assert!(repo.exists(user.id).await.unwrap());

        let mut changed = profile(user.id, &["go", "sql"]);
        changed.experience = "11 years".to_string();
        let (updated, was_created) = repo.upsert(changed).await.unwrap();

        assert!(!was_created);
        assert_eq!(updated.skills, ["go", "sql"]);
        assert_eq!(updated.experience, "11 years");
        assert_eq!(updated.user_id, created.user_id);
    }

    #[tokio::test]
    async fn test_set_availability_requires_profile() {
        let db = memory_db().await;
        let user = seed_user(&db, "Mentor").await;
        let repo = PostgresMentorRepository::new(db);

        let slot = Availability {
            day_of_week: 1,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            is_available: true,
        };
        assert!(matches!(
            repo.set_availability(user.id, vec![slot.clone()]).await,
            Err(RepoError::NotFound)
        ));

        repo.upsert(profile(user.id, &[])).await.unwrap();
        repo.set_availability(user.id, vec![slot.clone()]).await.unwrap();

        let stored = repo.find(user.id).await.unwrap().unwrap();
        assert_eq!(stored.availability, [slot]);
    }

    #[tokio::test]
    async fn test_list_filters_by_skill_and_tag() {
        let db = memory_db().await;
        let rustacean = seed_user(&db, "Rustacean").await;
        let gopher = seed_user(&db, "Gopher").await;
        let repo = PostgresMentorRepository::new(db.clone());
        repo.upsert(profile(rustacean.id, &["Rust"])).await.unwrap();
        repo.upsert(profile(gopher.id, &["Go"])).await.unwrap();

        let tags = PostgresTagRepository::new(db);
        let backend = tags.create(Tag::new("backend", None).unwrap()).await.unwrap();
        tags.attach_to_mentor(gopher.id, &[backend.id]).await.unwrap();

        let by_skill = repo
            .list(MentorFilter {
                skill: Some("rust".to_string()),
                tag: None,
            })
            .await
            .unwrap();
        assert_eq!(by_skill.len(), 1);
        assert_eq!(by_skill[0].user.as_ref().unwrap().name, "Rustacean");

        let by_tag = repo
            .list(MentorFilter {
                skill: None,
                tag: Some("backend".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].profile.user_id, gopher.id);
        assert_eq!(by_tag[0].tags[0].name, "backend");

        assert_eq!(repo.list(MentorFilter::default()).await.unwrap().len(), 2);
    }
}
