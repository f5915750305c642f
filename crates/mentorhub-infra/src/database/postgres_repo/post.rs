use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};
use uuid::Uuid;

use mentorhub_core::domain::{Post, PostDetails, PostFilter};
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::PostRepository;

use crate::database::entity::post::{self, Entity as PostEntity};
use crate::database::entity::{post_tag, saved_post, tag};
use crate::database::error::map_db_err;
use crate::database::loaders;
use crate::database::postgres_base::PostgresBaseRepository;

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own wildcards matched literally.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// Post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

fn visible_to(viewer: Option<Uuid>) -> Condition {
    match viewer {
        Some(viewer) => Condition::any()
            .add(post::Column::IsPrivate.eq(false))
            .add(post::Column::UserId.eq(viewer)),
        None => Condition::all().add(post::Column::IsPrivate.eq(false)),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_details(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostDetails>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut details = loaders::post_details(&self.db, vec![model.into()], viewer).await?;
        Ok(details.pop())
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<PostDetails>, RepoError> {
        let mut query = PostEntity::find().filter(visible_to(filter.viewer));

        if let Some(user_id) = filter.user_id {
            query = query.filter(post::Column::UserId.eq(user_id));
        }

        if let Some(tag_name) = filter.tag.as_deref() {
            let tagged = post_tag::Entity::find()
                .select_only()
                .column(post_tag::Column::PostId)
                .inner_join(tag::Entity)
                .filter(tag::Column::Name.eq(tag_name))
                .into_query();
            query = query.filter(post::Column::Id.in_subquery(tagged));
        }

        for term in filter.search_terms.iter().filter(|t| !t.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Content))))
                    .like(contains_pattern(term)),
            );
        }

        if let Some(start) = filter.start {
            let start: DateTimeWithTimeZone = start.into();
            query = query.filter(post::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filter.end {
            let end: DateTimeWithTimeZone = end.into();
            query = query.filter(post::Column::CreatedAt.lte(end));
        }

        let posts = query
            .order_by_desc(post::Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(count = posts.len(), "Listed posts");

        loaders::post_details(
            &self.db,
            posts.into_iter().map(Into::into).collect(),
            filter.viewer,
        )
        .await
    }

    async fn record_view(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn saved_by(&self, user_id: Uuid) -> Result<Vec<PostDetails>, RepoError> {
        let links = saved_post::Entity::find()
            .filter(saved_post::Column::UserId.eq(user_id))
            .order_by_desc(saved_post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = links.iter().map(|link| link.post_id).collect();
        let mut posts: Vec<Post> = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Into::into)
            .filter(|post: &Post| post.is_visible_to(Some(user_id)))
            .collect();

        posts.sort_by_key(|post| ids.iter().position(|id| *id == post.id));

        loaders::post_details(&self.db, posts, Some(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use mentorhub_core::domain::Tag;
    use mentorhub_core::ports::{BaseRepository, EngagementRepository, TagRepository};

    use super::*;
    use crate::database::postgres_repo::PostgresTagRepository;
    use crate::database::testing::{memory_db, seed_post, seed_user};
    use crate::database::PostgresEngagementRepository;

    #[tokio::test]
    async fn test_private_posts_are_listed_only_for_their_owner() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let other = seed_user(&db, "Other").await;
        seed_post(&db, owner.id, "public words", false).await;
        seed_post(&db, owner.id, "private words", true).await;

        let repo = PostgresPostRepository::new(db);
        let anonymous = repo.list(PostFilter::default()).await.unwrap();
        let as_owner = repo
            .list(PostFilter {
                viewer: Some(owner.id),
                ..Default::default()
            })
            .await
            .unwrap();
        let as_other = repo
            .list(PostFilter {
                viewer: Some(other.id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(anonymous.len(), 1);
        assert_eq!(as_owner.len(), 2);
        assert_eq!(as_other.len(), 1);
        assert_eq!(anonymous[0].author.as_ref().unwrap().name, "Owner");
    }

    #[tokio::test]
    async fn test_every_search_term_must_match() {
        let db = memory_db().await;
        let user = seed_user(&db, "Writer").await;
        seed_post(&db, user.id, "Learning Rust with a mentor", false).await;
        seed_post(&db, user.id, "Learning Go", false).await;

        let repo = PostgresPostRepository::new(db);
        let found = repo
            .list(PostFilter {
                search_terms: vec!["learning".to_string(), "RUST".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].post.content.contains("Rust"));
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let db = memory_db().await;
        let user = seed_user(&db, "Writer").await;
        seed_post(&db, user.id, "Half off: 50% discount", false).await;
        seed_post(&db, user.id, "snake_case names", false).await;
        seed_post(&db, user.id, "plain text", false).await;

        let repo = PostgresPostRepository::new(db);
        let search = |term: &str| PostFilter {
            search_terms: vec![term.to_string()],
            ..Default::default()
        };

        let percent = repo.list(search("%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert!(percent[0].post.content.contains("50%"));

        let underscore = repo.list(search("_")).await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert!(underscore[0].post.content.contains("snake_case"));
    }

    #[tokio::test]
    async fn test_filters_by_tag_author_and_date() {
        let db = memory_db().await;
        let alice = seed_user(&db, "Alice").await;
        let bob = seed_user(&db, "Bob").await;
        let tagged = seed_post(&db, alice.id, "tagged", false).await;
        seed_post(&db, alice.id, "untagged", false).await;
        seed_post(&db, bob.id, "bob's", false).await;

        let tags = PostgresTagRepository::new(db.clone());
        let rust = tags.create(Tag::new("rust", None).unwrap()).await.unwrap();
        tags.attach_to_post(tagged.id, &[rust.id]).await.unwrap();

        let repo = PostgresPostRepository::new(db);
        let by_tag = repo
            .list(PostFilter {
                tag: Some("rust".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].post.id, tagged.id);
        assert_eq!(by_tag[0].tags[0].name, "rust");

        let by_author = repo
            .list(PostFilter {
                user_id: Some(bob.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_author.len(), 1);

        let in_future = repo
            .list(PostFilter {
                start: Some(Utc::now() + TimeDelta::days(1)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(in_future.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let db = memory_db().await;
        let user = seed_user(&db, "Writer").await;
        let repo = PostgresPostRepository::new(db);

        let now = Utc::now();
        for (i, content) in ["first", "second", "third"].into_iter().enumerate() {
            let mut post = Post::new(user.id, content.to_string(), vec![], false);
            post.created_at = now + TimeDelta::seconds(i as i64);
            repo.insert(post).await.unwrap();
        }

        let page = repo
            .list(PostFilter {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        let contents: Vec<_> = page.iter().map(|d| d.post.content.as_str()).collect();
        assert_eq!(contents, ["third", "second"]);

        let rest = repo
            .list(PostFilter {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].post.content, "first");
    }

    #[tokio::test]
    async fn test_record_view() {
        let db = memory_db().await;
        let user = seed_user(&db, "Writer").await;
        let post = seed_post(&db, user.id, "hello", false).await;
        let repo = PostgresPostRepository::new(db);

        repo.record_view(post.id).await.unwrap();
        repo.record_view(post.id).await.unwrap();

        let stored: Post = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.analytics.views, 2);
        assert!(matches!(
            repo.record_view(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_share_details_hide_private_original_from_others() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let original = seed_post(&db, owner.id, "mine", false).await;

        let engagement = PostgresEngagementRepository::new(db.clone());
        let shared = engagement
            .share_post(owner.id, original.id, "look".to_string())
            .await
            .unwrap();

        let repo = PostgresPostRepository::new(db);
        let mut private = original.clone();
        private.is_private = true;
        repo.update(private).await.unwrap();

        let for_owner = repo.find_details(shared.id, Some(owner.id)).await.unwrap().unwrap();
        let for_anyone = repo.find_details(shared.id, None).await.unwrap().unwrap();

        assert_eq!(for_owner.original_post.unwrap().id, original.id);
        assert!(for_anyone.original_post.is_none());
    }

    #[tokio::test]
    async fn test_saved_by_lists_saved_posts() {
        let db = memory_db().await;
        let author = seed_user(&db, "Author").await;
        let reader = seed_user(&db, "Reader").await;
        let first = seed_post(&db, author.id, "first", false).await;
        let second = seed_post(&db, author.id, "second", false).await;

        let engagement = PostgresEngagementRepository::new(db.clone());
        engagement.save_post(reader.id, first.id).await.unwrap();
        engagement.save_post(reader.id, second.id).await.unwrap();

        let saved = PostgresPostRepository::new(db)
            .saved_by(reader.id)
            .await
            .unwrap();

        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|d| d.author.is_some()));
    }
}
