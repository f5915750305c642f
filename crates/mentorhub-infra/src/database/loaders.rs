//! Batched eager loading.
//!
//! Every loader issues a single `IN` query per relation, whatever the number
//! of parent rows.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use mentorhub_core::domain::{Post, PostDetails, Tag, User, UserSummary};
use mentorhub_core::error::RepoError;

use super::entity::{mentor_tag, post, post_tag, tag, user};
use super::error::map_db_err;

fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

pub(crate) async fn user_summaries<C>(
    db: &C,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserSummary>, RepoError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(distinct(ids.iter().copied())))
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(users
        .into_iter()
        .map(|model| {
            let user = User::from(model);
            (user.id, user.summary())
        })
        .collect())
}

pub(crate) async fn post_tags<C>(
    db: &C,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError>
where
    C: ConnectionTrait,
{
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.is_in(distinct(post_ids.iter().copied())))
        .find_also_related(tag::Entity)
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(group_tags(rows.into_iter().map(|(link, tag)| (link.post_id, tag))))
}

pub(crate) async fn mentor_tags<C>(
    db: &C,
    mentor_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError>
where
    C: ConnectionTrait,
{
    if mentor_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = mentor_tag::Entity::find()
        .filter(mentor_tag::Column::MentorId.is_in(distinct(mentor_ids.iter().copied())))
        .find_also_related(tag::Entity)
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(group_tags(rows.into_iter().map(|(link, tag)| (link.mentor_id, tag))))
}

fn group_tags(rows: impl Iterator<Item = (Uuid, Option<tag::Model>)>) -> HashMap<Uuid, Vec<Tag>> {
    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (owner, tag) in rows {
        if let Some(tag) = tag {
            grouped.entry(owner).or_default().push(tag.into());
        }
    }
    for tags in grouped.values_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}

async fn posts_by_id<C>(db: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, Post>, RepoError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let posts = post::Entity::find()
        .filter(post::Column::Id.is_in(distinct(ids.iter().copied())))
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(posts
        .into_iter()
        .map(|model| (model.id, Post::from(model)))
        .collect())
}

/// Attach authors, tags and shared originals, keeping the input order.
/// Originals `viewer` may not see are left out.
pub(crate) async fn post_details<C>(
    db: &C,
    posts: Vec<Post>,
    viewer: Option<Uuid>,
) -> Result<Vec<PostDetails>, RepoError>
where
    C: ConnectionTrait,
{
    let author_ids: Vec<Uuid> = posts.iter().map(|p| p.user_id).collect();
    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let original_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.original_post_id).collect();

    let (authors, mut tags, originals) = futures::try_join!(
        user_summaries(db, &author_ids),
        post_tags(db, &post_ids),
        posts_by_id(db, &original_ids),
    )?;

    Ok(posts
        .into_iter()
        .map(|post| PostDetails {
            author: authors.get(&post.user_id).cloned(),
            tags: tags.remove(&post.id).unwrap_or_default(),
            original_post: post
                .original_post_id
                .and_then(|id| originals.get(&id))
                .filter(|original| original.is_visible_to(viewer))
                .cloned(),
            post,
        })
        .collect())
}
