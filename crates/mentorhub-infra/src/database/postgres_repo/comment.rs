use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use mentorhub_core::domain::{Comment, CommentThread, CommentView};
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::CommentRepository;

use crate::database::entity::comment::{self, Entity as CommentEntity};
use crate::database::error::map_db_err;
use crate::database::loaders;
use crate::database::postgres_base::PostgresBaseRepository;

/// Comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn threads(&self, post_id: Uuid) -> Result<Vec<CommentThread>, RepoError> {
        let comments: Vec<Comment> = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Into::into)
            .collect();

        let author_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
        let authors = loaders::user_summaries(&self.db, &author_ids).await?;
        let view = |comment: Comment| CommentView {
            author: authors.get(&comment.user_id).cloned(),
            comment,
        };

        let (roots, replies): (Vec<Comment>, Vec<Comment>) =
            comments.into_iter().partition(|c| c.parent_id.is_none());

        let mut threads: Vec<CommentThread> = roots
            .into_iter()
            .map(|root| CommentThread {
                comment: view(root),
                replies: Vec::new(),
            })
            .collect();

        for reply in replies {
            let parent = reply.parent_id;
            let thread = threads
                .iter_mut()
                .find(|thread| Some(thread.comment.comment.id) == parent);
            if let Some(thread) = thread {
                thread.replies.push(view(reply));
            }
        }

        Ok(threads)
    }
}
