use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::CommentStore,
    error::{AppError, AppResult},
    middleware::ActingUser,
    models::{Comment, CommentNode, ListAction, MemberId, NewComment, Subject},
    services::{
        comment_tree::{build_comment_tree, limit_depth},
        list_membership,
    },
};

pub const MAX_COMMENT_CHARS: usize = 2000;

/// Deepest reply level accepted on create; a thread starter is level 0
pub const MAX_REPLY_DEPTH: usize = 32;

/// Comment threads attached to catalog subjects
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    /// Full reply forest for a subject, nested at most [`MAX_REPLY_DEPTH`] levels
    pub async fn thread(&self, subject: &Subject) -> AppResult<Vec<CommentNode>> {
        let comments = self.store.comments_for_subject(subject).await?;
        let mut tree = build_comment_tree(&comments);
        limit_depth(&mut tree, MAX_REPLY_DEPTH);

        tracing::debug!(
            tmdb_id = subject.tmdb_id,
            media_type = %subject.media_type,
            comments = comments.len(),
            roots = tree.len(),
            "Comment thread built"
        );

        Ok(tree)
    }

    pub async fn create(
        &self,
        actor: &ActingUser,
        subject: Subject,
        new: NewComment,
    ) -> AppResult<Comment> {
        let text = new.text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidArgument(
                "Comment text cannot be empty".to_string(),
            ));
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::InvalidArgument(format!(
                "Comment text exceeds {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let parent_id = new.parent_id.filter(|p| !p.trim().is_empty());
        if let Some(parent_id) = &parent_id {
            let parent = self
                .store
                .comment(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Parent comment {}", parent_id)))?;
            if parent.subject != subject {
                return Err(AppError::InvalidArgument(
                    "Parent comment belongs to a different title".to_string(),
                ));
            }
            self.check_reply_depth(&parent).await?;
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            subject,
            parent_id,
            author_id: actor.id().to_string(),
            text: text.to_string(),
            liked_by_ids: Vec::new(),
            created_at: Utc::now(),
        };

        self.store.insert_comment(&comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            author_id = %comment.author_id,
            is_reply = comment.parent_id.is_some(),
            "Comment created"
        );

        Ok(comment)
    }

    /// Deletes a comment owned by `actor`. Replies stay and become roots.
    pub async fn delete(&self, actor: &ActingUser, id: &str) -> AppResult<()> {
        let comment = self.load(id).await?;
        if comment.author_id != actor.id() {
            return Err(AppError::Forbidden(
                "Only the author can delete a comment".to_string(),
            ));
        }

        self.store.delete_comment(id).await?;
        tracing::info!(comment_id = %id, author_id = %actor, "Comment deleted");
        Ok(())
    }

    /// Likes the comment if `actor` has not yet, unlikes it otherwise
    pub async fn toggle_like(&self, actor: &ActingUser, id: &str) -> AppResult<Comment> {
        let mut comment = self.load(id).await?;

        let me = MemberId::from(actor.id());
        let action = if comment.liked_by_ids.iter().any(|u| *u == me.canonical()) {
            ListAction::Remove
        } else {
            ListAction::Add
        };

        comment.liked_by_ids = list_membership::reconcile(
            &list_membership::members(&comment.liked_by_ids),
            &me,
            action,
        );
        self.store.set_likes(id, &comment.liked_by_ids).await?;

        tracing::debug!(comment_id = %id, user_id = %actor, action = ?action, "Like toggled");
        Ok(comment)
    }

    /// Walks up from `parent`; a missing ancestor ends the chain like an orphan does
    async fn check_reply_depth(&self, parent: &Comment) -> AppResult<()> {
        let mut depth = 1;
        let mut cursor = parent.parent_id.clone();

        while let Some(ancestor_id) = cursor {
            depth += 1;
            if depth > MAX_REPLY_DEPTH {
                return Err(AppError::InvalidArgument(format!(
                    "Replies cannot be nested more than {} levels deep",
                    MAX_REPLY_DEPTH
                )));
            }
            cursor = self
                .store
                .comment(&ancestor_id)
                .await?
                .and_then(|c| c.parent_id);
        }

        Ok(())
    }

    async fn load(&self, id: &str) -> AppResult<Comment> {
        self.store
            .comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))
    }
}
