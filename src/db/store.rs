use crate::{
    error::AppResult,
    models::{Comment, ListKey, Subject, UserLists},
};

/// Persistence for threaded comments
#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments attached to a subject, oldest first
    async fn comments_for_subject(&self, subject: &Subject) -> AppResult<Vec<Comment>>;

    async fn comment(&self, id: &str) -> AppResult<Option<Comment>>;

    async fn insert_comment(&self, comment: &Comment) -> AppResult<()>;

    /// Removes a single comment. Replies are left untouched.
    async fn delete_comment(&self, id: &str) -> AppResult<()>;

    /// Replaces the set of users liking a comment
    async fn set_likes(&self, id: &str, liked_by_ids: &[String]) -> AppResult<()>;
}

/// Persistence for per-user id lists
#[async_trait::async_trait]
pub trait ListStore: Send + Sync {
    /// Current lists for a user; empty lists if the user never saved any
    async fn user_lists(&self, user_id: &str) -> AppResult<UserLists>;

    /// Overwrites one list and returns the updated snapshot
    async fn set_list(&self, user_id: &str, key: ListKey, ids: &[String]) -> AppResult<UserLists>;
}
