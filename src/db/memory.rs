use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::{CommentStore, ListStore},
    error::AppResult,
    models::{Comment, ListKey, Subject, UserLists},
};

/// Process-local store backed by maps behind an async lock
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    comments: HashMap<String, Comment>,
    lists: HashMap<String, UserLists>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CommentStore for InMemoryStore {
    async fn comments_for_subject(&self, subject: &Subject) -> AppResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.subject == *subject)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn comment(&self, id: &str) -> AppResult<Option<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner.comments.get(id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.comments.insert(comment.id.clone(), comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.comments.remove(id);
        Ok(())
    }

    async fn set_likes(&self, id: &str, liked_by_ids: &[String]) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(comment) = inner.comments.get_mut(id) {
            comment.liked_by_ids = liked_by_ids.to_vec();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ListStore for InMemoryStore {
    async fn user_lists(&self, user_id: &str) -> AppResult<UserLists> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserLists::empty(user_id)))
    }

    async fn set_list(&self, user_id: &str, key: ListKey, ids: &[String]) -> AppResult<UserLists> {
        let mut inner = self.inner.write().await;
        let lists = inner
            .lists
            .entry(user_id.to_string())
            .or_insert_with(|| UserLists::empty(user_id));
        lists.set(key, ids.to_vec());
        Ok(lists.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::Utc;

    fn comment(id: &str, subject: Subject) -> Comment {
        Comment {
            id: id.to_string(),
            subject,
            parent_id: None,
            author_id: "u1".to_string(),
            text: "hello".to_string(),
            liked_by_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_comments_filtered_by_subject() {
        let store = InMemoryStore::new();
        let matrix = Subject::new(MediaType::Movie, 603);
        let dark = Subject::new(MediaType::Tv, 70523);

        store.insert_comment(&comment("a", matrix)).await.unwrap();
        store.insert_comment(&comment("b", dark)).await.unwrap();

        let found = store.comments_for_subject(&matrix).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[tokio::test]
    async fn test_delete_and_likes() {
        let store = InMemoryStore::new();
        let subject = Subject::new(MediaType::Movie, 603);
        store.insert_comment(&comment("a", subject)).await.unwrap();

        store.set_likes("a", &["u2".to_string()]).await.unwrap();
        let liked = store.comment("a").await.unwrap().unwrap();
        assert_eq!(liked.liked_by_ids, vec!["u2"]);

        store.delete_comment("a").await.unwrap();
        assert!(store.comment("a").await.unwrap().is_none());
    }

    #[test]
    fn test_lists_default_empty_then_set() {
        let store = InMemoryStore::new();

        let lists = tokio_test::block_on(store.user_lists("u1")).unwrap();
        assert_eq!(lists, UserLists::empty("u1"));

        let updated = tokio_test::block_on(store.set_list(
            "u1",
            ListKey::FavoriteTv,
            &["1396".to_string()],
        ))
        .unwrap();
        assert_eq!(updated.favorite_tv_ids, vec!["1396"]);
        assert_eq!(tokio_test::block_on(store.user_lists("u1")).unwrap(), updated);
    }
}
