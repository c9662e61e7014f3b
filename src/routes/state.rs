use std::sync::Arc;

use crate::{
    db::{CommentStore, InMemoryStore, ListStore},
    services::{catalog::CatalogProvider, CommentService, ListService},
};

/// Shared handler state; cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub lists: ListService,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(
        comment_store: Arc<dyn CommentStore>,
        list_store: Arc<dyn ListStore>,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            comments: CommentService::new(comment_store),
            lists: ListService::new(list_store, catalog.clone()),
            catalog,
        }
    }

    /// State backed by a fresh [`InMemoryStore`] for both comments and lists
    pub fn in_memory(catalog: Arc<dyn CatalogProvider>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store, catalog)
    }
}
