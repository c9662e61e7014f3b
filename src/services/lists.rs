use std::sync::Arc;

use crate::{
    db::ListStore,
    error::{AppError, AppResult},
    middleware::ActingUser,
    models::{CatalogItem, ListAction, ListKey, MemberId, UserLists},
    services::{
        catalog::{details_batch, CatalogProvider},
        list_membership,
    },
};

/// Favorites and watchlists, reconciled in memory and persisted whole
#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn ListStore>,
    catalog: Arc<dyn CatalogProvider>,
}

impl ListService {
    pub fn new(store: Arc<dyn ListStore>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { store, catalog }
    }

    pub async fn lists(&self, user_id: &str) -> AppResult<UserLists> {
        self.store.user_lists(user_id).await
    }

    /// Adds or removes `candidate` in one of the actor's own lists.
    ///
    /// This is a read-modify-write; concurrent updates to the same list are
    /// last-writer-wins at the store.
    pub async fn update(
        &self,
        actor: &ActingUser,
        key: ListKey,
        candidate: &MemberId,
        action: ListAction,
    ) -> AppResult<UserLists> {
        if candidate.canonical().is_empty() {
            return Err(AppError::InvalidArgument(
                "List item id cannot be empty".to_string(),
            ));
        }

        let current = self.store.user_lists(actor.id()).await?;
        let before = current.get(key);
        let next =
            list_membership::reconcile(&list_membership::members(before), candidate, action);

        if next == before {
            tracing::debug!(user_id = %actor, list = %key, action = ?action, "List unchanged");
            return Ok(current);
        }

        let updated = self.store.set_list(actor.id(), key, &next).await?;
        tracing::info!(
            user_id = %actor,
            list = %key,
            action = ?action,
            item = %candidate.canonical(),
            size = next.len(),
            "List updated"
        );

        Ok(updated)
    }

    /// Resolves a list into catalog entries for display
    pub async fn items(&self, user_id: &str, key: ListKey) -> AppResult<Vec<CatalogItem>> {
        let lists = self.store.user_lists(user_id).await?;
        let media_type = key.media_type();

        let refs: Vec<_> = lists
            .get(key)
            .iter()
            .filter_map(|id| match id.parse::<i64>() {
                Ok(tmdb_id) => Some((media_type, tmdb_id)),
                Err(_) => {
                    tracing::warn!(
                        user_id = %user_id,
                        list = %key,
                        id = %id,
                        "Skipping non-numeric list entry"
                    );
                    None
                }
            })
            .collect();

        details_batch(self.catalog.clone(), refs).await
    }
}
