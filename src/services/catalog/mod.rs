//! Media catalog abstraction
//!
//! The catalog is an external service that maps a TMDB id to display
//! metadata. Providers only fetch single pages and single titles; paging
//! aggregation and batch lookups are built on top in this module.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, MediaType},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Most trending pages fetched for a single request
pub const MAX_TRENDING_PAGES: u32 = 5;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Display metadata for one title
    async fn details(&self, media_type: MediaType, tmdb_id: i64) -> AppResult<CatalogItem>;

    /// One page of free-text search results across movies and series
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<CatalogItem>>;

    /// One page of this week's trending titles
    async fn trending(&self, media_type: MediaType, page: u32) -> AppResult<Vec<CatalogItem>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Fetches trending pages `1..=pages` and merges them, dropping titles
/// already seen on an earlier page.
pub async fn trending_pages(
    provider: Arc<dyn CatalogProvider>,
    media_type: MediaType,
    pages: u32,
) -> AppResult<Vec<CatalogItem>> {
    if !(1..=MAX_TRENDING_PAGES).contains(&pages) {
        return Err(AppError::InvalidArgument(format!(
            "pages must be between 1 and {}",
            MAX_TRENDING_PAGES
        )));
    }

    let mut fetched = Vec::with_capacity(pages as usize);
    for page in 1..=pages {
        fetched.push(provider.trending(media_type, page).await?);
    }

    let merged = merge_pages(fetched);
    tracing::info!(
        provider = provider.name(),
        media_type = %media_type,
        pages,
        items = merged.len(),
        "Trending pages aggregated"
    );

    Ok(merged)
}

/// Concatenates pages, keeping the first occurrence of each title
pub fn merge_pages(pages: Vec<Vec<CatalogItem>>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .flatten()
        .filter(|item| seen.insert((item.media_type, item.tmdb_id)))
        .collect()
}

/// Looks up many titles in parallel, preserving the order of `refs`.
///
/// Individual failures are logged and skipped; the call only fails when
/// every lookup failed.
pub async fn details_batch(
    provider: Arc<dyn CatalogProvider>,
    refs: Vec<(MediaType, i64)>,
) -> AppResult<Vec<CatalogItem>> {
    if refs.is_empty() {
        return Ok(Vec::new());
    }

    let tasks: Vec<_> = refs
        .into_iter()
        .map(|(media_type, tmdb_id)| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.details(media_type, tmdb_id).await })
        })
        .collect();

    let mut items = Vec::new();
    let mut errors = 0usize;

    for task in tasks {
        match task.await {
            Ok(Ok(item)) => items.push(item),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Catalog lookup failed");
                errors += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog lookup task join error");
                errors += 1;
            }
        }
    }

    if errors > 0 {
        tracing::warn!(
            success_count = items.len(),
            error_count = errors,
            "Partial catalog lookup failure"
        );
    }

    if items.is_empty() && errors > 0 {
        return Err(AppError::ExternalApi(
            "Failed to fetch any catalog entries".to_string(),
        ));
    }

    Ok(items)
}

#[cfg(test)]
pub(crate) fn test_item(media_type: MediaType, tmdb_id: i64) -> CatalogItem {
    CatalogItem {
        tmdb_id,
        media_type,
        title: format!("{} {}", media_type, tmdb_id),
        overview: None,
        poster_path: None,
        release_date: None,
        vote_average: None,
    }
}
