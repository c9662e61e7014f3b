//! TMDB v3 catalog provider
//!
//! Endpoints used:
//! 1. Details: /{movie|tv}/{id}
//! 2. Search: /search/multi?query=&page=
//! 3. Trending: /trending/{movie|tv}/week?page=
//!
//! All responses go through the Redis cache via `cached!`.

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CatalogItem, MediaType, TmdbPage, TmdbResult},
    services::catalog::CatalogProvider,
};

const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const LIST_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// GETs `path` with the API key attached and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("No catalog entry at {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = %status, body = %body, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// Converts a page of raw results, dropping non-title entries
fn page_items(page: TmdbPage, fallback: MediaType) -> Vec<CatalogItem> {
    page.results
        .into_iter()
        .filter_map(|result| result.into_item(fallback))
        .collect()
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn details(&self, media_type: MediaType, tmdb_id: i64) -> AppResult<CatalogItem> {
        cached!(
            self.cache,
            CacheKey::Details(media_type, tmdb_id),
            DETAILS_CACHE_TTL,
            async move {
                let path = format!("/{}/{}", media_type, tmdb_id);
                let result: TmdbResult = self.get_json(&path, &[]).await?;

                // Detail payloads never carry media_type, so the fallback always applies.
                let item = result.into_item(media_type).ok_or_else(|| {
                    AppError::ExternalApi(format!("TMDB entry {} has no title", path))
                })?;

                tracing::debug!(tmdb_id, media_type = %media_type, "Fetched catalog details");
                Ok::<_, AppError>(item)
            }
        )
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<CatalogItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidArgument(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::Search {
                query: query.to_string(),
                page,
            },
            LIST_CACHE_TTL,
            async move {
                let raw: TmdbPage = self
                    .get_json(
                        "/search/multi",
                        &[("query", query.to_string()), ("page", page.to_string())],
                    )
                    .await?;
                let items = page_items(raw, MediaType::Movie);

                tracing::info!(
                    query = %query,
                    page,
                    results = items.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok::<_, AppError>(items)
            }
        )
    }

    async fn trending(&self, media_type: MediaType, page: u32) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::Trending(media_type, page),
            LIST_CACHE_TTL,
            async move {
                let path = format!("/trending/{}/week", media_type);
                let raw: TmdbPage = self.get_json(&path, &[("page", page.to_string())]).await?;
                Ok::<_, AppError>(page_items(raw, media_type))
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    #[test]
    fn test_page_items_skips_people_and_applies_fallback() {
        let page: TmdbPage = serde_json::from_str(
            r#"{
                "page": 1,
                "total_pages": 3,
                "results": [
                    {"id": 1, "title": "Alien", "release_date": "1979-05-25"},
                    {"id": 2, "media_type": "person", "name": "Sigourney Weaver"},
                    {"id": 3, "media_type": "tv", "name": "Firefly"}
                ]
            }"#,
        )
        .unwrap();

        let items = page_items(page, MediaType::Movie);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].media_type, MediaType::Movie);
        assert_eq!(items[1].media_type, MediaType::Tv);
        assert_eq!(items[1].title, "Firefly");
    }

    #[tokio::test]
    async fn test_empty_search_rejected_before_any_io() {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client);
        let provider = TmdbProvider::new(
            cache,
            "key".to_string(),
            "http://127.0.0.1:1/3/".to_string(),
        );

        assert_eq!(provider.api_url, "http://127.0.0.1:1/3");
        let result = provider.search("   ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }
}
