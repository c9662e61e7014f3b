use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, MediaType},
    routes::{
        extract::{AppPath, AppQuery},
        AppState,
    },
    services::catalog::trending_pages,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pages: Option<u32>,
}

/// Handler for catalog search
pub async fn search(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::InvalidArgument("page starts at 1".to_string()));
    }

    let items = state.catalog.search(&params.q, page).await?;
    Ok(Json(items))
}

/// Handler for aggregated trending titles
pub async fn trending(
    State(state): State<AppState>,
    AppPath(media_type): AppPath<MediaType>,
    AppQuery(params): AppQuery<TrendingQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let pages = params.pages.unwrap_or(1);
    let items = trending_pages(state.catalog.clone(), media_type, pages).await?;
    Ok(Json(items))
}

/// Handler for a single title's metadata
pub async fn details(
    State(state): State<AppState>,
    AppPath((media_type, tmdb_id)): AppPath<(MediaType, i64)>,
) -> AppResult<Json<CatalogItem>> {
    let item = state.catalog.details(media_type, tmdb_id).await?;
    Ok(Json(item))
}
