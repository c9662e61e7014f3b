use serde::{Deserialize, Serialize};

use super::MediaType;

/// Display metadata for a movie or TV series returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD` release or first air date
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One result from TMDB details, search and trending endpoints.
///
/// Movies carry `title`/`release_date`, series carry `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResult {
    pub id: i64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// Paged TMDB response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbResult>,
    #[serde(default)]
    pub total_pages: u32,
}

impl TmdbResult {
    /// Converts to a catalog item, using `fallback` when the payload does not
    /// say what it is. Returns `None` for non-title results such as people.
    pub fn into_item(self, fallback: MediaType) -> Option<CatalogItem> {
        let media_type = match self.media_type.as_deref() {
            None => fallback,
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Tv,
            Some(_) => return None,
        };

        let title = non_empty(self.title).or(non_empty(self.name))?;
        let release_date = non_empty(self.release_date).or(non_empty(self.first_air_date));

        Some(CatalogItem {
            tmdb_id: self.id,
            media_type,
            title,
            overview: non_empty(self.overview),
            poster_path: self.poster_path,
            release_date,
            vote_average: self.vote_average,
        })
    }
}

/// TMDB sends `""` for unknown text fields
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
