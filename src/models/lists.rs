use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::MediaType;
use crate::error::AppError;

/// Identifies one of the four id lists every user owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKey {
    FavoriteMovies,
    FavoriteTv,
    WatchlistMovies,
    WatchlistTv,
}

impl ListKey {
    pub const ALL: [ListKey; 4] = [
        ListKey::FavoriteMovies,
        ListKey::FavoriteTv,
        ListKey::WatchlistMovies,
        ListKey::WatchlistTv,
    ];

    /// Kind of catalog entry the list holds
    pub fn media_type(self) -> MediaType {
        match self {
            ListKey::FavoriteMovies | ListKey::WatchlistMovies => MediaType::Movie,
            ListKey::FavoriteTv | ListKey::WatchlistTv => MediaType::Tv,
        }
    }

    /// Column in `user_lists` backing this list
    pub fn column(self) -> &'static str {
        match self {
            ListKey::FavoriteMovies => "favorite_movie_ids",
            ListKey::FavoriteTv => "favorite_tv_ids",
            ListKey::WatchlistMovies => "watchlist_movie_ids",
            ListKey::WatchlistTv => "watchlist_tv_ids",
        }
    }
}

impl Display for ListKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListKey::FavoriteMovies => "favorite_movies",
            ListKey::FavoriteTv => "favorite_tv",
            ListKey::WatchlistMovies => "watchlist_movies",
            ListKey::WatchlistTv => "watchlist_tv",
        };
        f.write_str(name)
    }
}

/// Snapshot of every list a user owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLists {
    pub user_id: String,
    pub favorite_movie_ids: Vec<String>,
    pub favorite_tv_ids: Vec<String>,
    pub watchlist_movie_ids: Vec<String>,
    pub watchlist_tv_ids: Vec<String>,
}

impl UserLists {
    /// Empty lists for a user that has never saved anything
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: ListKey) -> &[String] {
        match key {
            ListKey::FavoriteMovies => &self.favorite_movie_ids,
            ListKey::FavoriteTv => &self.favorite_tv_ids,
            ListKey::WatchlistMovies => &self.watchlist_movie_ids,
            ListKey::WatchlistTv => &self.watchlist_tv_ids,
        }
    }

    pub fn set(&mut self, key: ListKey, ids: Vec<String>) {
        let slot = match key {
            ListKey::FavoriteMovies => &mut self.favorite_movie_ids,
            ListKey::FavoriteTv => &mut self.favorite_tv_ids,
            ListKey::WatchlistMovies => &mut self.watchlist_movie_ids,
            ListKey::WatchlistTv => &mut self.watchlist_tv_ids,
        };
        *slot = ids;
    }
}

/// A list member id as supplied by clients and upstream data.
///
/// The same logical id shows up as either a JSON number or a string, so
/// comparisons always go through [`MemberId::canonical`]. Any JSON number is
/// accepted, including floats and integers past `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberId {
    Number(serde_json::Number),
    Text(String),
}

impl MemberId {
    pub fn number(n: i64) -> Self {
        MemberId::Number(n.into())
    }

    /// Normalized string form used for equality.
    ///
    /// Integral floats render without a fraction, so `205.0` matches `205`.
    pub fn canonical(&self) -> String {
        match self {
            MemberId::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => {
                    format!("{:.0}", f)
                }
                _ => n.to_string(),
            },
            MemberId::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<i64> for MemberId {
    fn from(n: i64) -> Self {
        MemberId::number(n)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId::Text(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        MemberId::Text(s)
    }
}

/// Requested change to a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListAction {
    Add,
    Remove,
}

impl FromStr for ListAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ListAction::Add),
            "remove" => Ok(ListAction::Remove),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown list action '{}', expected 'add' or 'remove'",
                other
            ))),
        }
    }
}
