use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod catalog;
pub mod comment;
pub mod lists;

pub use catalog::{CatalogItem, TmdbPage, TmdbResult};
pub use comment::{Comment, CommentNode, NewComment, Subject};
pub use lists::{ListAction, ListKey, MemberId, UserLists};

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment TMDB uses for this media type
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown media type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_round_trips_through_str() {
        for media_type in [MediaType::Movie, MediaType::Tv] {
            assert_eq!(media_type.to_string().parse::<MediaType>().unwrap(), media_type);
        }
    }

    #[test]
    fn test_media_type_rejects_unknown() {
        assert!(matches!(
            "person".parse::<MediaType>(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_media_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
    }
}
