use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MediaType;

/// The catalog entry a comment thread is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub tmdb_id: i64,
    pub media_type: MediaType,
}

impl Subject {
    pub fn new(media_type: MediaType, tmdb_id: i64) -> Self {
        Self {
            tmdb_id,
            media_type,
        }
    }
}

/// A single comment as stored, with an optional reference to its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(flatten)]
    pub subject: Subject,
    /// `None` for a thread starter
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_id: String,
    pub text: String,
    #[serde(default)]
    pub liked_by_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A comment together with its ordered replies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, including this one
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }
}

// The derived drop would recurse once per level of nesting.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Payload for a new comment, as submitted by a user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}
