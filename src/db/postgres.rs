use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    db::{CommentStore, ListStore},
    error::{AppError, AppResult},
    models::{Comment, ListKey, Subject, UserLists},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(FromRow)]
struct CommentRow {
    id: String,
    tmdb_id: i64,
    media_type: String,
    parent_id: Option<String>,
    author_id: String,
    body: String,
    liked_by_ids: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let media_type = row
            .media_type
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad media_type in row {}", row.id)))?;

        Ok(Comment {
            id: row.id,
            subject: Subject::new(media_type, row.tmdb_id),
            parent_id: row.parent_id,
            author_id: row.author_id,
            text: row.body,
            liked_by_ids: row.liked_by_ids,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserListsRow {
    user_id: String,
    favorite_movie_ids: Vec<String>,
    favorite_tv_ids: Vec<String>,
    watchlist_movie_ids: Vec<String>,
    watchlist_tv_ids: Vec<String>,
}

impl From<UserListsRow> for UserLists {
    fn from(row: UserListsRow) -> Self {
        UserLists {
            user_id: row.user_id,
            favorite_movie_ids: row.favorite_movie_ids,
            favorite_tv_ids: row.favorite_tv_ids,
            watchlist_movie_ids: row.watchlist_movie_ids,
            watchlist_tv_ids: row.watchlist_tv_ids,
        }
    }
}

/// Comment and list persistence on PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommentStore for PgStore {
    async fn comments_for_subject(&self, subject: &Subject) -> AppResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, tmdb_id, media_type, parent_id, author_id, body, liked_by_ids, created_at
            FROM comments
            WHERE tmdb_id = $1 AND media_type = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(subject.tmdb_id)
        .bind(subject.media_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn comment(&self, id: &str) -> AppResult<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, tmdb_id, media_type, parent_id, author_id, body, liked_by_ids, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn insert_comment(&self, comment: &Comment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments
                (id, tmdb_id, media_type, parent_id, author_id, body, liked_by_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&comment.id)
        .bind(comment.subject.tmdb_id)
        .bind(comment.subject.media_type.as_str())
        .bind(&comment.parent_id)
        .bind(&comment.author_id)
        .bind(&comment.text)
        .bind(&comment.liked_by_ids)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_comment(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_likes(&self, id: &str, liked_by_ids: &[String]) -> AppResult<()> {
        sqlx::query("UPDATE comments SET liked_by_ids = $2 WHERE id = $1")
            .bind(id)
            .bind(liked_by_ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ListStore for PgStore {
    async fn user_lists(&self, user_id: &str) -> AppResult<UserLists> {
        let row: Option<UserListsRow> = sqlx::query_as(
            r#"
            SELECT user_id, favorite_movie_ids, favorite_tv_ids, watchlist_movie_ids, watchlist_tv_ids
            FROM user_lists
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(UserLists::from)
            .unwrap_or_else(|| UserLists::empty(user_id)))
    }

    async fn set_list(&self, user_id: &str, key: ListKey, ids: &[String]) -> AppResult<UserLists> {
        // Column names come from a closed set and are never user input.
        let column = key.column();
        let sql = format!(
            r#"
            INSERT INTO user_lists (user_id, {column})
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET {column} = EXCLUDED.{column}, updated_at = now()
            RETURNING user_id, favorite_movie_ids, favorite_tv_ids, watchlist_movie_ids, watchlist_tv_ids
            "#
        );

        let row: UserListsRow = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(user_id = %user_id, list = %key, size = ids.len(), "List persisted");

        Ok(row.into())
    }
}
