use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    middleware::ActingUser,
    models::{Comment, CommentNode, MediaType, NewComment, Subject},
    routes::{
        extract::{AppJson, AppPath},
        AppState,
    },
};

/// Handler returning the comment forest for a title
pub async fn thread(
    State(state): State<AppState>,
    AppPath((media_type, tmdb_id)): AppPath<(MediaType, i64)>,
) -> AppResult<Json<Vec<CommentNode>>> {
    let tree = state
        .comments
        .thread(&Subject::new(media_type, tmdb_id))
        .await?;
    Ok(Json(tree))
}

pub async fn create(
    State(state): State<AppState>,
    actor: ActingUser,
    AppPath((media_type, tmdb_id)): AppPath<(MediaType, i64)>,
    AppJson(new): AppJson<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .comments
        .create(&actor, Subject::new(media_type, tmdb_id), new)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: ActingUser,
    AppPath(id): AppPath<String>,
) -> AppResult<StatusCode> {
    state.comments.delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_like(
    State(state): State<AppState>,
    actor: ActingUser,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Comment>> {
    let comment = state.comments.toggle_like(&actor, &id).await?;
    Ok(Json(comment))
}
