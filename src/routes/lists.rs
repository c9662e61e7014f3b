use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::{ActingUser, RequestId},
    models::{CatalogItem, ListAction, ListKey, MemberId, UserLists},
    routes::{
        extract::{AppJson, AppPath},
        AppState,
    },
};

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub id: MemberId,
    /// Kept as text so unknown actions fail with our own error
    pub action: String,
}

pub async fn get_lists(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<UserLists>> {
    let lists = state.lists.lists(&user_id).await?;
    Ok(Json(lists))
}

/// Handler resolving a list into catalog entries
pub async fn items(
    State(state): State<AppState>,
    AppPath((user_id, key)): AppPath<(String, ListKey)>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = state.lists.items(&user_id, key).await?;
    Ok(Json(items))
}

/// Handler adding to or removing from one of the caller's lists
pub async fn update(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    actor: ActingUser,
    AppPath(key): AppPath<ListKey>,
    AppJson(request): AppJson<UpdateListRequest>,
) -> AppResult<Json<UserLists>> {
    let action: ListAction = request.action.parse()?;

    tracing::info!(
        request_id = %request_id,
        user_id = %actor,
        list = %key,
        action = ?action,
        "Processing list update"
    );

    let lists = state.lists.update(&actor, key, &request.id, action).await?;
    Ok(Json(lists))
}
