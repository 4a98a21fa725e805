use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use voyage_core::types::Favorite;

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::response::ApiResponse;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteQuery {
    pub user_id: String,
    pub destination_id: String,
}

pub async fn add(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<FavoriteQuery>,
) -> ApiResult<Json<ApiResponse<Favorite>>> {
    let favorite = state.favorites.add(&params.user_id, &params.destination_id).await?;
    Ok(ApiResponse::with_message("Added to favorites", favorite))
}

pub async fn remove(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<FavoriteQuery>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.favorites.remove(&params.user_id, &params.destination_id).await?;
    Ok(ApiResponse::message("Removed from favorites"))
}

pub async fn for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Favorite>>>> {
    Ok(ApiResponse::ok(state.favorites.list_for_user(&user_id).await?))
}

pub async fn check(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<FavoriteQuery>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    let is_favorite = state
        .favorites
        .is_favorite(&params.user_id, &params.destination_id)
        .await?;
    Ok(ApiResponse::ok(is_favorite))
}
