use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use voyage_catalog::{NewReview, ReviewUpdate};
use voyage_core::types::Review;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuery {
    pub min_rating: Option<i32>,
}

pub async fn create(
    Extension(state): Extension<ApiState>,
    ApiJson(request): ApiJson<NewReview>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.reviews.create(request).await?;
    Ok(ApiResponse::with_message("Review created successfully", review))
}

pub async fn for_destination(
    Extension(state): Extension<ApiState>,
    Path(destination_id): Path<String>,
    ApiQuery(params): ApiQuery<RatingQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Review>>>> {
    let reviews = state
        .reviews
        .list_for_destination(&destination_id, params.min_rating)
        .await?;
    Ok(ApiResponse::ok(reviews))
}

pub async fn for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Review>>>> {
    Ok(ApiResponse::ok(state.reviews.list_for_user(&user_id).await?))
}

pub async fn for_user_and_destination(
    Extension(state): Extension<ApiState>,
    Path((user_id, destination_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state
        .reviews
        .find_for_user_and_destination(&user_id, &destination_id)
        .await?;
    Ok(match review {
        Some(review) => ApiResponse::ok(review),
        None => Json(ApiResponse {
            success: true,
            message: Some("No review found".to_string()),
            data: None,
        }),
    })
}

pub async fn get(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    Ok(ApiResponse::ok(state.reviews.find(&id).await?))
}

pub async fn update(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<ReviewUpdate>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.reviews.update(&id, changes).await?;
    Ok(ApiResponse::with_message("Review updated successfully", review))
}

pub async fn delete(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.reviews.delete(&id).await?;
    Ok(ApiResponse::message("Review deleted successfully"))
}
