use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use voyage_catalog::DestinationInput;
use voyage_core::types::Destination;
use voyage_core::DestinationFilter;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuery {
    pub min_rating: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl From<FilterQuery> for DestinationFilter {
    fn from(q: FilterQuery) -> Self {
        DestinationFilter {
            category: q.category.filter(|c| !c.trim().is_empty()),
            min_price: q.min_price,
            max_price: q.max_price,
            min_rating: q.min_rating,
        }
    }
}

pub async fn list(Extension(state): Extension<ApiState>) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.list().await?))
}

pub async fn get(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Destination>> {
    Ok(Json(state.destinations.find(&id).await?))
}

pub async fn featured(Extension(state): Extension<ApiState>) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.featured().await?))
}

pub async fn popular(Extension(state): Extension<ApiState>) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.popular().await?))
}

pub async fn search(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.search(&params.query).await?))
}

pub async fn by_category(
    Extension(state): Extension<ApiState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.by_category(&category).await?))
}

pub async fn by_country(
    Extension(state): Extension<ApiState>,
    Path(country): Path<String>,
) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.by_country(&country).await?))
}

pub async fn by_price_range(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<PriceRangeQuery>,
) -> ApiResult<Json<Vec<Destination>>> {
    let found = state
        .destinations
        .by_price_range(params.min_price, params.max_price)
        .await?;
    Ok(Json(found))
}

pub async fn by_min_rating(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<RatingQuery>,
) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.by_min_rating(params.min_rating).await?))
}

pub async fn filter(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<FilterQuery>,
) -> ApiResult<Json<Vec<Destination>>> {
    Ok(Json(state.destinations.filter(params.into()).await?))
}

pub async fn create(
    Extension(state): Extension<ApiState>,
    ApiJson(input): ApiJson<DestinationInput>,
) -> ApiResult<Json<Destination>> {
    Ok(Json(state.destinations.create(input).await?))
}

pub async fn update(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<DestinationInput>,
) -> ApiResult<Json<Destination>> {
    Ok(Json(state.destinations.update(&id, input).await?))
}

pub async fn delete(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.destinations.delete(&id).await?;
    Ok(ApiResponse::message("Destination deleted successfully"))
}
