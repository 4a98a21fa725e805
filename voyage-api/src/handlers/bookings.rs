use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use voyage_catalog::NewBooking;
use voyage_core::types::{Booking, BookingStatus, PaymentStatus};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub payment_status: String,
}

pub async fn create(
    Extension(state): Extension<ApiState>,
    ApiJson(request): ApiJson<NewBooking>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state.bookings.create(request).await?;
    Ok(ApiResponse::with_message("Booking created successfully", booking))
}

/// Every booking, or only those in `?status=`.
pub async fn list(
    Extension(state): Extension<ApiState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    let bookings = match params.status {
        Some(status) => state.bookings.list_by_status(status.parse::<BookingStatus>()?).await?,
        None => state.bookings.list_all().await?,
    };
    Ok(ApiResponse::ok(bookings))
}

pub async fn get(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    Ok(ApiResponse::ok(state.bookings.find(&id).await?))
}

pub async fn upcoming(Extension(state): Extension<ApiState>) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ApiResponse::ok(state.bookings.upcoming().await?))
}

pub async fn for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ApiResponse::ok(state.bookings.list_for_user(&user_id).await?))
}

pub async fn upcoming_for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ApiResponse::ok(state.bookings.upcoming_for_user(&user_id).await?))
}

pub async fn completed_for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ApiResponse::ok(state.bookings.completed_for_user(&user_id).await?))
}

pub async fn active_for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ApiResponse::ok(state.bookings.active_for_user(&user_id).await?))
}

pub async fn update_status(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<StatusQuery>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let status: BookingStatus = params.status.parse()?;
    let booking = state.bookings.update_status(&id, status).await?;
    Ok(ApiResponse::with_message("Booking status updated", booking))
}

pub async fn update_payment(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<PaymentQuery>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let payment_status: PaymentStatus = params.payment_status.parse()?;
    let booking = state.bookings.update_payment_status(&id, payment_status).await?;
    Ok(ApiResponse::with_message("Payment status updated", booking))
}

pub async fn cancel(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.bookings.cancel(&id).await?;
    Ok(ApiResponse::message("Booking cancelled successfully"))
}
