use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::{Deserialize, Serialize};
use voyage_catalog::{Registration, UserUpdate};
use voyage_core::types::User;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::state::ApiState;

// Sessions are not implemented; every successful auth returns this token.
const PLACEHOLDER_TOKEN: &str = "dummy-token";

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub message: String,
}

impl AuthResponse {
    fn new(user: User, message: &str) -> Self {
        Self {
            token: PLACEHOLDER_TOKEN.to_string(),
            user,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub new_password: String,
}

pub async fn register(
    Extension(state): Extension<ApiState>,
    ApiJson(request): ApiJson<Registration>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let user = state.users.register(request).await?;
    Ok(ApiResponse::with_message(
        "Registration successful",
        AuthResponse::new(user, "User registered successfully"),
    ))
}

pub async fn login(
    Extension(state): Extension<ApiState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".to_string()));
    }
    let user = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::with_message(
        "Login successful",
        AuthResponse::new(user, "Login successful"),
    ))
}

pub async fn get_user(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<User>>> {
    Ok(ApiResponse::ok(state.users.find(&id).await?))
}

pub async fn update_user(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<UserUpdate>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.users.update(&id, changes).await?;
    Ok(ApiResponse::with_message("User updated successfully", user))
}

pub async fn change_password(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PasswordChange>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.users.change_password(&id, &request.new_password).await?;
    Ok(ApiResponse::message("Password changed successfully"))
}
