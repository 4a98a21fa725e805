pub mod auth;
pub mod bookings;
pub mod destinations;
pub mod favorites;
pub mod notifications;
pub mod reviews;

use axum::{extract::Extension, response::Json};

use crate::state::ApiState;

pub async fn health(Extension(state): Extension<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "voyage-api",
        "store": format!("{:?}", state.ctx.config.store.backend).to_lowercase(),
    }))
}
