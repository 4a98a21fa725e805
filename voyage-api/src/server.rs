use anyhow::Result;
use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing;
use voyage_core::config::ServerConfig;
use voyage_core::TravelContext;

use crate::handlers::{self, auth, bookings, destinations, favorites, notifications, reviews};
use crate::state::ApiState;

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let mut cors = CorsLayer::new();
            for origin in origins {
                match origin.parse::<HeaderValue>() {
                    Ok(parsed) => cors = cors.allow_origin(parsed),
                    Err(_) => tracing::warn!("Ignoring invalid CORS origin: {}", origin),
                }
            }
            cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
                .allow_credentials(true)
        }
        None => {
            tracing::warn!("CORS_ORIGINS not set, using permissive CORS. Set CORS_ORIGINS for production!");
            CorsLayer::permissive()
        }
    }
}

pub fn router(state: ApiState) -> Router {
    let cors = cors_layer(&state.ctx.config.server);

    Router::new()
        .route("/health", get(handlers::health))
        // auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/user/:id", get(auth::get_user).put(auth::update_user))
        .route("/auth/user/:id/password", put(auth::change_password))
        // destinations
        .route("/destinations", get(destinations::list).post(destinations::create))
        .route("/destinations/featured", get(destinations::featured))
        .route("/destinations/popular", get(destinations::popular))
        .route("/destinations/search", get(destinations::search))
        .route("/destinations/filter", get(destinations::filter))
        .route("/destinations/price-range", get(destinations::by_price_range))
        .route("/destinations/rating", get(destinations::by_min_rating))
        .route("/destinations/category/:category", get(destinations::by_category))
        .route("/destinations/country/:country", get(destinations::by_country))
        .route(
            "/destinations/:id",
            get(destinations::get)
                .put(destinations::update)
                .delete(destinations::delete),
        )
        // bookings
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route("/bookings/upcoming", get(bookings::upcoming))
        .route("/bookings/user/:user_id", get(bookings::for_user))
        .route("/bookings/user/:user_id/upcoming", get(bookings::upcoming_for_user))
        .route("/bookings/user/:user_id/completed", get(bookings::completed_for_user))
        .route("/bookings/user/:user_id/active", get(bookings::active_for_user))
        .route("/bookings/:id", get(bookings::get))
        .route("/bookings/:id/status", put(bookings::update_status))
        .route("/bookings/:id/payment", put(bookings::update_payment))
        .route("/bookings/:id/cancel", put(bookings::cancel))
        // reviews
        .route("/reviews", post(reviews::create))
        .route("/reviews/destination/:destination_id", get(reviews::for_destination))
        .route("/reviews/user/:user_id", get(reviews::for_user))
        .route(
            "/reviews/user/:user_id/destination/:destination_id",
            get(reviews::for_user_and_destination),
        )
        .route(
            "/reviews/:id",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
        // favorites
        .route("/favorites", post(favorites::add).delete(favorites::remove))
        .route("/favorites/user/:user_id", get(favorites::for_user))
        .route("/favorites/check", get(favorites::check))
        // notifications
        .route(
            "/notifications/scheduler/check-upcoming",
            post(notifications::check_upcoming),
        )
        .route(
            "/notifications/:id",
            get(notifications::for_user).delete(notifications::delete),
        )
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route("/notifications/:id/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/unread-count", get(notifications::unread_count))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(state))
                .layer(cors),
        )
}

pub async fn run(ctx: TravelContext) -> Result<()> {
    let server = ctx.config.server.clone();
    let app = router(ApiState::new(ctx));

    let addr: SocketAddr = format!("{}:{}", server.host, server.api_port).parse()?;
    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Local, NaiveTime};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use voyage_core::types::BookingStatus;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn app() -> (Router, ApiState) {
        let state = ApiState::new(TravelContext::in_memory());
        (router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_register_login_and_duplicate_email() {
        let (app, _) = app();
        let registration = json!({
            "email": "mai@example.vn",
            "password": "matkhau1",
            "fullName": "Lê Thị Mai"
        });

        let (status, body) = send(&app, "POST", "/auth/register", Some(registration.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token"], "dummy-token");
        assert!(body["data"]["user"].get("passwordHash").is_none());

        let (status, body) = send(&app, "POST", "/auth/register", Some(registration)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email already exists");

        let (status, _) = send(
            &app,
            "POST",
            "/auth/login",
            Some(json!({ "email": "mai@example.vn", "password": "sai-mat-khau" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            Some(json!({ "email": "mai@example.vn", "password": "matkhau1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["fullName"], "Lê Thị Mai");
    }

    #[tokio::test]
    async fn test_reviews_drive_destination_rating() {
        let (app, _) = app();
        let (_, destination) = send(
            &app,
            "POST",
            "/destinations",
            Some(json!({ "name": "Ninh Bình", "price": 1200000.0, "category": "nature" })),
        )
        .await;
        let destination_id = destination["id"].as_str().unwrap().to_string();

        let mut review_ids = vec![];
        for (i, rating) in [5, 3, 4].into_iter().enumerate() {
            let (_, user) = send(
                &app,
                "POST",
                "/auth/register",
                Some(json!({ "email": format!("u{}@example.vn", i), "password": "matkhau1" })),
            )
            .await;
            let (status, review) = send(
                &app,
                "POST",
                "/reviews",
                Some(json!({
                    "userId": user["data"]["user"]["id"],
                    "destinationId": destination_id,
                    "rating": rating,
                    "comment": "Rất đẹp"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            review_ids.push(review["data"]["id"].as_str().unwrap().to_string());
        }

        let uri = format!("/destinations/{}", destination_id);
        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(body["rating"], 4.0);
        assert_eq!(body["reviewCount"], 3);

        let (status, _) = send(&app, "DELETE", &format!("/reviews/{}", review_ids[1]), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(body["rating"], 4.5);
        assert_eq!(body["reviewCount"], 2);

        let (status, _) = send(
            &app,
            "POST",
            "/reviews",
            Some(json!({ "userId": "x", "destinationId": destination_id, "rating": 9, "comment": "?" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_manual_scheduler_trigger() {
        let (app, state) = app();
        let destination = state
            .destinations
            .create(voyage_catalog::DestinationInput {
                name: "Tam Cốc".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let booking = state
            .bookings
            .create(voyage_catalog::NewBooking {
                user_id: "u1".to_string(),
                destination_id: destination.id.clone(),
                travel_date: tomorrow.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                number_of_travelers: Some(1),
                total_price: 800_000.0,
                payment_method: "cash".to_string(),
                special_requests: None,
                contact_info: None,
            })
            .await
            .unwrap();

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/bookings/{}/status?status=CONFIRMED", booking.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.bookings.find(&booking.id).await.unwrap().status, BookingStatus::Confirmed);

        for _ in 0..2 {
            let (status, body) = send(&app, "POST", "/notifications/scheduler/check-upcoming", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, Value::String(notifications::CHECK_UPCOMING_REPLY.to_string()));
        }

        let (_, listed) = send(&app, "GET", "/notifications/u1", None).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["reminderType"], "upcoming-1d");
        assert_eq!(listed[0]["type"], "booking");
        assert_eq!(listed[0]["relatedId"], booking.id.as_str());

        let (_, count) = send(&app, "GET", "/notifications/u1/unread-count", None).await;
        assert_eq!(count, 1);

        let id = listed[0]["id"].as_str().unwrap();
        let (status, read) = send(&app, "PUT", &format!("/notifications/{}/read", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["read"], true);

        let (_, count) = send(&app, "GET", "/notifications/u1/unread-count", None).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (app, _) = app();

        let (status, body) = send(&app, "GET", "/bookings/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Booking not found");

        let (status, _) = send(&app, "PUT", "/bookings/missing/status?status=SHIPPED", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "PUT", "/notifications/missing/read", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", "/favorites?userId=u1&destinationId=d1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "POST", "/favorites?userId=u1&destinationId=d1", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (_, body) = send(&app, "GET", "/favorites/check?userId=u1&destinationId=d1", None).await;
        assert_eq!(body["data"], true);
    }

    #[tokio::test]
    async fn test_malformed_input_uses_error_envelope() {
        let (app, _) = app();

        let request = Request::builder()
            .method("POST")
            .uri("/reviews")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"userId": "u1", "rating": "#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(!body["message"].as_str().unwrap().is_empty());

        let (status, body) = send(&app, "POST", "/reviews", Some(json!({ "rating": "five" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, "GET", "/destinations/rating", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_listing_routes() {
        let (app, state) = app();
        for (name, price) in [("Hội An", 1_200_000.0), ("Phú Quốc", 3_000_000.0)] {
            let (status, _) = send(
                &app,
                "POST",
                "/destinations",
                Some(json!({ "name": name, "price": price })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, "GET", "/destinations/price-range?minPrice=1000000&maxPrice=2000000", None).await;
        assert_eq!(status, StatusCode::OK);
        let found = body.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "Hội An");

        let (status, _) = send(&app, "GET", "/destinations/price-range?minPrice=5&maxPrice=1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", "/destinations/rating?minRating=0", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        let (_, body) = send(&app, "GET", "/destinations/rating?minRating=4.5", None).await;
        assert!(body.as_array().unwrap().is_empty());

        let destination = state.destinations.list().await.unwrap().remove(0);
        let mut ids = vec![];
        for user in ["u1", "u2"] {
            let booking = state
                .bookings
                .create(voyage_catalog::NewBooking {
                    user_id: user.to_string(),
                    destination_id: destination.id.clone(),
                    travel_date: (Local::now().date_naive() + Duration::days(30))
                        .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                    number_of_travelers: Some(2),
                    total_price: 2_400_000.0,
                    payment_method: "card".to_string(),
                    special_requests: None,
                    contact_info: None,
                })
                .await
                .unwrap();
            ids.push(booking.id);
        }
        state
            .bookings
            .update_status(&ids[1], BookingStatus::Confirmed)
            .await
            .unwrap();

        let (status, body) = send(&app, "GET", "/bookings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, "GET", "/bookings?status=CONFIRMED", None).await;
        let confirmed = body["data"].as_array().unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0]["id"], ids[1].as_str());

        let (status, _) = send(&app, "GET", "/bookings?status=SHIPPED", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
