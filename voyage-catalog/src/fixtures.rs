use chrono::Utc;
use voyage_core::password::hash_password;
use voyage_core::types::{new_id, Destination, Review, User, UserPreferences};
use voyage_core::TravelContext;

pub async fn destination(ctx: &TravelContext, name: &str) -> Destination {
    let now = Utc::now();
    let destination = Destination {
        id: new_id(),
        name: name.to_string(),
        country: Some("Việt Nam".to_string()),
        description: None,
        short_description: None,
        image_url: None,
        images: vec![],
        rating: 0.0,
        review_count: 0,
        price: Some(2_000_000.0),
        duration: Some("3 ngày 2 đêm".to_string()),
        category: Some("beach".to_string()),
        featured: false,
        popular: false,
        location: None,
        highlights: vec![],
        amenities: vec![],
        created_at: now,
        updated_at: now,
    };
    ctx.stores.destinations.save(&destination).await.unwrap();
    destination
}

pub async fn user(ctx: &TravelContext, email: &str) -> User {
    let now = Utc::now();
    let user = User {
        id: new_id(),
        email: email.to_string(),
        password_hash: hash_password("secret1"),
        full_name: "Nguyễn Văn A".to_string(),
        avatar: None,
        phone: None,
        date_of_birth: None,
        gender: None,
        address: None,
        role: "USER".to_string(),
        preferences: UserPreferences::default(),
        created_at: now,
        updated_at: now,
    };
    ctx.stores.users.insert(&user).await.unwrap();
    user
}

/// Stores a review directly, bypassing the service and the aggregator.
pub async fn review(ctx: &TravelContext, destination_id: &str, user_id: &str, rating: i32) -> Review {
    let now = Utc::now();
    let review = Review {
        id: new_id(),
        user_id: user_id.to_string(),
        destination_id: destination_id.to_string(),
        user_name: "User".to_string(),
        user_avatar: None,
        rating,
        comment: "ok".to_string(),
        images: vec![],
        created_at: now,
        updated_at: now,
    };
    ctx.stores.reviews.save(&review).await.unwrap();
    review
}
