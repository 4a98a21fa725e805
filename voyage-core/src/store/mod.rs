//! Per-collection repositories.
//!
//! Every collection is reached through an object-safe trait so the services
//! stay agnostic of the backend. [`PgStore`] persists to Postgres,
//! [`MemoryStore`] keeps everything in process. Both backends enforce the
//! same unique keys:
//!
//! - users: `email`
//! - reviews and favorites: `(user_id, destination_id)`
//! - notifications: `(related_id, reminder_type)` when `reminder_type` is set

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::db::DbPool;
use crate::error::StoreError;
use crate::types::{Booking, BookingStatus, Destination, Favorite, Notification, Review, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl DestinationFilter {
    pub fn matches(&self, destination: &Destination) -> bool {
        if let Some(category) = &self.category {
            if destination.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = destination.price else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        if self.min_rating.is_some_and(|min| destination.rating < min) {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Destination>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Destination>>;
    /// Insert or replace by id.
    async fn save(&self, destination: &Destination) -> StoreResult<()>;
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
    async fn find_featured(&self) -> StoreResult<Vec<Destination>>;
    async fn find_popular(&self) -> StoreResult<Vec<Destination>>;
    /// Case-insensitive substring match on the name.
    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Destination>>;
    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Destination>>;
    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Destination>>;
    async fn find_by_filter(&self, filter: &DestinationFilter) -> StoreResult<Vec<Destination>>;
    /// Writes only the derived rating fields. Returns false when the
    /// destination does not exist.
    async fn update_rating(&self, id: &str, rating: f64, review_count: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Booking>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Booking>>;
    async fn save(&self, booking: &Booking) -> StoreResult<()>;
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;
    async fn find_by_user_and_status(&self, user_id: &str, status: BookingStatus) -> StoreResult<Vec<Booking>>;
    async fn find_by_status(&self, status: BookingStatus) -> StoreResult<Vec<Booking>>;
    /// CONFIRMED or COMPLETED bookings of one user.
    async fn find_active_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;
    /// CONFIRMED bookings departing at or after `now`.
    async fn find_upcoming(&self, now: NaiveDateTime) -> StoreResult<Vec<Booking>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Review>>;
    /// Insert or replace by id. A second review by the same user for the
    /// same destination is rejected as [`StoreError::Duplicate`].
    async fn save(&self, review: &Review) -> StoreResult<()>;
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
    async fn find_by_destination(&self, destination_id: &str) -> StoreResult<Vec<Review>>;
    async fn find_by_destination_newest_first(&self, destination_id: &str) -> StoreResult<Vec<Review>>;
    async fn find_by_destination_min_rating(&self, destination_id: &str, min_rating: i32) -> StoreResult<Vec<Review>>;
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Review>>;
    async fn find_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<Option<Review>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn insert(&self, favorite: &Favorite) -> StoreResult<()>;
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Favorite>>;
    async fn exists(&self, user_id: &str, destination_id: &str) -> StoreResult<bool>;
    async fn delete_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> StoreResult<()>;
    async fn save(&self, user: &User) -> StoreResult<()>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Rejects a second reminder for the same `(related_id, reminder_type)`
    /// with [`StoreError::Duplicate`].
    async fn insert(&self, notification: &Notification) -> StoreResult<()>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Notification>>;
    /// Newest first.
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Notification>>;
    async fn mark_read(&self, id: &str) -> StoreResult<bool>;
    async fn mark_all_read(&self, user_id: &str) -> StoreResult<u64>;
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
    async fn count_unread(&self, user_id: &str) -> StoreResult<i64>;
}

/// One handle per collection, all backed by the same store.
#[derive(Clone)]
pub struct Stores {
    pub destinations: Arc<dyn DestinationStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub users: Arc<dyn UserStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn postgres(pool: Arc<DbPool>) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: DestinationStore + BookingStore + ReviewStore + FavoriteStore + UserStore + NotificationStore + 'static,
    {
        Stores {
            destinations: store.clone(),
            bookings: store.clone(),
            reviews: store.clone(),
            favorites: store.clone(),
            users: store.clone(),
            notifications: store,
        }
    }
}
