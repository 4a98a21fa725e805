use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    BookingStore, DestinationFilter, DestinationStore, FavoriteStore, NotificationStore, ReviewStore,
    StoreResult, UserStore,
};
use crate::error::StoreError;
use crate::types::{Booking, BookingStatus, Destination, Favorite, Notification, Review, User};

#[derive(Default)]
struct Tables {
    destinations: HashMap<String, Destination>,
    bookings: HashMap<String, Booking>,
    reviews: HashMap<String, Review>,
    favorites: HashMap<String, Favorite>,
    users: HashMap<String, User>,
    // insertion order, oldest first
    notifications: Vec<Notification>,
}

/// Process-local store with the same unique keys as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

fn destinations_where(tables: &Tables, pred: impl Fn(&Destination) -> bool) -> Vec<Destination> {
    let found = tables.destinations.values().filter(|d| pred(d)).cloned().collect();
    sorted_by(found, |d: &Destination| (d.created_at, d.id.clone()))
}

fn bookings_where(tables: &Tables, pred: impl Fn(&Booking) -> bool) -> Vec<Booking> {
    let found = tables.bookings.values().filter(|b| pred(b)).cloned().collect();
    sorted_by(found, |b: &Booking| (b.created_at, b.id.clone()))
}

fn reviews_where(tables: &Tables, pred: impl Fn(&Review) -> bool) -> Vec<Review> {
    let found = tables.reviews.values().filter(|r| pred(r)).cloned().collect();
    sorted_by(found, |r: &Review| (r.created_at, r.id.clone()))
}

#[async_trait]
impl DestinationStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |_| true))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Destination>> {
        Ok(self.tables.read().await.destinations.get(id).cloned())
    }

    async fn save(&self, destination: &Destination) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .destinations
            .insert(destination.id.clone(), destination.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        Ok(self.tables.write().await.destinations.remove(id).is_some())
    }

    async fn find_featured(&self) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| d.featured))
    }

    async fn find_popular(&self) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| d.popular))
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Destination>> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| d.name.to_lowercase().contains(&needle)))
    }

    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| d.category.as_deref() == Some(category)))
    }

    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| d.country.as_deref() == Some(country)))
    }

    async fn find_by_filter(&self, filter: &DestinationFilter) -> StoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(destinations_where(&tables, |d| filter.matches(d)))
    }

    async fn update_rating(&self, id: &str, rating: f64, review_count: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.destinations.get_mut(id) {
            Some(destination) => {
                destination.rating = rating;
                destination.review_count = review_count;
                destination.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(bookings_where(&tables, |_| true))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(id).cloned())
    }

    async fn save(&self, booking: &Booking) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .bookings
            .insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(bookings_where(&tables, |b| b.user_id == user_id))
    }

    async fn find_by_user_and_status(&self, user_id: &str, status: BookingStatus) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(bookings_where(&tables, |b| b.user_id == user_id && b.status == status))
    }

    async fn find_by_status(&self, status: BookingStatus) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(bookings_where(&tables, |b| b.status == status))
    }

    async fn find_active_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(bookings_where(&tables, |b| {
            b.user_id == user_id && matches!(b.status, BookingStatus::Confirmed | BookingStatus::Completed)
        }))
    }

    async fn find_upcoming(&self, now: NaiveDateTime) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let found = tables
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.travel_date.is_some_and(|t| t >= now))
            .cloned()
            .collect();
        // soonest departure first
        Ok(sorted_by(found, |b: &Booking| (b.travel_date, b.id.clone())))
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Review>> {
        Ok(self.tables.read().await.reviews.get(id).cloned())
    }

    async fn save(&self, review: &Review) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let clash = tables.reviews.values().any(|r| {
            r.id != review.id && r.user_id == review.user_id && r.destination_id == review.destination_id
        });
        if clash {
            return Err(StoreError::Duplicate(format!(
                "review by {} for {}",
                review.user_id, review.destination_id
            )));
        }
        tables.reviews.insert(review.id.clone(), review.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        Ok(self.tables.write().await.reviews.remove(id).is_some())
    }

    async fn find_by_destination(&self, destination_id: &str) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(reviews_where(&tables, |r| r.destination_id == destination_id))
    }

    async fn find_by_destination_newest_first(&self, destination_id: &str) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews = reviews_where(&tables, |r| r.destination_id == destination_id);
        reviews.reverse();
        Ok(reviews)
    }

    async fn find_by_destination_min_rating(&self, destination_id: &str, min_rating: i32) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(reviews_where(&tables, |r| r.destination_id == destination_id && r.rating >= min_rating))
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(reviews_where(&tables, |r| r.user_id == user_id))
    }

    async fn find_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<Option<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .find(|r| r.user_id == user_id && r.destination_id == destination_id)
            .cloned())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn insert(&self, favorite: &Favorite) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let clash = tables.favorites.values().any(|f| {
            f.id == favorite.id || (f.user_id == favorite.user_id && f.destination_id == favorite.destination_id)
        });
        if clash {
            return Err(StoreError::Duplicate(format!(
                "favorite {} for {}",
                favorite.destination_id, favorite.user_id
            )));
        }
        tables.favorites.insert(favorite.id.clone(), favorite.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Favorite>> {
        let tables = self.tables.read().await;
        let found = tables.favorites.values().filter(|f| f.user_id == user_id).cloned().collect();
        Ok(sorted_by(found, |f: &Favorite| (f.created_at, f.id.clone())))
    }

    async fn exists(&self, user_id: &str, destination_id: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .values()
            .any(|f| f.user_id == user_id && f.destination_id == destination_id))
    }

    async fn delete_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|_, f| !(f.user_id == user_id && f.destination_id == destination_id));
        Ok(tables.favorites.len() != before)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) || tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("user {}", user.email)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Duplicate(format!("user {}", user.email)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: &Notification) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let clash = tables.notifications.iter().any(|n| {
            n.id == notification.id
                || (notification.reminder_type.is_some()
                    && notification.related_id.is_some()
                    && n.reminder_type == notification.reminder_type
                    && n.related_id == notification.related_id)
        });
        if clash {
            return Err(StoreError::Duplicate(format!(
                "notification {:?}/{:?}",
                notification.related_id, notification.reminder_type
            )));
        }
        tables.notifications.push(notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Notification>> {
        let tables = self.tables.read().await;
        Ok(tables.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        // newest insertion first, then a stable sort keeps that order on equal timestamps
        let mut found: Vec<Notification> = tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn mark_read(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for notification in tables.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.id != id);
        Ok(tables.notifications.len() != before)
    }

    async fn count_unread(&self, user_id: &str) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }
}
