use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;
use std::sync::Arc;

use super::{
    BookingStore, DestinationFilter, DestinationStore, FavoriteStore, NotificationStore, ReviewStore,
    StoreResult, UserStore,
};
use crate::db::{DbConnection, DbPool};
use crate::error::StoreError;
use crate::schema::{bookings, destinations, favorites, notifications, reviews, users};
use crate::types::{
    Booking, BookingStatus, ContactInfo, Destination, Favorite, Location, Notification, Review, User, UserPreferences,
};

/// Diesel-backed store sharing one connection pool across collections.
pub struct PgStore {
    pool: Arc<DbPool>,
}

impl PgStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<DbConnection> {
        self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))
    }
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> StoreResult<Option<Value>> {
    value.as_ref().map(serde_json::to_value).transpose().map_err(StoreError::from)
}

fn from_json<T: serde::de::DeserializeOwned>(value: Option<Value>) -> StoreResult<Option<T>> {
    value.map(serde_json::from_value).transpose().map_err(StoreError::from)
}

/// Escapes LIKE wildcards and wraps the needle for a substring match.
fn like_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = destinations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct DestinationRow {
    id: String,
    name: String,
    country: Option<String>,
    description: Option<String>,
    short_description: Option<String>,
    image_url: Option<String>,
    images: Vec<String>,
    rating: f64,
    review_count: i32,
    price: Option<f64>,
    duration: Option<String>,
    category: Option<String>,
    featured: bool,
    popular: bool,
    location: Option<Value>,
    highlights: Vec<String>,
    amenities: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DestinationRow {
    fn from_domain(d: &Destination) -> StoreResult<Self> {
        Ok(Self {
            id: d.id.clone(),
            name: d.name.clone(),
            country: d.country.clone(),
            description: d.description.clone(),
            short_description: d.short_description.clone(),
            image_url: d.image_url.clone(),
            images: d.images.clone(),
            rating: d.rating,
            review_count: d.review_count,
            price: d.price,
            duration: d.duration.clone(),
            category: d.category.clone(),
            featured: d.featured,
            popular: d.popular,
            location: to_json(&d.location)?,
            highlights: d.highlights.clone(),
            amenities: d.amenities.clone(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }

    fn into_domain(self) -> StoreResult<Destination> {
        Ok(Destination {
            id: self.id,
            name: self.name,
            country: self.country,
            description: self.description,
            short_description: self.short_description,
            image_url: self.image_url,
            images: self.images,
            rating: self.rating,
            review_count: self.review_count,
            price: self.price,
            duration: self.duration,
            category: self.category,
            featured: self.featured,
            popular: self.popular,
            location: from_json::<Location>(self.location)?,
            highlights: self.highlights,
            amenities: self.amenities,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    full_name: String,
    avatar: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    address: Option<String>,
    role: String,
    preferences: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn from_domain(u: &User) -> StoreResult<Self> {
        Ok(Self {
            id: u.id.clone(),
            email: u.email.clone(),
            password_hash: u.password_hash.clone(),
            full_name: u.full_name.clone(),
            avatar: u.avatar.clone(),
            phone: u.phone.clone(),
            date_of_birth: u.date_of_birth,
            gender: u.gender.clone(),
            address: u.address.clone(),
            role: u.role.clone(),
            preferences: serde_json::to_value(&u.preferences)?,
            created_at: u.created_at,
            updated_at: u.updated_at,
        })
    }

    fn into_domain(self) -> StoreResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            avatar: self.avatar,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            address: self.address,
            role: self.role,
            preferences: serde_json::from_value::<UserPreferences>(self.preferences)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct BookingRow {
    id: String,
    user_id: String,
    destination_id: Option<String>,
    status: String,
    booking_date: DateTime<Utc>,
    travel_date: Option<NaiveDateTime>,
    number_of_travelers: Option<i32>,
    total_price: Option<f64>,
    payment_method: Option<String>,
    payment_status: String,
    contact_info: Option<Value>,
    special_requests: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn from_domain(b: &Booking) -> StoreResult<Self> {
        Ok(Self {
            id: b.id.clone(),
            user_id: b.user_id.clone(),
            destination_id: b.destination_id.clone(),
            status: b.status.as_str().to_string(),
            booking_date: b.booking_date,
            travel_date: b.travel_date,
            number_of_travelers: b.number_of_travelers,
            total_price: b.total_price,
            payment_method: b.payment_method.clone(),
            payment_status: b.payment_status.as_str().to_string(),
            contact_info: to_json(&b.contact_info)?,
            special_requests: b.special_requests.clone(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        })
    }

    fn into_domain(self) -> StoreResult<Booking> {
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            destination_id: self.destination_id,
            status: self.status.parse()?,
            booking_date: self.booking_date,
            travel_date: self.travel_date,
            number_of_travelers: self.number_of_travelers,
            total_price: self.total_price,
            payment_method: self.payment_method,
            payment_status: self.payment_status.parse()?,
            contact_info: from_json::<ContactInfo>(self.contact_info)?,
            special_requests: self.special_requests,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct ReviewRow {
    id: String,
    user_id: String,
    destination_id: String,
    user_name: String,
    user_avatar: Option<String>,
    rating: i32,
    comment: String,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            destination_id: r.destination_id.clone(),
            user_name: r.user_name.clone(),
            user_avatar: r.user_avatar.clone(),
            rating: r.rating,
            comment: r.comment.clone(),
            images: r.images.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            destination_id: r.destination_id,
            user_name: r.user_name,
            user_avatar: r.user_avatar,
            rating: r.rating,
            comment: r.comment,
            images: r.images,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Queryable, Selectable, Insertable)]
#[diesel(table_name = favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct FavoriteRow {
    id: String,
    user_id: String,
    destination_id: String,
    created_at: DateTime<Utc>,
}

impl From<&Favorite> for FavoriteRow {
    fn from(f: &Favorite) -> Self {
        Self {
            id: f.id.clone(),
            user_id: f.user_id.clone(),
            destination_id: f.destination_id.clone(),
            created_at: f.created_at,
        }
    }
}

impl From<FavoriteRow> for Favorite {
    fn from(f: FavoriteRow) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            destination_id: f.destination_id,
            created_at: f.created_at,
        }
    }
}

#[derive(Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct NotificationRow {
    id: String,
    user_id: String,
    title: String,
    message: String,
    notification_type: String,
    read: bool,
    related_id: Option<String>,
    reminder_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            user_id: n.user_id.clone(),
            title: n.title.clone(),
            message: n.message.clone(),
            notification_type: n.kind.as_str().to_string(),
            read: n.read,
            related_id: n.related_id.clone(),
            reminder_type: n.reminder_type.map(|m| m.as_str().to_string()),
            created_at: n.created_at,
        }
    }
}

impl NotificationRow {
    fn into_domain(self) -> StoreResult<Notification> {
        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind: self.notification_type.parse()?,
            read: self.read,
            related_id: self.related_id,
            reminder_type: self.reminder_type.map(|m| m.parse()).transpose()?,
            created_at: self.created_at,
        })
    }
}

fn destinations_from(rows: Vec<DestinationRow>) -> StoreResult<Vec<Destination>> {
    rows.into_iter().map(DestinationRow::into_domain).collect()
}

/// Rows that no longer decode are logged and left out, so one bad booking
/// cannot hide every other booking from a scan.
fn bookings_from(rows: Vec<BookingRow>) -> Vec<Booking> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match row.into_domain() {
                Ok(booking) => Some(booking),
                Err(e) => {
                    tracing::warn!("Skipping unreadable booking {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

fn reviews_from(rows: Vec<ReviewRow>) -> Vec<Review> {
    rows.into_iter().map(Review::from).collect()
}

#[async_trait]
impl DestinationStore for PgStore {
    async fn find_all(&self) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Destination>> {
        let mut conn = self.conn().await?;
        destinations::table
            .find(id)
            .select(DestinationRow::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(DestinationRow::into_domain)
            .transpose()
    }

    async fn save(&self, destination: &Destination) -> StoreResult<()> {
        let row = DestinationRow::from_domain(destination)?;
        let mut conn = self.conn().await?;
        diesel::insert_into(destinations::table)
            .values(&row)
            .on_conflict(destinations::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(destinations::table.find(id)).execute(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn find_featured(&self) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .filter(destinations::featured.eq(true))
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn find_popular(&self) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .filter(destinations::popular.eq(true))
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .filter(destinations::name.ilike(like_pattern(query)))
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .filter(destinations::category.eq(category))
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Destination>> {
        let mut conn = self.conn().await?;
        let rows = destinations::table
            .filter(destinations::country.eq(country))
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .load(&mut conn)
            .await?;
        destinations_from(rows)
    }

    async fn find_by_filter(&self, filter: &DestinationFilter) -> StoreResult<Vec<Destination>> {
        let mut query = destinations::table
            .select(DestinationRow::as_select())
            .order((destinations::created_at.asc(), destinations::id.asc()))
            .into_boxed::<diesel::pg::Pg>();

        if let Some(category) = &filter.category {
            query = query.filter(destinations::category.eq(category.clone()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(destinations::price.ge(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(destinations::price.le(max));
        }
        if let Some(min) = filter.min_rating {
            query = query.filter(destinations::rating.ge(min));
        }

        let mut conn = self.conn().await?;
        let rows = query.load(&mut conn).await?;
        destinations_from(rows)
    }

    async fn update_rating(&self, id: &str, rating: f64, review_count: i32) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(destinations::table.find(id))
            .set((
                destinations::rating.eq(rating),
                destinations::review_count.eq(review_count),
                destinations::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .select(BookingRow::as_select())
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        bookings::table
            .find(id)
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(BookingRow::into_domain)
            .transpose()
    }

    async fn save(&self, booking: &Booking) -> StoreResult<()> {
        let row = BookingRow::from_domain(booking)?;
        let mut conn = self.conn().await?;
        diesel::insert_into(bookings::table)
            .values(&row)
            .on_conflict(bookings::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .select(BookingRow::as_select())
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }

    async fn find_by_user_and_status(&self, user_id: &str, status: BookingStatus) -> StoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .filter(bookings::status.eq(status.as_str()))
            .select(BookingRow::as_select())
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }

    async fn find_by_status(&self, status: BookingStatus) -> StoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .filter(bookings::status.eq(status.as_str()))
            .select(BookingRow::as_select())
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }

    async fn find_active_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let active = [BookingStatus::Confirmed.as_str(), BookingStatus::Completed.as_str()];
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .filter(bookings::status.eq_any(active))
            .select(BookingRow::as_select())
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }

    async fn find_upcoming(&self, now: NaiveDateTime) -> StoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let rows = bookings::table
            .filter(bookings::status.eq(BookingStatus::Confirmed.as_str()))
            .filter(bookings::travel_date.ge(now))
            .select(BookingRow::as_select())
            .order((bookings::travel_date.asc(), bookings::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(bookings_from(rows))
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Review>> {
        let mut conn = self.conn().await?;
        let row = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(Review::from))
    }

    async fn save(&self, review: &Review) -> StoreResult<()> {
        let row = ReviewRow::from(review);
        let mut conn = self.conn().await?;
        diesel::insert_into(reviews::table)
            .values(&row)
            .on_conflict(reviews::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(reviews::table.find(id)).execute(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn find_by_destination(&self, destination_id: &str) -> StoreResult<Vec<Review>> {
        let mut conn = self.conn().await?;
        let rows = reviews::table
            .filter(reviews::destination_id.eq(destination_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.asc(), reviews::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(reviews_from(rows))
    }

    async fn find_by_destination_newest_first(&self, destination_id: &str) -> StoreResult<Vec<Review>> {
        let mut conn = self.conn().await?;
        let rows = reviews::table
            .filter(reviews::destination_id.eq(destination_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .load(&mut conn)
            .await?;
        Ok(reviews_from(rows))
    }

    async fn find_by_destination_min_rating(&self, destination_id: &str, min_rating: i32) -> StoreResult<Vec<Review>> {
        let mut conn = self.conn().await?;
        let rows = reviews::table
            .filter(reviews::destination_id.eq(destination_id))
            .filter(reviews::rating.ge(min_rating))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.asc(), reviews::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(reviews_from(rows))
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Review>> {
        let mut conn = self.conn().await?;
        let rows = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.asc(), reviews::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(reviews_from(rows))
    }

    async fn find_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<Option<Review>> {
        let mut conn = self.conn().await?;
        let row = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .filter(reviews::destination_id.eq(destination_id))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(Review::from))
    }
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn insert(&self, favorite: &Favorite) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::insert_into(favorites::table)
            .values(FavoriteRow::from(favorite))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Favorite>> {
        let mut conn = self.conn().await?;
        let rows = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .select(FavoriteRow::as_select())
            .order((favorites::created_at.asc(), favorites::id.asc()))
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn exists(&self, user_id: &str, destination_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let found = diesel::select(diesel::dsl::exists(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::destination_id.eq(destination_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;
        Ok(found)
    }

    async fn delete_by_user_and_destination(&self, user_id: &str, destination_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::destination_id.eq(destination_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        let row = UserRow::from_domain(user)?;
        let mut conn = self.conn().await?;
        diesel::insert_into(users::table).values(&row).execute(&mut conn).await?;
        Ok(())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        let row = UserRow::from_domain(user)?;
        let mut conn = self.conn().await?;
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(UserRow::into_domain)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(UserRow::into_domain)
            .transpose()
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let found = diesel::select(diesel::dsl::exists(users::table.filter(users::email.eq(email))))
            .get_result::<bool>(&mut conn)
            .await?;
        Ok(found)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert(&self, notification: &Notification) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Notification>> {
        let mut conn = self.conn().await?;
        notifications::table
            .find(id)
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(NotificationRow::into_domain)
            .transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let mut conn = self.conn().await?;
        let rows = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .select(NotificationRow::as_select())
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .load(&mut conn)
            .await?;
        rows.into_iter().map(NotificationRow::into_domain).collect()
    }

    async fn mark_read(&self, id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(notifications::table.find(id))
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }

    async fn mark_all_read(&self, user_id: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await?;
        Ok(updated as u64)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(notifications::table.find(id)).execute(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn count_unread(&self, user_id: &str) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        let count = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_row(id: &str, status: &str) -> BookingRow {
        let now = Utc::now();
        BookingRow {
            id: id.to_string(),
            user_id: "u1".to_string(),
            destination_id: None,
            status: status.to_string(),
            booking_date: now,
            travel_date: None,
            number_of_travelers: None,
            total_price: None,
            payment_method: None,
            payment_status: "PENDING".to_string(),
            contact_info: None,
            special_requests: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unreadable_booking_rows_are_skipped() {
        let rows = vec![
            booking_row("b1", "CONFIRMED"),
            booking_row("b2", "SHIPPED"),
            booking_row("b3", "pending"),
        ];
        let ids: Vec<String> = bookings_from(rows).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b1".to_string(), "b3".to_string()]);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ha long"), "%ha long%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
