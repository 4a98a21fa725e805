use chrono::{Local, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing;
use voyage_core::types::{new_id, Booking, BookingStatus, ContactInfo, PaymentStatus};
use voyage_core::{ServiceError, ServiceResult, TravelContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user_id: String,
    pub destination_id: String,
    pub travel_date: NaiveDateTime,
    pub number_of_travelers: Option<i32>,
    pub total_price: f64,
    pub payment_method: String,
    pub special_requests: Option<String>,
    pub contact_info: Option<ContactInfo>,
}

impl NewBooking {
    fn validate(&self) -> ServiceResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(ServiceError::Validation("User ID is required".to_string()));
        }
        if self.destination_id.trim().is_empty() {
            return Err(ServiceError::Validation("Destination ID is required".to_string()));
        }
        if self.number_of_travelers.is_some_and(|n| n < 1) {
            return Err(ServiceError::Validation(
                "Number of travelers must be at least 1".to_string(),
            ));
        }
        if !self.total_price.is_finite() || self.total_price < 0.0 {
            return Err(ServiceError::Validation("Total price must not be negative".to_string()));
        }
        if self.payment_method.trim().is_empty() {
            return Err(ServiceError::Validation("Payment method is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct BookingService {
    ctx: TravelContext,
}

impl BookingService {
    pub fn new(ctx: TravelContext) -> Self {
        Self { ctx }
    }

    /// New bookings always start PENDING with a PENDING payment.
    pub async fn create(&self, request: NewBooking) -> ServiceResult<Booking> {
        request.validate()?;

        if self
            .ctx
            .stores
            .destinations
            .find_by_id(&request.destination_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::Validation("Destination not found".to_string()));
        }

        let now = Utc::now();
        let booking = Booking {
            id: new_id(),
            user_id: request.user_id,
            destination_id: Some(request.destination_id),
            status: BookingStatus::Pending,
            booking_date: now,
            travel_date: Some(request.travel_date),
            number_of_travelers: request.number_of_travelers,
            total_price: Some(request.total_price),
            payment_method: Some(request.payment_method),
            payment_status: PaymentStatus::Pending,
            contact_info: request.contact_info,
            special_requests: request
                .special_requests
                .filter(|s| !s.trim().is_empty())
                .into_iter()
                .collect(),
            created_at: now,
            updated_at: now,
        };

        self.ctx.stores.bookings.save(&booking).await?;
        tracing::info!("Booking {} created for user {}", booking.id, booking.user_id);
        Ok(booking)
    }

    pub async fn find(&self, id: &str) -> ServiceResult<Booking> {
        self.ctx
            .stores
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Booking>> {
        Ok(self.ctx.stores.bookings.find_all().await?)
    }

    pub async fn list_by_status(&self, status: BookingStatus) -> ServiceResult<Vec<Booking>> {
        Ok(self.ctx.stores.bookings.find_by_status(status).await?)
    }

    pub async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Booking>> {
        Ok(self.ctx.stores.bookings.find_by_user(user_id).await?)
    }

    pub async fn active_for_user(&self, user_id: &str) -> ServiceResult<Vec<Booking>> {
        Ok(self.ctx.stores.bookings.find_active_by_user(user_id).await?)
    }

    /// Confirmed bookings of one user.
    pub async fn upcoming_for_user(&self, user_id: &str) -> ServiceResult<Vec<Booking>> {
        Ok(self
            .ctx
            .stores
            .bookings
            .find_by_user_and_status(user_id, BookingStatus::Confirmed)
            .await?)
    }

    pub async fn completed_for_user(&self, user_id: &str) -> ServiceResult<Vec<Booking>> {
        Ok(self
            .ctx
            .stores
            .bookings
            .find_by_user_and_status(user_id, BookingStatus::Completed)
            .await?)
    }

    /// Confirmed bookings of every user departing from now on.
    pub async fn upcoming(&self) -> ServiceResult<Vec<Booking>> {
        self.upcoming_from(Local::now().naive_local()).await
    }

    pub async fn upcoming_from(&self, now: NaiveDateTime) -> ServiceResult<Vec<Booking>> {
        Ok(self.ctx.stores.bookings.find_upcoming(now).await?)
    }

    pub async fn update_status(&self, id: &str, status: BookingStatus) -> ServiceResult<Booking> {
        let mut booking = self.find(id).await?;
        let previous = booking.status;
        booking.status = status;
        booking.updated_at = Utc::now();
        self.ctx.stores.bookings.save(&booking).await?;

        tracing::info!("Booking {} status {} -> {}", id, previous, status);
        Ok(booking)
    }

    pub async fn update_payment_status(&self, id: &str, payment_status: PaymentStatus) -> ServiceResult<Booking> {
        let mut booking = self.find(id).await?;
        booking.payment_status = payment_status;
        booking.updated_at = Utc::now();
        self.ctx.stores.bookings.save(&booking).await?;

        tracing::info!("Booking {} payment status now {}", id, payment_status);
        Ok(booking)
    }

    pub async fn cancel(&self, id: &str) -> ServiceResult<Booking> {
        self.update_status(id, BookingStatus::Cancelled).await
    }
}
