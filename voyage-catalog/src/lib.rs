pub mod bookings;
pub mod destinations;
pub mod favorites;
pub mod rating;
pub mod reviews;
pub mod users;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bookings::{BookingService, NewBooking};
pub use destinations::{DestinationInput, DestinationService};
pub use favorites::FavoriteService;
pub use rating::{RatingAggregator, RatingSummary};
pub use reviews::{NewReview, ReviewService, ReviewUpdate};
pub use users::{Registration, UserService, UserUpdate};
