use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fresh document id for any collection.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Bookings in these states still expect the traveller to depart.
    pub fn awaits_departure(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            _ => Err(ParseEnumError::new("booking status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err(ParseEnumError::new("payment status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Booking,
    Payment,
    Review,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Booking => "booking",
            NotificationType::Payment => "payment",
            NotificationType::Review => "review",
            NotificationType::System => "system",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(NotificationType::Booking),
            "payment" => Ok(NotificationType::Payment),
            "review" => Ok(NotificationType::Review),
            "system" => Ok(NotificationType::System),
            _ => Err(ParseEnumError::new("notification type", s)),
        }
    }
}

/// A day offset before departure at which exactly one reminder is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Milestone {
    #[serde(rename = "upcoming-0d")]
    SameDay,
    #[serde(rename = "upcoming-1d")]
    OneDay,
    #[serde(rename = "upcoming-3d")]
    ThreeDays,
    #[serde(rename = "upcoming-7d")]
    SevenDays,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::SameDay,
        Milestone::OneDay,
        Milestone::ThreeDays,
        Milestone::SevenDays,
    ];

    pub fn days_before(&self) -> i64 {
        match self {
            Milestone::SameDay => 0,
            Milestone::OneDay => 1,
            Milestone::ThreeDays => 3,
            Milestone::SevenDays => 7,
        }
    }

    /// Exact-day match only: any offset without a milestone yields `None`.
    pub fn from_days(days: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.days_before() == days)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Milestone::SameDay => "upcoming-0d",
            Milestone::OneDay => "upcoming-1d",
            Milestone::ThreeDays => "upcoming-3d",
            Milestone::SevenDays => "upcoming-7d",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Milestone {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("reminder type", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Mean of current review ratings, maintained by the rating aggregator.
    pub rating: f64,
    pub review_count: i32,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub popular: bool,
    pub location: Option<Location>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub language: String,
    pub currency: String,
    pub notifications: bool,
    pub dark_mode: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            language: "vi".to_string(),
            currency: "VND".to_string(),
            notifications: true,
            dark_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub destination_id: Option<String>,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    /// Local wall-clock departure; only its calendar date drives reminders.
    pub travel_date: Option<NaiveDateTime>,
    pub number_of_travelers: Option<i32>,
    pub total_price: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub contact_info: Option<ContactInfo>,
    #[serde(default)]
    pub special_requests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub destination_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub rating: i32,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub destination_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    /// Booking or destination id this notification points at.
    pub related_id: Option<String>,
    pub reminder_type: Option<Milestone>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_exact_days() {
        assert_eq!(Milestone::from_days(0), Some(Milestone::SameDay));
        assert_eq!(Milestone::from_days(1), Some(Milestone::OneDay));
        assert_eq!(Milestone::from_days(3), Some(Milestone::ThreeDays));
        assert_eq!(Milestone::from_days(7), Some(Milestone::SevenDays));

        for days in [-1, 2, 4, 5, 6, 8, 30] {
            assert_eq!(Milestone::from_days(days), None, "day {} must not match", days);
        }
    }

    #[test]
    fn test_milestone_wire_names() {
        assert_eq!(serde_json::to_value(Milestone::ThreeDays).unwrap(), "upcoming-3d");
        assert_eq!("upcoming-7d".parse::<Milestone>().unwrap(), Milestone::SevenDays);
        assert!("booking-success".parse::<Milestone>().is_err());
    }

    #[test]
    fn test_booking_status_gating() {
        assert!(BookingStatus::Pending.awaits_departure());
        assert!(BookingStatus::Confirmed.awaits_departure());
        assert!(!BookingStatus::Cancelled.awaits_departure());
        assert!(!BookingStatus::Completed.awaits_departure());
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            email: "a@b.c".to_string(),
            password_hash: "secret".to_string(),
            full_name: "A".to_string(),
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
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["preferences"]["language"], "vi");
    }
}
