use chrono::NaiveDate;
use voyage_core::types::Milestone;
use voyage_core::Locale;

const FALLBACK_DESTINATION_VI: &str = "điểm đến của bạn";
const FALLBACK_DESTINATION_EN: &str = "your destination";

/// Rendered title and message for one departure reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTemplate {
    pub title: String,
    pub message: String,
}

impl ReminderTemplate {
    /// `destination` falls back to a generic name when the booking's
    /// destination could not be resolved.
    pub fn render(milestone: Milestone, locale: Locale, destination: Option<&str>, travel_date: NaiveDate) -> Self {
        let name = destination
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(match locale {
                Locale::Vi => FALLBACK_DESTINATION_VI,
                Locale::En => FALLBACK_DESTINATION_EN,
            });
        let date = travel_date.format("%d/%m/%Y");

        let (title, message) = match (locale, milestone) {
            (Locale::Vi, Milestone::SameDay) => (
                "Tour khởi hành hôm nay! 🚀".to_string(),
                format!("Chuyến đi đến {} của bạn khởi hành hôm nay. Chúc bạn có một chuyến đi vui vẻ!", name),
            ),
            (Locale::Vi, Milestone::OneDay) => (
                "Tour sắp khởi hành! 🎒".to_string(),
                format!("Tour đến {} của bạn sẽ khởi hành vào ngày mai. Hãy chuẩn bị sẵn sàng!", name),
            ),
            (Locale::Vi, Milestone::ThreeDays) => (
                "Nhắc nhở: Tour sắp khởi hành 📅".to_string(),
                format!("Tour đến {} của bạn sẽ khởi hành trong 3 ngày nữa (ngày {}).", name, date),
            ),
            (Locale::Vi, Milestone::SevenDays) => (
                "Tour sắp đến! 🗓️".to_string(),
                format!("Tour đến {} của bạn sẽ khởi hành trong 1 tuần nữa. Đừng quên chuẩn bị hành lý nhé!", name),
            ),
            (Locale::En, Milestone::SameDay) => (
                "Your tour departs today! 🚀".to_string(),
                format!("Your trip to {} departs today. Have a great journey!", name),
            ),
            (Locale::En, Milestone::OneDay) => (
                "Tour departing soon! 🎒".to_string(),
                format!("Your tour to {} departs tomorrow. Get ready!", name),
            ),
            (Locale::En, Milestone::ThreeDays) => (
                "Reminder: tour departing soon 📅".to_string(),
                format!("Your tour to {} departs in 3 days (on {}).", name, date),
            ),
            (Locale::En, Milestone::SevenDays) => (
                "Tour coming up! 🗓️".to_string(),
                format!("Your tour to {} departs in 1 week. Don't forget to pack!", name),
            ),
        };

        ReminderTemplate { title, message }
    }
}
