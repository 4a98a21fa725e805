pub mod reminder;
pub mod scheduler;
pub mod service;

pub use reminder::ReminderTemplate;
pub use scheduler::{ReminderScheduler, ScanReport};
pub use service::NotificationService;
