use chrono::{Local, NaiveDate};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing;
use voyage_core::types::{Booking, Milestone};
use voyage_core::{Locale, ServiceResult, TravelContext};

use crate::reminder::ReminderTemplate;
use crate::service::NotificationService;

/// Outcome counters of one scan over all bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub scanned: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub failed: usize,
    /// Bookings could not be loaded; nothing was processed.
    pub aborted: bool,
}

enum Outcome {
    NotDue,
    AlreadySent,
    Sent,
}

/// Emits at most one departure reminder per booking and milestone.
#[derive(Clone)]
pub struct ReminderScheduler {
    ctx: TravelContext,
    notifications: NotificationService,
    locale: Locale,
}

impl ReminderScheduler {
    pub fn new(ctx: TravelContext) -> Self {
        let locale = ctx.config.reminders.locale;
        Self {
            notifications: NotificationService::new(ctx.clone()),
            ctx,
            locale,
        }
    }

    /// Ticks on `interval` forever. Every tick spawns its own scan, so a slow
    /// scan never delays the next one and two scans may overlap.
    pub async fn run(self, interval: Duration) {
        tracing::info!("Starting reminder scheduler, interval {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let scheduler = self.clone();
            tokio::spawn(async move {
                scheduler.check_upcoming().await;
            });
        }
    }

    pub async fn check_upcoming(&self) -> ScanReport {
        self.check_upcoming_at(Local::now().date_naive()).await
    }

    pub async fn check_upcoming_at(&self, today: NaiveDate) -> ScanReport {
        tracing::info!("Checking for upcoming tours on {}", today);

        let mut report = ScanReport::default();
        let bookings = match self.ctx.stores.bookings.find_all().await {
            Ok(bookings) => bookings,
            Err(e) => {
                tracing::error!("Failed to load bookings, skipping this cycle: {}", e);
                report.aborted = true;
                return report;
            }
        };

        for booking in &bookings {
            report.scanned += 1;
            match self.process(booking, today).await {
                Ok(Outcome::Sent) => report.sent += 1,
                Ok(Outcome::AlreadySent) => report.already_sent += 1,
                Ok(Outcome::NotDue) => {}
                Err(e) => {
                    tracing::error!("Error processing booking {}: {}", booking.id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Finished checking upcoming tours: {} scanned, {} sent, {} already sent, {} failed",
            report.scanned,
            report.sent,
            report.already_sent,
            report.failed
        );
        report
    }

    async fn process(&self, booking: &Booking, today: NaiveDate) -> ServiceResult<Outcome> {
        if !booking.status.awaits_departure() {
            return Ok(Outcome::NotDue);
        }
        let Some(travel_date) = booking.travel_date.map(|t| t.date()) else {
            return Ok(Outcome::NotDue);
        };

        let days_until = (travel_date - today).num_days();
        let Some(milestone) = Milestone::from_days(days_until) else {
            return Ok(Outcome::NotDue);
        };

        // a failed lookup falls through to the insert, where the unique key decides
        let already_sent = self
            .notifications
            .has_reminder(&booking.user_id, &booking.id, milestone)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Could not check existing reminders for booking {}: {}", booking.id, e);
                false
            });
        if already_sent {
            tracing::debug!("Skip: already sent {} for booking {}", milestone, booking.id);
            return Ok(Outcome::AlreadySent);
        }

        let destination = self.destination_name(booking).await;
        let template = ReminderTemplate::render(milestone, self.locale, destination.as_deref(), travel_date);

        let created = self
            .notifications
            .create_reminder(&booking.user_id, &booking.id, milestone, &template.title, &template.message)
            .await?;

        match created {
            Some(_) => {
                tracing::info!("Sent {} reminder for booking {}", milestone, booking.id);
                Ok(Outcome::Sent)
            }
            None => Ok(Outcome::AlreadySent),
        }
    }

    async fn destination_name(&self, booking: &Booking) -> Option<String> {
        let id = booking.destination_id.as_deref()?;
        match self.ctx.stores.destinations.find_by_id(id).await {
            Ok(destination) => destination.map(|d| d.name),
            Err(e) => {
                tracing::warn!("Could not resolve destination {} for booking {}: {}", id, booking.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as Days, NaiveDateTime, NaiveTime, Utc};
    use std::sync::Arc;
    use voyage_core::store::{BookingStore, NotificationStore, StoreResult};
    use voyage_core::types::{new_id, BookingStatus, Destination, Notification, PaymentStatus};
    use voyage_core::{Config, StoreError, Stores};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn destination(name: &str) -> Destination {
        let now = Utc::now();
        Destination {
            id: new_id(),
            name: name.to_string(),
            country: Some("Việt Nam".to_string()),
            description: None,
            short_description: None,
            image_url: None,
            images: vec![],
            rating: 0.0,
            review_count: 0,
            price: Some(1_500_000.0),
            duration: None,
            category: None,
            featured: false,
            popular: false,
            location: None,
            highlights: vec![],
            amenities: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(destination_id: Option<&str>, status: BookingStatus, travel_date: Option<NaiveDate>) -> Booking {
        let now = Utc::now();
        Booking {
            id: new_id(),
            user_id: "u1".to_string(),
            destination_id: destination_id.map(str::to_string),
            status,
            booking_date: now,
            // time of day must not matter
            travel_date: travel_date.map(|d| d.and_time(NaiveTime::from_hms_opt(23, 30, 0).unwrap())),
            number_of_travelers: Some(2),
            total_price: None,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            contact_info: None,
            special_requests: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// Rejects every insert for user `bad`; everything else goes to `inner`.
    struct FlakyNotifications {
        inner: Arc<dyn NotificationStore>,
    }

    #[async_trait]
    impl NotificationStore for FlakyNotifications {
        async fn insert(&self, notification: &Notification) -> StoreResult<()> {
            if notification.user_id == "bad" {
                return Err(StoreError::Pool("connection reset".to_string()));
            }
            self.inner.insert(notification).await
        }
        async fn find_by_id(&self, id: &str) -> StoreResult<Option<Notification>> {
            self.inner.find_by_id(id).await
        }
        async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
            self.inner.list_by_user(user_id).await
        }
        async fn mark_read(&self, id: &str) -> StoreResult<bool> {
            self.inner.mark_read(id).await
        }
        async fn mark_all_read(&self, user_id: &str) -> StoreResult<u64> {
            self.inner.mark_all_read(user_id).await
        }
        async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
            self.inner.delete_by_id(id).await
        }
        async fn count_unread(&self, user_id: &str) -> StoreResult<i64> {
            self.inner.count_unread(user_id).await
        }
    }

    /// Bookings table that cannot be listed.
    struct UnreachableBookings {
        inner: Arc<dyn BookingStore>,
    }

    #[async_trait]
    impl BookingStore for UnreachableBookings {
        async fn find_all(&self) -> StoreResult<Vec<Booking>> {
            Err(StoreError::Pool("timed out waiting for connection".to_string()))
        }
        async fn find_by_id(&self, id: &str) -> StoreResult<Option<Booking>> {
            self.inner.find_by_id(id).await
        }
        async fn save(&self, booking: &Booking) -> StoreResult<()> {
            self.inner.save(booking).await
        }
        async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
            self.inner.find_by_user(user_id).await
        }
        async fn find_by_user_and_status(&self, user_id: &str, status: BookingStatus) -> StoreResult<Vec<Booking>> {
            self.inner.find_by_user_and_status(user_id, status).await
        }
        async fn find_by_status(&self, status: BookingStatus) -> StoreResult<Vec<Booking>> {
            self.inner.find_by_status(status).await
        }
        async fn find_active_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
            self.inner.find_active_by_user(user_id).await
        }
        async fn find_upcoming(&self, now: NaiveDateTime) -> StoreResult<Vec<Booking>> {
            self.inner.find_upcoming(now).await
        }
    }

    async fn setup(status: BookingStatus, days_ahead: i64) -> (ReminderScheduler, Booking) {
        let ctx = TravelContext::in_memory();
        let dest = destination("Đà Lạt");
        ctx.stores.destinations.save(&dest).await.unwrap();

        let b = booking(Some(&dest.id), status, Some(today() + Days::days(days_ahead)));
        ctx.stores.bookings.save(&b).await.unwrap();
        (ReminderScheduler::new(ctx), b)
    }

    async fn reminders(scheduler: &ReminderScheduler, booking_id: &str) -> Vec<Milestone> {
        scheduler
            .notifications
            .list_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.related_id.as_deref() == Some(booking_id))
            .filter_map(|n| n.reminder_type)
            .collect()
    }

    #[tokio::test]
    async fn test_two_runs_send_one_reminder() {
        let (scheduler, b) = setup(BookingStatus::Confirmed, 1).await;

        let first = scheduler.check_upcoming_at(today()).await;
        assert_eq!(first.sent, 1);

        let second = scheduler.check_upcoming_at(today()).await;
        assert_eq!(second.sent, 0);
        assert_eq!(second.already_sent, 1);

        assert_eq!(reminders(&scheduler, &b.id).await, vec![Milestone::OneDay]);
    }

    #[tokio::test]
    async fn test_no_reminder_between_milestones() {
        for days in [2, 4, 5, 6, 8, -1] {
            let (scheduler, b) = setup(BookingStatus::Confirmed, days).await;
            for _ in 0..3 {
                let report = scheduler.check_upcoming_at(today()).await;
                assert_eq!(report.sent, 0, "day offset {}", days);
            }
            assert!(reminders(&scheduler, &b.id).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_each_milestone_fires_once_as_days_pass() {
        let (scheduler, b) = setup(BookingStatus::Confirmed, 7).await;

        // walk "today" from a week out to departure day, twice per day
        for offset in 0..=7 {
            let day = today() + Days::days(offset);
            scheduler.check_upcoming_at(day).await;
            scheduler.check_upcoming_at(day).await;
        }

        let mut sent = reminders(&scheduler, &b.id).await;
        sent.sort_by_key(|m| m.days_before());
        assert_eq!(
            sent,
            vec![Milestone::SameDay, Milestone::OneDay, Milestone::ThreeDays, Milestone::SevenDays]
        );
    }

    #[tokio::test]
    async fn test_only_pending_and_confirmed_are_reminded() {
        for status in [BookingStatus::Cancelled, BookingStatus::Completed] {
            let (scheduler, b) = setup(status, 1).await;
            assert_eq!(scheduler.check_upcoming_at(today()).await.sent, 0);
            assert!(reminders(&scheduler, &b.id).await.is_empty());
        }

        let (scheduler, b) = setup(BookingStatus::Pending, 1).await;
        assert_eq!(scheduler.check_upcoming_at(today()).await.sent, 1);
        assert_eq!(reminders(&scheduler, &b.id).await, vec![Milestone::OneDay]);
    }

    #[tokio::test]
    async fn test_unresolved_destination_uses_fallback_name() {
        let ctx = TravelContext::in_memory();
        let dangling = booking(Some("gone"), BookingStatus::Confirmed, Some(today()));
        let missing = booking(None, BookingStatus::Confirmed, Some(today()));
        ctx.stores.bookings.save(&dangling).await.unwrap();
        ctx.stores.bookings.save(&missing).await.unwrap();
        let scheduler = ReminderScheduler::new(ctx);

        let report = scheduler.check_upcoming_at(today()).await;
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 0);

        let listed = scheduler.notifications.list_for_user("u1").await.unwrap();
        assert!(listed.iter().all(|n| n.message.contains("điểm đến của bạn")));
    }

    #[tokio::test]
    async fn test_message_names_destination_and_date() {
        let (scheduler, _) = setup(BookingStatus::Confirmed, 3).await;
        scheduler.check_upcoming_at(today()).await;

        let listed = scheduler.notifications.list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, voyage_core::types::NotificationType::Booking);
        assert!(listed[0].message.contains("Đà Lạt"));
        assert!(listed[0].message.contains("13/06/2025"));
    }

    #[tokio::test]
    async fn test_missing_travel_date_is_skipped() {
        let ctx = TravelContext::in_memory();
        ctx.stores
            .bookings
            .save(&booking(None, BookingStatus::Confirmed, None))
            .await
            .unwrap();
        let scheduler = ReminderScheduler::new(ctx);

        let report = scheduler.check_upcoming_at(today()).await;
        assert_eq!(report.scanned, 1);
        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_overlapping_scans_do_not_duplicate() {
        let (scheduler, b) = setup(BookingStatus::Confirmed, 0).await;

        let (left, right) = tokio::join!(
            scheduler.check_upcoming_at(today()),
            scheduler.check_upcoming_at(today())
        );
        assert_eq!(left.sent + right.sent, 1);
        assert_eq!(reminders(&scheduler, &b.id).await, vec![Milestone::SameDay]);
    }

    #[tokio::test]
    async fn test_failed_booking_does_not_stop_the_scan() {
        let mut stores = Stores::memory();
        stores.notifications = Arc::new(FlakyNotifications {
            inner: stores.notifications.clone(),
        });
        let ctx = TravelContext::with_stores(Config::in_memory(), stores);

        let mut broken = booking(None, BookingStatus::Confirmed, Some(today() + Days::days(1)));
        broken.user_id = "bad".to_string();
        let healthy = booking(None, BookingStatus::Confirmed, Some(today() + Days::days(1)));
        ctx.stores.bookings.save(&broken).await.unwrap();
        ctx.stores.bookings.save(&healthy).await.unwrap();
        let scheduler = ReminderScheduler::new(ctx);

        let report = scheduler.check_upcoming_at(today()).await;
        assert_eq!(report.scanned, 2);
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.aborted);
        assert_eq!(reminders(&scheduler, &healthy.id).await, vec![Milestone::OneDay]);

        // the failed booking is retried on the next scan
        let retry = scheduler.check_upcoming_at(today()).await;
        assert_eq!(retry.failed, 1);
        assert_eq!(retry.already_sent, 1);
    }

    #[tokio::test]
    async fn test_unlistable_bookings_abort_the_cycle() {
        let mut stores = Stores::memory();
        stores.bookings = Arc::new(UnreachableBookings {
            inner: stores.bookings.clone(),
        });
        let ctx = TravelContext::with_stores(Config::in_memory(), stores);
        ctx.stores
            .bookings
            .save(&booking(None, BookingStatus::Confirmed, Some(today())))
            .await
            .unwrap();
        let scheduler = ReminderScheduler::new(ctx);

        let report = scheduler.check_upcoming_at(today()).await;
        assert!(report.aborted);
        assert_eq!(report.scanned, 0);
        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 0);
    }
}
