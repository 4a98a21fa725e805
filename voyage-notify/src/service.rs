use chrono::Utc;
use tracing;
use voyage_core::types::{new_id, Milestone, Notification, NotificationType};
use voyage_core::{ServiceError, ServiceResult, StoreError, TravelContext};

#[derive(Clone)]
pub struct NotificationService {
    ctx: TravelContext,
}

impl NotificationService {
    pub fn new(ctx: TravelContext) -> Self {
        Self { ctx }
    }

    pub async fn create(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationType,
        related_id: Option<&str>,
    ) -> ServiceResult<Notification> {
        let notification = build(user_id, title, message, kind, related_id, None);
        self.ctx.stores.notifications.insert(&notification).await?;

        tracing::debug!("Created {} notification {} for user {}", kind, notification.id, user_id);
        Ok(notification)
    }

    /// Stores a booking reminder. Returns `None` when a reminder for the
    /// same booking and milestone already exists.
    pub async fn create_reminder(
        &self,
        user_id: &str,
        booking_id: &str,
        milestone: Milestone,
        title: &str,
        message: &str,
    ) -> ServiceResult<Option<Notification>> {
        let notification = build(
            user_id,
            title,
            message,
            NotificationType::Booking,
            Some(booking_id),
            Some(milestone),
        );

        match self.ctx.stores.notifications.insert(&notification).await {
            Ok(()) => Ok(Some(notification)),
            Err(StoreError::Duplicate(_)) => {
                tracing::debug!("Reminder {} for booking {} already stored", milestone, booking_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Notification>> {
        Ok(self.ctx.stores.notifications.list_by_user(user_id).await?)
    }

    pub async fn has_reminder(&self, user_id: &str, related_id: &str, milestone: Milestone) -> ServiceResult<bool> {
        let notifications = self.list_for_user(user_id).await?;
        Ok(notifications
            .iter()
            .any(|n| n.related_id.as_deref() == Some(related_id) && n.reminder_type == Some(milestone)))
    }

    pub async fn mark_read(&self, id: &str) -> ServiceResult<Notification> {
        let mut notification = self
            .ctx
            .stores
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification"))?;

        if !self.ctx.stores.notifications.mark_read(id).await? {
            return Err(ServiceError::not_found("Notification"));
        }
        notification.read = true;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: &str) -> ServiceResult<u64> {
        let updated = self.ctx.stores.notifications.mark_all_read(user_id).await?;
        tracing::debug!("Marked {} notifications read for user {}", updated, user_id);
        Ok(updated)
    }

    /// Deleting an unknown id is not an error.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.ctx.stores.notifications.delete_by_id(id).await? {
            tracing::debug!("Notification {} already absent", id);
        }
        Ok(())
    }

    pub async fn unread_count(&self, user_id: &str) -> ServiceResult<i64> {
        Ok(self.ctx.stores.notifications.count_unread(user_id).await?)
    }
}

fn build(
    user_id: &str,
    title: &str,
    message: &str,
    kind: NotificationType,
    related_id: Option<&str>,
    reminder_type: Option<Milestone>,
) -> Notification {
    Notification {
        id: new_id(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        read: false,
        related_id: related_id.map(str::to_string),
        reminder_type,
        created_at: Utc::now(),
    }
}
