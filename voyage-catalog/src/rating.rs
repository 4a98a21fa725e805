use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing;
use voyage_core::{ServiceResult, TravelContext};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: i32,
}

impl RatingSummary {
    /// Mean and count of integer ratings. No ratings means 0.0 over 0.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return RatingSummary { rating: 0.0, review_count: 0 };
        }
        let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        RatingSummary {
            rating: total as f64 / ratings.len() as f64,
            review_count: ratings.len() as i32,
        }
    }
}

/// Recomputes a destination's derived rating from its current reviews.
///
/// Recomputations for the same destination run one at a time; different
/// destinations proceed in parallel. Clones share the same lock table.
#[derive(Clone)]
pub struct RatingAggregator {
    ctx: TravelContext,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl RatingAggregator {
    pub fn new(ctx: TravelContext) -> Self {
        Self {
            ctx,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn recompute(&self, destination_id: &str) -> ServiceResult<RatingSummary> {
        let lock = self.lock_for(destination_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.recompute_locked(destination_id).await
        };
        self.release(destination_id, lock).await;
        result
    }

    async fn recompute_locked(&self, destination_id: &str) -> ServiceResult<RatingSummary> {
        let reviews = self.ctx.stores.reviews.find_by_destination(destination_id).await?;
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        let summary = RatingSummary::from_ratings(&ratings);

        let updated = self
            .ctx
            .stores
            .destinations
            .update_rating(destination_id, summary.rating, summary.review_count)
            .await?;

        if updated {
            tracing::debug!(
                "Destination {} rating now {:.2} over {} reviews",
                destination_id,
                summary.rating,
                summary.review_count
            );
        } else {
            tracing::warn!("Skipped rating update for unknown destination {}", destination_id);
        }
        Ok(summary)
    }

    async fn lock_for(&self, destination_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(destination_id.to_string()).or_default().clone()
    }

    async fn release(&self, destination_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // one reference in the table plus ours means nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(destination_id);
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.locks.lock().await.len()
    }
}
