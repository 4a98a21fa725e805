use chrono::Utc;
use serde::Deserialize;
use tracing;
use voyage_core::types::{new_id, Review};
use voyage_core::{ServiceError, ServiceResult, StoreError, TravelContext};

use crate::rating::RatingAggregator;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub user_id: String,
    pub destination_id: String,
    pub rating: i32,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating: i32,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
}

fn validate(rating: i32, comment: &str) -> ServiceResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ServiceError::Validation("Rating must be between 1 and 5".to_string()));
    }
    if comment.trim().is_empty() {
        return Err(ServiceError::Validation("Comment is required".to_string()));
    }
    Ok(())
}

/// Review CRUD. Every successful write or delete refreshes the
/// destination's rating before returning.
#[derive(Clone)]
pub struct ReviewService {
    ctx: TravelContext,
    ratings: RatingAggregator,
}

impl ReviewService {
    pub fn new(ctx: TravelContext, ratings: RatingAggregator) -> Self {
        Self { ctx, ratings }
    }

    pub async fn create(&self, request: NewReview) -> ServiceResult<Review> {
        if request.destination_id.trim().is_empty() {
            return Err(ServiceError::Validation("Destination ID is required".to_string()));
        }
        validate(request.rating, &request.comment)?;

        let user = self
            .ctx
            .stores
            .users
            .find_by_id(&request.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        if self
            .ctx
            .stores
            .destinations
            .find_by_id(&request.destination_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Destination"));
        }
        if self
            .ctx
            .stores
            .reviews
            .find_by_user_and_destination(&user.id, &request.destination_id)
            .await?
            .is_some()
        {
            return Err(already_reviewed());
        }

        let now = Utc::now();
        let user_name = if user.full_name.trim().is_empty() {
            "User".to_string()
        } else {
            user.full_name.clone()
        };
        let review = Review {
            id: new_id(),
            user_id: user.id,
            destination_id: request.destination_id,
            user_name,
            user_avatar: user.avatar,
            rating: request.rating,
            comment: request.comment,
            images: request.images,
            created_at: now,
            updated_at: now,
        };

        self.ctx.stores.reviews.save(&review).await.map_err(|e| match e {
            StoreError::Duplicate(_) => already_reviewed(),
            other => other.into(),
        })?;
        tracing::info!("Review {} created for destination {}", review.id, review.destination_id);

        self.ratings.recompute(&review.destination_id).await?;
        Ok(review)
    }

    pub async fn update(&self, id: &str, changes: ReviewUpdate) -> ServiceResult<Review> {
        validate(changes.rating, &changes.comment)?;

        let mut review = self.find(id).await?;
        review.rating = changes.rating;
        review.comment = changes.comment;
        review.images = changes.images;
        review.updated_at = Utc::now();

        self.ctx.stores.reviews.save(&review).await?;
        self.ratings.recompute(&review.destination_id).await?;
        Ok(review)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let review = self.find(id).await?;
        if !self.ctx.stores.reviews.delete_by_id(id).await? {
            return Err(ServiceError::not_found("Review"));
        }
        tracing::info!("Review {} deleted from destination {}", id, review.destination_id);

        self.ratings.recompute(&review.destination_id).await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> ServiceResult<Review> {
        self.ctx
            .stores
            .reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Review"))
    }

    /// Newest first, or every review at or above `min_rating`.
    pub async fn list_for_destination(&self, destination_id: &str, min_rating: Option<i32>) -> ServiceResult<Vec<Review>> {
        let reviews = match min_rating {
            Some(min) => {
                self.ctx
                    .stores
                    .reviews
                    .find_by_destination_min_rating(destination_id, min)
                    .await?
            }
            None => {
                self.ctx
                    .stores
                    .reviews
                    .find_by_destination_newest_first(destination_id)
                    .await?
            }
        };
        Ok(reviews)
    }

    pub async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Review>> {
        Ok(self.ctx.stores.reviews.find_by_user(user_id).await?)
    }

    pub async fn find_for_user_and_destination(&self, user_id: &str, destination_id: &str) -> ServiceResult<Option<Review>> {
        Ok(self
            .ctx
            .stores
            .reviews
            .find_by_user_and_destination(user_id, destination_id)
            .await?)
    }
}

fn already_reviewed() -> ServiceError {
    ServiceError::Conflict("You have already reviewed this destination".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use voyage_core::types::Destination;

    struct Harness {
        ctx: TravelContext,
        service: ReviewService,
        destination: Destination,
    }

    async fn harness() -> Harness {
        let ctx = TravelContext::in_memory();
        let destination = fixtures::destination(&ctx, "Hội An").await;
        let service = ReviewService::new(ctx.clone(), RatingAggregator::new(ctx.clone()));
        Harness { ctx, service, destination }
    }

    impl Harness {
        async fn review_as(&self, email: &str, rating: i32) -> Review {
            let user = fixtures::user(&self.ctx, email).await;
            self.service
                .create(NewReview {
                    user_id: user.id,
                    destination_id: self.destination.id.clone(),
                    rating,
                    comment: "Tuyệt vời".to_string(),
                    images: vec![],
                })
                .await
                .unwrap()
        }

        async fn stored(&self) -> (f64, i32) {
            let d = self
                .ctx
                .stores
                .destinations
                .find_by_id(&self.destination.id)
                .await
                .unwrap()
                .unwrap();
            (d.rating, d.review_count)
        }
    }

    #[tokio::test]
    async fn test_rating_follows_review_mutations() {
        let h = harness().await;
        h.review_as("a@x.vn", 5).await;
        let three = h.review_as("b@x.vn", 3).await;
        h.review_as("c@x.vn", 4).await;

        let (rating, count) = h.stored().await;
        assert!((rating - 4.0).abs() < 1e-9);
        assert_eq!(count, 3);

        h.service.delete(&three.id).await.unwrap();
        let (rating, count) = h.stored().await;
        assert!((rating - 4.5).abs() < 1e-9);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_deleting_last_review_resets_rating() {
        let h = harness().await;
        let only = h.review_as("a@x.vn", 2).await;
        assert_eq!(h.stored().await, (2.0, 1));

        h.service.delete(&only.id).await.unwrap();
        assert_eq!(h.stored().await, (0.0, 0));
    }

    #[tokio::test]
    async fn test_update_recomputes() {
        let h = harness().await;
        let review = h.review_as("a@x.vn", 1).await;
        h.review_as("b@x.vn", 5).await;

        let updated = h
            .service
            .update(
                &review.id,
                ReviewUpdate {
                    rating: 3,
                    comment: "Khá ổn".to_string(),
                    images: vec!["https://img/1.jpg".to_string()],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 3);
        assert_eq!(h.stored().await, (4.0, 2));
    }

    #[tokio::test]
    async fn test_second_review_by_same_user_conflicts() {
        let h = harness().await;
        let first = h.review_as("a@x.vn", 4).await;

        let err = h
            .service
            .create(NewReview {
                user_id: first.user_id.clone(),
                destination_id: h.destination.id.clone(),
                rating: 1,
                comment: "again".to_string(),
                images: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(h.stored().await, (4.0, 1));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let h = harness().await;
        let user = fixtures::user(&h.ctx, "v@x.vn").await;
        let request = |rating: i32, comment: &str| NewReview {
            user_id: user.id.clone(),
            destination_id: h.destination.id.clone(),
            rating,
            comment: comment.to_string(),
            images: vec![],
        };

        for (rating, comment) in [(0, "ok"), (6, "ok"), (3, "   ")] {
            let err = h.service.create(request(rating, comment)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let mut unknown_user = request(3, "ok");
        unknown_user.user_id = "ghost".to_string();
        assert!(matches!(
            h.service.create(unknown_user).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));

        let mut unknown_destination = request(3, "ok");
        unknown_destination.destination_id = "nowhere".to_string();
        assert!(matches!(
            h.service.create(unknown_destination).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_listing_filters() {
        let h = harness().await;
        let low = h.review_as("a@x.vn", 2).await;
        h.review_as("b@x.vn", 5).await;

        let all = h.service.list_for_destination(&h.destination.id, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let high = h.service.list_for_destination(&h.destination.id, Some(4)).await.unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].rating, 5);

        let mine = h.service.list_for_user(&low.user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(h
            .service
            .find_for_user_and_destination(&low.user_id, &h.destination.id)
            .await
            .unwrap()
            .is_some());
    }
}
