use chrono::Utc;
use tracing;
use voyage_core::types::{new_id, Favorite};
use voyage_core::{ServiceError, ServiceResult, StoreError, TravelContext};

#[derive(Clone)]
pub struct FavoriteService {
    ctx: TravelContext,
}

impl FavoriteService {
    pub fn new(ctx: TravelContext) -> Self {
        Self { ctx }
    }

    pub async fn add(&self, user_id: &str, destination_id: &str) -> ServiceResult<Favorite> {
        if user_id.trim().is_empty() || destination_id.trim().is_empty() {
            return Err(ServiceError::Validation(
                "userId and destinationId are required".to_string(),
            ));
        }
        if self.ctx.stores.favorites.exists(user_id, destination_id).await? {
            return Err(already_favorite());
        }

        let favorite = Favorite {
            id: new_id(),
            user_id: user_id.to_string(),
            destination_id: destination_id.to_string(),
            created_at: Utc::now(),
        };
        self.ctx.stores.favorites.insert(&favorite).await.map_err(|e| match e {
            StoreError::Duplicate(_) => already_favorite(),
            other => other.into(),
        })?;

        tracing::debug!("User {} favorited {}", user_id, destination_id);
        Ok(favorite)
    }

    /// Removing a pair that was never favorited is not an error.
    pub async fn remove(&self, user_id: &str, destination_id: &str) -> ServiceResult<()> {
        self.ctx
            .stores
            .favorites
            .delete_by_user_and_destination(user_id, destination_id)
            .await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Favorite>> {
        Ok(self.ctx.stores.favorites.find_by_user(user_id).await?)
    }

    pub async fn is_favorite(&self, user_id: &str, destination_id: &str) -> ServiceResult<bool> {
        Ok(self.ctx.stores.favorites.exists(user_id, destination_id).await?)
    }
}

fn already_favorite() -> ServiceError {
    ServiceError::Conflict("Destination already in favorites".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_check_remove() {
        let service = FavoriteService::new(TravelContext::in_memory());

        service.add("u1", "d1").await.unwrap();
        service.add("u1", "d2").await.unwrap();
        assert!(service.is_favorite("u1", "d1").await.unwrap());
        assert!(!service.is_favorite("u2", "d1").await.unwrap());

        let err = service.add("u1", "d1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        service.remove("u1", "d1").await.unwrap();
        service.remove("u1", "d1").await.unwrap();
        let left = service.list_for_user("u1").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].destination_id, "d2");
    }
}
