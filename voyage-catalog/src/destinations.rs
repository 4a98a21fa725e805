use chrono::Utc;
use serde::Deserialize;
use tracing;
use voyage_core::types::{new_id, Destination, Location};
use voyage_core::{DestinationFilter, ServiceError, ServiceResult, TravelContext};

/// Descriptive fields of a destination. The derived rating fields are
/// never taken from input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationInput {
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub popular: bool,
    pub location: Option<Location>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl DestinationInput {
    fn validate(&self) -> ServiceResult<()> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(ServiceError::Validation("Price must not be negative".to_string()));
        }
        Ok(())
    }

    fn apply(self, destination: &mut Destination) {
        destination.name = self.name;
        destination.country = self.country;
        destination.description = self.description;
        destination.short_description = self.short_description;
        destination.image_url = self.image_url;
        destination.images = self.images;
        destination.price = self.price;
        destination.duration = self.duration;
        destination.category = self.category;
        destination.featured = self.featured;
        destination.popular = self.popular;
        destination.location = self.location;
        destination.highlights = self.highlights;
        destination.amenities = self.amenities;
    }
}

#[derive(Clone)]
pub struct DestinationService {
    ctx: TravelContext,
}

impl DestinationService {
    pub fn new(ctx: TravelContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_all().await?)
    }

    pub async fn find(&self, id: &str) -> ServiceResult<Destination> {
        self.ctx
            .stores
            .destinations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Destination"))
    }

    pub async fn featured(&self) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_featured().await?)
    }

    pub async fn popular(&self) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_popular().await?)
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.search_by_name(query.trim()).await?)
    }

    pub async fn by_category(&self, category: &str) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_by_category(category).await?)
    }

    pub async fn by_country(&self, country: &str) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_by_country(country).await?)
    }

    pub async fn by_price_range(&self, min_price: f64, max_price: f64) -> ServiceResult<Vec<Destination>> {
        if min_price > max_price {
            return Err(ServiceError::Validation(
                "Minimum price must not exceed maximum price".to_string(),
            ));
        }
        self.filter(DestinationFilter {
            min_price: Some(min_price),
            max_price: Some(max_price),
            ..Default::default()
        })
        .await
    }

    pub async fn by_min_rating(&self, min_rating: f64) -> ServiceResult<Vec<Destination>> {
        self.filter(DestinationFilter {
            min_rating: Some(min_rating),
            ..Default::default()
        })
        .await
    }

    /// Combines whichever criteria are set; an empty filter lists everything.
    pub async fn filter(&self, filter: DestinationFilter) -> ServiceResult<Vec<Destination>> {
        Ok(self.ctx.stores.destinations.find_by_filter(&filter).await?)
    }

    pub async fn create(&self, input: DestinationInput) -> ServiceResult<Destination> {
        input.validate()?;

        let now = Utc::now();
        let mut destination = Destination {
            id: new_id(),
            name: String::new(),
            country: None,
            description: None,
            short_description: None,
            image_url: None,
            images: vec![],
            rating: 0.0,
            review_count: 0,
            price: None,
            duration: None,
            category: None,
            featured: false,
            popular: false,
            location: None,
            highlights: vec![],
            amenities: vec![],
            created_at: now,
            updated_at: now,
        };
        input.apply(&mut destination);

        self.ctx.stores.destinations.save(&destination).await?;
        tracing::info!("Destination {} created: {}", destination.id, destination.name);
        Ok(destination)
    }

    /// Replaces the descriptive fields and keeps rating and review count.
    pub async fn update(&self, id: &str, input: DestinationInput) -> ServiceResult<Destination> {
        input.validate()?;

        let mut destination = self.find(id).await?;
        input.apply(&mut destination);
        destination.updated_at = Utc::now();

        self.ctx.stores.destinations.save(&destination).await?;
        Ok(destination)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.ctx.stores.destinations.delete_by_id(id).await? {
            return Err(ServiceError::not_found("Destination"));
        }
        tracing::info!("Destination {} deleted", id);
        Ok(())
    }
}
