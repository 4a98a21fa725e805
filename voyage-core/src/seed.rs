//! Starter catalogue for fresh installs.

use chrono::Utc;

use crate::store::{StoreResult, Stores};
use crate::types::{new_id, Destination, Location};

const COVER_IMAGE: &str = "https://images.unsplash.com/photo-1502602898536-47ad22581b52?w=800&h=600&fit=crop";
const GALLERY_IMAGE: &str = "https://images.unsplash.com/photo-1513639765736-5c6d1f8e1b5c?w=800&h=600&fit=crop";
const AMENITIES: [&str; 4] = ["WiFi", "Breakfast", "Airport Transfer", "Guide"];

struct Sample {
    name: &'static str,
    country: &'static str,
    description: &'static str,
    city: &'static str,
    coordinates: (f64, f64),
    category: &'static str,
    price: f64,
    duration: &'static str,
    featured: bool,
    highlights: [&'static str; 3],
}

const SAMPLES: [Sample; 5] = [
    Sample {
        name: "Paris, France",
        country: "France",
        description: "Thành phố ánh sáng với những công trình kiến trúc tuyệt đẹp",
        city: "Paris",
        coordinates: (48.8566, 2.3522),
        category: "Cultural",
        price: 2_500_000.0,
        duration: "5 days",
        featured: true,
        highlights: ["Eiffel Tower", "Louvre Museum", "Notre Dame"],
    },
    Sample {
        name: "Tokyo, Japan",
        country: "Japan",
        description: "Thành phố hiện đại kết hợp truyền thống",
        city: "Tokyo",
        coordinates: (35.6762, 139.6503),
        category: "Cultural",
        price: 3_200_000.0,
        duration: "7 days",
        featured: true,
        highlights: ["Tokyo Tower", "Senso-ji Temple", "Shibuya Crossing"],
    },
    Sample {
        name: "Bali, Indonesia",
        country: "Indonesia",
        description: "Thiên đường nhiệt đới với những bãi biển tuyệt đẹp",
        city: "Bali",
        coordinates: (-8.3405, 115.0920),
        category: "Beach",
        price: 1_800_000.0,
        duration: "6 days",
        featured: true,
        highlights: ["Ubud", "Tanah Lot", "Mount Batur"],
    },
    Sample {
        name: "Dubai, UAE",
        country: "United Arab Emirates",
        description: "Thành phố vàng với những tòa nhà chọc trời",
        city: "Dubai",
        coordinates: (25.2048, 55.2708),
        category: "Luxury",
        price: 4_500_000.0,
        duration: "4 days",
        featured: false,
        highlights: ["Burj Khalifa", "Palm Jumeirah", "Dubai Mall"],
    },
    Sample {
        name: "Santorini, Greece",
        country: "Greece",
        description: "Hòn đảo xinh đẹp với kiến trúc trắng xanh",
        city: "Santorini",
        coordinates: (36.3932, 25.4615),
        category: "Beach",
        price: 2_800_000.0,
        duration: "5 days",
        featured: false,
        highlights: ["Oia Village", "Red Beach", "Santorini Volcano"],
    },
];

impl Sample {
    fn to_destination(&self) -> Destination {
        let now = Utc::now();
        Destination {
            id: new_id(),
            name: self.name.to_string(),
            country: Some(self.country.to_string()),
            description: Some(self.description.to_string()),
            short_description: Some(self.description.chars().take(100).collect()),
            image_url: Some(COVER_IMAGE.to_string()),
            images: vec![COVER_IMAGE.to_string(), GALLERY_IMAGE.to_string()],
            // no reviews yet, so nothing to average
            rating: 0.0,
            review_count: 0,
            price: Some(self.price),
            duration: Some(self.duration.to_string()),
            category: Some(self.category.to_string()),
            featured: self.featured,
            popular: true,
            location: Some(Location {
                latitude: Some(self.coordinates.0),
                longitude: Some(self.coordinates.1),
                address: Some(self.name.to_string()),
                city: Some(self.city.to_string()),
                country: Some(self.country.to_string()),
            }),
            highlights: self.highlights.iter().map(|h| h.to_string()).collect(),
            amenities: AMENITIES.iter().map(|a| a.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Saves the sample destinations when the catalogue is empty and returns how
/// many were written. A catalogue with any destination is left alone.
pub async fn seed_sample_destinations(stores: &Stores) -> StoreResult<usize> {
    if !stores.destinations.find_all().await?.is_empty() {
        tracing::debug!("Destinations present, skipping sample data");
        return Ok(0);
    }

    for sample in &SAMPLES {
        stores.destinations.save(&sample.to_destination()).await?;
    }
    Ok(SAMPLES.len())
}
