pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod password;
pub mod schema;
pub mod seed;
pub mod store;
pub mod types;

pub use config::{Config, Locale};
pub use context::TravelContext;
pub use db::DbPool;
pub use error::{ServiceError, ServiceResult, StoreError};
pub use store::{DestinationFilter, Stores};
