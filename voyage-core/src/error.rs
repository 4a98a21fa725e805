use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Failures raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    /// A unique constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("query failed: {0}")]
    Query(DieselError),
    #[error("stored document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored value is malformed: {0}")]
    Corrupt(String),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Duplicate(info.message().to_string())
            }
            DieselError::NotFound => StoreError::NotFound("row".to_string()),
            other => StoreError::Query(other),
        }
    }
}

impl From<crate::types::ParseEnumError> for StoreError {
    fn from(err: crate::types::ParseEnumError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Failures surfaced by the domain services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
