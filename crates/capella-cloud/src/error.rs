//! Resource monitoring error types

use crate::import_id::IdError;
use crate::waiter::FetchError;
use capella_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Unknown resource kind: {0} (expected cluster, app-service or backup)")]
    UnknownKind(String),

    #[error("Invalid resource ID: {0}")]
    Id(#[from] IdError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("{kind} response has no '{field}' field")]
    MissingState { kind: String, field: String },
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::Api(err) if err.is_not_found())
    }
}

impl FetchError for CloudError {
    fn is_not_found(&self) -> bool {
        CloudError::is_not_found(self)
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
