use serde::Serialize;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller's view of the draft tree no longer matches the engine's:
    /// a key that was issued by the engine could not be resolved.
    #[error("Draft desynchronized: {0}")]
    Desynchronized(String),

    #[error("Draft store error: {0}")]
    DraftStoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    /// Stable machine-readable code for this error, used as a metrics label
    /// and by callers that map errors onto their own surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Desynchronized(_) => "desynchronized",
            Self::DraftStoreError(_) => "draft_store_error",
            Self::SerializationError(_) => "serialization_error",
        }
    }

    /// Whether the error is caused by the data the caller supplied, as
    /// opposed to an engine/caller programming defect.
    pub fn is_caller_recoverable(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidInput(_))
    }
}

// Type aliases for the individual engine concerns
pub type HierarchyError = ServiceError;
pub type PayloadError = ServiceError;

// Result extensions for easier error handling
pub trait ResultExt<T> {
    fn map_err_to_service(self) -> Result<T, ServiceError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ServiceError>,
{
    fn map_err_to_service(self) -> Result<T, ServiceError> {
        self.map_err(|e| e.into())
    }
}
