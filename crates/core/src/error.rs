use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid response from {service}: {details}")]
    Backend { service: String, details: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("search request cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Shared(Arc<SearchError>),
}

impl SearchError {
    pub fn backend(service: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Backend {
            service: service.into(),
            details: details.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            SearchError::Cancelled => true,
            SearchError::Shared(inner) => inner.is_cancelled(),
            _ => false,
        }
    }

    /// Recovers the owned error when the cache handed back its only copy.
    pub(crate) fn from_shared(error: Arc<SearchError>) -> Self {
        Arc::try_unwrap(error).unwrap_or_else(SearchError::Shared)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}
