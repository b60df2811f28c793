use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Not signed in: a user id is required")]
    NotSignedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Invalid upstream response: {0}")]
    UpstreamResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
