//! Error types for tfplug

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("no resource type named {0:?} is registered")]
    UnknownResourceType(String),

    #[error("no data source type named {0:?} is registered")]
    UnknownDataSourceType(String),

    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("attribute '{0}' not found")]
    MissingAttribute(String),

    #[error("list index {index} out of bounds ({len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("path step {0} does not apply to this value")]
    InvalidPath(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TfplugError>;
