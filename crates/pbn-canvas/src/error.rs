use pbn_engine::paint::ColorParseError;
use pbn_path::ParseError;
use thiserror::Error;

use crate::persist::StoreError;

#[derive(Error, Debug)]
pub enum CanvasError {
    /// The image processing collaborator failed or timed out. Recoverable:
    /// the user can retry with the same or a new image.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// A palette index that is not in the palette was selected.
    #[error("unknown color index {0}")]
    UnknownColorIndex(u32),

    /// A painting violated a structural rule at construction time.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The board catalog is malformed.
    #[error("invalid board catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Path(#[from] ParseError),

    #[error(transparent)]
    Color(#[from] ColorParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Convenience type alias for results with [`CanvasError`].
pub type Result<T> = std::result::Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_error_converts() {
        let err: CanvasError = pbn_path::parse_str("L0,0").unwrap_err().into();
        assert!(matches!(err, CanvasError::Path(_)));
        assert!(err.to_string().starts_with("path data error"));
    }

    #[test]
    fn display() {
        assert_eq!(CanvasError::UnknownColorIndex(7).to_string(), "unknown color index 7");
        assert_eq!(
            CanvasError::ProcessingFailed("timed out".into()).to_string(),
            "processing failed: timed out"
        );
        let err: CanvasError = StoreError::NotAuthenticated.into();
        assert_eq!(err.to_string(), "storage error: user not authenticated");
    }
}
