use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FertiplanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load calibration from {path}: {reason}")]
    CalibrationLoad { path: PathBuf, reason: String },

    #[error("invalid calibration: {0}")]
    CalibrationInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
