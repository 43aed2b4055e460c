use thiserror::Error;

/// Fatal failures: anything in here aborts the run with no deck produced.
///
/// Per-slide image failures are deliberately not represented; those degrade
/// to [`crate::compose::GenerationOutcome::Failed`] at the slide boundary.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid slide input: {0}")]
    InvalidInput(String),

    #[error("deck archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, DeckError>;
