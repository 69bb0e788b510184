use thiserror::Error;

pub type Result<T> = std::result::Result<T, MendError>;

#[derive(Debug, Error)]
pub enum MendError {
    /// Repair kept changing the text and never reached a fixed point.
    #[error("text repair did not settle after {passes} passes")]
    Unsettled { passes: usize },
    #[error("invalid confusion matrix: {0}")]
    InvalidMatrix(String),
    #[error("invalid plot option: {0}")]
    PlotOption(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
