use crate::llm::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),
    #[error("Failed to encode image: {0}")]
    ImageEncode(String),
    #[error("No transcript available for video {video_id}")]
    NoTranscriptAvailable { video_id: String },
    #[error("All models failed: {}", models.join(", "))]
    AllModelsFailed { models: Vec<String> },
    #[error("Model {model} returned no content")]
    NoContentGenerated { model: String },
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Background task failed: {err}"))
    }
}
