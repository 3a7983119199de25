use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed date '{raw}': {reason}")]
    MalformedDate { raw: String, reason: String },

    #[error("Malformed time '{raw}'")]
    MalformedTime { raw: String },

    #[error("Fetch failed for {url}: status {status}")]
    Fetch { url: String, status: u16 },

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub(crate) fn malformed_date(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedDate {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
