use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed vendor response: {0}")]
    MalformedResponse(String),
    #[error("Signature error: {0}")]
    Signature(String),
    #[error("Host error: {0}")]
    Host(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GatewayError {
    /// True for failures that happened while talking to the vendor, as opposed
    /// to problems with the input the host gave us.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
