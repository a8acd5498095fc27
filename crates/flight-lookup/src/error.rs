use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid lookup URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Lookup failed ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse lookup response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Expected a JSON array of candidates, got {found}")]
    NotAnArray { found: &'static str },
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::Transport(_) | LookupError::Url(_) => FailureKind::Transport,
            LookupError::Status { .. } => FailureKind::Status,
            LookupError::Decode(_) | LookupError::NotAnArray { .. } => FailureKind::Malformed,
        }
    }
}

/// Coarse cause of a failed lookup, kept by the field for rendering and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status,
    Malformed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
