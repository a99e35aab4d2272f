use atlas_resilience::FailureKind;
use thiserror::Error;

/// Extractor-level error taxonomy (spec §7: "Transient I/O"/"Permanent I/O").
#[derive(Debug, Error, Clone)]
pub enum ExtractError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    HttpStatus(u16),
    #[error("response body was empty")]
    ParseEmpty,
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("operation cancelled")]
    Cancelled,
}

impl FailureKind for ExtractError {
    fn is_transient(&self) -> bool {
        match self {
            ExtractError::Network(_) => true,
            ExtractError::HttpStatus(code) => *code >= 500 || *code == 429,
            ExtractError::ParseEmpty => true,
            ExtractError::Parse(_) => false,
            ExtractError::MalformedArtifact(_) => false,
            ExtractError::TooManyRedirects => false,
            ExtractError::Cancelled => false,
        }
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ExtractError::HttpStatus(status.as_u16())
        } else {
            ExtractError::Network(e.to_string())
        }
    }
}
