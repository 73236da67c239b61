use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid target: {0}. It must start with http:// or https://")]
    InvalidTarget(String),

    #[error("Wordlist not found: {0}")]
    WordlistNotFound(String),

    #[error("Failed to read wordlist {path}: {source}")]
    Wordlist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScanError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidTarget(_)
                | ScanError::WordlistNotFound(_)
                | ScanError::Wordlist { .. }
                | ScanError::InvalidRegex { .. }
                | ScanError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
