// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Maps auth, transport, API and filesystem failures to exit codes

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Markdown conversion error: {0}")]
    Convert(String),

    #[error("Incomplete backup of '{scope}': {cause}")]
    PartialFetch { scope: String, cause: String },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 2,
            Error::Network(_) => 3,
            Error::Api { .. } => 4,
            Error::Parse(_) => 5,
            Error::Filesystem(_) => 6,
            Error::Convert(_) => 7,
            Error::PartialFetch { .. } => 8,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
