use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlashdeckError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("HTTP error {status} on {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Deck index present but empty (field \"decks\")")]
    EmptyDeckIndex,

    #[error("No deck catalog available (decks: {decks}; legacy: {legacy})")]
    CatalogUnavailable { decks: String, legacy: String },

    #[error("FlashdeckError: {0}")]
    Custom(String),
}

impl FlashdeckError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlashdeckError::NotFound(_))
    }
}

impl From<std::io::Error> for FlashdeckError {
    fn from(error: std::io::Error) -> Self {
        FlashdeckError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for FlashdeckError {
    fn from(error: reqwest::Error) -> Self {
        FlashdeckError::Reqwest(Box::new(error))
    }
}
