use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("API key not configured. Set GEMINI_API_KEY environment variable or run: studio config set api.key <your-key>")]
    MissingApiKey,

    #[error("{0}")]
    MissingInput(String),

    #[error("Unsupported file type '{0}'. Please select an image file (PNG, JPG, WEBP, ...)")]
    UnsupportedMedia(String),

    #[error("Failed to read the image file: {0}")]
    MediaRead(String),

    #[error("No image was returned. The model may have refused the request{}", detail_suffix(.0))]
    NoImageReturned(Option<String>),

    #[error("Upstream service error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => ".".to_string(),
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Upstream {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl StudioError {
    /// Validation failures are reported synchronously and never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StudioError::MissingInput(_) | StudioError::UnsupportedMedia(_)
        )
    }
}
