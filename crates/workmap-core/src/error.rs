use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkmapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error for {url}: {detail}")]
    Transport { url: String, detail: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Decode error for {url}: {detail}")]
    Decode { url: String, detail: String },

    #[error("Task join error: {0}")]
    Join(String),
}

impl WorkmapError {
    /// The request URL this error is tagged with, when it came from a fetch.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Transport { url, .. } | Self::HttpStatus { url, .. } | Self::Decode { url, .. } => {
                Some(url)
            }
            Self::Config(_) | Self::Join(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkmapError>;
