use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

pub type Result<T> = std::result::Result<T, GoogleError>;
