use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please select at least one patch and one tournament")]
    EmptySelection,

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Could not decode report file: {0}")]
    DecodeError(String),

    #[error("IO error: {0}")]
    IoError(String),
}
