use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extractor error: {0}")]
    Extractor(#[from] sportdeutschland_parser::extractor::error::ExtractorError),

    #[error("No streams available for the provided URL")]
    NoStreamsAvailable,
}

impl CliError {
    pub fn no_streams_found() -> Self {
        Self::NoStreamsAvailable
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
