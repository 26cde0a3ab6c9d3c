use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
