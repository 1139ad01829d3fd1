use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParlexError {
    #[error("Search backend error: {0}")]
    Search(String),

    #[error("Model provider error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
