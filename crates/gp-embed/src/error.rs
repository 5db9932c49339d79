use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
