use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid post id: {0}")]
    InvalidPostId(String),
}
