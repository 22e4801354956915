use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Fatal configuration errors, surfaced to the caller immediately.
///
/// Collaborator failures (provider, reranker) are not in this taxonomy:
/// they are logged and degrade the result set instead of aborting.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Component profile yields no search terms")]
    EmptyProfile,

    #[error("min_confidence must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("max_results must be greater than zero")]
    InvalidLimit,
}
