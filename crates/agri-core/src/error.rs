use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriError {
    /// The search or completion provider failed or answered with something unusable.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),

    /// A stored document is missing a field the response shape needs.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

pub type AgriResult<T> = Result<T, AgriError>;
