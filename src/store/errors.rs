use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),
}
