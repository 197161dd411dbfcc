use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("User is not authenticated")]
    Unauthorized,
    #[error("User is not authorized")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("{0}")]
    Payment(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
