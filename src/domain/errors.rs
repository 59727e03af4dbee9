use thiserror::Error;

/// One offending cart line in a failed stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortage {
    pub product_id: i64,
    pub requested: i32,
    pub available: i32,
}

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Brand {0} not found")]
    BrandNotFound(i64),

    /// Requested products are missing or soft-deleted. Carries every missing id.
    #[error("Products not found or unavailable")]
    ProductsUnavailable(Vec<i64>),

    /// Pre-commit stock check failed. Carries the full shortage report.
    #[error("Insufficient stock")]
    InsufficientStock(Vec<Shortage>),

    /// The conditional stock decrement lost a race at commit time; the whole
    /// transaction was rolled back.
    #[error("Stock changed concurrently, order was not committed")]
    ConcurrencyConflict(Vec<Shortage>),

    #[error("No default order or payment statuses are configured")]
    MissingStatusConfiguration,

    #[error("Internal error: {0}")]
    Internal(String),
}
