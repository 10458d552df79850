//! Error types for pledge checkout operations

/// Errors that can occur while pricing or running a checkout
#[derive(Debug, thiserror::Error)]
pub enum PledgeError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    #[error("Malformed amount: {0:?}")]
    MalformedAmount(String),

    #[error("Negative amount: {0:?}")]
    NegativeAmount(String),

    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("Amount overflow")]
    Overflow,

    #[error("Shipping rules unavailable: {0}")]
    ShippingRulesUnavailable(String),

    #[error("Checkout session closed")]
    SessionClosed,
}

/// Result type alias for pledge operations
pub type PledgeResult<T> = Result<T, PledgeError>;
