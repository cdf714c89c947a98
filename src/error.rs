use crate::domain::email::Email;
use thiserror::Error;

/// Errors raised while placing or reading orders.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Order must contain at least one item")]
    EmptyOrder,
    /// Another checkout saved the same customer first. Safe to retry.
    #[error("Concurrent update of customer {email}")]
    Conflict { email: Email },
    #[error("Store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CheckoutError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(Box::new(std::io::Error::other(message.into())))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Failures reported by the payment gateway, passed to callers as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        body: serde_json::Value,
    },
    #[error("Gateway transport error: {0}")]
    Transport(String),
    #[error("Gateway returned an invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
