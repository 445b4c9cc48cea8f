//! Error types for the message log
//!
//! `RegistryError` is what an [`OrderRegistry`](crate::OrderRegistry)
//! implementation reports back; `MessageLogError` unifies it with the
//! parsing and configuration failures of this crate.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Registry Errors
// ----------------------------------------------------------------------------

/// Failures reported by the external order registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Order registry unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Order registry rejected order {order_id}: {reason}")]
    Rejected { order_id: String, reason: String },

    #[error("Order registry internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn rejected(order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            order_id: order_id.into(),
            reason: reason.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Message Log Errors
// ----------------------------------------------------------------------------

/// Core error type for message ingestion
#[derive(Debug, Error)]
pub enum MessageLogError {
    #[error("Order registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MessageLogError {
    /// Whether the failure came from the order registry
    pub fn is_registry_error(&self) -> bool {
        matches!(self, Self::Registry(_))
    }
}

pub type Result<T> = core::result::Result<T, MessageLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_converts() {
        let err: MessageLogError = RegistryError::unavailable("relay offline").into();
        assert!(err.is_registry_error());
        assert_eq!(
            err.to_string(),
            "Order registry error: Order registry unavailable: relay offline"
        );
    }

    #[test]
    fn test_rejected_display() {
        let err = RegistryError::rejected("o1", "unknown status");
        assert_eq!(
            err.to_string(),
            "Order registry rejected order o1: unknown status"
        );
    }
}
