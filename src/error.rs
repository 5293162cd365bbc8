//! Error types for the withdrawal flow

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the withdrawal flow
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Validation errors (recoverable, user corrects input)
    #[error("Invalid withdrawal amount")]
    InvalidAmount,

    #[error("Amount exceeds available balance: {available} {label}")]
    ExceedsBalance { available: String, label: String },

    #[error("No payout destination linked")]
    NoDestination,

    // Flow guard errors
    #[error("A withdrawal request is already in flight")]
    SubmissionInFlight,

    #[error("Not authenticated: no session token available")]
    NotAuthenticated,

    #[error("Operation not supported for the {0} deployment variant")]
    UnsupportedVariant(String),

    // Network errors (recoverable, user may retry)
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    // Server-reported business-rule failure, message surfaced verbatim
    #[error("Server rejected request: {0}")]
    ServerRejection(String),

    // Serialization errors
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // Token storage errors
    #[error("Token storage error: {0}")]
    Storage(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is a client-side validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount | Error::ExceedsBalance { .. } | Error::NoDestination
        )
    }

    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Timeout(_))
    }

    /// User-facing message for the notification channel.
    ///
    /// Validation and server-rejection errors carry their own wording; any
    /// other submission failure collapses to a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidAmount => "Please enter a valid amount.".to_string(),
            Error::ExceedsBalance { available, label } => format!(
                "You cannot withdraw more than your available balance ({} {}).",
                available, label
            ),
            Error::NoDestination => "No bank account linked.".to_string(),
            Error::ServerRejection(message) => message.clone(),
            _ => "Something went wrong with withdrawal.".to_string(),
        }
    }
}

// Conversion from reqwest errors. The gateway maps timeouts itself so the
// configured budget ends up in the error; this fallback only classifies.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Http(e.to_string())
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::InvalidAmount.is_validation());
        assert!(Error::NoDestination.is_validation());
        assert!(!Error::Http("down".into()).is_validation());
        assert!(Error::Http("down".into()).is_retryable());
        assert!(!Error::ServerRejection("nope".into()).is_retryable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::InvalidAmount.user_message(),
            "Please enter a valid amount."
        );
        let over = Error::ExceedsBalance {
            available: "50".into(),
            label: "USD".into(),
        };
        assert_eq!(
            over.user_message(),
            "You cannot withdraw more than your available balance (50 USD)."
        );
        assert_eq!(
            Error::ServerRejection("Daily limit reached".into()).user_message(),
            "Daily limit reached"
        );
        assert_eq!(
            Error::Timeout(10000).user_message(),
            "Something went wrong with withdrawal."
        );
    }
}
