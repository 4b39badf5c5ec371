//! Unified error system for the ballot workspace
//!
//! One error enum covers the ledger's abort reasons and the client service's
//! own failures. Errors are serializable because ledger aborts cross the node
//! boundary and reach the client unchanged.

use serde::{Deserialize, Serialize};

/// Unified error type for all ballot operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum VotingError {
    /// Caller lacks the required role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// What the caller was not allowed to do
        message: String,
    },

    /// Malformed input such as empty text, oversized text or a null address
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Which input was rejected
        message: String,
    },

    /// Operation not valid in the current lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the conflicting state
        message: String,
    },

    /// Referenced proposal does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// Duplicate action, e.g. a second vote
    #[error("Already done: {message}")]
    AlreadyDone {
        /// The action that was repeated
        message: String,
    },

    /// Action would break a permanent guarantee
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// The guarantee that would be broken
        message: String,
    },

    /// Client service used before a wallet was bound
    #[error("Not connected: {message}")]
    NotConnected {
        /// Operation that required a connection
        message: String,
    },

    /// Wallet is on the wrong network and switching was refused
    #[error("Network mismatch: {message}")]
    NetworkMismatch {
        /// Details of the refused switch
        message: String,
    },

    /// Decryption oracle could not reveal a tally
    #[error("Decryption unavailable: {message}")]
    DecryptionUnavailable {
        /// Oracle failure description
        message: String,
    },

    /// Wallet refused or failed an account or signer request
    #[error("Wallet error: {message}")]
    Wallet {
        /// Wallet failure description
        message: String,
    },

    /// Signature or key material failure
    #[error("Crypto error: {message}")]
    Crypto {
        /// Cryptographic failure description
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serialization failure description
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Configuration problem description
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Internal failure description
        message: String,
    },
}

impl VotingError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an already-done error
    pub fn already_done(message: impl Into<String>) -> Self {
        Self::AlreadyDone {
            message: message.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a not connected error
    pub fn not_connected(message: impl Into<String>) -> Self {
        Self::NotConnected {
            message: message.into(),
        }
    }

    /// Create a network mismatch error
    pub fn network_mismatch(message: impl Into<String>) -> Self {
        Self::NetworkMismatch {
            message: message.into(),
        }
    }

    /// Create a decryption unavailable error
    pub fn decryption_unavailable(message: impl Into<String>) -> Self {
        Self::DecryptionUnavailable {
            message: message.into(),
        }
    }

    /// Create a wallet error
    pub fn wallet(message: impl Into<String>) -> Self {
        Self::Wallet {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable kind label, used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::InvalidState { .. } => "invalid_state",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyDone { .. } => "already_done",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::NotConnected { .. } => "not_connected",
            Self::NetworkMismatch { .. } => "network_mismatch",
            Self::DecryptionUnavailable { .. } => "decryption_unavailable",
            Self::Wallet { .. } => "wallet",
            Self::Crypto { .. } => "crypto",
            Self::Serialization { .. } => "serialization",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Standard Result type for ballot operations
pub type Result<T> = std::result::Result<T, VotingError>;

impl From<bincode::Error> for VotingError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for VotingError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::configuration(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = VotingError::unauthorized("only admin can perform this action");
        assert!(matches!(err, VotingError::Unauthorized { .. }));
        assert_eq!(
            err.to_string(),
            "Unauthorized: only admin can perform this action"
        );
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn test_error_survives_serialization() {
        let err = VotingError::invariant_violation("cannot revoke admin");
        let bytes = bincode::serialize(&err).unwrap();
        let back: VotingError = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_io_not_found_is_configuration() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing ballot.toml");
        assert!(matches!(
            VotingError::from(io_err),
            VotingError::Configuration { .. }
        ));
    }
}
