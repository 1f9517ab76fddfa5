//! Error types for session and nonce management.
//!
//! Every precondition violation surfaces as a typed error at the earliest
//! point of detection. The manager never substitutes a default key and
//! never silently no-ops - either would downgrade security guarantees
//! without the caller noticing.

use thiserror::Error;

use crate::class::SecurityClass;
use crate::manager::{MulticastGroupId, NodeId};

/// Errors from security session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// A network key or PRK had the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length that was provided
        actual: usize,
    },

    /// An entropy input had the wrong length.
    #[error("invalid entropy input length: expected {expected} bytes, got {actual}")]
    InvalidEntropyInput {
        /// Required entropy input length
        expected: usize,
        /// Length that was provided
        actual: usize,
    },

    /// No security class has been assigned to the node.
    #[error("no security class assigned to node {node_id}")]
    NoSecurityClass {
        /// Node the lookup was for
        node_id: NodeId,
    },

    /// No security class has been assigned to the multicast group.
    #[error("no security class assigned to multicast group {group_id}")]
    NoMulticastClass {
        /// Group the lookup was for
        group_id: MulticastGroupId,
    },

    /// The network key for a granted security class was never set.
    #[error("network key for {class:?} has not been set")]
    KeyNotSet {
        /// Class whose key is missing
        class: SecurityClass,
    },

    /// A nonce was requested before the SPAN handshake completed.
    #[error("SPAN for node {node_id} has not been established")]
    NoSpan {
        /// Peer the nonce was requested for
        node_id: NodeId,
    },

    /// A multicast keystream was requested before `initialize_mpan`.
    #[error("MPAN for group {group_id} has not been initialized")]
    NoMpan {
        /// Group the keystream was requested for
        group_id: MulticastGroupId,
    },
}

impl SecurityError {
    /// Returns true if the caller can recover by re-running a handshake or
    /// key exchange.
    ///
    /// Length violations are never recoverable - they indicate a broken
    /// caller, not missing protocol state.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidKeyLength { .. } | Self::InvalidEntropyInput { .. } => false,

            // Missing state: a new nonce exchange or key grant repairs these
            Self::NoSecurityClass { .. }
            | Self::NoMulticastClass { .. }
            | Self::KeyNotSet { .. }
            | Self::NoSpan { .. }
            | Self::NoMpan { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_violations_are_fatal() {
        assert!(!SecurityError::InvalidKeyLength { expected: 16, actual: 13 }.is_recoverable());
        assert!(!SecurityError::InvalidEntropyInput { expected: 16, actual: 0 }.is_recoverable());
    }

    #[test]
    fn missing_state_is_recoverable() {
        assert!(SecurityError::NoSpan { node_id: 4 }.is_recoverable());
        assert!(SecurityError::NoMpan { group_id: 1 }.is_recoverable());
        assert!(
            SecurityError::KeyNotSet { class: SecurityClass::S2Authenticated }.is_recoverable()
        );
    }

    #[test]
    fn error_display() {
        let err = SecurityError::NoSpan { node_id: 12 };
        assert_eq!(err.to_string(), "SPAN for node 12 has not been established");

        let err = SecurityError::InvalidKeyLength { expected: 16, actual: 7 };
        assert_eq!(err.to_string(), "invalid key length: expected 16 bytes, got 7");
    }
}
