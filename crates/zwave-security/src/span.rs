//! Per-peer SPAN handshake state.

use zwave_crypto::CtrDrbg;

use crate::class::SecurityClass;

/// State of the nonce handshake with one peer.
///
/// Exactly one entry exists per peer; the absence of an entry means no
/// handshake has started. The variants are a strict progression - the
/// manager only ever moves an entry towards [`SpanState::Span`] or removes
/// it.
#[derive(Debug)]
pub enum SpanState {
    /// The peer's receiver entropy input arrived before we sent ours.
    RemoteEi {
        /// Entropy input from the peer's Nonce Report.
        receiver_ei: [u8; 16],
    },

    /// We generated and sent our receiver entropy input and are waiting
    /// for the peer's sender entropy input.
    LocalEi {
        /// Entropy input we handed to the encapsulation layer.
        receiver_ei: [u8; 16],
    },

    /// Both entropy inputs are mixed; a live nonce generator exists.
    Span {
        /// Security class whose personalization string seeded the DRBG.
        security_class: SecurityClass,
        /// Per-peer nonce generator. Never shared across peers.
        rng: CtrDrbg,
    },
}

impl SpanState {
    /// Receiver entropy input stored in a pre-SPAN state, if any.
    pub fn receiver_ei(&self) -> Option<&[u8; 16]> {
        match self {
            Self::RemoteEi { receiver_ei } | Self::LocalEi { receiver_ei } => Some(receiver_ei),
            Self::Span { .. } => None,
        }
    }

    /// True once the handshake has produced a live nonce generator.
    pub fn is_established(&self) -> bool {
        matches!(self, Self::Span { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_span_states_expose_entropy_input() {
        let ei = [0xABu8; 16];

        assert_eq!(SpanState::RemoteEi { receiver_ei: ei }.receiver_ei(), Some(&ei));
        assert_eq!(SpanState::LocalEi { receiver_ei: ei }.receiver_ei(), Some(&ei));
    }

    #[test]
    fn established_span_has_no_pending_entropy_input() {
        let state = SpanState::Span {
            security_class: SecurityClass::S2Authenticated,
            rng: CtrDrbg::new(&[0u8; 32]),
        };

        assert!(state.is_established());
        assert_eq!(state.receiver_ei(), None);
    }
}
