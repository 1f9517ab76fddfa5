//! Z-Wave Security S2 Session Core
//!
//! Session and nonce management for Security S2 (and the legacy S0 class).
//! The [`SecurityManager`] owns every piece of mutable security state for
//! one controller: network keys per security class, per-peer SPAN nonce
//! generators, per-group MPAN counters, and sequence-number replay
//! tracking. The encapsulation layer above it turns this state into wire
//! frames; nothing in this crate performs I/O.
//!
//! # SPAN lifecycle
//!
//! A SPAN (Singlecast Pairwise Alternating Nonce) is bootstrapped by
//! exchanging 16-byte entropy inputs, one per direction:
//!
//! ```text
//!           generate_nonce                 initialize_span
//!   None ───────────────────► LocalEI ─────────────────────► SPAN
//!     │                                                       ▲  │
//!     └── store_remote_ei ──► RemoteEI ── initialize_span ────┘  │
//!                                                                ▼
//!   None ◄─────────────────────── delete_nonce ───────── next_nonce*
//! ```
//!
//! Once both entropy inputs are mixed, a per-peer CTR-DRBG produces the
//! 13-byte CCM nonces. Re-running `initialize_span` for a peer is a hard
//! session reset: every nonce issued under the previous SPAN becomes
//! invalid.
//!
//! # Security Properties
//!
//! - Nonce freshness: a SPAN never hands out the same nonce twice; the
//!   DRBG rekeys after every draw
//! - Replay rejection: the last accepted peer sequence number is tracked
//!   per peer and compared on every incoming frame
//! - Key separation: each security class carries independently derived
//!   CCM, MPAN, and personalization material; the manager never falls back
//!   to a default key
//! - No ambient state: the manager is an explicit value, so separate
//!   controllers (or tests) never share session state

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod class;
pub mod entropy;
pub mod error;
pub mod keys;
pub mod manager;
pub mod mpan;
pub mod span;

pub use class::SecurityClass;
pub use entropy::{Entropy, OsEntropy};
pub use error::SecurityError;
pub use keys::{NetworkKeys, PeerKeys};
pub use manager::{
    ENTROPY_INPUT_SIZE, GeneratedNonce, MulticastGroupId, NONCE_SIZE, NodeId, SecurityManager,
};
pub use mpan::MpanState;
pub use span::SpanState;
