//! Z-Wave Security Cryptographic Primitives
//!
//! Cryptographic building blocks for the Security S2 (and legacy S0) layers.
//! Pure functions with deterministic outputs. Callers provide entropy, so
//! every operation here is reproducible in tests.
//!
//! # Key Lifecycle
//!
//! All S2 key material descends from two roots: the ECDH shared secret
//! agreed during inclusion, and the permanent network key granted per
//! security class. Both are expanded through fixed CMAC chains whose
//! constants are mandated by the protocol and must match bit for bit.
//!
//! ```text
//! ECDH Shared Secret              Permanent Network Key (per class)
//!        │                                  │
//!        ▼ CMAC chain                       ▼ CMAC chain
//! Temporary bootstrap keys        key_ccm ‖ key_mpan ‖ personalization
//!                                           │
//! Sender EI ‖ Receiver EI                   │
//!        ▼ CMAC                             ▼
//!    Nonce PRK ──► MEI ──► CTR-DRBG (per peer) ──► 13-byte CCM nonces
//! ```
//!
//! The CTR-DRBG rekeys itself after every draw, so compromise of its state
//! never reveals nonces that were already handed out.
//!
//! # Backend
//!
//! AES-128 single-block encryption sits behind the [`BlockCipher`] seam;
//! the MAC, KDF, and DRBG layers never touch a crypto library directly.
//! [`Aes128`] is the shipped backend on the RustCrypto `aes` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod block;
pub mod drbg;
pub mod kdf;
pub mod mac;
pub mod ofb;

pub use block::{Aes128, Block, BlockCipher, BLOCK_SIZE, KEY_SIZE, encrypt_aes128_ecb, increment_block};
pub use drbg::{CtrDrbg, DrbgError, SEED_LEN};
pub use kdf::{
    NetworkKeySet, S0KeySet, TempKeySet, compute_nonce_prk, compute_prk, derive_mei,
    derive_network_keys, derive_s0_keys, derive_temp_keys,
};
pub use mac::{CMAC_SIZE, MAC_SIZE, compute_cmac, compute_mac};
pub use ofb::{decrypt_aes128_ofb, encrypt_aes128_ofb};
