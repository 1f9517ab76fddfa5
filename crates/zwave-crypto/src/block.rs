//! AES-128 single-block primitive behind a narrow backend seam.
//!
//! The MAC, KDF, and DRBG layers are written against [`BlockCipher`] only.
//! Swapping crypto libraries means reimplementing this trait, nothing else.

use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};

/// AES-128 block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// A single 16-byte cipher block.
pub type Block = [u8; BLOCK_SIZE];

/// Single-block encryption seam.
///
/// Only encryption is required: every mode used by the S2 core (CBC-MAC,
/// CMAC, OFB, CTR) runs the forward cipher in both directions.
pub trait BlockCipher: Sized {
    /// Expand a 16-byte key into a cipher instance.
    fn new(key: &[u8; KEY_SIZE]) -> Self;

    /// Encrypt one 16-byte block in place.
    fn encrypt_block(&self, block: &mut Block);
}

/// AES-128 backend on the RustCrypto `aes` crate.
#[derive(Clone)]
pub struct Aes128 {
    cipher: aes::Aes128,
}

impl BlockCipher for Aes128 {
    fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self { cipher: aes::Aes128::new(GenericArray::from_slice(key)) }
    }

    fn encrypt_block(&self, block: &mut Block) {
        let mut generic_block = GenericArray::clone_from_slice(block);
        self.cipher.encrypt_block(&mut generic_block);
        block.copy_from_slice(&generic_block);
    }
}

/// Encrypt a single block with AES-128 ECB. No padding, no chaining.
pub fn encrypt_aes128_ecb(block: &Block, key: &[u8; KEY_SIZE]) -> Block {
    let cipher = Aes128::new(key);
    let mut out = *block;
    cipher.encrypt_block(&mut out);
    out
}

/// XOR `other` into `block`.
#[inline]
pub(crate) fn xor_block(block: &mut Block, other: &Block) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

/// Increment a block as a big-endian counter, wrapping at 2^128.
pub fn increment_block(block: &mut Block) {
    for byte in block.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}
