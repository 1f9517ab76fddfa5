//! AES-128 CTR-DRBG (NIST SP800-90A subset).
//!
//! Fixed to AES-128: 16-byte key, 16-byte counter block, 32-byte seed. No
//! derivation function, no reseed counter, no additional input at generate
//! time; the S2 nonce schedule never uses them.
//!
//! # Security Properties
//!
//! - Determinism: the same seed and personalization produce the same stream
//! - Backtracking resistance: the state is rekeyed after every draw, so a
//!   captured state cannot reproduce bytes that were already returned
//! - Two consecutive `generate` calls never return identical output

use std::marker::PhantomData;

use thiserror::Error;
use zeroize::Zeroize;

use crate::block::{Aes128, BLOCK_SIZE, BlockCipher, KEY_SIZE, increment_block};

/// Seed length: key plus counter block.
pub const SEED_LEN: usize = KEY_SIZE + BLOCK_SIZE;

/// Errors from DRBG instantiation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrbgError {
    /// The personalization string exceeds the seed length.
    #[error("personalization string too long: {actual} bytes, limit {limit}")]
    PersonalizationTooLong {
        /// Length that was provided
        actual: usize,
        /// Maximum accepted length
        limit: usize,
    },
}

/// Deterministic random bit generator in counter mode.
///
/// Generic over the [`BlockCipher`] seam; [`Aes128`] is the default and the
/// only backend the protocol uses.
pub struct CtrDrbg<C: BlockCipher = Aes128> {
    key: [u8; KEY_SIZE],
    v: [u8; BLOCK_SIZE],
    _cipher: PhantomData<C>,
}

impl<C: BlockCipher> CtrDrbg<C> {
    /// Instantiate from 32 bytes of entropy with no personalization string.
    pub fn new(entropy: &[u8; SEED_LEN]) -> Self {
        let mut drbg = Self::zeroed();
        drbg.update(Some(entropy));
        drbg
    }

    /// Instantiate with a personalization string of at most [`SEED_LEN`]
    /// bytes, XORed left-aligned into the entropy input.
    pub fn with_personalization(
        entropy: &[u8; SEED_LEN],
        personalization: &[u8],
    ) -> Result<Self, DrbgError> {
        if personalization.len() > SEED_LEN {
            return Err(DrbgError::PersonalizationTooLong {
                actual: personalization.len(),
                limit: SEED_LEN,
            });
        }

        let mut seed = *entropy;
        for (s, p) in seed.iter_mut().zip(personalization) {
            *s ^= p;
        }

        let mut drbg = Self::zeroed();
        drbg.update(Some(&seed));
        seed.zeroize();
        Ok(drbg)
    }

    /// Draw `len` pseudorandom bytes and rekey the internal state.
    pub fn generate(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.keystream(&mut out);
        out
    }

    /// Draw a fixed-size array of pseudorandom bytes and rekey.
    pub fn generate_array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        self.keystream(&mut out);
        out
    }

    /// Fill `out` from the counter keystream, then rekey for backtracking
    /// resistance.
    fn keystream(&mut self, out: &mut [u8]) {
        let cipher = C::new(&self.key);
        for chunk in out.chunks_mut(BLOCK_SIZE) {
            increment_block(&mut self.v);
            let mut block = self.v;
            cipher.encrypt_block(&mut block);
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        self.update(None);
    }

    /// SP800-90A CTR_DRBG_Update: advance the counter, encrypt two blocks of
    /// keystream, fold in `provided_data`, and split the result into the new
    /// key and counter.
    fn update(&mut self, provided_data: Option<&[u8; SEED_LEN]>) {
        let cipher = C::new(&self.key);

        let mut temp = [0u8; SEED_LEN];
        for chunk in temp.chunks_exact_mut(BLOCK_SIZE) {
            increment_block(&mut self.v);
            let mut block = self.v;
            cipher.encrypt_block(&mut block);
            chunk.copy_from_slice(&block);
        }

        if let Some(data) = provided_data {
            for (t, d) in temp.iter_mut().zip(data) {
                *t ^= d;
            }
        }

        self.key.copy_from_slice(&temp[..KEY_SIZE]);
        self.v.copy_from_slice(&temp[KEY_SIZE..]);
        temp.zeroize();
    }

    fn zeroed() -> Self {
        Self { key: [0; KEY_SIZE], v: [0; BLOCK_SIZE], _cipher: PhantomData }
    }
}

impl<C: BlockCipher> Drop for CtrDrbg<C> {
    fn drop(&mut self) {
        self.key.zeroize();
        self.v.zeroize();
    }
}

impl<C: BlockCipher> std::fmt::Debug for CtrDrbg<C> {
    // Internal state stays out of logs and panic messages
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtrDrbg").finish_non_exhaustive()
    }
}
