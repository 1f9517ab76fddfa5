//! Message authentication: CMAC (OMAC1) for S2 and the legacy CBC-MAC for S0.
//!
//! CMAC follows NIST SP800-38B exactly. The S2 key-derivation chains are all
//! built on it, so the subkey rule and padding here must match the published
//! vectors bit for bit.

use crate::block::{Aes128, BLOCK_SIZE, Block, BlockCipher, KEY_SIZE, xor_block};

/// Length of the legacy S0 authentication tag.
pub const MAC_SIZE: usize = 8;

/// Length of a full CMAC tag.
pub const CMAC_SIZE: usize = 16;

/// Rb constant from SP800-38B for the GF(2^128) doubling step.
const RB: u8 = 0x87;

/// Legacy S0 authentication tag.
///
/// AES-128-CBC over `auth_data` with a zero IV; the tag is the first 8 bytes
/// of the last ciphertext block. A short final chunk is implicitly
/// zero-padded by the accumulator.
pub fn compute_mac(auth_data: &[u8], key: &[u8; KEY_SIZE]) -> [u8; MAC_SIZE] {
    let cipher = Aes128::new(key);

    let mut acc: Block = [0; BLOCK_SIZE];
    for chunk in auth_data.chunks(BLOCK_SIZE) {
        for (a, b) in acc.iter_mut().zip(chunk) {
            *a ^= b;
        }
        cipher.encrypt_block(&mut acc);
    }

    let mut mac = [0u8; MAC_SIZE];
    mac.copy_from_slice(&acc[..MAC_SIZE]);
    mac
}

/// AES-128 CMAC (OMAC1) per NIST SP800-38B.
pub fn compute_cmac(message: &[u8], key: &[u8; KEY_SIZE]) -> [u8; CMAC_SIZE] {
    let cipher = Aes128::new(key);

    // Subkeys: L = AES(0^128), K1 = dbl(L), K2 = dbl(K1)
    let mut l: Block = [0; BLOCK_SIZE];
    cipher.encrypt_block(&mut l);
    let k1 = generate_subkey(&l);
    let k2 = generate_subkey(&k1);

    // The last block is complete iff the message is non-empty and
    // block-aligned; only then does K1 apply.
    let complete = !message.is_empty() && message.len() % BLOCK_SIZE == 0;
    let split = if complete {
        message.len() - BLOCK_SIZE
    } else {
        message.len() / BLOCK_SIZE * BLOCK_SIZE
    };
    let (head, tail) = message.split_at(split);

    let mut last: Block = [0; BLOCK_SIZE];
    last[..tail.len()].copy_from_slice(tail);
    if complete {
        xor_block(&mut last, &k1);
    } else {
        last[tail.len()] = 0x80;
        xor_block(&mut last, &k2);
    }

    let mut acc: Block = [0; BLOCK_SIZE];
    for chunk in head.chunks_exact(BLOCK_SIZE) {
        for (a, b) in acc.iter_mut().zip(chunk) {
            *a ^= b;
        }
        cipher.encrypt_block(&mut acc);
    }
    xor_block(&mut acc, &last);
    cipher.encrypt_block(&mut acc);
    acc
}

/// GF(2^128) doubling: left shift by one bit, conditionally XOR Rb into the
/// low byte when the shifted-out bit was set.
fn generate_subkey(block: &Block) -> Block {
    let mut out: Block = [0; BLOCK_SIZE];
    let mut carry = 0u8;
    for i in (0..BLOCK_SIZE).rev() {
        out[i] = (block[i] << 1) | carry;
        carry = block[i] >> 7;
    }
    if carry == 1 {
        out[BLOCK_SIZE - 1] ^= RB;
    }
    out
}
