//! Key derivation chains for Security S2 and the legacy S0 key schedule.
//!
//! Every S2 derivation is a CMAC chain over a fixed domain-separation
//! constant. The constants are protocol-mandated; changing a single byte
//! breaks interoperability with every certified device.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::{BLOCK_SIZE, KEY_SIZE, encrypt_aes128_ecb};
use crate::mac::compute_cmac;

/// CMAC key for deriving the PRK from the ECDH shared secret.
const PRK_CONSTANT: [u8; KEY_SIZE] = [0x33; KEY_SIZE];

/// CMAC key for mixing the exchanged entropy inputs into the nonce PRK.
const NONCE_PRK_CONSTANT: [u8; KEY_SIZE] = [0x26; KEY_SIZE];

/// Domain constant for the permanent network key chain.
const NETWORK_KEY_CONSTANT: [u8; 15] = [0x55; 15];

/// Domain constant for the temporary bootstrap key chain.
const TEMP_KEY_CONSTANT: [u8; 15] = [0x88; 15];

/// Domain constant for the mixed-entropy (MEI) chain.
const ENTROPY_CONSTANT: [u8; 15] = [0x88; 15];

/// Keys derived from a permanent network key for one security class.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NetworkKeySet {
    /// AES-CCM encryption key for singlecast frames.
    pub key_ccm: [u8; KEY_SIZE],
    /// Personalization string for the per-peer SPAN DRBG.
    pub personalization_string: [u8; 32],
    /// Key for the multicast MPAN keystream.
    pub key_mpan: [u8; KEY_SIZE],
}

/// Keys derived from the ECDH PRK for the bootstrap phase.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TempKeySet {
    /// AES-CCM encryption key used until permanent keys are granted.
    pub key_ccm: [u8; KEY_SIZE],
    /// Personalization string for the bootstrap SPAN DRBG.
    pub personalization_string: [u8; 32],
}

/// Legacy S0 working keys expanded from the S0 network key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct S0KeySet {
    /// Key for the S0 CBC-MAC authentication tag.
    pub auth_key: [u8; KEY_SIZE],
    /// Key for the S0 OFB payload cipher.
    pub enc_key: [u8; KEY_SIZE],
}

/// Derive the PRK from the ECDH shared secret and both public keys.
pub fn compute_prk(shared_secret: &[u8], pub_key_a: &[u8], pub_key_b: &[u8]) -> [u8; KEY_SIZE] {
    let mut message =
        Vec::with_capacity(shared_secret.len() + pub_key_a.len() + pub_key_b.len());
    message.extend_from_slice(shared_secret);
    message.extend_from_slice(pub_key_a);
    message.extend_from_slice(pub_key_b);
    compute_cmac(&message, &PRK_CONSTANT)
}

/// Derive the temporary bootstrap keys from the PRK.
pub fn derive_temp_keys(prk: &[u8; KEY_SIZE]) -> TempKeySet {
    let t1 = compute_cmac(&round_message(None, &TEMP_KEY_CONSTANT, 0x01), prk);
    let t2 = compute_cmac(&round_message(Some(&t1), &TEMP_KEY_CONSTANT, 0x02), prk);
    let t3 = compute_cmac(&round_message(Some(&t2), &TEMP_KEY_CONSTANT, 0x03), prk);

    TempKeySet { key_ccm: t1, personalization_string: concat_halves(&t2, &t3) }
}

/// Derive the permanent working keys from a permanent network key.
pub fn derive_network_keys(pnk: &[u8; KEY_SIZE]) -> NetworkKeySet {
    let t1 = compute_cmac(&round_message(None, &NETWORK_KEY_CONSTANT, 0x01), pnk);
    let t2 = compute_cmac(&round_message(Some(&t1), &NETWORK_KEY_CONSTANT, 0x02), pnk);
    let t3 = compute_cmac(&round_message(Some(&t2), &NETWORK_KEY_CONSTANT, 0x03), pnk);
    let t4 = compute_cmac(&round_message(Some(&t3), &NETWORK_KEY_CONSTANT, 0x04), pnk);

    NetworkKeySet {
        key_ccm: t1,
        personalization_string: concat_halves(&t2, &t3),
        key_mpan: t4,
    }
}

/// Mix the exchanged entropy inputs into the nonce PRK.
///
/// `sender_ei` is the entropy input of the node transmitting the
/// encapsulated frame; `receiver_ei` the one from its Nonce Report.
pub fn compute_nonce_prk(
    sender_ei: &[u8; BLOCK_SIZE],
    receiver_ei: &[u8; BLOCK_SIZE],
) -> [u8; KEY_SIZE] {
    let message = concat_halves(sender_ei, receiver_ei);
    compute_cmac(&message, &NONCE_PRK_CONSTANT)
}

/// Expand the nonce PRK into the 32-byte mixed entropy input (MEI) that
/// seeds the per-peer SPAN DRBG.
pub fn derive_mei(nonce_prk: &[u8; KEY_SIZE]) -> [u8; 32] {
    let mut first = Vec::with_capacity(32);
    first.extend_from_slice(&ENTROPY_CONSTANT);
    first.push(0x00);
    first.extend_from_slice(&ENTROPY_CONSTANT);
    first.push(0x01);

    let t1 = compute_cmac(&first, nonce_prk);
    let t2 = compute_cmac(&round_message(Some(&t1), &ENTROPY_CONSTANT, 0x02), nonce_prk);

    concat_halves(&t1, &t2)
}

/// Expand the legacy S0 network key into its authentication and encryption
/// keys.
pub fn derive_s0_keys(network_key: &[u8; KEY_SIZE]) -> S0KeySet {
    S0KeySet {
        auth_key: encrypt_aes128_ecb(&[0x55; BLOCK_SIZE], network_key),
        enc_key: encrypt_aes128_ecb(&[0xAA; BLOCK_SIZE], network_key),
    }
}

/// One round of a CMAC chain: `prev ‖ constant ‖ counter`.
fn round_message(prev: Option<&[u8; KEY_SIZE]>, constant: &[u8; 15], counter: u8) -> Vec<u8> {
    let mut message = Vec::with_capacity(32);
    if let Some(prev) = prev {
        message.extend_from_slice(prev);
    }
    message.extend_from_slice(constant);
    message.push(counter);
    message
}

fn concat_halves(first: &[u8; 16], second: &[u8; 16]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..16].copy_from_slice(first);
    out[16..].copy_from_slice(second);
    out
}
