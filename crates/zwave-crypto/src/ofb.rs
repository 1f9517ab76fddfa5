//! AES-128 OFB mode for the legacy S0 payload cipher.
//!
//! OFB generates a keystream independent of the data, so encryption and
//! decryption are the same operation. The input is processed as if
//! zero-padded to a block boundary and the output trimmed back to the input
//! length.

use crate::block::{Aes128, BLOCK_SIZE, BlockCipher, KEY_SIZE};

/// Encrypt with AES-128-OFB. Output length equals input length.
pub fn encrypt_aes128_ofb(input: &[u8], key: &[u8; KEY_SIZE], iv: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let cipher = Aes128::new(key);
    let mut feedback = *iv;
    let mut out = Vec::with_capacity(input.len());

    for chunk in input.chunks(BLOCK_SIZE) {
        cipher.encrypt_block(&mut feedback);
        for (byte, keystream) in chunk.iter().zip(&feedback) {
            out.push(byte ^ keystream);
        }
    }
    out
}

/// Decrypt with AES-128-OFB. Identical to encryption (keystream XOR).
pub fn decrypt_aes128_ofb(input: &[u8], key: &[u8; KEY_SIZE], iv: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    encrypt_aes128_ofb(input, key, iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_from_hex(s: &str) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&hex::decode(s).unwrap());
        out
    }

    #[test]
    fn ofb_sp800_38a_first_block() {
        // SP800-38A F.4.1, segment 1
        let key = block_from_hex("2b7e151628aed2a6abf7158809cf4f3c");
        let iv = block_from_hex("000102030405060708090a0b0c0d0e0f");
        let plaintext = block_from_hex("6bc1bee22e409f96e93d7e117393172a");

        let ciphertext = encrypt_aes128_ofb(&plaintext, &key, &iv);

        assert_eq!(ciphertext, hex::decode("3b3fd92eb72dad20333449f8e83cfb4a").unwrap());
    }

    #[test]
    fn output_length_matches_input_length() {
        let key = [0x01u8; KEY_SIZE];
        let iv = [0x02u8; BLOCK_SIZE];

        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let input = vec![0xABu8; len];
            assert_eq!(encrypt_aes128_ofb(&input, &key, &iv).len(), len);
        }
    }

    #[test]
    fn roundtrip_arbitrary_lengths() {
        let key = [0xC3u8; KEY_SIZE];
        let iv = [0x3Cu8; BLOCK_SIZE];

        for len in [1usize, 7, 16, 23, 48, 129] {
            let input: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ciphertext = encrypt_aes128_ofb(&input, &key, &iv);
            assert_eq!(decrypt_aes128_ofb(&ciphertext, &key, &iv), input);
        }
    }

    #[test]
    fn partial_block_matches_full_block_prefix() {
        // Trimming must not change the keystream for the bytes kept.
        let key = [0x44u8; KEY_SIZE];
        let iv = [0x55u8; BLOCK_SIZE];
        let full = [0x99u8; 2 * BLOCK_SIZE];

        let whole = encrypt_aes128_ofb(&full, &key, &iv);
        let partial = encrypt_aes128_ofb(&full[..20], &key, &iv);

        assert_eq!(partial, whole[..20]);
    }

    #[test]
    fn different_iv_changes_keystream() {
        let key = [0x10u8; KEY_SIZE];
        let input = [0u8; BLOCK_SIZE];

        let a = encrypt_aes128_ofb(&input, &key, &[0x01; BLOCK_SIZE]);
        let b = encrypt_aes128_ofb(&input, &key, &[0x02; BLOCK_SIZE]);

        assert_ne!(a, b);
    }
}
