//! Network key material per security class.

use zeroize::{Zeroize, ZeroizeOnDrop};
use zwave_crypto::{NetworkKeySet, TempKeySet, derive_network_keys};

/// Key material for one security class: the permanent network key and
/// everything derived from it.
///
/// Immutable once derived; granting a new key replaces the whole value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NetworkKeys {
    pnk: [u8; 16],
    derived: NetworkKeySet,
}

impl NetworkKeys {
    /// Derive the working keys from a permanent network key.
    pub fn derive(pnk: [u8; 16]) -> Self {
        let derived = derive_network_keys(&pnk);
        Self { pnk, derived }
    }

    /// The permanent network key this material was derived from.
    pub fn pnk(&self) -> &[u8; 16] {
        &self.pnk
    }

    /// AES-CCM key for singlecast frames.
    pub fn key_ccm(&self) -> &[u8; 16] {
        &self.derived.key_ccm
    }

    /// Key for the multicast MPAN keystream.
    pub fn key_mpan(&self) -> &[u8; 16] {
        &self.derived.key_mpan
    }

    /// Personalization string for the per-peer SPAN DRBG.
    pub fn personalization_string(&self) -> &[u8; 32] {
        &self.derived.personalization_string
    }
}

/// Key material the encapsulation layer should use for one peer: permanent
/// network keys, or temporary bootstrap keys while inclusion is running.
#[derive(Clone, Copy)]
pub enum PeerKeys<'a> {
    /// Permanent keys of the peer's highest granted security class.
    Permanent(&'a NetworkKeys),
    /// Temporary keys derived from the ECDH PRK during bootstrap.
    Temporary(&'a TempKeySet),
}

impl PeerKeys<'_> {
    /// AES-CCM key for frames to this peer.
    pub fn key_ccm(&self) -> &[u8; 16] {
        match self {
            Self::Permanent(keys) => keys.key_ccm(),
            Self::Temporary(keys) => &keys.key_ccm,
        }
    }

    /// Personalization string for this peer's SPAN DRBG.
    pub fn personalization_string(&self) -> &[u8; 32] {
        match self {
            Self::Permanent(keys) => keys.personalization_string(),
            Self::Temporary(keys) => &keys.personalization_string,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let pnk = [0x42u8; 16];

        let a = NetworkKeys::derive(pnk);
        let b = NetworkKeys::derive(pnk);

        assert_eq!(a.key_ccm(), b.key_ccm());
        assert_eq!(a.key_mpan(), b.key_mpan());
        assert_eq!(a.personalization_string(), b.personalization_string());
        assert_eq!(a.pnk(), &pnk);
    }

    #[test]
    fn derived_keys_differ_from_pnk() {
        let pnk = [0x42u8; 16];
        let keys = NetworkKeys::derive(pnk);

        assert_ne!(keys.key_ccm(), &pnk);
        assert_ne!(keys.key_mpan(), &pnk);
    }

    #[test]
    fn peer_keys_expose_both_variants() {
        let network = NetworkKeys::derive([0x01; 16]);
        let temp = zwave_crypto::derive_temp_keys(&[0x02; 16]);

        let permanent = PeerKeys::Permanent(&network);
        let temporary = PeerKeys::Temporary(&temp);

        assert_eq!(permanent.key_ccm(), network.key_ccm());
        assert_eq!(temporary.key_ccm(), &temp.key_ccm);
        assert_ne!(permanent.personalization_string(), temporary.personalization_string());
    }
}
