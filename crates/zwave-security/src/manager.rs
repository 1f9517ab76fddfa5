//! The security session manager.
//!
//! One [`SecurityManager`] per controller. It owns all mutable Security
//! S2 state: network keys per class, temporary bootstrap keys, the SPAN
//! table, sequence-number replay tracking, and MPAN counters for both
//! directions of multicast.
//!
//! All operations are synchronous and CPU-bound. Rust's `&mut self`
//! receivers enforce the serialization the protocol requires: two logical
//! flows can never interleave `generate_nonce` / `initialize_span` /
//! `next_nonce` for the same peer. There is no internal timeout - a
//! stalled handshake is torn down by the caller via [`SecurityManager::delete_nonce`].

use std::collections::HashMap;

use zeroize::Zeroize;
use zwave_crypto::{
    CtrDrbg, KEY_SIZE, SEED_LEN, TempKeySet, compute_nonce_prk, derive_mei, derive_temp_keys,
    encrypt_aes128_ecb, increment_block,
};

use crate::class::SecurityClass;
use crate::entropy::{Entropy, OsEntropy};
use crate::error::SecurityError;
use crate::keys::{NetworkKeys, PeerKeys};
use crate::mpan::MpanState;
use crate::span::SpanState;

/// Node identifier on the mesh (16-bit to cover Long Range).
pub type NodeId = u16;

/// Multicast group identifier.
pub type MulticastGroupId = u8;

/// Length of an AES-CCM nonce handed to the encapsulation layer.
pub const NONCE_SIZE: usize = 13;

/// Length of an entropy input exchanged via Nonce Get / Nonce Report.
pub const ENTROPY_INPUT_SIZE: usize = 16;

/// Payload for an outgoing Nonce Report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedNonce {
    /// Sequence number to place in the report.
    pub own_sequence_number: u8,
    /// Our fresh receiver entropy input.
    pub receiver_ei: [u8; ENTROPY_INPUT_SIZE],
}

/// Session state for one controller.
///
/// Peers and multicast groups are fully independent: every map below is
/// keyed by node id, group id, or both, and no entry is ever shared.
pub struct SecurityManager<E: Entropy = OsEntropy> {
    entropy: E,
    /// Master DRBG: source of entropy inputs, MPAN seeds, and nothing else.
    rng: CtrDrbg,
    network_keys: HashMap<SecurityClass, NetworkKeys>,
    temp_keys: HashMap<NodeId, TempKeySet>,
    node_classes: HashMap<NodeId, Vec<SecurityClass>>,
    group_classes: HashMap<MulticastGroupId, SecurityClass>,
    span_table: HashMap<NodeId, SpanState>,
    own_sequence_numbers: HashMap<NodeId, u8>,
    peer_sequence_numbers: HashMap<NodeId, u8>,
    /// Our outgoing MPAN counter per group.
    mpan_states: HashMap<MulticastGroupId, [u8; 16]>,
    /// MPAN streams we follow as a receiver.
    peer_mpans: HashMap<(NodeId, MulticastGroupId), MpanState>,
}

impl SecurityManager<OsEntropy> {
    /// Create a manager backed by the operating system RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy::new())
    }
}

impl Default for SecurityManager<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entropy> SecurityManager<E> {
    /// Create a manager with an explicit entropy source.
    ///
    /// The master DRBG is seeded once from `entropy`; afterwards the
    /// source is only consulted for sequence-number starting points.
    pub fn with_entropy(entropy: E) -> Self {
        let mut seed = [0u8; SEED_LEN];
        entropy.random_bytes(&mut seed);
        let rng = CtrDrbg::new(&seed);
        seed.zeroize();

        Self {
            entropy,
            rng,
            network_keys: HashMap::new(),
            temp_keys: HashMap::new(),
            node_classes: HashMap::new(),
            group_classes: HashMap::new(),
            span_table: HashMap::new(),
            own_sequence_numbers: HashMap::new(),
            peer_sequence_numbers: HashMap::new(),
            mpan_states: HashMap::new(),
            peer_mpans: HashMap::new(),
        }
    }

    // --- Key management -------------------------------------------------

    /// Install the permanent network key for a security class and derive
    /// its working keys.
    pub fn set_key(&mut self, class: SecurityClass, key: &[u8]) -> Result<(), SecurityError> {
        let pnk: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| SecurityError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() })?;

        tracing::debug!(class = ?class, "installing network key");
        self.network_keys.insert(class, NetworkKeys::derive(pnk));
        Ok(())
    }

    /// Derive and store temporary bootstrap keys for a peer from the ECDH
    /// PRK. Consulted by [`Self::keys_for_peer`] until deleted.
    pub fn set_temp_keys(&mut self, peer: NodeId, prk: &[u8]) -> Result<(), SecurityError> {
        let prk: [u8; KEY_SIZE] = prk
            .try_into()
            .map_err(|_| SecurityError::InvalidKeyLength { expected: KEY_SIZE, actual: prk.len() })?;

        self.temp_keys.insert(peer, derive_temp_keys(&prk));
        Ok(())
    }

    /// Drop a peer's temporary bootstrap keys (end of inclusion).
    pub fn delete_temp_keys(&mut self, peer: NodeId) {
        self.temp_keys.remove(&peer);
    }

    /// Assign the granted security classes for a node. Overwrites any
    /// prior assignment.
    pub fn assign_security_classes(&mut self, node_id: NodeId, classes: &[SecurityClass]) {
        self.node_classes.insert(node_id, classes.to_vec());
    }

    /// Assign the security class for a multicast group. Overwrites any
    /// prior assignment.
    pub fn assign_security_class_multicast(
        &mut self,
        group_id: MulticastGroupId,
        class: SecurityClass,
    ) {
        self.group_classes.insert(group_id, class);
    }

    /// The highest-trust security class granted to a node, if any.
    pub fn highest_security_class(&self, node_id: NodeId) -> Option<SecurityClass> {
        self.node_classes.get(&node_id).and_then(|classes| classes.iter().copied().max())
    }

    /// Working keys for a security class.
    pub fn keys_for_class(&self, class: SecurityClass) -> Result<&NetworkKeys, SecurityError> {
        self.network_keys.get(&class).ok_or(SecurityError::KeyNotSet { class })
    }

    /// Key material to use for a peer: temporary bootstrap keys if
    /// present, otherwise the keys of the peer's highest granted class.
    pub fn keys_for_peer(&self, node_id: NodeId) -> Result<PeerKeys<'_>, SecurityError> {
        if let Some(temp) = self.temp_keys.get(&node_id) {
            return Ok(PeerKeys::Temporary(temp));
        }

        let class = self
            .highest_security_class(node_id)
            .ok_or(SecurityError::NoSecurityClass { node_id })?;
        Ok(PeerKeys::Permanent(self.keys_for_class(class)?))
    }

    // --- SPAN lifecycle -------------------------------------------------

    /// Generate a fresh receiver entropy input and sequence number for an
    /// outgoing Nonce Report.
    ///
    /// Replaces any existing handshake state for `peer` with
    /// [`SpanState::LocalEi`] and commits a fresh own sequence number.
    pub fn generate_nonce(&mut self, peer: NodeId) -> GeneratedNonce {
        let receiver_ei = self.rng.generate_array::<ENTROPY_INPUT_SIZE>();
        let own_sequence_number = self.random_sequence_number();

        self.own_sequence_numbers.insert(peer, own_sequence_number);
        self.span_table.insert(peer, SpanState::LocalEi { receiver_ei });

        GeneratedNonce { own_sequence_number, receiver_ei }
    }

    /// Record a receiver entropy input that arrived from the peer before
    /// we sent ours (the [`SpanState::RemoteEi`] path).
    pub fn store_remote_ei(&mut self, peer: NodeId, receiver_ei: &[u8]) -> Result<(), SecurityError> {
        let receiver_ei = parse_entropy_input(receiver_ei)?;
        self.span_table.insert(peer, SpanState::RemoteEi { receiver_ei });
        Ok(())
    }

    /// Draw a sender entropy input without touching the SPAN table.
    ///
    /// Used to complete the [`SpanState::RemoteEi`] path: the peer's
    /// stored entropy input keeps the receiver position and our fresh one
    /// takes the sender position in
    /// [`initialize_span`](Self::initialize_span), exactly as in the
    /// [`SpanState::LocalEi`] path with the roles exchanged.
    pub fn fresh_entropy_input(&mut self) -> [u8; ENTROPY_INPUT_SIZE] {
        self.rng.generate_array::<ENTROPY_INPUT_SIZE>()
    }

    /// Mix both entropy inputs and establish the SPAN for a peer.
    ///
    /// `sender_ei` belongs to the node that transmits the encapsulated
    /// frame, `receiver_ei` to the node that issued the Nonce Report.
    /// Unconditionally replaces any existing entry: a second call is a
    /// hard session reset and invalidates every nonce issued before it.
    pub fn initialize_span(
        &mut self,
        peer: NodeId,
        sender_ei: &[u8],
        receiver_ei: &[u8],
    ) -> Result<(), SecurityError> {
        let sender_ei = parse_entropy_input(sender_ei)?;
        let receiver_ei = parse_entropy_input(receiver_ei)?;

        let class = self
            .highest_security_class(peer)
            .ok_or(SecurityError::NoSecurityClass { node_id: peer })?;
        let personalization = *self.keys_for_class(class)?.personalization_string();

        let nonce_prk = compute_nonce_prk(&sender_ei, &receiver_ei);
        let mei = derive_mei(&nonce_prk);

        let Ok(rng) = CtrDrbg::with_personalization(&mei, &personalization) else {
            unreachable!("a 32-byte personalization string is within the DRBG seed length");
        };

        if self.span_table.contains_key(&peer) {
            tracing::debug!(node_id = peer, "replacing SPAN state; prior nonces are invalid");
        }
        self.span_table.insert(peer, SpanState::Span { security_class: class, rng });
        Ok(())
    }

    /// Draw the next 13-byte CCM nonce for a peer.
    ///
    /// Every call advances the SPAN generator; a nonce is never handed
    /// out twice for the lifetime of the SPAN.
    pub fn next_nonce(&mut self, peer: NodeId) -> Result<[u8; NONCE_SIZE], SecurityError> {
        match self.span_table.get_mut(&peer) {
            Some(SpanState::Span { rng, .. }) => {
                let bytes = rng.generate_array::<ENTROPY_INPUT_SIZE>();
                let mut nonce = [0u8; NONCE_SIZE];
                nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
                Ok(nonce)
            },
            _ => Err(SecurityError::NoSpan { node_id: peer }),
        }
    }

    /// Tear down the SPAN and forget the peer's replay sequence number.
    ///
    /// Our own sequence number for the peer is retained so a later
    /// handshake does not resend a number the peer already accepted.
    pub fn delete_nonce(&mut self, peer: NodeId) {
        tracing::debug!(node_id = peer, "deleting SPAN state");
        self.span_table.remove(&peer);
        self.peer_sequence_numbers.remove(&peer);
    }

    /// Current handshake state for a peer, if any.
    pub fn span_state(&self, peer: NodeId) -> Option<&SpanState> {
        self.span_table.get(&peer)
    }

    // --- Replay protection ----------------------------------------------

    /// True iff `sequence_number` equals the last accepted number from
    /// this peer. Singlecast S2 is strictly request/response, so a single
    /// remembered value suffices - there is no sliding window.
    pub fn is_duplicate_singlecast(&self, peer: NodeId, sequence_number: u8) -> bool {
        self.peer_sequence_numbers.get(&peer) == Some(&sequence_number)
    }

    /// Commit an accepted peer sequence number. Last value wins.
    pub fn store_sequence_number(&mut self, peer: NodeId, sequence_number: u8) {
        self.peer_sequence_numbers.insert(peer, sequence_number);
    }

    /// Next own sequence number for a peer: random on first use so a
    /// restart reveals no pattern, then incrementing mod 256.
    pub fn next_sequence_number(&mut self, peer: NodeId) -> u8 {
        let next = match self.own_sequence_numbers.get(&peer) {
            Some(&current) => current.wrapping_add(1),
            None => self.random_sequence_number(),
        };
        self.own_sequence_numbers.insert(peer, next);
        next
    }

    // --- Multicast (MPAN) -----------------------------------------------

    /// Seed the outgoing MPAN counter for a multicast group from the
    /// master DRBG.
    pub fn initialize_mpan(&mut self, group_id: MulticastGroupId) {
        let state = self.rng.generate_array::<16>();
        self.mpan_states.insert(group_id, state);
    }

    /// Next 16-byte MPAN keystream block for an outgoing multicast frame.
    ///
    /// Requires a prior [`initialize_mpan`](Self::initialize_mpan) and an
    /// assigned, keyed security class for the group. The counter advances
    /// after every draw.
    pub fn next_mpan(&mut self, group_id: MulticastGroupId) -> Result<[u8; 16], SecurityError> {
        let state =
            *self.mpan_states.get(&group_id).ok_or(SecurityError::NoMpan { group_id })?;
        let class = *self
            .group_classes
            .get(&group_id)
            .ok_or(SecurityError::NoMulticastClass { group_id })?;
        let key_mpan = *self.keys_for_class(class)?.key_mpan();

        // Derive from a copy, then store the incremented successor; the
        // read state is never aliased by the increment.
        let ciphertext = encrypt_aes128_ecb(&state, &key_mpan);
        let mut next = state;
        increment_block(&mut next);
        self.mpan_states.insert(group_id, next);

        Ok(ciphertext)
    }

    /// Record the MPAN state of a stream received from a peer.
    pub fn store_peer_mpan(
        &mut self,
        peer: NodeId,
        group_id: MulticastGroupId,
        state: MpanState,
    ) {
        self.peer_mpans.insert((peer, group_id), state);
    }

    /// Tracked MPAN state for a `(peer, group)` stream, if any.
    pub fn peer_mpan(&self, peer: NodeId, group_id: MulticastGroupId) -> Option<&MpanState> {
        self.peer_mpans.get(&(peer, group_id))
    }

    /// Forget every tracked peer stream for a group (group rekeyed or
    /// dissolved).
    pub fn delete_peer_mpan_for_group(&mut self, group_id: MulticastGroupId) {
        self.peer_mpans.retain(|(_, group), _| *group != group_id);
    }

    fn random_sequence_number(&self) -> u8 {
        let mut byte = [0u8; 1];
        self.entropy.random_bytes(&mut byte);
        byte[0]
    }
}

fn parse_entropy_input(ei: &[u8]) -> Result<[u8; ENTROPY_INPUT_SIZE], SecurityError> {
    ei.try_into().map_err(|_| SecurityError::InvalidEntropyInput {
        expected: ENTROPY_INPUT_SIZE,
        actual: ei.len(),
    })
}
