//! Tracking state for multicast streams received from peers.

/// State of a multicast (MPAN) stream we follow as a receiver.
///
/// Keyed by `(peer, group)` in the manager. Our own outgoing group
/// counters live separately; this type only tracks what peers send us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpanState {
    /// We lost synchronization with the group and must request a fresh
    /// MPAN before the next multicast frame can be authenticated.
    Outdated,

    /// Synchronized inner state for the group's keystream.
    Set {
        /// Current 16-byte inner MPAN state.
        inner: [u8; 16],
    },
}

impl MpanState {
    /// True if the stream needs a fresh MPAN from the peer.
    pub fn is_outdated(&self) -> bool {
        matches!(self, Self::Outdated)
    }
}
