//! Security classes: the trust tiers a node or multicast group can hold.

/// Trust tier granted to a node or multicast group during inclusion.
///
/// Each class carries independent key material. The derived `Ord` follows
/// trust, lowest to highest: `S0Legacy` < `S2Unauthenticated` <
/// `S2Authenticated` < `S2AccessControl`, so "highest security class"
/// resolution is a plain `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityClass {
    /// Legacy S0, the weakest tier.
    S0Legacy,
    /// S2 without user authentication of the joining node.
    S2Unauthenticated,
    /// S2 with DSK-authenticated inclusion.
    S2Authenticated,
    /// S2 for access-control devices (locks, garage doors).
    S2AccessControl,
}

impl SecurityClass {
    /// Protocol identifier as carried in the S2 KEX commands.
    pub fn id(self) -> u8 {
        match self {
            Self::S2Unauthenticated => 0x00,
            Self::S2Authenticated => 0x01,
            Self::S2AccessControl => 0x02,
            Self::S0Legacy => 0x07,
        }
    }

    /// Parse a protocol identifier. Unknown values are rejected, never
    /// mapped to a default class.
    pub fn try_from_id(id: u8) -> Option<Self> {
        match id {
            0x00 => Some(Self::S2Unauthenticated),
            0x01 => Some(Self::S2Authenticated),
            0x02 => Some(Self::S2AccessControl),
            0x07 => Some(Self::S0Legacy),
            _ => None,
        }
    }
}
