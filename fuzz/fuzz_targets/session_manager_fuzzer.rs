//! Fuzz target for the security session manager
//!
//! Drives arbitrary operation sequences against a manager and checks that
//! it never panics and never hands out state it should not have.
//!
//! # Invariants
//!
//! - No operation sequence panics
//! - `next_nonce` succeeds iff the peer's SPAN is established
//! - `next_mpan` fails without initialization, class, and keys
//! - Error cases leave the manager usable

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zwave_security::{Entropy, SecurityClass, SecurityManager};

#[derive(Clone)]
struct FuzzEntropy {
    byte: u8,
}

impl Entropy for FuzzEntropy {
    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(self.byte);
    }
}

#[derive(Debug, Arbitrary)]
struct ManagerScenario {
    entropy_byte: u8,
    operations: Vec<Operation>,
}

#[derive(Debug, Arbitrary)]
enum Operation {
    SetKey { class_id: u8, key: Vec<u8> },
    SetTempKeys { node: u16, prk: Vec<u8> },
    DeleteTempKeys { node: u16 },
    AssignClasses { node: u16, class_ids: Vec<u8> },
    AssignMulticast { group: u8, class_id: u8 },
    KeysForPeer { node: u16 },
    GenerateNonce { node: u16 },
    StoreRemoteEi { node: u16, ei: Vec<u8> },
    InitializeSpan { node: u16, sender_ei: Vec<u8>, receiver_ei: Vec<u8> },
    NextNonce { node: u16 },
    DeleteNonce { node: u16 },
    StoreSequenceNumber { node: u16, seq: u8 },
    NextSequenceNumber { node: u16 },
    IsDuplicate { node: u16, seq: u8 },
    InitializeMpan { group: u8 },
    NextMpan { group: u8 },
}

fn class_from(id: u8) -> Option<SecurityClass> {
    SecurityClass::try_from_id(id)
}

fuzz_target!(|scenario: ManagerScenario| {
    let mut manager =
        SecurityManager::with_entropy(FuzzEntropy { byte: scenario.entropy_byte });

    for op in scenario.operations {
        match op {
            Operation::SetKey { class_id, key } => {
                if let Some(class) = class_from(class_id) {
                    let result = manager.set_key(class, &key);
                    assert_eq!(result.is_ok(), key.len() == 16);
                }
            },

            Operation::SetTempKeys { node, prk } => {
                let result = manager.set_temp_keys(node, &prk);
                assert_eq!(result.is_ok(), prk.len() == 16);
            },

            Operation::DeleteTempKeys { node } => manager.delete_temp_keys(node),

            Operation::AssignClasses { node, class_ids } => {
                let classes: Vec<SecurityClass> =
                    class_ids.iter().filter_map(|&id| class_from(id)).collect();
                manager.assign_security_classes(node, &classes);
            },

            Operation::AssignMulticast { group, class_id } => {
                if let Some(class) = class_from(class_id) {
                    manager.assign_security_class_multicast(group, class);
                }
            },

            Operation::KeysForPeer { node } => {
                // Either outcome is fine; the call must not panic
                let _ = manager.keys_for_peer(node);
            },

            Operation::GenerateNonce { node } => {
                let nonce = manager.generate_nonce(node);

                // A pending handshake is not an established SPAN
                assert!(manager.next_nonce(node).is_err());

                // The same state must not be handed out twice
                let again = manager.generate_nonce(node);
                assert_ne!(nonce.receiver_ei, again.receiver_ei);
            },

            Operation::StoreRemoteEi { node, ei } => {
                let result = manager.store_remote_ei(node, &ei);
                assert_eq!(result.is_ok(), ei.len() == 16);
            },

            Operation::InitializeSpan { node, sender_ei, receiver_ei } => {
                let result = manager.initialize_span(node, &sender_ei, &receiver_ei);

                // A successful mix must yield a live SPAN; a failed one
                // must leave any previous state untouched.
                if result.is_ok() {
                    assert!(manager.next_nonce(node).is_ok());
                }
            },

            Operation::NextNonce { node } => {
                let established =
                    manager.span_state(node).is_some_and(|state| state.is_established());
                assert_eq!(manager.next_nonce(node).is_ok(), established);
            },

            Operation::DeleteNonce { node } => {
                manager.delete_nonce(node);
                assert!(manager.next_nonce(node).is_err());
                assert!(manager.span_state(node).is_none());
            },

            Operation::StoreSequenceNumber { node, seq } => {
                manager.store_sequence_number(node, seq);
                assert!(manager.is_duplicate_singlecast(node, seq));
            },

            Operation::NextSequenceNumber { node } => {
                let first = manager.next_sequence_number(node);
                let second = manager.next_sequence_number(node);
                assert_eq!(second, first.wrapping_add(1));
            },

            Operation::IsDuplicate { node, seq } => {
                let _ = manager.is_duplicate_singlecast(node, seq);
            },

            Operation::InitializeMpan { group } => {
                manager.initialize_mpan(group);
            },

            Operation::NextMpan { group } => {
                if let Ok(first) = manager.next_mpan(group) {
                    // Counter must have advanced
                    let second = manager.next_mpan(group);
                    assert_ne!(second, Ok(first));
                }
            },
        }
    }
});
