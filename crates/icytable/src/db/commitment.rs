//! Commitment root: a digest that changes exactly when the logical
//! contents of the commitment store change.

use crate::db::store::CommitmentStore;
use sha2::{Digest, Sha256};

/// SHA-256 over every commitment entry in key order.
///
/// Each entry contributes `len(key) ‖ key ‖ len(value) ‖ value` with
/// lengths as big-endian `u64`, so entry boundaries are unambiguous.
#[must_use]
pub fn commitment_root(store: &CommitmentStore) -> [u8; 32] {
    let mut hasher = Sha256::new();

    for (key, value) in store.entries() {
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(&key);
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(&value);
    }

    hasher.finalize().into()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MAX_KEY_BYTES, MAX_VALUE_BYTES,
        db::store::{RawKey, RawValue},
        test_support::test_memory,
    };

    #[test]
    fn entry_boundaries_change_the_root() {
        let mut joined = CommitmentStore::init(test_memory(0));
        let mut split = CommitmentStore::init(test_memory(0));

        joined.apply_set(raw_key(b"ab"), raw_value(b"c"));
        split.apply_set(raw_key(b"a"), raw_value(b"bc"));

        assert_ne!(commitment_root(&joined), commitment_root(&split));
    }

    #[test]
    fn empty_store_has_sha256_of_nothing() {
        let store = CommitmentStore::init(test_memory(0));

        let expected: [u8; 32] = Sha256::digest(b"").into();

        assert_eq!(commitment_root(&store), expected);
    }

    fn raw_key(bytes: &[u8]) -> RawKey {
        RawKey::try_new(bytes.to_vec(), MAX_KEY_BYTES).unwrap()
    }

    fn raw_value(bytes: &[u8]) -> RawValue {
        RawValue::try_new(bytes.to_vec(), MAX_VALUE_BYTES).unwrap()
    }
}
