//! Module: store::range
//! Responsibility: byte-level range helpers shared by every iterator.
//! Boundary: the key codec produces bytes; this module only reasons about
//! lexicographic byte order.

use crate::db::store::RawKey;
use std::ops::Bound;

/// Smallest byte string strictly greater than every string prefixed by `prefix`.
///
/// Returns `None` when no such string exists (empty prefix or all `0xFF`),
/// in which case the range is unbounded above.
#[must_use]
pub(crate) fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();

    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }

    None
}

/// Half-open bounds covering exactly the keys that start with `prefix`.
#[must_use]
pub(crate) fn prefix_bounds(prefix: &[u8]) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
    let upper = prefix_end(prefix).map_or(Bound::Unbounded, Bound::Excluded);

    (Bound::Included(prefix.to_vec()), upper)
}

/// Whether raw bounds describe an empty traversal envelope.
#[must_use]
pub(crate) fn envelope_is_empty(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    // Unbounded envelopes are never empty by construction.
    let (Some(lower_key), Some(upper_key)) = (bound_key_ref(lower), bound_key_ref(upper)) else {
        return false;
    };

    if lower_key < upper_key {
        return false;
    }
    if lower_key > upper_key {
        return true;
    }

    !matches!(lower, Bound::Included(_)) || !matches!(upper, Bound::Included(_))
}

/// Lift a byte bound into a raw store-key bound.
pub(crate) fn raw_bound(bound: &Bound<Vec<u8>>) -> Bound<RawKey> {
    match bound {
        Bound::Unbounded => Bound::Unbounded,
        Bound::Included(bytes) => Bound::Included(RawKey::bound(bytes.clone())),
        Bound::Excluded(bytes) => Bound::Excluded(RawKey::bound(bytes.clone())),
    }
}

const fn bound_key_ref(bound: &Bound<Vec<u8>>) -> Option<&Vec<u8>> {
    match bound {
        Bound::Included(value) | Bound::Excluded(value) => Some(value),
        Bound::Unbounded => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_end_increments_last_non_max_byte() {
        assert_eq!(prefix_end(&[1, 2, 3]), Some(vec![1, 2, 4]));
        assert_eq!(prefix_end(&[1, 0xff, 0xff]), Some(vec![2]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
        assert_eq!(prefix_end(&[]), None);
    }

    #[test]
    fn envelope_emptiness_identifies_empty_equal_exclusive_bounds() {
        let lower = Bound::Included(vec![0x10]);
        let upper = Bound::Excluded(vec![0x10]);

        assert!(envelope_is_empty(&lower, &upper));
        assert!(!envelope_is_empty(
            &Bound::Included(vec![0x10]),
            &Bound::Included(vec![0x10])
        ));
        assert!(envelope_is_empty(
            &Bound::Included(vec![0x11]),
            &Bound::Included(vec![0x10])
        ));
        assert!(!envelope_is_empty(&Bound::Unbounded, &Bound::Excluded(vec![0])));
    }
}
