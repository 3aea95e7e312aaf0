//! Structural hashing primitives.
//!
//! Every node caches a content hash computed at construction time: a fixed
//! per-variant tag mixed with the hashes of the children. Commutative
//! containers sort their child hashes before folding so the hash is
//! independent of insertion order; everything else folds left to right.
//!
//! Hashes are not cryptographic. Collisions are tolerated by re-checking
//! structural equality whenever a hash lookup hits.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Mix a value into a running seed (boost-style combine).
#[inline]
pub fn combine(seed: u64, value: u64) -> u64 {
    seed ^ (value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2))
}

/// Hash an arbitrary `Hash` value with the crate's hasher.
#[inline]
pub fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Fold child hashes in left-to-right order under a variant tag.
pub fn ordered(tag: u64, children: impl IntoIterator<Item = u64>) -> u64 {
    let mut seed = combine(0, tag);
    for h in children {
        seed = combine(seed, h);
    }
    seed
}

/// Fold child hashes order-insensitively under a variant tag: the hashes
/// are sorted before folding, so commutative containers hash identically
/// regardless of the order terms were inserted in.
pub fn commutative(tag: u64, children: impl IntoIterator<Item = u64>) -> u64 {
    let mut hashes: Vec<u64> = children.into_iter().collect();
    hashes.sort_unstable();
    ordered(tag, hashes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commutative_is_order_insensitive() {
        let a = commutative(7, [1, 2, 3]);
        let b = commutative(7, [3, 1, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn ordered_is_order_sensitive() {
        assert_ne!(ordered(7, [1, 2]), ordered(7, [2, 1]));
    }

    #[test]
    fn tags_separate_variants() {
        assert_ne!(ordered(1, [42]), ordered(2, [42]));
    }
}
