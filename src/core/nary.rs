//! The n-ary container backing `Add` and `Mul` nodes.
//!
//! A container holds an optional numeric coefficient slot and a map of
//! child terms keyed by a *grouping* hash: for sums, the hash of the term
//! with its numeric coefficient stripped; for products, the hash of the
//! base of a power. Insertion under an occupied key is a merge (handled by
//! the domain simplifier), so `2*x` and `3*x` collapse to `5*x` and
//! `x * pow(x, 2)` collapses to `pow(x, 3)`.
//!
//! Genuine u64 collisions between structurally different terms are
//! resolved by linear probing; callers re-check structural equality on
//! every hit before merging.

use rustc_hash::FxHashMap;

use crate::core::error::CasError;
use crate::core::number::Number;

/// Hash-keyed associative-commutative child collection with a numeric
/// coefficient slot.
///
/// Invariants after simplification:
/// - a container with one term and no coefficient has been collapsed to
///   the lone child by the owning factory;
/// - no child is an `Add`/`Mul` of the same domain (flattening);
/// - the coefficient slot never stores the neutral element (`None`
///   instead).
#[derive(Debug, Clone, PartialEq)]
pub struct NaryMap<E> {
    coeff: Option<Number>,
    terms: FxHashMap<u64, E>,
}

impl<E> Default for NaryMap<E> {
    fn default() -> Self {
        NaryMap {
            coeff: None,
            terms: FxHashMap::default(),
        }
    }
}

impl<E> NaryMap<E> {
    /// Empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of child terms (the coefficient slot does not count).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when there are no child terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The coefficient slot.
    pub fn coeff(&self) -> Option<Number> {
        self.coeff
    }

    /// Replace the coefficient slot. Storing the neutral element is the
    /// caller's responsibility to avoid (pass `None`).
    pub fn set_coeff(&mut self, coeff: Option<Number>) {
        self.coeff = coeff;
    }

    /// Look up the term stored under a grouping key.
    pub fn get(&self, key: u64) -> Option<&E> {
        self.terms.get(&key)
    }

    /// Store a term under a key, replacing any previous occupant.
    pub fn insert(&mut self, key: u64, term: E) {
        self.terms.insert(key, term);
    }

    /// Store a term under a key that must be vacant.
    ///
    /// # Errors
    /// `InternalError` when the key is already occupied; duplicate
    /// insertion means a merge was skipped upstream.
    pub fn insert_unique(&mut self, key: u64, term: E) -> Result<(), CasError> {
        if self.terms.contains_key(&key) {
            return Err(CasError::internal(format!(
                "duplicate insertion into n-ary container under key {key:#x}"
            )));
        }
        self.terms.insert(key, term);
        Ok(())
    }

    /// Remove and return the term under a key.
    pub fn remove(&mut self, key: u64) -> Option<E> {
        self.terms.remove(&key)
    }

    /// Iterate the stored terms in map order (not deterministic; callers
    /// that need a stable order sort by the domain comparison).
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.terms.values()
    }

    /// Iterate `(grouping key, term)` pairs in map order.
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &E)> {
        self.terms.iter()
    }

    /// Consume the container, yielding the stored terms.
    pub fn into_values(self) -> impl Iterator<Item = E> {
        self.terms.into_values()
    }

    /// Find a free or matching slot starting at `key`: probes linearly
    /// until it finds either a vacant key or an occupant for which
    /// `matches` returns true. Returns the key to use.
    pub fn probe(&self, key: u64, mut matches: impl FnMut(&E) -> bool) -> u64 {
        let mut k = key;
        loop {
            match self.terms.get(&k) {
                None => return k,
                Some(existing) if matches(existing) => return k,
                Some(_) => k = k.wrapping_add(1),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_unique_rejects_duplicates() {
        let mut map: NaryMap<i32> = NaryMap::new();
        map.insert_unique(1, 10).unwrap();
        assert!(map.insert_unique(1, 11).is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn probe_skips_mismatched_occupants() {
        let mut map: NaryMap<i32> = NaryMap::new();
        map.insert(5, 50);
        // occupant does not match: probing moves to the next key
        assert_eq!(map.probe(5, |&v| v == 99), 6);
        // occupant matches: probing stays
        assert_eq!(map.probe(5, |&v| v == 50), 5);
    }
}
