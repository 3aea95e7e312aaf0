//! Contraction index sequences and index permutations.
//!
//! The public API is 1-based throughout: index 1 is a tensor's first free
//! index. The numeric kernel converts to 0-based offsets at its boundary.

use std::fmt;

use crate::core::error::CasError;
use crate::core::hash::{combine, ordered};

/// A sequence of 1-based index positions, as used by inner and outer
/// products (e.g. `[1, 2]` addresses a rank-2 tensor's both indices).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSeq(Vec<usize>);

impl IndexSeq {
    /// Build a sequence from 1-based positions.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        IndexSeq(indices.into())
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The positions as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// True when the sequence is exactly `1, 2, ..., n`.
    pub fn is_leading(&self, n: usize) -> bool {
        self.0.len() == n && self.0.iter().enumerate().all(|(i, &v)| v == i + 1)
    }

    /// True when the sequence is exactly `start, start+1, ..., start+n-1`.
    pub fn is_consecutive_from(&self, start: usize, n: usize) -> bool {
        self.0.len() == n && self.0.iter().enumerate().all(|(i, &v)| v == start + i)
    }

    /// Validate against a tensor of the given rank: every position must be
    /// in `1..=rank` and no position may repeat.
    ///
    /// # Errors
    /// `IndexError` naming the operation and the offending position.
    pub fn validate(&self, rank: usize, op: &'static str) -> Result<(), CasError> {
        let mut seen = vec![false; rank];
        for &idx in &self.0 {
            if idx == 0 || idx > rank {
                return Err(CasError::index(
                    op,
                    format!("position {idx} out of range for rank {rank}"),
                ));
            }
            if seen[idx - 1] {
                return Err(CasError::index(op, format!("position {idx} repeated")));
            }
            seen[idx - 1] = true;
        }
        Ok(())
    }

    pub(crate) fn content_hash(&self) -> u64 {
        ordered(0x5e, self.0.iter().map(|&i| i as u64))
    }
}

impl From<&[usize]> for IndexSeq {
    fn from(slice: &[usize]) -> Self {
        IndexSeq(slice.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for IndexSeq {
    fn from(array: [usize; N]) -> Self {
        IndexSeq(array.to_vec())
    }
}

impl fmt::Display for IndexSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "]")
    }
}

/// A permutation of the index positions `1..=n`.
///
/// `BasisChange(t, p)` reads as: index `i` of the result is index `p[i]`
/// of the operand. The rank-2 transpose is `[2, 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Build a permutation, validating that it is a rearrangement of
    /// `1..=n`.
    ///
    /// # Errors
    /// `IndexError` when a position is out of range or repeated.
    pub fn new(indices: impl Into<Vec<usize>>) -> Result<Self, CasError> {
        let indices = indices.into();
        let seq = IndexSeq::new(indices.clone());
        seq.validate(indices.len(), "permutation")?;
        Ok(Permutation(indices))
    }

    /// The identity permutation on `n` positions.
    pub fn identity(n: usize) -> Self {
        Permutation((1..=n).collect())
    }

    /// The rank-2 transpose `[2, 1]`.
    pub fn transpose() -> Self {
        Permutation(vec![2, 1])
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the zero-length permutation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The positions as a slice (1-based).
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// True when this permutation maps every position to itself.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| v == i + 1)
    }

    /// Composition: applying `self` first and `next` afterwards equals
    /// applying the returned permutation once, so
    /// `BasisChange(BasisChange(t, self), next) ==
    /// BasisChange(t, self.compose(next))`.
    pub fn compose(&self, next: &Permutation) -> Permutation {
        debug_assert_eq!(self.len(), next.len());
        Permutation(self.0.iter().map(|&i| next.0[i - 1]).collect())
    }

    /// Extend with identity positions `n+1..=n+extra` (used when a
    /// basis change is lifted over appended derivative indices).
    #[must_use]
    pub fn extended(&self, extra: usize) -> Permutation {
        let n = self.0.len();
        let mut v = self.0.clone();
        v.extend(n + 1..=n + extra);
        Permutation(v)
    }

    pub(crate) fn content_hash(&self) -> u64 {
        combine(0x5f, ordered(0x60, self.0.iter().map(|&i| i as u64)))
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_validation() {
        let seq = IndexSeq::from([1, 2]);
        assert!(seq.validate(2, "test").is_ok());
        assert!(seq.validate(1, "test").is_err());
        assert!(IndexSeq::from([1, 1]).validate(2, "test").is_err());
        assert!(IndexSeq::from([0]).validate(2, "test").is_err());
    }

    #[test]
    fn permutation_compose() {
        let t = Permutation::transpose();
        let composed = t.compose(&t);
        assert!(composed.is_identity());
    }

    #[test]
    fn permutation_extend() {
        let t = Permutation::transpose();
        assert_eq!(t.extended(2).as_slice(), &[2, 1, 3, 4]);
    }
}
