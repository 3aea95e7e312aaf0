//! Numeric assumptions and the per-node propagation cache.
//!
//! Assumptions are semantic predicates attached to expressions. Users set
//! and remove them on *symbols* only; every other node derives its set
//! bottom-up from its children (the propagator in each domain module).
//!
//! Cache invalidation uses a global epoch, bumped by every user mutation:
//! a cached propagation result is valid only while its stamp matches the
//! current epoch. Propagation is idempotent, so re-running after an
//! invalidation is always safe.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global assumption epoch. `assume` / `remove_assumption` bump it;
/// cached propagation results older than the current value recompute.
static ASSUMPTION_EPOCH: AtomicU64 = AtomicU64::new(1);

/// The current assumption epoch.
pub(crate) fn current_epoch() -> u64 {
    ASSUMPTION_EPOCH.load(Ordering::Acquire)
}

/// Invalidate all cached propagation results.
pub(crate) fn bump_epoch() {
    ASSUMPTION_EPOCH.fetch_add(1, Ordering::AcqRel);
}

// =============================================================================
// NUMERIC ASSUMPTION TAGS
// =============================================================================

/// A single numeric assumption tag for the scalar domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assumption {
    /// Strictly greater than zero.
    Positive,
    /// Strictly less than zero.
    Negative,
    /// Different from zero.
    Nonzero,
    /// Greater than or equal to zero.
    Nonnegative,
    /// Less than or equal to zero.
    Nonpositive,
    /// An integer.
    Integer,
    /// An even integer.
    Even,
    /// An odd integer.
    Odd,
    /// A rational number.
    Rational,
    /// An irrational number.
    Irrational,
    /// A real number.
    Real,
    /// A complex number.
    Complex,
    /// A prime number.
    Prime,
}

impl Assumption {
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// The tags implied by this one (implication closure of the
    /// assumption lattice). The tag itself is not included.
    pub fn implied(self) -> AssumptionSet {
        use Assumption::*;
        let mut set = AssumptionSet::EMPTY;
        match self {
            Positive => {
                set = set.with(Nonnegative).with(Nonzero).with(Real);
            }
            Negative => {
                set = set.with(Nonpositive).with(Nonzero).with(Real);
            }
            Nonnegative | Nonpositive | Rational => {
                set = set.with(Real);
            }
            Integer => {
                set = set.with(Rational).with(Real);
            }
            Even | Odd => {
                set = set.with(Integer).with(Rational).with(Real);
            }
            Prime => {
                set = set
                    .with(Integer)
                    .with(Positive)
                    .with(Nonnegative)
                    .with(Nonzero)
                    .with(Rational)
                    .with(Real);
            }
            Nonzero | Irrational | Real | Complex => {}
        }
        set
    }
}

// =============================================================================
// ASSUMPTION SET
// =============================================================================

/// A set of numeric assumption tags (13 tags, stored as a bitset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssumptionSet(u16);

impl AssumptionSet {
    /// The empty set.
    pub const EMPTY: AssumptionSet = AssumptionSet(0);

    /// Membership test.
    pub fn contains(&self, tag: Assumption) -> bool {
        self.0 & tag.bit() != 0
    }

    /// The set with `tag` added (no closure applied).
    #[must_use]
    pub fn with(self, tag: Assumption) -> AssumptionSet {
        AssumptionSet(self.0 | tag.bit())
    }

    /// The set with `tag` added together with everything it implies.
    #[must_use]
    pub fn assuming(self, tag: Assumption) -> AssumptionSet {
        self.with(tag).union(tag.implied())
    }

    /// The set with exactly `tag` removed. Implied tags remain; removing
    /// `Positive` from an assumed-positive symbol still leaves it
    /// `Nonnegative` and `Nonzero`.
    #[must_use]
    pub fn without(self, tag: Assumption) -> AssumptionSet {
        AssumptionSet(self.0 & !tag.bit())
    }

    /// Set union.
    #[must_use]
    pub fn union(self, other: AssumptionSet) -> AssumptionSet {
        AssumptionSet(self.0 | other.0)
    }

    /// True when no tag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// PER-NODE CACHE
// =============================================================================

#[derive(Debug)]
struct CellState<T> {
    /// User-set value; meaningful on symbol nodes only.
    user: T,
    /// Last propagation result (user value already merged in).
    cached: T,
    /// Epoch the cached value was computed at.
    epoch: u64,
    /// Whether `cached` has ever been filled.
    inferred: bool,
}

/// Epoch-tagged assumption cache carried by every node.
///
/// The cell is the single mutable element of an otherwise immutable node.
/// Writes are idempotent (the propagated set is a pure function of the
/// tree and the user assumptions at a given epoch), so aliased handles can
/// race on the fill without observing a partially computed value.
#[derive(Debug)]
pub(crate) struct AssumptionCell<T> {
    state: RwLock<CellState<T>>,
}

impl<T: Copy + Default> AssumptionCell<T> {
    pub(crate) fn new() -> Self {
        AssumptionCell {
            state: RwLock::new(CellState {
                user: T::default(),
                cached: T::default(),
                epoch: 0,
                inferred: false,
            }),
        }
    }

    /// The user-set value (symbols only; default elsewhere).
    pub(crate) fn user(&self) -> T {
        match self.state.read() {
            Ok(guard) => guard.user,
            Err(poisoned) => poisoned.into_inner().user,
        }
    }

    /// Replace the user-set value and invalidate every cached propagation
    /// result in the program.
    pub(crate) fn set_user(&self, value: T) {
        match self.state.write() {
            Ok(mut guard) => guard.user = value,
            Err(poisoned) => poisoned.into_inner().user = value,
        }
        bump_epoch();
    }

    /// Return the cached propagation result for the current epoch, or
    /// compute it with `infer` (called outside the lock, so it may recurse
    /// into child cells) and cache it.
    pub(crate) fn get_or_infer(&self, infer: impl FnOnce(T) -> T) -> T {
        let epoch = current_epoch();
        {
            let guard = match self.state.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if guard.inferred && guard.epoch == epoch {
                return guard.cached;
            }
        }
        let user = self.user();
        let value = infer(user);
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.cached = value;
        guard.epoch = epoch;
        guard.inferred = true;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_of_positive() {
        let set = AssumptionSet::EMPTY.assuming(Assumption::Positive);
        assert!(set.contains(Assumption::Positive));
        assert!(set.contains(Assumption::Nonnegative));
        assert!(set.contains(Assumption::Nonzero));
        assert!(set.contains(Assumption::Real));
        assert!(!set.contains(Assumption::Negative));
    }

    #[test]
    fn closure_of_prime() {
        let set = AssumptionSet::EMPTY.assuming(Assumption::Prime);
        for tag in [
            Assumption::Prime,
            Assumption::Integer,
            Assumption::Positive,
            Assumption::Nonzero,
            Assumption::Rational,
            Assumption::Real,
        ] {
            assert!(set.contains(tag), "prime should imply {tag:?}");
        }
    }

    #[test]
    fn removal_keeps_implied_tags() {
        let set = AssumptionSet::EMPTY
            .assuming(Assumption::Positive)
            .without(Assumption::Positive);
        assert!(!set.contains(Assumption::Positive));
        assert!(set.contains(Assumption::Nonnegative));
        assert!(set.contains(Assumption::Nonzero));
    }

    #[test]
    fn cell_recomputes_after_epoch_bump() {
        let cell: AssumptionCell<AssumptionSet> = AssumptionCell::new();
        let first = cell.get_or_infer(|u| u.assuming(Assumption::Real));
        assert!(first.contains(Assumption::Real));

        cell.set_user(AssumptionSet::EMPTY.assuming(Assumption::Positive));
        let second = cell.get_or_infer(|u| u.assuming(Assumption::Real));
        assert!(second.contains(Assumption::Positive));
    }
}
