//! Numeric assumption API and the scalar propagator.
//!
//! `assume` / `remove_assumption` mutate symbols only; every other node
//! derives its set bottom-up on first query and caches the result until
//! the global assumption epoch moves.

use crate::core::assumptions::{Assumption, AssumptionSet};
use crate::core::error::CasError;
use crate::core::number::Number;
use crate::scalar::{ScalarExpr, ScalarFn, ScalarKind};

impl ScalarExpr {
    /// Attach an assumption (and everything it implies) to a symbol.
    ///
    /// # Errors
    /// `DomainMismatch` when called on a non-symbol node; derived nodes
    /// get their assumptions from propagation only.
    pub fn assume(&self, tag: Assumption) -> Result<(), CasError> {
        if self.as_symbol().is_none() {
            return Err(CasError::DomainMismatch {
                op: "assume",
                detail: "assumptions can only be set on symbols".to_owned(),
            });
        }
        let cell = &self.node().assumptions;
        cell.set_user(cell.user().assuming(tag));
        Ok(())
    }

    /// Remove exactly one assumption tag from a symbol. Tags implied by a
    /// previous `assume` remain.
    ///
    /// # Errors
    /// `DomainMismatch` when called on a non-symbol node.
    pub fn remove_assumption(&self, tag: Assumption) -> Result<(), CasError> {
        if self.as_symbol().is_none() {
            return Err(CasError::DomainMismatch {
                op: "remove_assumption",
                detail: "assumptions can only be removed from symbols".to_owned(),
            });
        }
        let cell = &self.node().assumptions;
        cell.set_user(cell.user().without(tag));
        Ok(())
    }

    /// The full propagated assumption set of this node.
    pub fn assumptions(&self) -> AssumptionSet {
        self.node()
            .assumptions
            .get_or_infer(|user| infer(self, user))
    }

    /// True when the node is known to be strictly positive.
    pub fn is_positive(&self) -> bool {
        self.assumptions().contains(Assumption::Positive)
    }

    /// True when the node is known to be strictly negative.
    pub fn is_negative(&self) -> bool {
        self.assumptions().contains(Assumption::Negative)
    }

    /// True when the node is known to be nonzero.
    pub fn is_nonzero(&self) -> bool {
        self.assumptions().contains(Assumption::Nonzero)
    }

    /// True when the node is known to be greater than or equal to zero.
    pub fn is_nonnegative(&self) -> bool {
        self.assumptions().contains(Assumption::Nonnegative)
    }

    /// True when the node is known to be less than or equal to zero.
    pub fn is_nonpositive(&self) -> bool {
        self.assumptions().contains(Assumption::Nonpositive)
    }

    /// True when the node is known to be an integer.
    pub fn is_integer(&self) -> bool {
        self.assumptions().contains(Assumption::Integer)
    }

    /// True when the node is known to be an even integer.
    pub fn is_even(&self) -> bool {
        self.assumptions().contains(Assumption::Even)
    }

    /// True when the node is known to be an odd integer.
    pub fn is_odd(&self) -> bool {
        self.assumptions().contains(Assumption::Odd)
    }

    /// True when the node is known to be rational.
    pub fn is_rational(&self) -> bool {
        self.assumptions().contains(Assumption::Rational)
    }

    /// True when the node is known to be real.
    pub fn is_real(&self) -> bool {
        self.assumptions().contains(Assumption::Real)
    }
}

// =============================================================================
// PROPAGATION
// =============================================================================

fn tags_of_number(n: &Number) -> AssumptionSet {
    let mut set = AssumptionSet::EMPTY;
    if n.is_positive() {
        set = set.assuming(Assumption::Positive);
    } else if n.is_negative() {
        set = set.assuming(Assumption::Negative);
    } else {
        set = set
            .assuming(Assumption::Nonnegative)
            .assuming(Assumption::Nonpositive);
    }
    match n {
        Number::Int(v) => {
            set = set.assuming(Assumption::Integer);
            set = if v % 2 == 0 {
                set.assuming(Assumption::Even)
            } else {
                set.assuming(Assumption::Odd)
            };
        }
        Number::Rational(..) => set = set.assuming(Assumption::Rational),
        Number::Real(_) => set = set.assuming(Assumption::Real),
    }
    set
}

fn flip_sign(set: AssumptionSet) -> AssumptionSet {
    use Assumption::*;
    let mut flipped = AssumptionSet::EMPTY;
    let swaps = [
        (Positive, Negative),
        (Negative, Positive),
        (Nonnegative, Nonpositive),
        (Nonpositive, Nonnegative),
    ];
    for (from, to) in swaps {
        if set.contains(from) {
            flipped = flipped.with(to);
        }
    }
    for keep in [Nonzero, Integer, Even, Odd, Rational, Irrational, Real, Complex] {
        if set.contains(keep) {
            flipped = flipped.with(keep);
        }
    }
    flipped
}

/// Tags that hold for every term of a sum also hold for the sum.
fn join_add(sets: &[AssumptionSet]) -> AssumptionSet {
    use Assumption::*;
    let mut result = AssumptionSet::EMPTY;
    for tag in [Positive, Negative, Nonnegative, Nonpositive, Integer, Rational, Real] {
        if sets.iter().all(|s| s.contains(tag)) {
            result = result.assuming(tag);
        }
    }
    result
}

fn join_mul(sets: &[AssumptionSet]) -> AssumptionSet {
    use Assumption::*;
    let mut result = AssumptionSet::EMPTY;
    for tag in [Nonzero, Integer, Rational, Real] {
        if sets.iter().all(|s| s.contains(tag)) {
            result = result.assuming(tag);
        }
    }
    // Sign classes multiply: pos*pos = pos, pos*neg = neg, neg*neg = pos.
    let mut sign = 1i8;
    let mut known = true;
    for set in sets {
        if set.contains(Positive) {
            // sign unchanged
        } else if set.contains(Negative) {
            sign = -sign;
        } else {
            known = false;
            break;
        }
    }
    if known {
        result = if sign > 0 {
            result.assuming(Positive)
        } else {
            result.assuming(Negative)
        };
    }
    result
}

pub(crate) fn infer(expr: &ScalarExpr, user: AssumptionSet) -> AssumptionSet {
    let derived = match expr.kind() {
        ScalarKind::Symbol(_) => AssumptionSet::EMPTY,
        ScalarKind::Zero => AssumptionSet::EMPTY
            .assuming(Assumption::Even)
            .assuming(Assumption::Nonnegative)
            .assuming(Assumption::Nonpositive),
        ScalarKind::One => AssumptionSet::EMPTY
            .assuming(Assumption::Positive)
            .assuming(Assumption::Odd),
        ScalarKind::Constant(n) => tags_of_number(n),
        ScalarKind::Named { expr: inner, .. } => inner.assumptions(),
        ScalarKind::Neg(inner) => flip_sign(inner.assumptions()),
        ScalarKind::Unary(func, inner) => infer_unary(*func, inner),
        ScalarKind::Pow(base, exp) => infer_pow(base, exp),
        ScalarKind::Add(map) => {
            let mut sets: Vec<AssumptionSet> =
                map.values().map(ScalarExpr::assumptions).collect();
            if let Some(c) = map.coeff() {
                sets.push(tags_of_number(&c));
            }
            join_add(&sets)
        }
        ScalarKind::Mul(map) => {
            let mut sets: Vec<AssumptionSet> =
                map.values().map(ScalarExpr::assumptions).collect();
            if let Some(c) = map.coeff() {
                sets.push(tags_of_number(&c));
            }
            join_mul(&sets)
        }
    };
    derived.union(user)
}

fn infer_unary(func: ScalarFn, inner: &ScalarExpr) -> AssumptionSet {
    let child = inner.assumptions();
    let mut set = AssumptionSet::EMPTY;
    match func {
        ScalarFn::Exp => {
            set = set.assuming(Assumption::Positive);
        }
        ScalarFn::Abs => {
            set = set.assuming(Assumption::Nonnegative);
            if child.contains(Assumption::Nonzero) {
                set = set.assuming(Assumption::Positive);
            }
        }
        ScalarFn::Sqrt => {
            set = set.assuming(Assumption::Nonnegative);
        }
        ScalarFn::Sin | ScalarFn::Cos | ScalarFn::Atan | ScalarFn::Sign => {
            if child.contains(Assumption::Real) {
                set = set.assuming(Assumption::Real);
            }
        }
        ScalarFn::Log => {
            if child.contains(Assumption::Positive) {
                set = set.assuming(Assumption::Real);
            }
        }
        ScalarFn::Tan | ScalarFn::Asin | ScalarFn::Acos => {}
    }
    set
}

fn infer_pow(base: &ScalarExpr, exp: &ScalarExpr) -> AssumptionSet {
    let base_set = base.assumptions();
    let mut set = AssumptionSet::EMPTY;
    if base_set.contains(Assumption::Positive) {
        set = set.assuming(Assumption::Positive);
    }
    if let Some(n) = exp.as_constant() {
        if n.is_integer() {
            if let Some(k) = n.as_i64()
                && k % 2 == 0
            {
                set = set.assuming(Assumption::Nonnegative);
            }
            if base_set.contains(Assumption::Nonzero) {
                set = set.assuming(Assumption::Nonzero);
            }
            if base_set.contains(Assumption::Real) {
                set = set.assuming(Assumption::Real);
            }
            if base_set.contains(Assumption::Integer) && !n.is_negative() {
                set = set.assuming(Assumption::Integer);
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_inference() {
        let two = ScalarExpr::constant(2);
        assert!(two.is_positive());
        assert!(two.is_integer());
        assert!(two.is_even());
        assert!(two.is_real());

        let minus = ScalarExpr::constant(-3);
        assert!(minus.is_negative());
        assert!(minus.is_odd());
    }

    #[test]
    fn exp_is_positive() {
        let x = ScalarExpr::symbol("assume_exp_x");
        let e = x.exp();
        assert!(e.is_positive());
        assert!(e.is_nonzero());
        assert!(e.is_real());
    }

    #[test]
    fn even_power_is_nonnegative() {
        let x = ScalarExpr::symbol("assume_pow_x");
        let p = x.powi(2).unwrap();
        assert!(p.is_nonnegative());
    }

    #[test]
    fn product_of_negatives_is_positive() {
        let x = ScalarExpr::symbol("assume_mul_x");
        let y = ScalarExpr::symbol("assume_mul_y");
        x.assume(Assumption::Negative).unwrap();
        y.assume(Assumption::Negative).unwrap();
        let p = x.mul_expr(&y).unwrap();
        assert!(p.is_positive());
    }
}
