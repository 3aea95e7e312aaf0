//! The scalar simplifier.
//!
//! Invoked from every compound factory; dispatches on the kinds of the
//! operands and rewrites the pair into canonical form. Distribution over
//! sums is never performed.

use num_traits::{One, Zero};

use crate::core::error::CasError;
use crate::core::nary::NaryMap;
use crate::core::number::Number;
use crate::scalar::{ScalarExpr, ScalarFn, ScalarKind};

// =============================================================================
// TERM DECOMPOSITION
// =============================================================================

/// Split a term into its numeric coefficient and coefficient-free core:
/// `2*x` -> `(2, x)`, `-x` -> `(-1, x)`, `3` -> `(3, 1)`, `x` -> `(1, x)`.
pub(crate) fn split_coeff(term: &ScalarExpr) -> (Number, ScalarExpr) {
    match term.kind() {
        ScalarKind::Zero => (Number::Int(0), ScalarExpr::one()),
        ScalarKind::One => (Number::Int(1), ScalarExpr::one()),
        ScalarKind::Constant(n) => (*n, ScalarExpr::one()),
        ScalarKind::Neg(inner) => {
            let (coeff, core) = split_coeff(inner);
            (-coeff, core)
        }
        ScalarKind::Mul(map) => match map.coeff() {
            Some(coeff) => (coeff, with_coeff(map, Number::Int(1))),
            None => (Number::Int(1), term.clone()),
        },
        _ => (Number::Int(1), term.clone()),
    }
}

/// Split a factor into base and exponent: `pow(x, e)` -> `(x, e)`,
/// anything else -> `(x, 1)`.
fn split_pow(factor: &ScalarExpr) -> (ScalarExpr, ScalarExpr) {
    match factor.kind() {
        ScalarKind::Pow(base, exp) => (base.clone(), exp.clone()),
        _ => (factor.clone(), ScalarExpr::one()),
    }
}

/// Rebuild a product container under a new numeric coefficient, keeping
/// the container invariants (collapse on neutral coefficient with a single
/// child, `Neg` for coefficient -1).
fn with_coeff(map: &NaryMap<ScalarExpr>, coeff: Number) -> ScalarExpr {
    if coeff.is_zero() {
        return ScalarExpr::zero();
    }
    let mut terms: Vec<ScalarExpr> = map.values().cloned().collect();
    if terms.len() == 1 {
        let single = terms.pop().unwrap_or_else(ScalarExpr::zero);
        return scale(coeff, &single);
    }
    let mut rebuilt = map.clone();
    rebuilt.set_coeff(if coeff.is_one() { None } else { Some(coeff) });
    ScalarExpr::from_kind(ScalarKind::Mul(rebuilt))
}

/// Multiply an expression by a numeric constant without going through the
/// full product builder. Total: never fails.
pub(crate) fn scale(coeff: Number, expr: &ScalarExpr) -> ScalarExpr {
    if coeff.is_zero() {
        return ScalarExpr::zero();
    }
    if coeff.is_one() {
        return expr.clone();
    }
    match expr.kind() {
        ScalarKind::Zero => ScalarExpr::zero(),
        ScalarKind::One => ScalarExpr::constant(coeff),
        ScalarKind::Constant(n) => ScalarExpr::constant(coeff * *n),
        ScalarKind::Neg(inner) => scale(-coeff, inner),
        ScalarKind::Mul(map) => {
            let existing = map.coeff().unwrap_or_else(Number::one);
            with_coeff(map, coeff * existing)
        }
        _ => {
            if coeff.is_neg_one() {
                return ScalarExpr::from_kind(ScalarKind::Neg(expr.clone()));
            }
            let mut map = NaryMap::new();
            map.set_coeff(Some(coeff));
            let (base, _) = split_pow(expr);
            map.insert(base.content_hash(), expr.clone());
            ScalarExpr::from_kind(ScalarKind::Mul(map))
        }
    }
}

/// Negation: `-(-x) = x`, constants fold, products negate their
/// coefficient slot.
pub(crate) fn neg(expr: &ScalarExpr) -> ScalarExpr {
    scale(Number::Int(-1), expr)
}

// =============================================================================
// ADDITION
// =============================================================================

struct AddBuilder {
    coeff: Number,
    terms: NaryMap<ScalarExpr>,
}

impl AddBuilder {
    fn new() -> Self {
        AddBuilder {
            coeff: Number::Int(0),
            terms: NaryMap::new(),
        }
    }

    fn push(&mut self, expr: &ScalarExpr) {
        match expr.kind() {
            ScalarKind::Zero => {}
            ScalarKind::One => self.coeff = self.coeff + Number::Int(1),
            ScalarKind::Constant(n) => self.coeff = self.coeff + *n,
            ScalarKind::Add(map) => {
                if let Some(c) = map.coeff() {
                    self.coeff = self.coeff + c;
                }
                for term in map.values() {
                    self.push_term(term);
                }
            }
            _ => self.push_term(expr),
        }
    }

    /// Insert one non-constant term, merging like terms by the hash of the
    /// coefficient-stripped core.
    fn push_term(&mut self, term: &ScalarExpr) {
        let (coeff, core) = split_coeff(term);
        if coeff.is_zero() {
            return;
        }
        // A negated or scaled sum flattens, distributing the coefficient;
        // `e - e` must cancel termwise.
        if let ScalarKind::Add(inner) = core.kind() {
            if let Some(c) = inner.coeff() {
                self.coeff = self.coeff + coeff * c;
            }
            for inner_term in inner.values() {
                self.push_term(&scale(coeff, inner_term));
            }
            return;
        }
        let key = self
            .terms
            .probe(core.content_hash(), |existing| split_coeff(existing).1 == core);
        match self.terms.remove(key) {
            Some(existing) => {
                let merged = split_coeff(&existing).0 + coeff;
                if !merged.is_zero() {
                    self.terms.insert(key, scale(merged, &core));
                }
            }
            None => self.terms.insert(key, term.clone()),
        }
    }

    fn finish(self) -> ScalarExpr {
        let AddBuilder { coeff, mut terms } = self;
        if terms.is_empty() {
            return ScalarExpr::constant(coeff);
        }
        if coeff.is_zero() && terms.len() == 1 {
            let key = *match terms.iter().next() {
                Some((k, _)) => k,
                None => return ScalarExpr::zero(),
            };
            return terms.remove(key).unwrap_or_else(ScalarExpr::zero);
        }
        terms.set_coeff(if coeff.is_zero() { None } else { Some(coeff) });
        ScalarExpr::from_kind(ScalarKind::Add(terms))
    }
}

/// Canonicalizing sum of two scalar expressions.
pub(crate) fn add(lhs: &ScalarExpr, rhs: &ScalarExpr) -> ScalarExpr {
    let mut builder = AddBuilder::new();
    builder.push(lhs);
    builder.push(rhs);
    builder.finish()
}

// =============================================================================
// MULTIPLICATION
// =============================================================================

struct MulBuilder {
    coeff: Number,
    terms: NaryMap<ScalarExpr>,
    annihilated: bool,
}

impl MulBuilder {
    fn new() -> Self {
        MulBuilder {
            coeff: Number::Int(1),
            terms: NaryMap::new(),
            annihilated: false,
        }
    }

    fn push(&mut self, expr: &ScalarExpr) -> Result<(), CasError> {
        if self.annihilated {
            return Ok(());
        }
        match expr.kind() {
            ScalarKind::Zero => self.annihilated = true,
            ScalarKind::One => {}
            ScalarKind::Constant(n) => self.coeff = self.coeff * *n,
            ScalarKind::Neg(inner) => {
                self.coeff = -self.coeff;
                self.push(inner)?;
            }
            ScalarKind::Mul(map) => {
                if let Some(c) = map.coeff() {
                    self.coeff = self.coeff * c;
                }
                for factor in map.values() {
                    self.push_factor(factor)?;
                }
            }
            _ => self.push_factor(expr)?,
        }
        Ok(())
    }

    /// Insert one factor, merging powers of equal bases:
    /// `x * x -> pow(x, 2)`, `pow(x, a) * pow(x, b) -> pow(x, a + b)`.
    fn push_factor(&mut self, factor: &ScalarExpr) -> Result<(), CasError> {
        let (base, exp) = split_pow(factor);
        let key = self
            .terms
            .probe(base.content_hash(), |existing| split_pow(existing).0 == base);
        match self.terms.remove(key) {
            Some(existing) => {
                let (_, old_exp) = split_pow(&existing);
                let merged = pow(&base, &add(&old_exp, &exp))?;
                match merged.kind() {
                    ScalarKind::One => {}
                    ScalarKind::Zero => self.annihilated = true,
                    ScalarKind::Constant(n) => self.coeff = self.coeff * *n,
                    _ => self.terms.insert(key, merged),
                }
            }
            None => self.terms.insert(key, factor.clone()),
        }
        Ok(())
    }

    fn finish(self) -> ScalarExpr {
        let MulBuilder {
            coeff,
            mut terms,
            annihilated,
        } = self;
        if annihilated || coeff.is_zero() {
            return ScalarExpr::zero();
        }
        if terms.is_empty() {
            return ScalarExpr::constant(coeff);
        }
        if terms.len() == 1 {
            let key = *match terms.iter().next() {
                Some((k, _)) => k,
                None => return ScalarExpr::one(),
            };
            let single = terms.remove(key).unwrap_or_else(ScalarExpr::one);
            return scale(coeff, &single);
        }
        terms.set_coeff(if coeff.is_one() { None } else { Some(coeff) });
        ScalarExpr::from_kind(ScalarKind::Mul(terms))
    }
}

/// Canonicalizing product of two scalar expressions.
pub(crate) fn mul(lhs: &ScalarExpr, rhs: &ScalarExpr) -> Result<ScalarExpr, CasError> {
    let mut builder = MulBuilder::new();
    builder.push(lhs)?;
    builder.push(rhs)?;
    Ok(builder.finish())
}

// =============================================================================
// POWER AND DIVISION
// =============================================================================

/// Canonicalizing power.
pub(crate) fn pow(base: &ScalarExpr, exp: &ScalarExpr) -> Result<ScalarExpr, CasError> {
    // pow(_, 0) = 1, including pow(0, 0) by convention.
    if exp.is_zero_expr() {
        return Ok(ScalarExpr::one());
    }
    if base.is_one_expr() {
        return Ok(ScalarExpr::one());
    }
    if exp.is_one_expr() {
        return Ok(base.clone());
    }
    if base.is_zero_expr() {
        if let Some(n) = exp.as_constant() {
            if n.is_positive() {
                return Ok(ScalarExpr::zero());
            }
            return Err(CasError::DivisionByZero { op: "scalar pow" });
        }
        if exp.is_positive() {
            return Ok(ScalarExpr::zero());
        }
        return Ok(ScalarExpr::from_kind(ScalarKind::Pow(
            base.clone(),
            exp.clone(),
        )));
    }
    if let (Some(a), Some(b)) = (base.as_constant(), exp.as_constant()) {
        return Ok(ScalarExpr::constant(a.pow(&b)?));
    }
    if let ScalarKind::Pow(inner_base, inner_exp) = base.kind() {
        let merged = mul(inner_exp, exp)?;
        return pow(inner_base, &merged);
    }
    Ok(ScalarExpr::from_kind(ScalarKind::Pow(
        base.clone(),
        exp.clone(),
    )))
}

/// Division, canonicalized to `lhs * pow(rhs, -1)`.
pub(crate) fn div(lhs: &ScalarExpr, rhs: &ScalarExpr) -> Result<ScalarExpr, CasError> {
    if let Some(n) = rhs.as_constant() {
        if n.is_zero() {
            return Err(CasError::DivisionByZero {
                op: "scalar division",
            });
        }
        let inverse = Number::one().div(&n)?;
        return Ok(scale(inverse, lhs));
    }
    if lhs.is_zero_expr() {
        return Ok(ScalarExpr::zero());
    }
    let inverse = pow(rhs, &ScalarExpr::constant(-1))?;
    mul(lhs, &inverse)
}

// =============================================================================
// UNARY FUNCTIONS
// =============================================================================

/// Canonicalizing unary function application.
pub(crate) fn unary(func: ScalarFn, arg: &ScalarExpr) -> ScalarExpr {
    match func {
        ScalarFn::Sin | ScalarFn::Tan | ScalarFn::Asin | ScalarFn::Atan => {
            if arg.is_zero_expr() {
                return ScalarExpr::zero();
            }
        }
        ScalarFn::Cos => {
            if arg.is_zero_expr() {
                return ScalarExpr::one();
            }
        }
        ScalarFn::Exp => {
            if arg.is_zero_expr() {
                return ScalarExpr::one();
            }
            // exp(log(x)) = x only for the exact structural counterpart.
            if let ScalarKind::Unary(ScalarFn::Log, inner) = arg.kind() {
                return inner.clone();
            }
        }
        ScalarFn::Log => {
            if arg.is_one_expr() {
                return ScalarExpr::zero();
            }
            if let ScalarKind::Unary(ScalarFn::Exp, inner) = arg.kind() {
                return inner.clone();
            }
        }
        ScalarFn::Sqrt => {
            if arg.is_zero_expr() {
                return ScalarExpr::zero();
            }
            if arg.is_one_expr() {
                return ScalarExpr::one();
            }
            if let ScalarKind::Pow(base, exp) = arg.kind()
                && let Some(two) = exp.as_constant()
                && two == Number::Int(2)
                && base.is_nonnegative()
            {
                return base.clone();
            }
        }
        ScalarFn::Abs => {
            if let Some(n) = arg.as_constant() {
                return ScalarExpr::constant(n.abs());
            }
            if let ScalarKind::Neg(inner) = arg.kind() {
                return unary(ScalarFn::Abs, inner);
            }
            if arg.is_nonnegative() {
                return arg.clone();
            }
            if arg.is_negative() {
                return neg(arg);
            }
        }
        ScalarFn::Sign => {
            if let Some(n) = arg.as_constant() {
                if n.is_positive() {
                    return ScalarExpr::one();
                }
                if n.is_negative() {
                    return ScalarExpr::constant(-1);
                }
                return ScalarExpr::zero();
            }
            if arg.is_positive() {
                return ScalarExpr::one();
            }
            if arg.is_negative() {
                return ScalarExpr::constant(-1);
            }
        }
        ScalarFn::Acos => {}
    }
    ScalarExpr::from_kind(ScalarKind::Unary(func, arg.clone()))
}

// =============================================================================
// SUBSTITUTION
// =============================================================================

/// Replace every occurrence of the symbol `from` with `to`, rebuilding
/// through the factories.
pub(crate) fn substitute(
    expr: &ScalarExpr,
    from: &ScalarExpr,
    to: &ScalarExpr,
) -> Result<ScalarExpr, CasError> {
    let Some(from_id) = from.as_symbol() else {
        return Err(CasError::InvalidExpression {
            detail: "substitute requires a symbol to replace".to_owned(),
        });
    };
    walk_substitute(expr, from_id, to)
}

fn walk_substitute(
    expr: &ScalarExpr,
    from: &crate::symbol::SymbolId,
    to: &ScalarExpr,
) -> Result<ScalarExpr, CasError> {
    match expr.kind() {
        ScalarKind::Symbol(id) => {
            if id == from {
                Ok(to.clone())
            } else {
                Ok(expr.clone())
            }
        }
        ScalarKind::Zero | ScalarKind::One | ScalarKind::Constant(_) => Ok(expr.clone()),
        ScalarKind::Named { name, expr: inner } => Ok(ScalarExpr::named(
            name,
            &walk_substitute(inner, from, to)?,
        )),
        ScalarKind::Neg(inner) => Ok(neg(&walk_substitute(inner, from, to)?)),
        ScalarKind::Unary(func, inner) => {
            Ok(unary(*func, &walk_substitute(inner, from, to)?))
        }
        ScalarKind::Pow(base, exp) => pow(
            &walk_substitute(base, from, to)?,
            &walk_substitute(exp, from, to)?,
        ),
        ScalarKind::Add(map) => {
            let mut acc = ScalarExpr::constant(map.coeff().unwrap_or_else(Number::zero));
            for term in map.values() {
                acc = add(&acc, &walk_substitute(term, from, to)?);
            }
            Ok(acc)
        }
        ScalarKind::Mul(map) => {
            let mut acc = ScalarExpr::constant(map.coeff().unwrap_or_else(Number::one));
            for factor in map.values() {
                acc = mul(&acc, &walk_substitute(factor, from, to)?)?;
            }
            Ok(acc)
        }
    }
}
