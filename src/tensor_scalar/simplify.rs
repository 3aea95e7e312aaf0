//! The tensor-to-scalar simplifier: reduction rules for trace,
//! determinant and norm, scalar-coefficient canonicalization, and the
//! n-ary sum/product merging.

use num_traits::Zero;

use crate::core::error::CasError;
use crate::core::nary::NaryMap;
use crate::core::number::Number;
use crate::scalar::{ScalarExpr, simplify as scalar};
use crate::symbol::SymbolId;
use crate::tensor::{TensorExpr, TensorKind, simplify as tensor};
use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind};

// =============================================================================
// TERM DECOMPOSITION
// =============================================================================

/// Split a term into its scalar coefficient and core:
/// `x*tr(Y)` -> `(x, tr(Y))`, `-tr(Y)` -> `(-1, tr(Y))`,
/// a wrapped scalar -> `(scalar, 1)`.
pub(crate) fn split_term(term: &TensorScalarExpr) -> (ScalarExpr, TensorScalarExpr) {
    match term.kind() {
        TensorScalarKind::Zero => (ScalarExpr::zero(), TensorScalarExpr::one()),
        TensorScalarKind::One => (ScalarExpr::one(), TensorScalarExpr::one()),
        TensorScalarKind::ScalarWrapper(s) => (s.clone(), TensorScalarExpr::one()),
        TensorScalarKind::Neg(inner) => {
            let (coeff, core) = split_term(inner);
            (scalar::neg(&coeff), core)
        }
        TensorScalarKind::WithScalarMul { scalar: s, expr } => (s.clone(), expr.clone()),
        _ => (ScalarExpr::one(), term.clone()),
    }
}

fn split_pow(factor: &TensorScalarExpr) -> (TensorScalarExpr, TensorScalarExpr) {
    match factor.kind() {
        TensorScalarKind::Pow { base, exp } => (base.clone(), exp.clone()),
        _ => (factor.clone(), TensorScalarExpr::one()),
    }
}

/// Symbolic scalar times reduction, canonicalized.
pub(crate) fn with_scalar_mul(
    coeff: &ScalarExpr,
    expr: &TensorScalarExpr,
) -> TensorScalarExpr {
    if coeff.is_zero_expr() || expr.is_zero_expr() {
        return TensorScalarExpr::zero();
    }
    if coeff.is_one_expr() {
        return expr.clone();
    }
    match expr.kind() {
        TensorScalarKind::One => TensorScalarExpr::wrap(coeff),
        TensorScalarKind::ScalarWrapper(inner) => match scalar::mul(coeff, inner) {
            Ok(product) => TensorScalarExpr::wrap(&product),
            Err(_) => build_with_scalar_mul(coeff, expr),
        },
        TensorScalarKind::Neg(inner) => with_scalar_mul(&scalar::neg(coeff), inner),
        TensorScalarKind::WithScalarMul {
            scalar: inner_coeff,
            expr: inner,
        } => match scalar::mul(coeff, inner_coeff) {
            Ok(product) => with_scalar_mul(&product, inner),
            Err(_) => build_with_scalar_mul(coeff, expr),
        },
        _ => build_with_scalar_mul(coeff, expr),
    }
}

fn build_with_scalar_mul(coeff: &ScalarExpr, expr: &TensorScalarExpr) -> TensorScalarExpr {
    if let Some(n) = coeff.as_constant()
        && n.is_neg_one()
    {
        return TensorScalarExpr::from_kind(TensorScalarKind::Neg(expr.clone()));
    }
    TensorScalarExpr::from_kind(TensorScalarKind::WithScalarMul {
        scalar: coeff.clone(),
        expr: expr.clone(),
    })
}

/// Negation.
pub(crate) fn neg(expr: &TensorScalarExpr) -> TensorScalarExpr {
    with_scalar_mul(&ScalarExpr::constant(-1), expr)
}

// =============================================================================
// ADDITION
// =============================================================================

struct AddBuilder {
    terms: NaryMap<TensorScalarExpr>,
}

impl AddBuilder {
    fn new() -> Self {
        AddBuilder {
            terms: NaryMap::new(),
        }
    }

    fn push(&mut self, expr: &TensorScalarExpr) {
        match expr.kind() {
            TensorScalarKind::Zero => {}
            TensorScalarKind::Add(map) => {
                for term in map.values() {
                    self.push_term(term);
                }
            }
            _ => self.push_term(expr),
        }
    }

    fn push_term(&mut self, term: &TensorScalarExpr) {
        let (coeff, core) = split_term(term);
        if coeff.is_zero_expr() {
            return;
        }
        // A negated or scaled sum flattens, distributing the coefficient;
        // `e - e` must cancel termwise.
        if let TensorScalarKind::Add(inner) = core.kind() {
            for inner_term in inner.values() {
                self.push_term(&with_scalar_mul(&coeff, inner_term));
            }
            return;
        }
        let key = self
            .terms
            .probe(core.content_hash(), |existing| split_term(existing).1 == core);
        match self.terms.remove(key) {
            Some(existing) => {
                let merged = scalar::add(&split_term(&existing).0, &coeff);
                if !merged.is_zero_expr() {
                    self.terms.insert(key, with_scalar_mul(&merged, &core));
                }
            }
            None => self.terms.insert(key, term.clone()),
        }
    }

    fn finish(mut self) -> TensorScalarExpr {
        if self.terms.is_empty() {
            return TensorScalarExpr::zero();
        }
        if self.terms.len() == 1 {
            let key = *match self.terms.iter().next() {
                Some((k, _)) => k,
                None => return TensorScalarExpr::zero(),
            };
            return self
                .terms
                .remove(key)
                .unwrap_or_else(TensorScalarExpr::zero);
        }
        TensorScalarExpr::from_kind(TensorScalarKind::Add(self.terms))
    }
}

/// Canonicalizing sum.
pub(crate) fn add(lhs: &TensorScalarExpr, rhs: &TensorScalarExpr) -> TensorScalarExpr {
    let mut builder = AddBuilder::new();
    builder.push(lhs);
    builder.push(rhs);
    builder.finish()
}

// =============================================================================
// MULTIPLICATION
// =============================================================================

struct MulBuilder {
    coeff: ScalarExpr,
    terms: NaryMap<TensorScalarExpr>,
    annihilated: bool,
}

impl MulBuilder {
    fn new() -> Self {
        MulBuilder {
            coeff: ScalarExpr::one(),
            terms: NaryMap::new(),
            annihilated: false,
        }
    }

    fn push(&mut self, expr: &TensorScalarExpr) -> Result<(), CasError> {
        if self.annihilated {
            return Ok(());
        }
        match expr.kind() {
            TensorScalarKind::Zero => self.annihilated = true,
            TensorScalarKind::One => {}
            TensorScalarKind::ScalarWrapper(s) => {
                self.coeff = scalar::mul(&self.coeff, s)?;
            }
            TensorScalarKind::Neg(inner) => {
                self.coeff = scalar::neg(&self.coeff);
                self.push(inner)?;
            }
            TensorScalarKind::WithScalarMul { scalar: s, expr: inner } => {
                self.coeff = scalar::mul(&self.coeff, s)?;
                self.push(inner)?;
            }
            TensorScalarKind::Mul(map) => {
                for factor in map.values() {
                    self.push_factor(factor)?;
                }
            }
            _ => self.push_factor(expr)?,
        }
        Ok(())
    }

    fn push_factor(&mut self, factor: &TensorScalarExpr) -> Result<(), CasError> {
        let (base, exp) = split_pow(factor);
        let key = self
            .terms
            .probe(base.content_hash(), |existing| split_pow(existing).0 == base);
        match self.terms.remove(key) {
            Some(existing) => {
                let (_, old_exp) = split_pow(&existing);
                let merged = pow(&base, &add(&old_exp, &exp))?;
                match merged.kind() {
                    TensorScalarKind::One => {}
                    TensorScalarKind::Zero => self.annihilated = true,
                    TensorScalarKind::ScalarWrapper(s) => {
                        self.coeff = scalar::mul(&self.coeff, s)?;
                    }
                    _ => self.terms.insert(key, merged),
                }
            }
            None => self.terms.insert(key, factor.clone()),
        }
        Ok(())
    }

    fn finish(mut self) -> TensorScalarExpr {
        if self.annihilated || self.coeff.is_zero_expr() {
            return TensorScalarExpr::zero();
        }
        if self.terms.is_empty() {
            return TensorScalarExpr::wrap(&self.coeff);
        }
        let product = if self.terms.len() == 1 {
            let key = *match self.terms.iter().next() {
                Some((k, _)) => k,
                None => return TensorScalarExpr::one(),
            };
            self.terms
                .remove(key)
                .unwrap_or_else(TensorScalarExpr::one)
        } else {
            TensorScalarExpr::from_kind(TensorScalarKind::Mul(self.terms))
        };
        with_scalar_mul(&self.coeff, &product)
    }
}

/// Canonicalizing product.
pub(crate) fn mul(
    lhs: &TensorScalarExpr,
    rhs: &TensorScalarExpr,
) -> Result<TensorScalarExpr, CasError> {
    let mut builder = MulBuilder::new();
    builder.push(lhs)?;
    builder.push(rhs)?;
    Ok(builder.finish())
}

// =============================================================================
// POWER, DIVISION, LOG
// =============================================================================

/// Canonicalizing power.
pub(crate) fn pow(
    base: &TensorScalarExpr,
    exp: &TensorScalarExpr,
) -> Result<TensorScalarExpr, CasError> {
    if exp.is_zero_expr() {
        return Ok(TensorScalarExpr::one());
    }
    if base.is_one_expr() {
        return Ok(TensorScalarExpr::one());
    }
    if exp.is_one_expr() {
        return Ok(base.clone());
    }
    if base.is_zero_expr() {
        if let Some(n) = exp.as_constant() {
            if n.is_positive() {
                return Ok(TensorScalarExpr::zero());
            }
            return Err(CasError::DivisionByZero {
                op: "tensor-to-scalar pow",
            });
        }
        return Ok(TensorScalarExpr::from_kind(TensorScalarKind::Pow {
            base: base.clone(),
            exp: exp.clone(),
        }));
    }
    if let (Some(a), Some(b)) = (base.as_constant(), exp.as_constant()) {
        return Ok(TensorScalarExpr::constant(a.pow(&b)?));
    }
    // Wrapped scalars exponentiate in the scalar domain.
    if let (TensorScalarKind::ScalarWrapper(a), TensorScalarKind::ScalarWrapper(b)) =
        (base.kind(), exp.kind())
    {
        return Ok(TensorScalarExpr::wrap(&a.pow_expr(b)?));
    }
    if let TensorScalarKind::Pow {
        base: inner_base,
        exp: inner_exp,
    } = base.kind()
    {
        let merged = mul(inner_exp, exp)?;
        return pow(inner_base, &merged);
    }
    Ok(TensorScalarExpr::from_kind(TensorScalarKind::Pow {
        base: base.clone(),
        exp: exp.clone(),
    }))
}

/// Division. Constant divisors fold into the coefficient, scalar
/// operands route to the dedicated cross nodes, and the general case
/// canonicalizes to `lhs * pow(rhs, -1)`.
pub(crate) fn div(
    lhs: &TensorScalarExpr,
    rhs: &TensorScalarExpr,
) -> Result<TensorScalarExpr, CasError> {
    if let Some(n) = rhs.as_constant() {
        if n.is_zero() {
            return Err(CasError::DivisionByZero {
                op: "tensor-to-scalar division",
            });
        }
        let inverse = ScalarExpr::constant(Number::Int(1).div(&n)?);
        return Ok(with_scalar_mul(&inverse, lhs));
    }
    if lhs.is_zero_expr() {
        return Ok(TensorScalarExpr::zero());
    }
    if let TensorScalarKind::ScalarWrapper(divisor) = rhs.kind() {
        return with_scalar_div(lhs, divisor);
    }
    if let TensorScalarKind::ScalarWrapper(numerator) = lhs.kind() {
        return scalar_div_t2s(numerator, rhs);
    }
    let inverse = pow(rhs, &TensorScalarExpr::constant(-1))?;
    mul(lhs, &inverse)
}

/// Natural logarithm; `log(1) = 0`.
pub(crate) fn log(expr: &TensorScalarExpr) -> TensorScalarExpr {
    if expr.is_one_expr() {
        return TensorScalarExpr::zero();
    }
    if let TensorScalarKind::ScalarWrapper(s) = expr.kind() {
        return TensorScalarExpr::wrap(&s.log());
    }
    TensorScalarExpr::from_kind(TensorScalarKind::Log(expr.clone()))
}

/// Reduction divided by a symbolic scalar.
pub(crate) fn with_scalar_div(
    expr: &TensorScalarExpr,
    divisor: &ScalarExpr,
) -> Result<TensorScalarExpr, CasError> {
    if let Some(n) = divisor.as_constant() {
        if n.is_zero() {
            return Err(CasError::DivisionByZero {
                op: "tensor-to-scalar / scalar",
            });
        }
        let inverse = ScalarExpr::constant(Number::Int(1).div(&n)?);
        return Ok(with_scalar_mul(&inverse, expr));
    }
    if expr.is_zero_expr() {
        return Ok(expr.clone());
    }
    Ok(TensorScalarExpr::from_kind(TensorScalarKind::WithScalarDiv {
        expr: expr.clone(),
        scalar: divisor.clone(),
    }))
}

/// Symbolic scalar divided by a reduction.
pub(crate) fn scalar_div_t2s(
    numerator: &ScalarExpr,
    expr: &TensorScalarExpr,
) -> Result<TensorScalarExpr, CasError> {
    if expr.is_zero_expr() {
        return Err(CasError::DivisionByZero {
            op: "scalar / tensor-to-scalar",
        });
    }
    if numerator.is_zero_expr() {
        return Ok(TensorScalarExpr::zero());
    }
    if expr.is_one_expr() {
        return Ok(TensorScalarExpr::wrap(numerator));
    }
    if let TensorScalarKind::ScalarWrapper(s) = expr.kind() {
        return Ok(TensorScalarExpr::wrap(&numerator.div_expr(s)?));
    }
    Ok(TensorScalarExpr::from_kind(TensorScalarKind::ScalarDivT2s {
        scalar: numerator.clone(),
        expr: expr.clone(),
    }))
}

// =============================================================================
// REDUCTIONS
// =============================================================================

/// Trace of a rank-2 tensor.
pub(crate) fn trace(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    if t.rank() != 2 {
        return Err(CasError::ShapeMismatch {
            op: "trace",
            detail: format!("requires rank 2, got rank {}", t.rank()),
        });
    }
    match t.kind() {
        TensorKind::Zero { .. } => Ok(TensorScalarExpr::zero()),
        // tr(I) is the spatial dimension itself.
        TensorKind::Delta { dim } => Ok(TensorScalarExpr::constant(*dim as i64)),
        TensorKind::Neg(inner) => Ok(neg(&trace(inner)?)),
        TensorKind::ScalarMul { coeff, expr } => Ok(with_scalar_mul(coeff, &trace(expr)?)),
        TensorKind::FieldMul { field, expr } => mul(field, &trace(expr)?),
        // Transposition leaves the trace unchanged.
        TensorKind::BasisChange { expr, perm }
            if expr.rank() == 2 && perm.as_slice() == [2, 1] =>
        {
            trace(expr)
        }
        _ => {
            // Skew and deviatoric operands are trace-free.
            if t.is_skew() || t.is_deviatoric() {
                return Ok(TensorScalarExpr::zero());
            }
            Ok(TensorScalarExpr::from_kind(TensorScalarKind::Trace(
                t.clone(),
            )))
        }
    }
}

/// Determinant of a rank-2 tensor.
pub(crate) fn det(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    if t.rank() != 2 {
        return Err(CasError::ShapeMismatch {
            op: "det",
            detail: format!("requires rank 2, got rank {}", t.rank()),
        });
    }
    match t.kind() {
        TensorKind::Zero { .. } => Ok(TensorScalarExpr::zero()),
        TensorKind::Delta { .. } => Ok(TensorScalarExpr::one()),
        _ => Ok(TensorScalarExpr::from_kind(TensorScalarKind::Det(
            t.clone(),
        ))),
    }
}

/// Frobenius norm.
pub(crate) fn norm(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    match t.kind() {
        TensorKind::Zero { .. } => Ok(TensorScalarExpr::zero()),
        TensorKind::Neg(inner) => norm(inner),
        // norm(s*t) = |s| * norm(t)
        TensorKind::ScalarMul { coeff, expr } => {
            Ok(with_scalar_mul(&coeff.abs(), &norm(expr)?))
        }
        _ => Ok(TensorScalarExpr::from_kind(TensorScalarKind::Norm(
            t.clone(),
        ))),
    }
}

/// Full self-contraction `t : t`.
pub(crate) fn dot(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    match t.kind() {
        TensorKind::Zero { .. } => Ok(TensorScalarExpr::zero()),
        TensorKind::Neg(inner) => dot(inner),
        _ => Ok(TensorScalarExpr::from_kind(TensorScalarKind::Dot(
            t.clone(),
        ))),
    }
}

/// Full contraction of two same-shape tensors; the self-contraction
/// normalizes to `Dot`.
pub(crate) fn inner_to_scalar(
    lhs: &TensorExpr,
    rhs: &TensorExpr,
) -> Result<TensorScalarExpr, CasError> {
    if lhs.shape() != rhs.shape() {
        return Err(CasError::shape("dot product", lhs.shape(), rhs.shape()));
    }
    if lhs.is_zero_expr() || rhs.is_zero_expr() {
        return Ok(TensorScalarExpr::zero());
    }
    if lhs == rhs {
        return dot(lhs);
    }
    Ok(TensorScalarExpr::from_kind(TensorScalarKind::InnerToScalar {
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    }))
}

// =============================================================================
// SUBSTITUTION
// =============================================================================

/// Replace a tensor symbol inside every tensor child.
pub(crate) fn substitute_tensor(
    expr: &TensorScalarExpr,
    from: &SymbolId,
    to: &TensorExpr,
) -> Result<TensorScalarExpr, CasError> {
    match expr.kind() {
        TensorScalarKind::Zero
        | TensorScalarKind::One
        | TensorScalarKind::ScalarWrapper(_) => Ok(expr.clone()),
        TensorScalarKind::Trace(t) => trace(&tensor::substitute_symbol(t, from, to)?),
        TensorScalarKind::Det(t) => det(&tensor::substitute_symbol(t, from, to)?),
        TensorScalarKind::Norm(t) => norm(&tensor::substitute_symbol(t, from, to)?),
        TensorScalarKind::Dot(t) => dot(&tensor::substitute_symbol(t, from, to)?),
        TensorScalarKind::Log(g) => Ok(log(&substitute_tensor(g, from, to)?)),
        TensorScalarKind::Neg(g) => Ok(neg(&substitute_tensor(g, from, to)?)),
        TensorScalarKind::Pow { base, exp } => pow(
            &substitute_tensor(base, from, to)?,
            &substitute_tensor(exp, from, to)?,
        ),
        TensorScalarKind::InnerToScalar { lhs, rhs } => inner_to_scalar(
            &tensor::substitute_symbol(lhs, from, to)?,
            &tensor::substitute_symbol(rhs, from, to)?,
        ),
        TensorScalarKind::WithScalarMul { scalar: s, expr: g } => {
            Ok(with_scalar_mul(s, &substitute_tensor(g, from, to)?))
        }
        TensorScalarKind::WithScalarDiv { expr: g, scalar: s } => {
            with_scalar_div(&substitute_tensor(g, from, to)?, s)
        }
        TensorScalarKind::ScalarDivT2s { scalar: s, expr: g } => {
            scalar_div_t2s(s, &substitute_tensor(g, from, to)?)
        }
        TensorScalarKind::Add(map) => {
            let mut acc = TensorScalarExpr::zero();
            for term in map.values() {
                acc = add(&acc, &substitute_tensor(term, from, to)?);
            }
            Ok(acc)
        }
        TensorScalarKind::Mul(map) => {
            let mut acc = TensorScalarExpr::one();
            for factor in map.values() {
                acc = mul(&acc, &substitute_tensor(factor, from, to)?)?;
            }
            Ok(acc)
        }
    }
}
