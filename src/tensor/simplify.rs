//! The tensor simplifier: additive/multiplicative canonicalization,
//! scalar and field coefficients, powers, inverses, and the
//! assumption-driven part (sym/skew/vol/dev) elimination.

use crate::core::error::CasError;
use crate::core::nary::NaryMap;
use crate::scalar::{ScalarExpr, simplify as scalar};
use crate::symbol::SymbolId;
use crate::tensor::space::SpaceKind;
use crate::tensor::{TensorExpr, TensorKind, contract};
use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind, simplify as t2s};

// =============================================================================
// TERM DECOMPOSITION
// =============================================================================

/// Split a sum term into its scalar coefficient and tensor core:
/// `2*X` -> `(2, X)`, `-X` -> `(-1, X)`, `X` -> `(1, X)`.
pub(crate) fn split_term(term: &TensorExpr) -> (ScalarExpr, TensorExpr) {
    match term.kind() {
        TensorKind::Neg(inner) => {
            let (coeff, core) = split_term(inner);
            (scalar::neg(&coeff), core)
        }
        TensorKind::ScalarMul { coeff, expr } => (coeff.clone(), expr.clone()),
        _ => (ScalarExpr::one(), term.clone()),
    }
}

/// Scalar times tensor with the canonical special cases applied.
pub(crate) fn scalar_mul(
    coeff: &ScalarExpr,
    expr: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    if coeff.is_zero_expr() || expr.is_zero_expr() {
        return Ok(TensorExpr::zero(expr.dim(), expr.rank()));
    }
    if coeff.is_one_expr() {
        return Ok(expr.clone());
    }
    match expr.kind() {
        TensorKind::Neg(inner) => scalar_mul(&scalar::neg(coeff), inner),
        // ScalarMul(s1, ScalarMul(s2, t)) = ScalarMul(s1*s2, t)
        TensorKind::ScalarMul {
            coeff: inner_coeff,
            expr: inner,
        } => scalar_mul(&scalar::mul(coeff, inner_coeff)?, inner),
        _ => {
            if let Some(n) = coeff.as_constant()
                && n.is_neg_one()
            {
                return Ok(TensorExpr::from_kind(
                    TensorKind::Neg(expr.clone()),
                    expr.dim(),
                    expr.rank(),
                ));
            }
            Ok(TensorExpr::from_kind(
                TensorKind::ScalarMul {
                    coeff: coeff.clone(),
                    expr: expr.clone(),
                },
                expr.dim(),
                expr.rank(),
            ))
        }
    }
}

/// Negation by scalar -1.
pub(crate) fn neg(expr: &TensorExpr) -> TensorExpr {
    match expr.kind() {
        TensorKind::Zero { .. } => expr.clone(),
        TensorKind::Neg(inner) => inner.clone(),
        TensorKind::ScalarMul { coeff, expr: inner } => {
            match scalar_mul(&scalar::neg(coeff), inner) {
                Ok(negated) => negated,
                Err(_) => TensorExpr::from_kind(
                    TensorKind::Neg(expr.clone()),
                    expr.dim(),
                    expr.rank(),
                ),
            }
        }
        _ => TensorExpr::from_kind(TensorKind::Neg(expr.clone()), expr.dim(), expr.rank()),
    }
}

/// Tensor divided by scalar.
pub(crate) fn scalar_div(
    expr: &TensorExpr,
    coeff: &ScalarExpr,
) -> Result<TensorExpr, CasError> {
    if let Some(n) = coeff.as_constant() {
        if num_traits::Zero::is_zero(&n) {
            return Err(CasError::DivisionByZero {
                op: "tensor / scalar",
            });
        }
        // Constant divisors fold into a scalar coefficient.
        let inverse = ScalarExpr::one().div_expr(coeff)?;
        return scalar_mul(&inverse, expr);
    }
    if expr.is_zero_expr() {
        return Ok(expr.clone());
    }
    if let TensorKind::ScalarDiv {
        expr: inner,
        coeff: inner_coeff,
    } = expr.kind()
    {
        return Ok(TensorExpr::from_kind(
            TensorKind::ScalarDiv {
                expr: inner.clone(),
                coeff: scalar::mul(inner_coeff, coeff)?,
            },
            inner.dim(),
            inner.rank(),
        ));
    }
    Ok(TensorExpr::from_kind(
        TensorKind::ScalarDiv {
            expr: expr.clone(),
            coeff: coeff.clone(),
        },
        expr.dim(),
        expr.rank(),
    ))
}

/// Tensor-to-scalar field times tensor.
pub(crate) fn field_mul(
    field: &TensorScalarExpr,
    expr: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    match field.kind() {
        TensorScalarKind::Zero => Ok(TensorExpr::zero(expr.dim(), expr.rank())),
        TensorScalarKind::One => Ok(expr.clone()),
        TensorScalarKind::ScalarWrapper(s) => scalar_mul(s, expr),
        _ => {
            if expr.is_zero_expr() {
                return Ok(expr.clone());
            }
            if let TensorKind::FieldMul {
                field: inner_field,
                expr: inner,
            } = expr.kind()
            {
                return field_mul(&t2s::mul(field, inner_field)?, inner);
            }
            Ok(TensorExpr::from_kind(
                TensorKind::FieldMul {
                    field: field.clone(),
                    expr: expr.clone(),
                },
                expr.dim(),
                expr.rank(),
            ))
        }
    }
}

/// Tensor divided by a tensor-to-scalar field.
pub(crate) fn field_div(
    expr: &TensorExpr,
    field: &TensorScalarExpr,
) -> Result<TensorExpr, CasError> {
    match field.kind() {
        TensorScalarKind::Zero => Err(CasError::DivisionByZero {
            op: "tensor / tensor-to-scalar",
        }),
        TensorScalarKind::One => Ok(expr.clone()),
        TensorScalarKind::ScalarWrapper(s) => scalar_div(expr, s),
        _ => {
            if expr.is_zero_expr() {
                return Ok(expr.clone());
            }
            Ok(TensorExpr::from_kind(
                TensorKind::FieldDiv {
                    expr: expr.clone(),
                    field: field.clone(),
                },
                expr.dim(),
                expr.rank(),
            ))
        }
    }
}

// =============================================================================
// ADDITION
// =============================================================================

struct AddBuilder {
    shape: (usize, usize),
    terms: NaryMap<TensorExpr>,
}

impl AddBuilder {
    fn new(shape: (usize, usize)) -> Self {
        AddBuilder {
            shape,
            terms: NaryMap::new(),
        }
    }

    fn push(&mut self, expr: &TensorExpr) -> Result<(), CasError> {
        if expr.shape() != self.shape {
            return Err(CasError::shape("tensor add", self.shape, expr.shape()));
        }
        match expr.kind() {
            TensorKind::Zero { .. } => Ok(()),
            TensorKind::Add(map) => {
                for term in map.values() {
                    self.push_term(term)?;
                }
                Ok(())
            }
            _ => self.push_term(expr),
        }
    }

    /// Merge like terms by the hash of the coefficient-stripped core; the
    /// coefficients are summed in the scalar domain.
    fn push_term(&mut self, term: &TensorExpr) -> Result<(), CasError> {
        let (coeff, core) = split_term(term);
        // A negated or scaled sum flattens, distributing the coefficient;
        // `e - e` must cancel termwise.
        if let TensorKind::Add(inner) = core.kind() {
            for inner_term in inner.values() {
                self.push_term(&scalar_mul(&coeff, inner_term)?)?;
            }
            return Ok(());
        }
        let key = self
            .terms
            .probe(core.content_hash(), |existing| split_term(existing).1 == core);
        match self.terms.remove(key) {
            Some(existing) => {
                let merged = scalar::add(&split_term(&existing).0, &coeff);
                if !merged.is_zero_expr() {
                    self.terms.insert(key, scalar_mul(&merged, &core)?);
                }
            }
            None => self.terms.insert(key, term.clone()),
        }
        Ok(())
    }

    fn finish(mut self) -> TensorExpr {
        let (dim, rank) = self.shape;
        if self.terms.is_empty() {
            return TensorExpr::zero(dim, rank);
        }
        if self.terms.len() == 1 {
            let key = *match self.terms.iter().next() {
                Some((k, _)) => k,
                None => return TensorExpr::zero(dim, rank),
            };
            return self
                .terms
                .remove(key)
                .unwrap_or_else(|| TensorExpr::zero(dim, rank));
        }
        TensorExpr::from_kind(TensorKind::Add(self.terms), dim, rank)
    }
}

/// Canonicalizing tensor sum.
pub(crate) fn add(lhs: &TensorExpr, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
    // Projector algebra runs before term merging.
    if let (
        TensorKind::Projector { space: a, dim: da },
        TensorKind::Projector { space: b, dim: db },
    ) = (lhs.kind(), rhs.kind())
        && da == db
    {
        match (a, b) {
            (SpaceKind::Sym, SpaceKind::Skew) | (SpaceKind::Skew, SpaceKind::Sym) => {
                return TensorExpr::identity(*da, 4);
            }
            (SpaceKind::Vol, SpaceKind::Dev) | (SpaceKind::Dev, SpaceKind::Vol) => {
                return Ok(TensorExpr::projector(SpaceKind::Sym, *da));
            }
            _ => {}
        }
    }
    let mut builder = AddBuilder::new(lhs.shape());
    builder.push(lhs)?;
    builder.push(rhs)?;
    Ok(builder.finish())
}

// =============================================================================
// MATRIX PRODUCT
// =============================================================================

struct MulBuilder {
    dim: usize,
    coeff: ScalarExpr,
    factors: Vec<TensorExpr>,
    annihilated: bool,
}

impl MulBuilder {
    fn new(dim: usize) -> Self {
        MulBuilder {
            dim,
            coeff: ScalarExpr::one(),
            factors: Vec::new(),
            annihilated: false,
        }
    }

    fn push(&mut self, expr: &TensorExpr) -> Result<(), CasError> {
        if self.annihilated {
            return Ok(());
        }
        if expr.dim() != self.dim {
            return Err(CasError::shape(
                "tensor mul",
                (self.dim, 2),
                expr.shape(),
            ));
        }
        match expr.kind() {
            TensorKind::Zero { .. } => {
                self.annihilated = true;
                Ok(())
            }
            // The Kronecker delta is the unit of the matrix product.
            TensorKind::Delta { .. } => Ok(()),
            TensorKind::Neg(inner) => {
                self.coeff = scalar::neg(&self.coeff);
                self.push(inner)
            }
            TensorKind::ScalarMul { coeff, expr: inner } => {
                self.coeff = scalar::mul(&self.coeff, coeff)?;
                self.push(inner)
            }
            TensorKind::Mul(inner) => {
                for factor in inner {
                    self.push_factor(factor)?;
                }
                Ok(())
            }
            _ => self.push_factor(expr),
        }
    }

    /// Append one rank-2 factor, merging adjacent powers of equal bases:
    /// `X * X -> pow(X, 2)`, `pow(X, a) * X -> pow(X, a + 1)`.
    fn push_factor(&mut self, factor: &TensorExpr) -> Result<(), CasError> {
        if factor.rank() != 2 {
            return Err(CasError::not_implemented(
                "tensor mul",
                format!(
                    "matrix products are defined for rank-2 factors, got rank {}",
                    factor.rank()
                ),
            ));
        }
        let (base, exp) = split_pow(factor);
        if let Some(last) = self.factors.last() {
            let (last_base, last_exp) = split_pow(last);
            if last_base == base {
                let merged = pow(&base, &scalar::add(&last_exp, &exp))?;
                self.factors.pop();
                match merged.kind() {
                    TensorKind::Delta { .. } => {}
                    _ => self.factors.push(merged),
                }
                return Ok(());
            }
        }
        self.factors.push(factor.clone());
        Ok(())
    }

    fn finish(self) -> Result<TensorExpr, CasError> {
        let MulBuilder {
            dim,
            coeff,
            factors,
            annihilated,
        } = self;
        if annihilated || coeff.is_zero_expr() {
            return Ok(TensorExpr::zero(dim, 2));
        }
        let product = match factors.len() {
            0 => TensorExpr::delta(dim),
            1 => match factors.into_iter().next() {
                Some(single) => single,
                None => TensorExpr::delta(dim),
            },
            _ => TensorExpr::from_kind(TensorKind::Mul(factors), dim, 2),
        };
        scalar_mul(&coeff, &product)
    }
}

fn split_pow(factor: &TensorExpr) -> (TensorExpr, ScalarExpr) {
    match factor.kind() {
        TensorKind::Pow { base, exp } => (base.clone(), exp.clone()),
        _ => (factor.clone(), ScalarExpr::one()),
    }
}

/// Canonicalizing matrix product of rank-2 tensors.
pub(crate) fn mul(lhs: &TensorExpr, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
    let mut builder = MulBuilder::new(lhs.dim());
    builder.push(lhs)?;
    builder.push(rhs)?;
    builder.finish()
}

// =============================================================================
// POWER AND INVERSE
// =============================================================================

/// Canonicalizing matrix power.
pub(crate) fn pow(base: &TensorExpr, exp: &ScalarExpr) -> Result<TensorExpr, CasError> {
    if base.rank() != 2 {
        return Err(CasError::not_implemented(
            "tensor pow",
            format!("matrix powers require rank 2, got rank {}", base.rank()),
        ));
    }
    // pow(t, 0) is the identity on the operand's shape.
    if exp.is_zero_expr() {
        return Ok(TensorExpr::delta(base.dim()));
    }
    if exp.is_one_expr() {
        return Ok(base.clone());
    }
    match base.kind() {
        TensorKind::Delta { .. } => Ok(base.clone()),
        TensorKind::Pow {
            base: inner_base,
            exp: inner_exp,
        } => {
            let merged = scalar::mul(inner_exp, exp)?;
            pow(inner_base, &merged)
        }
        _ => Ok(TensorExpr::from_kind(
            TensorKind::Pow {
                base: base.clone(),
                exp: exp.clone(),
            },
            base.dim(),
            2,
        )),
    }
}

/// Matrix inverse.
pub(crate) fn inv(expr: &TensorExpr) -> Result<TensorExpr, CasError> {
    if expr.rank() != 2 {
        return Err(CasError::not_implemented(
            "tensor inverse",
            format!("inverse requires rank 2, got rank {}", expr.rank()),
        ));
    }
    match expr.kind() {
        TensorKind::Zero { .. } => Err(CasError::DivisionByZero {
            op: "tensor inverse",
        }),
        TensorKind::Delta { .. } => Ok(expr.clone()),
        TensorKind::Inv(inner) => Ok(inner.clone()),
        _ => Ok(TensorExpr::from_kind(
            TensorKind::Inv(expr.clone()),
            expr.dim(),
            2,
        )),
    }
}

// =============================================================================
// PART (sym / skew / vol / dev)
// =============================================================================

/// The functional forms `sym`, `skew`, `vol`, `dev` with assumption-driven
/// elimination: projecting a tensor already known to live in the target
/// subspace is the identity, projecting an orthogonal one gives zero.
pub(crate) fn part(space: SpaceKind, expr: &TensorExpr) -> Result<TensorExpr, CasError> {
    if expr.rank() != 2 {
        return Err(CasError::not_implemented(
            "tensor part",
            format!(
                "{} is defined for rank-2 operands, got rank {}",
                space.func_name(),
                expr.rank()
            ),
        ));
    }
    if expr.is_zero_expr() {
        return Ok(expr.clone());
    }
    // Kronecker delta special cases: sym(I) = vol(I) = I, skew(I) = dev(I) = 0.
    if matches!(expr.kind(), TensorKind::Delta { .. }) {
        return match space {
            SpaceKind::Sym | SpaceKind::Vol => Ok(expr.clone()),
            SpaceKind::Skew | SpaceKind::Dev => Ok(TensorExpr::zero(expr.dim(), 2)),
        };
    }
    let known = expr.space();
    if space.keeps(known) {
        return Ok(expr.clone());
    }
    if space.kills(known) {
        return Ok(TensorExpr::zero(expr.dim(), 2));
    }
    Ok(TensorExpr::from_kind(
        TensorKind::Part {
            space,
            expr: expr.clone(),
        },
        expr.dim(),
        2,
    ))
}

// =============================================================================
// SUBSTITUTION
// =============================================================================

/// Replace every occurrence of a tensor symbol, rebuilding through the
/// factories so everything re-simplifies.
pub(crate) fn substitute(
    expr: &TensorExpr,
    from: &TensorExpr,
    to: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    let Some(from_id) = from.as_symbol() else {
        return Err(CasError::InvalidExpression {
            detail: "substitute requires a tensor symbol to replace".to_owned(),
        });
    };
    if from.shape() != to.shape() {
        return Err(CasError::shape("tensor substitute", from.shape(), to.shape()));
    }
    substitute_symbol(expr, from_id, to)
}

pub(crate) fn substitute_symbol(
    expr: &TensorExpr,
    from: &SymbolId,
    to: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    match expr.kind() {
        TensorKind::Symbol { id, .. } => {
            if id == from {
                Ok(to.clone())
            } else {
                Ok(expr.clone())
            }
        }
        TensorKind::Zero { .. }
        | TensorKind::Delta { .. }
        | TensorKind::Identity { .. }
        | TensorKind::Projector { .. } => Ok(expr.clone()),
        TensorKind::Neg(inner) => Ok(neg(&substitute_symbol(inner, from, to)?)),
        TensorKind::Inv(inner) => inv(&substitute_symbol(inner, from, to)?),
        TensorKind::Pow { base, exp } => pow(&substitute_symbol(base, from, to)?, exp),
        TensorKind::BasisChange { expr: inner, perm } => {
            contract::basis_change(&substitute_symbol(inner, from, to)?, perm)
        }
        TensorKind::Symmetry { expr: inner, perms } => {
            contract::symmetry(&substitute_symbol(inner, from, to)?, perms.clone())
        }
        TensorKind::Part { space, expr: inner } => {
            part(*space, &substitute_symbol(inner, from, to)?)
        }
        TensorKind::Inner {
            lhs,
            lhs_idx,
            rhs,
            rhs_idx,
        } => contract::inner_product(
            &substitute_symbol(lhs, from, to)?,
            lhs_idx,
            &substitute_symbol(rhs, from, to)?,
            rhs_idx,
        ),
        TensorKind::Outer {
            lhs,
            lhs_pos,
            rhs,
            rhs_pos,
        } => contract::outer_product(
            &substitute_symbol(lhs, from, to)?,
            lhs_pos,
            &substitute_symbol(rhs, from, to)?,
            rhs_pos,
        ),
        TensorKind::ScalarMul { coeff, expr: inner } => {
            scalar_mul(coeff, &substitute_symbol(inner, from, to)?)
        }
        TensorKind::ScalarDiv { expr: inner, coeff } => {
            scalar_div(&substitute_symbol(inner, from, to)?, coeff)
        }
        TensorKind::FieldMul { field, expr: inner } => field_mul(
            &t2s::substitute_tensor(field, from, to)?,
            &substitute_symbol(inner, from, to)?,
        ),
        TensorKind::FieldDiv { expr: inner, field } => field_div(
            &substitute_symbol(inner, from, to)?,
            &t2s::substitute_tensor(field, from, to)?,
        ),
        TensorKind::Add(map) => {
            let mut acc = TensorExpr::zero(expr.dim(), expr.rank());
            for term in map.values() {
                acc = add(&acc, &substitute_symbol(term, from, to)?)?;
            }
            Ok(acc)
        }
        TensorKind::Mul(factors) => {
            let mut acc = TensorExpr::delta(expr.dim());
            for factor in factors {
                acc = mul(&acc, &substitute_symbol(factor, from, to)?)?;
            }
            Ok(acc)
        }
        TensorKind::SimpleOuter(factors) => {
            let mut replaced = Vec::with_capacity(factors.len());
            for factor in factors {
                replaced.push(substitute_symbol(factor, from, to)?);
            }
            contract::simple_outer(replaced)
        }
    }
}
