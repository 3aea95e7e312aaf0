//! Scalar differentiation.
//!
//! Every rule emits its result through the public factories, so the
//! simplifier runs on each intermediate; that keeps derivatives compact.

use num_traits::One;

use crate::core::error::CasError;
use crate::core::number::Number;
use crate::scalar::simplify;
use crate::scalar::{ScalarExpr, ScalarFn, ScalarKind};
use crate::symbol::SymbolId;

/// Differentiate a scalar expression with respect to a scalar symbol.
pub(crate) fn diff_scalar(
    expr: &ScalarExpr,
    arg: &ScalarExpr,
) -> Result<ScalarExpr, CasError> {
    let Some(arg_id) = arg.as_symbol() else {
        return Err(CasError::InvalidExpression {
            detail: "differentiation argument must be a symbol".to_owned(),
        });
    };
    walk(expr, arg_id)
}

fn walk(expr: &ScalarExpr, arg: &SymbolId) -> Result<ScalarExpr, CasError> {
    match expr.kind() {
        ScalarKind::Symbol(id) => {
            if id == arg {
                Ok(ScalarExpr::one())
            } else {
                Ok(ScalarExpr::zero())
            }
        }
        ScalarKind::Zero | ScalarKind::One | ScalarKind::Constant(_) => {
            Ok(ScalarExpr::zero())
        }
        ScalarKind::Named { expr: inner, .. } => walk(inner, arg),
        ScalarKind::Neg(inner) => Ok(simplify::neg(&walk(inner, arg)?)),
        ScalarKind::Unary(func, inner) => {
            let du = walk(inner, arg)?;
            if du.is_zero_expr() {
                return Ok(ScalarExpr::zero());
            }
            chain(*func, inner, &du)
        }
        ScalarKind::Pow(base, exp) => diff_pow(base, exp, arg),
        ScalarKind::Add(map) => {
            let mut acc = ScalarExpr::zero();
            for term in map.values() {
                acc = simplify::add(&acc, &walk(term, arg)?);
            }
            Ok(acc)
        }
        ScalarKind::Mul(map) => {
            // Leibniz over the factor map: sum over factors of the factor's
            // derivative times every other factor.
            let factors: Vec<&ScalarExpr> = map.values().collect();
            let mut acc = ScalarExpr::zero();
            for (j, factor) in factors.iter().enumerate() {
                let df = walk(factor, arg)?;
                if df.is_zero_expr() {
                    continue;
                }
                let mut term = df;
                for (i, other) in factors.iter().enumerate() {
                    if i != j {
                        term = simplify::mul(&term, other)?;
                    }
                }
                acc = simplify::add(&acc, &term);
            }
            Ok(simplify::scale(map.coeff().unwrap_or_else(Number::one), &acc))
        }
    }
}

/// Chain rule for the built-in unary functions.
fn chain(
    func: ScalarFn,
    u: &ScalarExpr,
    du: &ScalarExpr,
) -> Result<ScalarExpr, CasError> {
    let outer = match func {
        // sin -> cos, cos -> -sin
        ScalarFn::Sin => u.cos(),
        ScalarFn::Cos => simplify::neg(&u.sin()),
        // tan' = 1 + tan^2
        ScalarFn::Tan => simplify::add(&ScalarExpr::one(), &u.tan().powi(2)?),
        // asin' = 1/sqrt(1 - u^2), acos' = -asin'
        ScalarFn::Asin => {
            let root = one_minus_square(u)?.sqrt();
            simplify::div(&ScalarExpr::one(), &root)?
        }
        ScalarFn::Acos => {
            let root = one_minus_square(u)?.sqrt();
            simplify::neg(&simplify::div(&ScalarExpr::one(), &root)?)
        }
        // atan' = 1/(1 + u^2)
        ScalarFn::Atan => {
            let denom = simplify::add(&ScalarExpr::one(), &u.powi(2)?);
            simplify::div(&ScalarExpr::one(), &denom)?
        }
        ScalarFn::Exp => u.exp(),
        // log' = 1/u
        ScalarFn::Log => simplify::div(&ScalarExpr::one(), u)?,
        // sqrt' = 1/(2*sqrt(u))
        ScalarFn::Sqrt => {
            let denom = simplify::scale(Number::Int(2), &u.sqrt());
            simplify::div(&ScalarExpr::one(), &denom)?
        }
        // sign is flat away from zero
        ScalarFn::Sign => return Ok(ScalarExpr::zero()),
        // |u|' = sign(u)
        ScalarFn::Abs => u.sign(),
    };
    simplify::mul(&outer, du)
}

fn one_minus_square(u: &ScalarExpr) -> Result<ScalarExpr, CasError> {
    Ok(simplify::add(
        &ScalarExpr::one(),
        &simplify::neg(&u.powi(2)?),
    ))
}

fn diff_pow(
    base: &ScalarExpr,
    exp: &ScalarExpr,
    arg: &SymbolId,
) -> Result<ScalarExpr, CasError> {
    let du = walk(base, arg)?;
    if let Some(c) = exp.as_constant() {
        // d pow(u, c) = c * pow(u, c - 1) * u'
        if du.is_zero_expr() {
            return Ok(ScalarExpr::zero());
        }
        let lowered = simplify::pow(base, &ScalarExpr::constant(c - Number::Int(1)))?;
        let scaled = simplify::scale(c, &lowered);
        return simplify::mul(&scaled, &du);
    }
    // d pow(u, v) = pow(u, v) * (v' * log(u) + v * u'/u)
    let dv = walk(exp, arg)?;
    let left = simplify::mul(&dv, &base.log())?;
    let right = simplify::mul(exp, &simplify::div(&du, base)?)?;
    let inner = simplify::add(&left, &right);
    simplify::mul(&simplify::pow(base, exp)?, &inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_rule() {
        // d(x^2)/dx = 2*x
        let x = ScalarExpr::symbol("sdiff_x");
        let d = diff_scalar(&x.powi(2).unwrap(), &x).unwrap();
        assert_eq!(d, simplify::scale(Number::Int(2), &x));
    }

    #[test]
    fn sin_rule() {
        let x = ScalarExpr::symbol("sdiff_sin_x");
        let d = diff_scalar(&x.sin(), &x).unwrap();
        assert_eq!(d, x.cos());
    }

    #[test]
    fn independent_symbol() {
        let x = ScalarExpr::symbol("sdiff_ind_x");
        let y = ScalarExpr::symbol("sdiff_ind_y");
        let d = diff_scalar(&y, &x).unwrap();
        assert!(d.is_zero_expr());
    }

    #[test]
    fn product_rule() {
        // d(x*sin(x))/dx = sin(x) + x*cos(x)
        let x = ScalarExpr::symbol("sdiff_prod_x");
        let e = x.mul_expr(&x.sin()).unwrap();
        let d = diff_scalar(&e, &x).unwrap();
        let expected = simplify::add(&x.sin(), &x.mul_expr(&x.cos()).unwrap());
        assert_eq!(d, expected);
    }
}
