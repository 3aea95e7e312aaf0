//! Numeric evaluation of fully simplified expressions.
//!
//! The evaluator walks a tree and produces `f64` values or [`DenseTensor`]
//! storage, looking up symbols in a [`Bindings`] map. It fails with
//! [`EvalError`], never with the core's construction errors.

pub(crate) mod dense;

pub use dense::DenseTensor;

use rustc_hash::FxHashMap;

use crate::core::error::EvalError;
use crate::core::index::IndexSeq;
use crate::scalar::{ScalarExpr, ScalarFn, ScalarKind};
use crate::tensor::{TensorExpr, TensorKind};
use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind};

/// Bindings from symbol names to numeric values.
///
/// # Example
/// ```
/// use symtensor::{Bindings, ScalarExpr, eval_scalar};
///
/// let x = ScalarExpr::symbol("doc_eval_x");
/// let mut bindings = Bindings::new();
/// bindings.bind_scalar("doc_eval_x", 2.0);
/// let value = eval_scalar(&(x.clone() * x), &bindings).unwrap();
/// assert_eq!(value, 4.0);
/// ```
#[derive(Debug, Default)]
pub struct Bindings {
    scalars: FxHashMap<String, f64>,
    tensors: FxHashMap<String, DenseTensor>,
}

impl Bindings {
    /// Empty bindings.
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Bind a scalar symbol.
    pub fn bind_scalar(&mut self, name: &str, value: f64) -> &mut Self {
        self.scalars.insert(name.to_owned(), value);
        self
    }

    /// Bind a tensor symbol to dense storage.
    pub fn bind_tensor(&mut self, name: &str, value: DenseTensor) -> &mut Self {
        self.tensors.insert(name.to_owned(), value);
        self
    }

    fn scalar(&self, name: &str) -> Result<f64, EvalError> {
        self.scalars
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::SymbolUnbound {
                name: name.to_owned(),
            })
    }

    fn tensor(&self, name: &str) -> Result<&DenseTensor, EvalError> {
        self.tensors.get(name).ok_or_else(|| EvalError::SymbolUnbound {
            name: name.to_owned(),
        })
    }
}

// =============================================================================
// SCALAR EVALUATION
// =============================================================================

/// Evaluate a scalar expression.
///
/// # Errors
/// `SymbolUnbound` for missing bindings, `DomainError` for undefined
/// numeric operations.
pub fn eval_scalar(expr: &ScalarExpr, bindings: &Bindings) -> Result<f64, EvalError> {
    match expr.kind() {
        ScalarKind::Symbol(id) => bindings.scalar(id.name()),
        ScalarKind::Zero => Ok(0.0),
        ScalarKind::One => Ok(1.0),
        ScalarKind::Constant(n) => Ok(n.to_f64()),
        ScalarKind::Named { expr: inner, .. } => eval_scalar(inner, bindings),
        ScalarKind::Neg(inner) => Ok(-eval_scalar(inner, bindings)?),
        ScalarKind::Unary(func, inner) => {
            let value = eval_scalar(inner, bindings)?;
            eval_scalar_fn(*func, value)
        }
        ScalarKind::Pow(base, exp) => {
            Ok(eval_scalar(base, bindings)?.powf(eval_scalar(exp, bindings)?))
        }
        ScalarKind::Add(map) => {
            let mut sum = map.coeff().map_or(0.0, |c| c.to_f64());
            for term in map.values() {
                sum += eval_scalar(term, bindings)?;
            }
            Ok(sum)
        }
        ScalarKind::Mul(map) => {
            let mut product = map.coeff().map_or(1.0, |c| c.to_f64());
            for factor in map.values() {
                product *= eval_scalar(factor, bindings)?;
            }
            Ok(product)
        }
    }
}

fn eval_scalar_fn(func: ScalarFn, value: f64) -> Result<f64, EvalError> {
    let result = match func {
        ScalarFn::Sin => value.sin(),
        ScalarFn::Cos => value.cos(),
        ScalarFn::Tan => value.tan(),
        ScalarFn::Asin => value.asin(),
        ScalarFn::Acos => value.acos(),
        ScalarFn::Atan => value.atan(),
        ScalarFn::Exp => value.exp(),
        ScalarFn::Log => {
            if value <= 0.0 {
                return Err(EvalError::domain(format!("log of {value}")));
            }
            value.ln()
        }
        ScalarFn::Sqrt => {
            if value < 0.0 {
                return Err(EvalError::domain(format!("sqrt of {value}")));
            }
            value.sqrt()
        }
        ScalarFn::Sign => {
            if value > 0.0 {
                1.0
            } else if value < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        ScalarFn::Abs => value.abs(),
    };
    Ok(result)
}

// =============================================================================
// TENSOR EVALUATION
// =============================================================================

/// Evaluate a tensor expression into dense storage.
///
/// # Errors
/// `SymbolUnbound` for missing bindings, `DomainError` for shape or
/// numeric failures.
pub fn eval_tensor(expr: &TensorExpr, bindings: &Bindings) -> Result<DenseTensor, EvalError> {
    match expr.kind() {
        TensorKind::Symbol { id, dim, rank } => {
            let stored = bindings.tensor(id.name())?;
            if stored.dim() != *dim || stored.rank() != *rank {
                return Err(EvalError::domain(format!(
                    "binding for '{}' has shape ({}, {}), expected ({dim}, {rank})",
                    id.name(),
                    stored.dim(),
                    stored.rank()
                )));
            }
            Ok(stored.clone())
        }
        TensorKind::Zero { dim, rank } => DenseTensor::new(*dim, *rank),
        TensorKind::Delta { dim } => DenseTensor::delta(*dim),
        TensorKind::Identity { dim, rank } => DenseTensor::identity(*dim, *rank),
        TensorKind::Projector { space, dim } => DenseTensor::projector(*space, *dim),
        TensorKind::Neg(inner) => Ok(eval_tensor(inner, bindings)?.scaled(-1.0)),
        TensorKind::Inv(inner) => eval_tensor(inner, bindings)?.inverse(),
        TensorKind::Pow { base, exp } => {
            let exponent = eval_scalar(exp, bindings)?;
            if exponent.fract() != 0.0 {
                return Err(EvalError::domain(format!(
                    "matrix power with non-integer exponent {exponent}"
                )));
            }
            let base_value = eval_tensor(base, bindings)?;
            matrix_power(&base_value, exponent as i64)
        }
        TensorKind::BasisChange { expr: inner, perm } => {
            eval_tensor(inner, bindings)?.permute(perm)
        }
        TensorKind::Symmetry { expr: inner, perms } => {
            let value = eval_tensor(inner, bindings)?;
            let mut acc = DenseTensor::new(value.dim(), value.rank())?;
            for perm in perms {
                acc = acc.add(&value.permute(perm)?)?;
            }
            acc.scale(1.0 / perms.len() as f64);
            Ok(acc)
        }
        TensorKind::Part { space, expr: inner } => {
            eval_tensor(inner, bindings)?.part(*space)
        }
        TensorKind::Inner {
            lhs,
            lhs_idx,
            rhs,
            rhs_idx,
        } => eval_tensor(lhs, bindings)?.inner_product(
            lhs_idx,
            &eval_tensor(rhs, bindings)?,
            rhs_idx,
        ),
        TensorKind::Outer {
            lhs,
            lhs_pos,
            rhs,
            rhs_pos,
        } => eval_tensor(lhs, bindings)?.outer_product(
            lhs_pos,
            &eval_tensor(rhs, bindings)?,
            rhs_pos,
        ),
        TensorKind::ScalarMul { coeff, expr: inner } => {
            Ok(eval_tensor(inner, bindings)?.scaled(eval_scalar(coeff, bindings)?))
        }
        TensorKind::ScalarDiv { expr: inner, coeff } => {
            let divisor = eval_scalar(coeff, bindings)?;
            if divisor == 0.0 {
                return Err(EvalError::domain("tensor / scalar: division by zero"));
            }
            Ok(eval_tensor(inner, bindings)?.scaled(1.0 / divisor))
        }
        TensorKind::FieldMul { field, expr: inner } => {
            Ok(eval_tensor(inner, bindings)?.scaled(eval_t2s(field, bindings)?))
        }
        TensorKind::FieldDiv { expr: inner, field } => {
            let divisor = eval_t2s(field, bindings)?;
            if divisor == 0.0 {
                return Err(EvalError::domain(
                    "tensor / tensor-to-scalar: division by zero",
                ));
            }
            Ok(eval_tensor(inner, bindings)?.scaled(1.0 / divisor))
        }
        TensorKind::Add(map) => {
            let mut acc = DenseTensor::new(expr.dim(), expr.rank())?;
            for term in map.values() {
                acc = acc.add(&eval_tensor(term, bindings)?)?;
            }
            Ok(acc)
        }
        TensorKind::Mul(factors) => {
            let mut values = factors.iter().map(|f| eval_tensor(f, bindings));
            let mut acc = match values.next() {
                Some(first) => first?,
                None => DenseTensor::delta(expr.dim())?,
            };
            for value in values {
                acc = acc.inner_product(&IndexSeq::from([2]), &value?, &IndexSeq::from([1]))?;
            }
            Ok(acc)
        }
        TensorKind::SimpleOuter(factors) => {
            let mut acc: Option<DenseTensor> = None;
            for factor in factors {
                let value = eval_tensor(factor, bindings)?;
                acc = Some(match acc {
                    None => value,
                    Some(current) => {
                        let left: Vec<usize> = (1..=current.rank()).collect();
                        let right: Vec<usize> =
                            (current.rank() + 1..=current.rank() + value.rank()).collect();
                        current.outer_product(
                            &IndexSeq::new(left),
                            &value,
                            &IndexSeq::new(right),
                        )?
                    }
                });
            }
            match acc {
                Some(result) => Ok(result),
                None => DenseTensor::new(expr.dim(), expr.rank()),
            }
        }
    }
}

fn matrix_power(base: &DenseTensor, exponent: i64) -> Result<DenseTensor, EvalError> {
    if exponent == 0 {
        return DenseTensor::delta(base.dim());
    }
    let positive = if exponent < 0 { base.inverse()? } else { base.clone() };
    let mut acc = positive.clone();
    for _ in 1..exponent.unsigned_abs() {
        acc = acc.inner_product(&IndexSeq::from([2]), &positive, &IndexSeq::from([1]))?;
    }
    Ok(acc)
}

// =============================================================================
// TENSOR-TO-SCALAR EVALUATION
// =============================================================================

/// Evaluate a tensor-to-scalar expression.
///
/// # Errors
/// `SymbolUnbound` for missing bindings, `DomainError` for shape or
/// numeric failures.
pub fn eval_t2s(expr: &TensorScalarExpr, bindings: &Bindings) -> Result<f64, EvalError> {
    match expr.kind() {
        TensorScalarKind::Zero => Ok(0.0),
        TensorScalarKind::One => Ok(1.0),
        TensorScalarKind::ScalarWrapper(s) => eval_scalar(s, bindings),
        TensorScalarKind::Trace(t) => eval_tensor(t, bindings)?.trace(),
        TensorScalarKind::Det(t) => eval_tensor(t, bindings)?.det(),
        TensorScalarKind::Norm(t) => Ok(eval_tensor(t, bindings)?.norm()),
        TensorScalarKind::Dot(t) => Ok(eval_tensor(t, bindings)?.dot()),
        TensorScalarKind::Log(g) => {
            let value = eval_t2s(g, bindings)?;
            if value <= 0.0 {
                return Err(EvalError::domain(format!("log of {value}")));
            }
            Ok(value.ln())
        }
        TensorScalarKind::Neg(g) => Ok(-eval_t2s(g, bindings)?),
        TensorScalarKind::Pow { base, exp } => {
            Ok(eval_t2s(base, bindings)?.powf(eval_t2s(exp, bindings)?))
        }
        TensorScalarKind::InnerToScalar { lhs, rhs } => {
            let a = eval_tensor(lhs, bindings)?;
            let b = eval_tensor(rhs, bindings)?;
            if a.dim() != b.dim() || a.rank() != b.rank() {
                return Err(EvalError::domain("dot_product: shape mismatch"));
            }
            Ok(a.data().iter().zip(b.data().iter()).map(|(x, y)| x * y).sum())
        }
        TensorScalarKind::WithScalarMul { scalar, expr: g } => {
            Ok(eval_scalar(scalar, bindings)? * eval_t2s(g, bindings)?)
        }
        TensorScalarKind::WithScalarDiv { expr: g, scalar } => {
            let divisor = eval_scalar(scalar, bindings)?;
            if divisor == 0.0 {
                return Err(EvalError::domain("tensor-to-scalar / scalar: division by zero"));
            }
            Ok(eval_t2s(g, bindings)? / divisor)
        }
        TensorScalarKind::ScalarDivT2s { scalar, expr: g } => {
            let divisor = eval_t2s(g, bindings)?;
            if divisor == 0.0 {
                return Err(EvalError::domain("scalar / tensor-to-scalar: division by zero"));
            }
            Ok(eval_scalar(scalar, bindings)? / divisor)
        }
        TensorScalarKind::Add(map) => {
            let mut sum = 0.0;
            for term in map.values() {
                sum += eval_t2s(term, bindings)?;
            }
            Ok(sum)
        }
        TensorScalarKind::Mul(map) => {
            let mut product = 1.0;
            for factor in map.values() {
                product *= eval_t2s(factor, bindings)?;
            }
            Ok(product)
        }
    }
}
