//! Plain-text formatting for tensor-to-scalar expressions.

use std::fmt;

use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind, sorted_t2s_terms};

impl fmt::Display for TensorScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TensorScalarKind::Zero => write!(f, "0"),
            TensorScalarKind::One => write!(f, "1"),
            TensorScalarKind::ScalarWrapper(s) => write!(f, "{s}"),
            TensorScalarKind::Trace(t) => write!(f, "tr({t})"),
            TensorScalarKind::Det(t) => write!(f, "det({t})"),
            TensorScalarKind::Norm(t) => write!(f, "norm({t})"),
            TensorScalarKind::Dot(t) => write!(f, "dot({t})"),
            TensorScalarKind::Log(g) => write!(f, "log({g})"),
            TensorScalarKind::Neg(g) => {
                write!(f, "-")?;
                write_tight(f, g)
            }
            TensorScalarKind::Pow { base, exp } => write!(f, "pow({base},{exp})"),
            TensorScalarKind::InnerToScalar { lhs, rhs } => {
                write!(f, "dot_product({lhs},{rhs})")
            }
            TensorScalarKind::WithScalarMul { scalar, expr } => {
                let coeff = scalar.to_string();
                let interior_minus = coeff.chars().skip(1).any(|c| c == '-');
                if coeff.contains('+') || interior_minus {
                    write!(f, "({coeff})*")?;
                } else {
                    write!(f, "{coeff}*")?;
                }
                write_tight(f, expr)
            }
            TensorScalarKind::WithScalarDiv { expr, scalar } => {
                write_tight(f, expr)?;
                write!(f, "/{scalar}")
            }
            TensorScalarKind::ScalarDivT2s { scalar, expr } => {
                write!(f, "{scalar}/")?;
                write_tight(f, expr)
            }
            TensorScalarKind::Add(map) => {
                let mut first = true;
                for term in sorted_t2s_terms(map) {
                    let rendered = term.to_string();
                    if !first && !rendered.starts_with('-') {
                        write!(f, "+")?;
                    }
                    write!(f, "{rendered}")?;
                    first = false;
                }
                Ok(())
            }
            TensorScalarKind::Mul(map) => {
                let mut first = true;
                for factor in sorted_t2s_terms(map) {
                    if !first {
                        write!(f, "*")?;
                    }
                    write_tight(f, factor)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

fn write_tight(f: &mut fmt::Formatter<'_>, expr: &TensorScalarExpr) -> fmt::Result {
    if matches!(expr.kind(), TensorScalarKind::Add(_)) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}
