//! Plain-text formatting for tensor expressions.
//!
//! Follows the projector notation `P_sym{4}`, the delta shorthand `I`,
//! and functional printing for powers, parts and contractions.

use std::fmt;

use crate::tensor::{TensorExpr, TensorKind, sorted_tensor_terms};

impl fmt::Display for TensorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TensorKind::Symbol { id, .. } => write!(f, "{}", id.name()),
            TensorKind::Zero { .. } => write!(f, "0"),
            TensorKind::Delta { .. } => write!(f, "I"),
            TensorKind::Identity { rank, .. } => write!(f, "I{{{rank}}}"),
            TensorKind::Projector { space, .. } => {
                write!(f, "{}{{4}}", space.projector_name())
            }
            TensorKind::Neg(inner) => {
                write!(f, "-")?;
                write_tight(f, inner)
            }
            TensorKind::Inv(inner) => write!(f, "inv({inner})"),
            TensorKind::Pow { base, exp } => write!(f, "pow({base},{exp})"),
            TensorKind::BasisChange { expr, perm } => {
                if expr.rank() == 2 && perm.as_slice() == [2, 1] {
                    write!(f, "trans({expr})")
                } else {
                    write!(f, "permute_indices({expr},{perm})")
                }
            }
            TensorKind::Symmetry { expr, perms } => {
                write!(f, "symmetrize({expr}")?;
                for perm in perms {
                    write!(f, ",{perm}")?;
                }
                write!(f, ")")
            }
            TensorKind::Part { space, expr } => {
                write!(f, "{}({expr})", space.func_name())
            }
            TensorKind::Inner {
                lhs,
                lhs_idx,
                rhs,
                rhs_idx,
            } => write!(f, "inner_product({lhs},{lhs_idx},{rhs},{rhs_idx})"),
            TensorKind::Outer {
                lhs,
                lhs_pos,
                rhs,
                rhs_pos,
            } => write!(f, "outer_product({lhs},{lhs_pos},{rhs},{rhs_pos})"),
            TensorKind::ScalarMul { coeff, expr } => {
                write_coeff(f, &coeff.to_string())?;
                write!(f, "*")?;
                write_tight(f, expr)
            }
            TensorKind::ScalarDiv { expr, coeff } => {
                write_tight(f, expr)?;
                write!(f, "/")?;
                write_coeff(f, &coeff.to_string())
            }
            TensorKind::FieldMul { field, expr } => {
                write!(f, "{field}*")?;
                write_tight(f, expr)
            }
            TensorKind::FieldDiv { expr, field } => {
                write_tight(f, expr)?;
                write!(f, "/{field}")
            }
            TensorKind::Add(map) => {
                let mut first = true;
                for term in sorted_tensor_terms(map) {
                    let rendered = term.to_string();
                    if !first && !rendered.starts_with('-') {
                        write!(f, "+")?;
                    }
                    write!(f, "{rendered}")?;
                    first = false;
                }
                Ok(())
            }
            TensorKind::Mul(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write_tight(f, factor)?;
                }
                Ok(())
            }
            TensorKind::SimpleOuter(factors) => {
                write!(f, "otimes(")?;
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{factor}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_tight(f: &mut fmt::Formatter<'_>, expr: &TensorExpr) -> fmt::Result {
    if matches!(expr.kind(), TensorKind::Add(_)) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Scalar coefficients print without parentheses when atomic.
fn write_coeff(f: &mut fmt::Formatter<'_>, rendered: &str) -> fmt::Result {
    let interior_minus = rendered.chars().skip(1).any(|c| c == '-');
    if rendered.contains('+') || interior_minus {
        write!(f, "({rendered})")
    } else {
        write!(f, "{rendered}")
    }
}
