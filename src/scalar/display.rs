//! Plain-text formatting for scalar expressions.
//!
//! Sums print their numeric coefficient first and their terms in the
//! canonical order; powers print functionally as `pow(base,exp)`.

use std::fmt;

use crate::scalar::{ScalarExpr, ScalarKind, sorted_terms};

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ScalarKind::Zero => write!(f, "0"),
            ScalarKind::One => write!(f, "1"),
            ScalarKind::Constant(n) => write!(f, "{n}"),
            ScalarKind::Symbol(id) => write!(f, "{}", id.name()),
            ScalarKind::Named { name, .. } => write!(f, "{name}"),
            ScalarKind::Neg(inner) => {
                write!(f, "-")?;
                write_tight(f, inner)
            }
            ScalarKind::Unary(func, inner) => write!(f, "{}({inner})", func.name()),
            ScalarKind::Pow(base, exp) => write!(f, "pow({base},{exp})"),
            ScalarKind::Add(map) => {
                let mut first = true;
                if let Some(c) = map.coeff() {
                    write!(f, "{c}")?;
                    first = false;
                }
                for term in sorted_terms(map) {
                    let rendered = term.to_string();
                    if !first && !rendered.starts_with('-') {
                        write!(f, "+")?;
                    }
                    write!(f, "{rendered}")?;
                    first = false;
                }
                Ok(())
            }
            ScalarKind::Mul(map) => {
                let mut first = true;
                if let Some(c) = map.coeff() {
                    write!(f, "{c}")?;
                    first = false;
                }
                for factor in sorted_terms(map) {
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

/// Write a subexpression that appears inside a product or under a leading
/// minus; sums get parenthesized.
fn write_tight(f: &mut fmt::Formatter<'_>, expr: &ScalarExpr) -> fmt::Result {
    if matches!(expr.kind(), ScalarKind::Add(_)) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}
