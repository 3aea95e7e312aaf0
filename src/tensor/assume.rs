//! Tensor-space assumptions and propagation.
//!
//! Space assumptions are set on tensor symbols and propagated bottom-up:
//! scalar multiples and negations keep their operand's space, sums join,
//! powers and inverses downgrade per the lattice rules.

use crate::core::error::CasError;
use crate::tensor::space::{PermClass, TensorSpace, TraceClass};
use crate::tensor::{TensorExpr, TensorKind};

impl TensorExpr {
    fn assume_space(&self, update: impl FnOnce(TensorSpace) -> TensorSpace) -> Result<(), CasError> {
        if self.as_symbol().is_none() {
            return Err(CasError::DomainMismatch {
                op: "assume",
                detail: "space assumptions can only be set on tensor symbols".to_owned(),
            });
        }
        let cell = &self.node().space;
        cell.set_user(update(cell.user()));
        Ok(())
    }

    /// Assume this symbol is symmetric.
    ///
    /// # Errors
    /// `DomainMismatch` on non-symbol nodes.
    pub fn assume_symmetric(&self) -> Result<(), CasError> {
        self.assume_space(|s| TensorSpace {
            perm: PermClass::Symmetric,
            trace: s.trace,
        })
    }

    /// Assume this symbol is skew-symmetric.
    ///
    /// # Errors
    /// `DomainMismatch` on non-symbol nodes.
    pub fn assume_skew(&self) -> Result<(), CasError> {
        self.assume_space(|s| TensorSpace {
            perm: PermClass::Skew,
            trace: s.trace,
        })
    }

    /// Assume this symbol is deviatoric (symmetric and trace-free).
    ///
    /// # Errors
    /// `DomainMismatch` on non-symbol nodes.
    pub fn assume_deviatoric(&self) -> Result<(), CasError> {
        self.assume_space(|_| TensorSpace::DEVIATORIC)
    }

    /// Assume this symbol is volumetric (a multiple of the identity).
    ///
    /// # Errors
    /// `DomainMismatch` on non-symbol nodes.
    pub fn assume_volumetric(&self) -> Result<(), CasError> {
        self.assume_space(|_| TensorSpace::VOLUMETRIC)
    }

    /// Drop all space assumptions from this symbol.
    ///
    /// # Errors
    /// `DomainMismatch` on non-symbol nodes.
    pub fn clear_space(&self) -> Result<(), CasError> {
        self.assume_space(|_| TensorSpace::ANY)
    }

    /// The propagated space of this expression.
    pub fn space(&self) -> TensorSpace {
        self.node().space.get_or_infer(|user| infer(self, user))
    }

    /// True when the expression is known to be symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.space().perm == PermClass::Symmetric
    }

    /// True when the expression is known to be skew-symmetric.
    pub fn is_skew(&self) -> bool {
        self.space().perm == PermClass::Skew
    }

    /// True when the expression is known to be deviatoric.
    pub fn is_deviatoric(&self) -> bool {
        self.space().trace == TraceClass::Deviatoric
    }

    /// True when the expression is known to be volumetric.
    pub fn is_volumetric(&self) -> bool {
        self.space().trace == TraceClass::Volumetric
    }
}

fn infer(expr: &TensorExpr, user: TensorSpace) -> TensorSpace {
    match expr.kind() {
        TensorKind::Symbol { .. } => user,
        // The delta is symmetric and proportional to itself.
        TensorKind::Delta { .. } => TensorSpace::VOLUMETRIC,
        TensorKind::Identity { .. }
        | TensorKind::Projector { .. }
        | TensorKind::Zero { .. } => TensorSpace::ANY,
        TensorKind::Neg(inner)
        | TensorKind::ScalarMul { expr: inner, .. }
        | TensorKind::ScalarDiv { expr: inner, .. }
        | TensorKind::FieldMul { expr: inner, .. }
        | TensorKind::FieldDiv { expr: inner, .. } => inner.space(),
        TensorKind::Part { space, .. } => space.space(),
        TensorKind::Pow { base, .. } => base.space().pow(),
        TensorKind::Inv(inner) => inner.space().inv(),
        TensorKind::Add(map) => {
            let mut spaces = map.values().map(TensorExpr::space);
            match spaces.next() {
                Some(first) => spaces.fold(first, TensorSpace::join),
                None => TensorSpace::ANY,
            }
        }
        TensorKind::BasisChange { expr: inner, .. } => {
            // The rank-2 transpose preserves both classes; general
            // permutations do not.
            if inner.rank() == 2 {
                inner.space()
            } else {
                TensorSpace::ANY
            }
        }
        TensorKind::Symmetry { .. }
        | TensorKind::Inner { .. }
        | TensorKind::Outer { .. }
        | TensorKind::Mul(_)
        | TensorKind::SimpleOuter(_) => TensorSpace::ANY,
    }
}
