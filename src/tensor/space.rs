//! The tensor-space lattice.
//!
//! A rank-2 tensor's space is a pair of a permutation class and a trace
//! class. Deviatoric and volumetric tensors are symmetric by convention
//! (`P_vol + P_dev = P_sym`), so assuming either also fixes the
//! permutation class.

/// Permutation symmetry class of a rank-2 tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PermClass {
    /// No known permutation symmetry.
    #[default]
    Any,
    /// Invariant under index transposition.
    Symmetric,
    /// Negated by index transposition.
    Skew,
}

/// Trace class of a rank-2 tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraceClass {
    /// No known trace structure.
    #[default]
    Any,
    /// Trace-free.
    Deviatoric,
    /// Proportional to the identity.
    Volumetric,
}

/// The space a tensor is known to live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TensorSpace {
    /// Permutation symmetry class.
    pub perm: PermClass,
    /// Trace class.
    pub trace: TraceClass,
}

impl TensorSpace {
    /// The top element: nothing is known.
    pub const ANY: TensorSpace = TensorSpace {
        perm: PermClass::Any,
        trace: TraceClass::Any,
    };

    /// Symmetric tensors.
    pub const SYMMETRIC: TensorSpace = TensorSpace {
        perm: PermClass::Symmetric,
        trace: TraceClass::Any,
    };

    /// Skew-symmetric tensors.
    pub const SKEW: TensorSpace = TensorSpace {
        perm: PermClass::Skew,
        trace: TraceClass::Any,
    };

    /// Symmetric trace-free tensors.
    pub const DEVIATORIC: TensorSpace = TensorSpace {
        perm: PermClass::Symmetric,
        trace: TraceClass::Deviatoric,
    };

    /// Multiples of the identity.
    pub const VOLUMETRIC: TensorSpace = TensorSpace {
        perm: PermClass::Symmetric,
        trace: TraceClass::Volumetric,
    };

    /// Pointwise join, used when propagating through sums: the sum of a
    /// symmetric and a skew tensor has no known symmetry.
    #[must_use]
    pub fn join(self, other: TensorSpace) -> TensorSpace {
        TensorSpace {
            perm: if self.perm == other.perm {
                self.perm
            } else {
                PermClass::Any
            },
            trace: if self.trace == other.trace {
                self.trace
            } else {
                TraceClass::Any
            },
        }
    }

    /// Space of an integer power `t^n` (n >= 2): a skew operand squares
    /// to a symmetric tensor, a deviatoric operand loses its trace class,
    /// a volumetric operand stays volumetric.
    #[must_use]
    pub fn pow(self) -> TensorSpace {
        TensorSpace {
            perm: match self.perm {
                PermClass::Skew | PermClass::Symmetric => PermClass::Symmetric,
                PermClass::Any => PermClass::Any,
            },
            trace: match self.trace {
                TraceClass::Volumetric => TraceClass::Volumetric,
                TraceClass::Deviatoric | TraceClass::Any => TraceClass::Any,
            },
        }
    }

    /// Space of the inverse: the permutation class survives, volumetric
    /// stays volumetric, but `tr(D^-1)` is unconstrained for deviatoric
    /// operands.
    #[must_use]
    pub fn inv(self) -> TensorSpace {
        TensorSpace {
            perm: self.perm,
            trace: match self.trace {
                TraceClass::Volumetric => TraceClass::Volumetric,
                TraceClass::Deviatoric | TraceClass::Any => TraceClass::Any,
            },
        }
    }
}

// =============================================================================
// PROJECTOR TAGS
// =============================================================================

/// Tag of one of the four rank-4 projectors (and of the matching
/// functional forms `sym`, `skew`, `vol`, `dev`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    /// Symmetric part.
    Sym,
    /// Skew part.
    Skew,
    /// Volumetric part.
    Vol,
    /// Deviatoric part.
    Dev,
}

impl SpaceKind {
    /// Name of the functional form: `sym`, `skew`, `vol`, `dev`.
    pub fn func_name(self) -> &'static str {
        match self {
            SpaceKind::Sym => "sym",
            SpaceKind::Skew => "skew",
            SpaceKind::Vol => "vol",
            SpaceKind::Dev => "dev",
        }
    }

    /// Name of the projector node: `P_sym`, `P_skew`, `P_vol`, `P_dev`.
    pub fn projector_name(self) -> &'static str {
        match self {
            SpaceKind::Sym => "P_sym",
            SpaceKind::Skew => "P_skew",
            SpaceKind::Vol => "P_vol",
            SpaceKind::Dev => "P_dev",
        }
    }

    /// The space a projection lands in.
    pub fn space(self) -> TensorSpace {
        match self {
            SpaceKind::Sym => TensorSpace::SYMMETRIC,
            SpaceKind::Skew => TensorSpace::SKEW,
            SpaceKind::Vol => TensorSpace::VOLUMETRIC,
            SpaceKind::Dev => TensorSpace::DEVIATORIC,
        }
    }

    /// True when a tensor of space `s` already lies in this subspace, so
    /// the projection is the identity on it.
    pub fn keeps(self, s: TensorSpace) -> bool {
        match self {
            SpaceKind::Sym => s.perm == PermClass::Symmetric,
            SpaceKind::Skew => s.perm == PermClass::Skew,
            SpaceKind::Vol => s.trace == TraceClass::Volumetric,
            SpaceKind::Dev => s.trace == TraceClass::Deviatoric,
        }
    }

    /// True when a tensor of space `s` is orthogonal to this subspace, so
    /// the projection annihilates it.
    pub fn kills(self, s: TensorSpace) -> bool {
        match self {
            SpaceKind::Sym => s.perm == PermClass::Skew,
            SpaceKind::Skew => s.perm == PermClass::Symmetric,
            SpaceKind::Vol => s.trace == TraceClass::Deviatoric || s.perm == PermClass::Skew,
            SpaceKind::Dev => s.trace == TraceClass::Volumetric || s.perm == PermClass::Skew,
        }
    }

    /// Projector composition `P_a : P_b`; `None` means the product is the
    /// zero tensor.
    pub fn compose(self, other: SpaceKind) -> Option<SpaceKind> {
        use SpaceKind::*;
        match (self, other) {
            (a, b) if a == b => Some(a),
            (Sym, Vol) | (Vol, Sym) => Some(Vol),
            (Sym, Dev) | (Dev, Sym) => Some(Dev),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_of_sym_and_skew_is_any() {
        let joined = TensorSpace::SYMMETRIC.join(TensorSpace::SKEW);
        assert_eq!(joined.perm, PermClass::Any);
    }

    #[test]
    fn join_is_idempotent() {
        assert_eq!(
            TensorSpace::DEVIATORIC.join(TensorSpace::DEVIATORIC),
            TensorSpace::DEVIATORIC
        );
    }

    #[test]
    fn pow_downgrades() {
        assert_eq!(TensorSpace::SKEW.pow(), TensorSpace::SYMMETRIC);
        assert_eq!(TensorSpace::DEVIATORIC.pow(), TensorSpace::SYMMETRIC);
        assert_eq!(TensorSpace::VOLUMETRIC.pow(), TensorSpace::VOLUMETRIC);
    }

    #[test]
    fn inv_keeps_perm_and_vol() {
        assert_eq!(TensorSpace::SKEW.inv(), TensorSpace::SKEW);
        assert_eq!(TensorSpace::VOLUMETRIC.inv(), TensorSpace::VOLUMETRIC);
        assert_eq!(TensorSpace::DEVIATORIC.inv(), TensorSpace::SYMMETRIC);
    }

    #[test]
    fn projector_composition() {
        assert_eq!(SpaceKind::Sym.compose(SpaceKind::Sym), Some(SpaceKind::Sym));
        assert_eq!(SpaceKind::Sym.compose(SpaceKind::Vol), Some(SpaceKind::Vol));
        assert_eq!(SpaceKind::Sym.compose(SpaceKind::Skew), None);
        assert_eq!(SpaceKind::Vol.compose(SpaceKind::Dev), None);
    }
}
