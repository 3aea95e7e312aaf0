//! Error types for expression construction, queries and evaluation
//!
//! This module provides:
//! - `CasError` - The main error enum for all construction/query failures
//! - `EvalError` - Errors raised by the numeric evaluator

use std::fmt;

/// Errors that can occur while constructing or querying expressions.
///
/// Every constructor that would violate an invariant fails with one of
/// these instead of returning a malformed handle. Nothing is caught
/// internally; errors surface through the factory or query that detected
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CasError {
    /// Incompatible dim or rank on a binary tensor operation.
    ShapeMismatch {
        /// The operation that failed (e.g. "tensor add").
        op: &'static str,
        /// Description of the two shapes involved.
        detail: String,
    },
    /// A contraction index is out of range or duplicated.
    IndexError {
        /// The operation that failed.
        op: &'static str,
        /// Description of the offending sequence.
        detail: String,
    },
    /// An operation was invoked across incompatible domains.
    DomainMismatch {
        /// The operation that failed.
        op: &'static str,
        /// What went wrong.
        detail: String,
    },
    /// Division by a numeric or symbolic zero.
    DivisionByZero {
        /// The operation that failed.
        op: &'static str,
    },
    /// An operation on an empty or otherwise unusable handle.
    InvalidExpression {
        /// What went wrong.
        detail: String,
    },
    /// An internal invariant was violated (e.g. duplicate insertion into
    /// an n-ary container).
    InternalError {
        /// What went wrong.
        detail: String,
    },
    /// A simplification rule or numeric path is not supported for the
    /// given input.
    NotImplemented {
        /// The operation that failed.
        op: &'static str,
        /// What is unsupported.
        detail: String,
    },
}

impl CasError {
    /// Shorthand for a `ShapeMismatch` naming two (dim, rank) pairs.
    pub fn shape(op: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        CasError::ShapeMismatch {
            op,
            detail: format!(
                "lhs is dim {} rank {}, rhs is dim {} rank {}",
                lhs.0, lhs.1, rhs.0, rhs.1
            ),
        }
    }

    /// Shorthand for an `IndexError` with a formatted detail.
    pub fn index(op: &'static str, detail: impl Into<String>) -> Self {
        CasError::IndexError {
            op,
            detail: detail.into(),
        }
    }

    /// Shorthand for a `NotImplemented` with a formatted detail.
    pub fn not_implemented(op: &'static str, detail: impl Into<String>) -> Self {
        CasError::NotImplemented {
            op,
            detail: detail.into(),
        }
    }

    /// Shorthand for an `InternalError`.
    pub fn internal(detail: impl Into<String>) -> Self {
        CasError::InternalError {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasError::ShapeMismatch { op, detail } => {
                write!(f, "shape mismatch in {op}: {detail}")
            }
            CasError::IndexError { op, detail } => {
                write!(f, "index error in {op}: {detail}")
            }
            CasError::DomainMismatch { op, detail } => {
                write!(f, "domain mismatch in {op}: {detail}")
            }
            CasError::DivisionByZero { op } => {
                write!(f, "division by zero in {op}")
            }
            CasError::InvalidExpression { detail } => {
                write!(f, "invalid expression: {detail}")
            }
            CasError::InternalError { detail } => {
                write!(f, "internal invariant violated: {detail}")
            }
            CasError::NotImplemented { op, detail } => {
                write!(f, "not implemented in {op}: {detail}")
            }
        }
    }
}

impl std::error::Error for CasError {}

/// Errors raised by the numeric evaluator.
///
/// Kept separate from [`CasError`]: the evaluator is a collaborator of the
/// core, and its failures never leak into expression construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    /// A tensor dimension is outside the supported range.
    DimOutOfRange {
        /// The dimension that was requested.
        dim: usize,
        /// The operation that failed.
        op: &'static str,
    },
    /// A tensor rank is outside the supported range.
    RankOutOfRange {
        /// The rank that was requested.
        rank: usize,
        /// The operation that failed.
        op: &'static str,
    },
    /// A symbol has no binding.
    SymbolUnbound {
        /// The unbound symbol's name.
        name: String,
    },
    /// The expression cannot be evaluated numerically (wrong domain,
    /// division by zero, log of a non-positive value, ...).
    DomainError {
        /// What went wrong.
        detail: String,
    },
}

impl EvalError {
    /// Shorthand for a `DomainError` with a formatted detail.
    pub fn domain(detail: impl Into<String>) -> Self {
        EvalError::DomainError {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DimOutOfRange { dim, op } => {
                write!(f, "dim {dim} out of range in {op}")
            }
            EvalError::RankOutOfRange { rank, op } => {
                write!(f, "rank {rank} out of range in {op}")
            }
            EvalError::SymbolUnbound { name } => {
                write!(f, "symbol '{name}' has no binding")
            }
            EvalError::DomainError { detail } => {
                write!(f, "evaluation domain error: {detail}")
            }
        }
    }
}

impl std::error::Error for EvalError {}
