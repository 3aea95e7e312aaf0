//! Core building blocks shared by all three expression domains:
//! - `Number` - exact numeric scalar (integer / rational / real)
//! - `CasError` / `EvalError` - error types
//! - `AssumptionSet` and the epoch-tagged propagation cache
//! - `NaryMap` - the hash-keyed n-ary Add/Mul container
//! - `IndexSeq` / `Permutation` - 1-based contraction index plumbing
//! - structural hashing primitives

pub(crate) mod assumptions;
pub(crate) mod error;
pub(crate) mod hash;
pub(crate) mod index;
pub(crate) mod nary;
pub(crate) mod number;

pub use assumptions::{Assumption, AssumptionSet};
pub use error::{CasError, EvalError};
pub use index::{IndexSeq, Permutation};
pub use nary::NaryMap;
pub use number::Number;
