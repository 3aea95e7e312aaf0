//! Cross-domain differentiation surface.
//!
//! The output domain is fixed by the (expression, argument) pair:
//! - scalar by scalar symbol -> scalar
//! - tensor by tensor symbol -> tensor of rank `rank_expr + rank_arg`
//! - tensor-to-scalar by tensor symbol -> tensor of rank `rank_arg`
//! - scalar by tensor symbol -> the zero tensor (scalars contain no
//!   tensor symbols)

use crate::core::error::CasError;
use crate::scalar::ScalarExpr;
use crate::tensor::TensorExpr;
use crate::tensor_scalar::TensorScalarExpr;

/// Symbolic differentiation with a domain-determined output type.
pub trait Differentiate<Arg> {
    /// The derivative's domain.
    type Output;

    /// Differentiate with respect to `arg`, which must be a symbol.
    ///
    /// # Errors
    /// `InvalidExpression` when `arg` is not a symbol; rule-specific
    /// errors otherwise.
    fn diff(&self, arg: &Arg) -> Result<Self::Output, CasError>;
}

impl Differentiate<ScalarExpr> for ScalarExpr {
    type Output = ScalarExpr;

    fn diff(&self, arg: &ScalarExpr) -> Result<ScalarExpr, CasError> {
        crate::scalar::diff::diff_scalar(self, arg)
    }
}

impl Differentiate<TensorExpr> for TensorExpr {
    type Output = TensorExpr;

    fn diff(&self, arg: &TensorExpr) -> Result<TensorExpr, CasError> {
        crate::tensor::diff::diff_tensor(self, arg)
    }
}

impl Differentiate<TensorExpr> for TensorScalarExpr {
    type Output = TensorExpr;

    fn diff(&self, arg: &TensorExpr) -> Result<TensorExpr, CasError> {
        crate::tensor_scalar::diff::diff_t2s(self, arg)
    }
}

impl Differentiate<TensorExpr> for ScalarExpr {
    type Output = TensorExpr;

    fn diff(&self, arg: &TensorExpr) -> Result<TensorExpr, CasError> {
        if arg.as_symbol().is_none() {
            return Err(CasError::InvalidExpression {
                detail: "differentiation argument must be a tensor symbol".to_owned(),
            });
        }
        Ok(TensorExpr::zero(arg.dim(), arg.rank()))
    }
}

/// Differentiate an expression with respect to a symbol.
///
/// # Errors
/// See [`Differentiate::diff`].
pub fn diff<E, A>(expr: &E, arg: &A) -> Result<E::Output, CasError>
where
    E: Differentiate<A>,
{
    expr.diff(arg)
}
