//! Scalar expression domain.
//!
//! Scalar expressions are immutable `Arc`-shared nodes with a cached
//! structural hash and an assumption cell. Every compound constructor runs
//! the simplifier, so a handle always refers to a canonical form:
//! `x + x` is `2*x` the moment it is built.
//!
//! # Example
//! ```
//! use symtensor::ScalarExpr;
//!
//! let x = ScalarExpr::symbol("doc_scalar_x");
//! let e = x.clone() * x.clone() * x.clone();
//! assert_eq!(e.to_string(), "pow(doc_scalar_x,3)");
//! ```

pub(crate) mod assume;
pub(crate) mod diff;
mod display;
pub(crate) mod ops;
pub(crate) mod simplify;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::AnyExpr;
use crate::core::assumptions::AssumptionCell;
use crate::core::error::CasError;
use crate::core::hash::{combine, commutative, hash_one, ordered};
use crate::core::nary::NaryMap;
use crate::core::number::Number;
use crate::symbol::{self, SymbolId};

// =============================================================================
// KINDS
// =============================================================================

/// Built-in unary scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFn {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Inverse sine.
    Asin,
    /// Inverse cosine.
    Acos,
    /// Inverse tangent.
    Atan,
    /// Natural exponential.
    Exp,
    /// Natural logarithm.
    Log,
    /// Square root.
    Sqrt,
    /// Sign function.
    Sign,
    /// Absolute value.
    Abs,
}

impl ScalarFn {
    /// The function's printed name.
    pub fn name(self) -> &'static str {
        match self {
            ScalarFn::Sin => "sin",
            ScalarFn::Cos => "cos",
            ScalarFn::Tan => "tan",
            ScalarFn::Asin => "asin",
            ScalarFn::Acos => "acos",
            ScalarFn::Atan => "atan",
            ScalarFn::Exp => "exp",
            ScalarFn::Log => "log",
            ScalarFn::Sqrt => "sqrt",
            ScalarFn::Sign => "sign",
            ScalarFn::Abs => "abs",
        }
    }
}

/// The structure of a scalar expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    /// A named symbol (interned through the global registry).
    Symbol(SymbolId),
    /// The additive identity.
    Zero,
    /// The multiplicative identity.
    One,
    /// A numeric constant other than zero and one.
    Constant(Number),
    /// A named wrapper around a subexpression.
    Named {
        /// The display name.
        name: Arc<str>,
        /// The wrapped expression.
        expr: ScalarExpr,
    },
    /// Negation.
    Neg(ScalarExpr),
    /// A unary function application.
    Unary(ScalarFn, ScalarExpr),
    /// Exponentiation.
    Pow(ScalarExpr, ScalarExpr),
    /// N-ary sum; the coefficient slot accumulates numeric addends.
    Add(NaryMap<ScalarExpr>),
    /// N-ary product; the coefficient slot accumulates numeric factors.
    Mul(NaryMap<ScalarExpr>),
}

// =============================================================================
// NODE AND HANDLE
// =============================================================================

#[derive(Debug)]
pub(crate) struct ScalarNode {
    kind: ScalarKind,
    hash: u64,
    pub(crate) assumptions: AssumptionCell<crate::core::assumptions::AssumptionSet>,
}

/// Handle to an immutable scalar expression node.
///
/// Cloning is cheap (an `Arc` bump). Equality is structural with a hash
/// fast-reject; two equal expressions may live in distinct allocations.
#[derive(Debug, Clone)]
pub struct ScalarExpr(Arc<ScalarNode>);

impl PartialEq for ScalarExpr {
    fn eq(&self, other: &Self) -> bool {
        if self.0.hash != other.0.hash {
            return false;
        }
        self.0.kind == other.0.kind
    }
}

impl std::hash::Hash for ScalarExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

// Variant tags mixed into the structural hash.
const TAG_SYMBOL: u64 = 0x0101;
const TAG_ZERO: u64 = 0x0102;
const TAG_ONE: u64 = 0x0103;
const TAG_CONSTANT: u64 = 0x0104;
const TAG_NAMED: u64 = 0x0105;
const TAG_NEG: u64 = 0x0106;
const TAG_UNARY: u64 = 0x0107;
const TAG_POW: u64 = 0x0108;
const TAG_ADD: u64 = 0x0109;
const TAG_MUL: u64 = 0x010a;

fn nary_hash(tag: u64, map: &NaryMap<ScalarExpr>) -> u64 {
    let base = commutative(tag, map.values().map(ScalarExpr::content_hash));
    match map.coeff() {
        Some(c) => combine(base, c.content_hash()),
        None => base,
    }
}

fn compute_hash(kind: &ScalarKind) -> u64 {
    match kind {
        // Symbols hash by name so reconstruction is hash-stable.
        ScalarKind::Symbol(id) => combine(TAG_SYMBOL, hash_one(&id.name())),
        ScalarKind::Zero => ordered(TAG_ZERO, []),
        ScalarKind::One => ordered(TAG_ONE, []),
        ScalarKind::Constant(n) => combine(TAG_CONSTANT, n.content_hash()),
        ScalarKind::Named { name, expr } => combine(
            combine(TAG_NAMED, hash_one(&&**name)),
            expr.content_hash(),
        ),
        ScalarKind::Neg(x) => combine(TAG_NEG, x.content_hash()),
        ScalarKind::Unary(func, x) => {
            combine(combine(TAG_UNARY, *func as u64), x.content_hash())
        }
        ScalarKind::Pow(base, exp) => {
            ordered(TAG_POW, [base.content_hash(), exp.content_hash()])
        }
        ScalarKind::Add(map) => nary_hash(TAG_ADD, map),
        ScalarKind::Mul(map) => nary_hash(TAG_MUL, map),
    }
}

impl ScalarExpr {
    pub(crate) fn from_kind(kind: ScalarKind) -> ScalarExpr {
        let hash = compute_hash(&kind);
        ScalarExpr(Arc::new(ScalarNode {
            kind,
            hash,
            assumptions: AssumptionCell::new(),
        }))
    }

    pub(crate) fn from_symbol(id: SymbolId) -> ScalarExpr {
        ScalarExpr::from_kind(ScalarKind::Symbol(id))
    }

    pub(crate) fn node(&self) -> &ScalarNode {
        &self.0
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The node's structure.
    pub fn kind(&self) -> &ScalarKind {
        &self.0.kind
    }

    /// The cached structural hash.
    pub fn content_hash(&self) -> u64 {
        self.0.hash
    }

    /// Immediate subexpressions, in deterministic order.
    pub fn children(&self) -> Vec<AnyExpr> {
        match self.kind() {
            ScalarKind::Symbol(_)
            | ScalarKind::Zero
            | ScalarKind::One
            | ScalarKind::Constant(_) => Vec::new(),
            ScalarKind::Named { expr, .. }
            | ScalarKind::Neg(expr)
            | ScalarKind::Unary(_, expr) => vec![AnyExpr::Scalar(expr.clone())],
            ScalarKind::Pow(base, exp) => vec![
                AnyExpr::Scalar(base.clone()),
                AnyExpr::Scalar(exp.clone()),
            ],
            ScalarKind::Add(map) | ScalarKind::Mul(map) => sorted_terms(map)
                .into_iter()
                .map(|t| AnyExpr::Scalar(t.clone()))
                .collect(),
        }
    }

    /// True when this is the zero node.
    pub fn is_zero_expr(&self) -> bool {
        matches!(self.kind(), ScalarKind::Zero)
    }

    /// True when this is the one node.
    pub fn is_one_expr(&self) -> bool {
        matches!(self.kind(), ScalarKind::One)
    }

    /// The numeric value, if this node is a constant.
    pub fn as_constant(&self) -> Option<Number> {
        match self.kind() {
            ScalarKind::Zero => Some(Number::Int(0)),
            ScalarKind::One => Some(Number::Int(1)),
            ScalarKind::Constant(n) => Some(*n),
            _ => None,
        }
    }

    /// The symbol identity, if this node is a symbol.
    pub(crate) fn as_symbol(&self) -> Option<&SymbolId> {
        match self.kind() {
            ScalarKind::Symbol(id) => Some(id),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Leaf factories
    // -------------------------------------------------------------------------

    /// The zero expression.
    pub fn zero() -> ScalarExpr {
        ScalarExpr::from_kind(ScalarKind::Zero)
    }

    /// The one expression.
    pub fn one() -> ScalarExpr {
        ScalarExpr::from_kind(ScalarKind::One)
    }

    /// A numeric constant. Zero and one normalize to their dedicated
    /// nodes, so `constant(0) == zero()`.
    pub fn constant(value: impl Into<Number>) -> ScalarExpr {
        let n = value.into();
        if num_traits::Zero::is_zero(&n) {
            ScalarExpr::zero()
        } else if n.is_one() {
            ScalarExpr::one()
        } else {
            ScalarExpr::from_kind(ScalarKind::Constant(n))
        }
    }

    /// The interned symbol with the given name. Repeated calls return the
    /// same node, so assumptions persist across call sites.
    pub fn symbol(name: &str) -> ScalarExpr {
        symbol::intern_scalar(name)
    }

    /// A named wrapper around a subexpression; prints as its name.
    pub fn named(name: &str, expr: &ScalarExpr) -> ScalarExpr {
        ScalarExpr::from_kind(ScalarKind::Named {
            name: Arc::from(name),
            expr: expr.clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Compound factories (all run the simplifier)
    // -------------------------------------------------------------------------

    /// Negation.
    pub fn neg_expr(&self) -> ScalarExpr {
        simplify::neg(self)
    }

    /// Sum.
    pub fn add_expr(&self, rhs: &ScalarExpr) -> ScalarExpr {
        simplify::add(self, rhs)
    }

    /// Difference.
    pub fn sub_expr(&self, rhs: &ScalarExpr) -> ScalarExpr {
        simplify::add(self, &simplify::neg(rhs))
    }

    /// Product.
    ///
    /// # Errors
    /// Propagates failures from exponent merging (`x * pow(x, e)`).
    pub fn mul_expr(&self, rhs: &ScalarExpr) -> Result<ScalarExpr, CasError> {
        simplify::mul(self, rhs)
    }

    /// Quotient, canonicalized to `lhs * pow(rhs, -1)`.
    ///
    /// # Errors
    /// `DivisionByZero` when `rhs` is the numeric zero.
    pub fn div_expr(&self, rhs: &ScalarExpr) -> Result<ScalarExpr, CasError> {
        simplify::div(self, rhs)
    }

    /// Exponentiation.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero base with a negative constant exponent.
    pub fn pow_expr(&self, exp: &ScalarExpr) -> Result<ScalarExpr, CasError> {
        simplify::pow(self, exp)
    }

    /// Convenience power with an integer exponent.
    ///
    /// # Errors
    /// Same as [`ScalarExpr::pow_expr`].
    pub fn powi(&self, exp: i64) -> Result<ScalarExpr, CasError> {
        simplify::pow(self, &ScalarExpr::constant(exp))
    }

    /// Replace a symbol with another scalar expression, rebuilding through
    /// the factories so everything re-simplifies.
    ///
    /// # Errors
    /// `InvalidExpression` when `from` is not a symbol.
    pub fn substitute(
        &self,
        from: &ScalarExpr,
        to: &ScalarExpr,
    ) -> Result<ScalarExpr, CasError> {
        simplify::substitute(self, from, to)
    }
}

// =============================================================================
// UNARY FUNCTION FACTORIES
// =============================================================================

macro_rules! scalar_unary_fns {
    ($(($method:ident, $variant:ident, $doc:literal)),* $(,)?) => {
        impl ScalarExpr {
            $(
                #[doc = $doc]
                pub fn $method(&self) -> ScalarExpr {
                    simplify::unary(ScalarFn::$variant, self)
                }
            )*
        }
    };
}

scalar_unary_fns![
    (sin, Sin, "Sine."),
    (cos, Cos, "Cosine."),
    (tan, Tan, "Tangent."),
    (asin, Asin, "Inverse sine."),
    (acos, Acos, "Inverse cosine."),
    (atan, Atan, "Inverse tangent."),
    (exp, Exp, "Natural exponential."),
    (log, Log, "Natural logarithm."),
    (sqrt, Sqrt, "Square root."),
    (sign, Sign, "Sign function."),
    (abs, Abs, "Absolute value."),
];

// =============================================================================
// CANONICAL ORDERING
// =============================================================================

fn kind_class(kind: &ScalarKind) -> u8 {
    match kind {
        ScalarKind::Zero | ScalarKind::One | ScalarKind::Constant(_) => 0,
        ScalarKind::Symbol(_) => 1,
        ScalarKind::Named { .. } => 2,
        ScalarKind::Unary(..) => 3,
        ScalarKind::Pow(..) => 4,
        ScalarKind::Neg(_) => 5,
        ScalarKind::Add(_) => 6,
        ScalarKind::Mul(_) => 7,
    }
}

/// Deterministic structural ordering: constants first (by value), then
/// symbols alphabetically, then compound kinds; ties break on the
/// structural hash.
pub(crate) fn scalar_cmp(a: &ScalarExpr, b: &ScalarExpr) -> Ordering {
    let (ca, cb) = (kind_class(a.kind()), kind_class(b.kind()));
    if ca != cb {
        return ca.cmp(&cb);
    }
    match (a.kind(), b.kind()) {
        (ScalarKind::Symbol(x), ScalarKind::Symbol(y)) => x.cmp(y),
        (ScalarKind::Named { name: x, .. }, ScalarKind::Named { name: y, .. }) => x.cmp(y),
        (ScalarKind::Unary(f, x), ScalarKind::Unary(g, y)) => f
            .name()
            .cmp(g.name())
            .then_with(|| scalar_cmp(x, y)),
        (ScalarKind::Pow(bx, ex), ScalarKind::Pow(by, ey)) => {
            scalar_cmp(bx, by).then_with(|| scalar_cmp(ex, ey))
        }
        (ScalarKind::Neg(x), ScalarKind::Neg(y)) => scalar_cmp(x, y),
        _ => {
            if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant())
                && let Some(ord) = x.partial_cmp(&y)
            {
                return ord;
            }
            a.content_hash().cmp(&b.content_hash())
        }
    }
}

/// Terms of an n-ary container in canonical print order: sorted by the
/// coefficient-stripped core, then by coefficient (`x` before `2*x`).
pub(crate) fn sorted_terms(map: &NaryMap<ScalarExpr>) -> Vec<&ScalarExpr> {
    let mut terms: Vec<&ScalarExpr> = map.values().collect();
    terms.sort_by(|a, b| {
        let (coeff_a, core_a) = simplify::split_coeff(a);
        let (coeff_b, core_b) = simplify::split_coeff(b);
        scalar_cmp(&core_a, &core_b).then_with(|| {
            coeff_a.partial_cmp(&coeff_b).unwrap_or(Ordering::Equal)
        })
    });
    terms
}
