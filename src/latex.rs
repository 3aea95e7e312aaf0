//! LaTeX rendering.
//!
//! Tensor symbols are typeset with a font macro chosen by rank through
//! [`LatexConfig`]; rank-2 tensors default to boldface and rank-4 tensors
//! to blackboard bold.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::scalar::{ScalarExpr, ScalarKind, sorted_terms};
use crate::tensor::{TensorExpr, TensorKind, sorted_tensor_terms};
use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind, sorted_t2s_terms};

/// Configuration for the LaTeX printer: a mapping from tensor rank to the
/// font macro used for symbols of that rank.
#[derive(Debug, Clone)]
pub struct LatexConfig {
    rank_macros: FxHashMap<usize, String>,
}

impl Default for LatexConfig {
    fn default() -> Self {
        let mut rank_macros = FxHashMap::default();
        rank_macros.insert(2, "\\mathbf".to_owned());
        rank_macros.insert(4, "\\mathbb".to_owned());
        LatexConfig { rank_macros }
    }
}

impl LatexConfig {
    /// Override the font macro for a rank.
    pub fn set_rank_macro(&mut self, rank: usize, command: &str) -> &mut Self {
        self.rank_macros.insert(rank, command.to_owned());
        self
    }

    fn wrap(&self, rank: usize, name: &str) -> String {
        match self.rank_macros.get(&rank) {
            Some(command) => format!("{command}{{{name}}}"),
            None => name.to_owned(),
        }
    }
}

impl ScalarExpr {
    /// Render as LaTeX.
    pub fn to_latex(&self) -> String {
        scalar_latex(self)
    }
}

impl TensorExpr {
    /// Render as LaTeX under a printer configuration.
    pub fn to_latex(&self, cfg: &LatexConfig) -> String {
        tensor_latex(self, cfg)
    }
}

impl TensorScalarExpr {
    /// Render as LaTeX under a printer configuration.
    pub fn to_latex(&self, cfg: &LatexConfig) -> String {
        t2s_latex(self, cfg)
    }
}

fn join_sum(parts: Vec<String>) -> String {
    let mut out = String::new();
    for part in parts {
        if !out.is_empty() && !part.starts_with('-') {
            out.push('+');
        }
        out.push_str(&part);
    }
    out
}

fn scalar_latex(expr: &ScalarExpr) -> String {
    match expr.kind() {
        ScalarKind::Zero => "0".to_owned(),
        ScalarKind::One => "1".to_owned(),
        ScalarKind::Constant(n) => n.to_string(),
        ScalarKind::Symbol(id) => id.name().to_owned(),
        ScalarKind::Named { name, .. } => name.to_string(),
        ScalarKind::Neg(inner) => format!("-{}", scalar_latex_tight(inner)),
        ScalarKind::Unary(func, inner) => {
            format!("\\{}\\left({}\\right)", func.name(), scalar_latex(inner))
        }
        ScalarKind::Pow(base, exp) => format!(
            "{{{}}}^{{{}}}",
            scalar_latex_tight(base),
            scalar_latex(exp)
        ),
        ScalarKind::Add(map) => {
            let mut parts = Vec::new();
            if let Some(c) = map.coeff() {
                parts.push(c.to_string());
            }
            parts.extend(sorted_terms(map).into_iter().map(scalar_latex));
            join_sum(parts)
        }
        ScalarKind::Mul(map) => {
            let mut out = String::new();
            if let Some(c) = map.coeff() {
                let _ = write!(out, "{c}");
            }
            for factor in sorted_terms(map) {
                if !out.is_empty() {
                    out.push_str(" \\cdot ");
                }
                out.push_str(&scalar_latex_tight(factor));
            }
            out
        }
    }
}

fn scalar_latex_tight(expr: &ScalarExpr) -> String {
    if matches!(expr.kind(), ScalarKind::Add(_)) {
        format!("\\left({}\\right)", scalar_latex(expr))
    } else {
        scalar_latex(expr)
    }
}

fn tensor_latex(expr: &TensorExpr, cfg: &LatexConfig) -> String {
    match expr.kind() {
        TensorKind::Symbol { id, rank, .. } => cfg.wrap(*rank, id.name()),
        TensorKind::Zero { .. } => "\\mathbf{0}".to_owned(),
        TensorKind::Delta { .. } => cfg.wrap(2, "I"),
        TensorKind::Identity { rank, .. } => cfg.wrap(*rank, "I"),
        TensorKind::Projector { space, .. } => {
            let name = match space {
                crate::tensor::SpaceKind::Sym => "\\mathbb{P}^{sym}",
                crate::tensor::SpaceKind::Skew => "\\mathbb{P}^{skew}",
                crate::tensor::SpaceKind::Vol => "\\mathbb{P}^{vol}",
                crate::tensor::SpaceKind::Dev => "\\mathbb{P}^{dev}",
            };
            name.to_owned()
        }
        TensorKind::Neg(inner) => format!("-{}", tensor_latex_tight(inner, cfg)),
        TensorKind::Inv(inner) => format!("{{{}}}^{{-1}}", tensor_latex_tight(inner, cfg)),
        TensorKind::Pow { base, exp } => format!(
            "{{{}}}^{{{}}}",
            tensor_latex_tight(base, cfg),
            scalar_latex(exp)
        ),
        TensorKind::BasisChange { expr: inner, perm } => {
            if inner.rank() == 2 && perm.as_slice() == [2, 1] {
                format!("{{{}}}^{{T}}", tensor_latex_tight(inner, cfg))
            } else {
                format!(
                    "\\pi_{{{perm}}}\\left({}\\right)",
                    tensor_latex(inner, cfg)
                )
            }
        }
        TensorKind::Symmetry { expr: inner, .. } => {
            format!("\\mathcal{{S}}\\left({}\\right)", tensor_latex(inner, cfg))
        }
        TensorKind::Part { space, expr: inner } => format!(
            "\\operatorname{{{}}}\\left({}\\right)",
            space.func_name(),
            tensor_latex(inner, cfg)
        ),
        TensorKind::Inner { lhs, rhs, .. } => format!(
            "{} : {}",
            tensor_latex_tight(lhs, cfg),
            tensor_latex_tight(rhs, cfg)
        ),
        TensorKind::Outer { lhs, rhs, .. } => format!(
            "{} \\otimes {}",
            tensor_latex_tight(lhs, cfg),
            tensor_latex_tight(rhs, cfg)
        ),
        TensorKind::SimpleOuter(factors) => {
            let parts: Vec<String> = factors
                .iter()
                .map(|f| tensor_latex_tight(f, cfg))
                .collect();
            parts.join(" \\otimes ")
        }
        TensorKind::ScalarMul { coeff, expr: inner } => format!(
            "{} \\, {}",
            scalar_latex_tight(coeff),
            tensor_latex_tight(inner, cfg)
        ),
        TensorKind::ScalarDiv { expr: inner, coeff } => format!(
            "\\frac{{{}}}{{{}}}",
            tensor_latex(inner, cfg),
            scalar_latex(coeff)
        ),
        TensorKind::FieldMul { field, expr: inner } => format!(
            "{} \\, {}",
            t2s_latex(field, cfg),
            tensor_latex_tight(inner, cfg)
        ),
        TensorKind::FieldDiv { expr: inner, field } => format!(
            "\\frac{{{}}}{{{}}}",
            tensor_latex(inner, cfg),
            t2s_latex(field, cfg)
        ),
        TensorKind::Add(map) => {
            let parts: Vec<String> = sorted_tensor_terms(map)
                .into_iter()
                .map(|t| tensor_latex(t, cfg))
                .collect();
            join_sum(parts)
        }
        TensorKind::Mul(factors) => {
            let parts: Vec<String> = factors
                .iter()
                .map(|f| tensor_latex_tight(f, cfg))
                .collect();
            parts.join(" \\cdot ")
        }
    }
}

fn tensor_latex_tight(expr: &TensorExpr, cfg: &LatexConfig) -> String {
    if matches!(expr.kind(), TensorKind::Add(_)) {
        format!("\\left({}\\right)", tensor_latex(expr, cfg))
    } else {
        tensor_latex(expr, cfg)
    }
}

fn t2s_latex(expr: &TensorScalarExpr, cfg: &LatexConfig) -> String {
    match expr.kind() {
        TensorScalarKind::Zero => "0".to_owned(),
        TensorScalarKind::One => "1".to_owned(),
        TensorScalarKind::ScalarWrapper(s) => scalar_latex(s),
        TensorScalarKind::Trace(t) => {
            format!("\\operatorname{{tr}}\\left({}\\right)", tensor_latex(t, cfg))
        }
        TensorScalarKind::Det(t) => {
            format!("\\det\\left({}\\right)", tensor_latex(t, cfg))
        }
        TensorScalarKind::Norm(t) => {
            format!("\\left\\lVert {} \\right\\rVert", tensor_latex(t, cfg))
        }
        TensorScalarKind::Dot(t) => {
            let rendered = tensor_latex_tight(t, cfg);
            format!("{rendered} : {rendered}")
        }
        TensorScalarKind::Log(g) => format!("\\ln\\left({}\\right)", t2s_latex(g, cfg)),
        TensorScalarKind::Neg(g) => format!("-{}", t2s_latex_tight(g, cfg)),
        TensorScalarKind::Pow { base, exp } => format!(
            "{{{}}}^{{{}}}",
            t2s_latex_tight(base, cfg),
            t2s_latex(exp, cfg)
        ),
        TensorScalarKind::InnerToScalar { lhs, rhs } => format!(
            "{} : {}",
            tensor_latex_tight(lhs, cfg),
            tensor_latex_tight(rhs, cfg)
        ),
        TensorScalarKind::WithScalarMul { scalar, expr: g } => format!(
            "{} \\, {}",
            scalar_latex_tight(scalar),
            t2s_latex_tight(g, cfg)
        ),
        TensorScalarKind::WithScalarDiv { expr: g, scalar } => format!(
            "\\frac{{{}}}{{{}}}",
            t2s_latex(g, cfg),
            scalar_latex(scalar)
        ),
        TensorScalarKind::ScalarDivT2s { scalar, expr: g } => format!(
            "\\frac{{{}}}{{{}}}",
            scalar_latex(scalar),
            t2s_latex(g, cfg)
        ),
        TensorScalarKind::Add(map) => {
            let parts: Vec<String> = sorted_t2s_terms(map)
                .into_iter()
                .map(|t| t2s_latex(t, cfg))
                .collect();
            join_sum(parts)
        }
        TensorScalarKind::Mul(map) => {
            let parts: Vec<String> = sorted_t2s_terms(map)
                .into_iter()
                .map(|t| t2s_latex_tight(t, cfg))
                .collect();
            parts.join(" \\cdot ")
        }
    }
}

fn t2s_latex_tight(expr: &TensorScalarExpr, cfg: &LatexConfig) -> String {
    if matches!(expr.kind(), TensorScalarKind::Add(_)) {
        format!("\\left({}\\right)", t2s_latex(expr, cfg))
    } else {
        t2s_latex(expr, cfg)
    }
}
