use crate::{
    TensorExpr, TensorKind, det, diff, dot, dot_product, identity_tensor,
    kronecker_delta, norm, projector_sym, symb, symb_tensor, tensor_zero, trace,
};

const DIM: usize = 3;

fn t(name: &str) -> TensorExpr {
    symb_tensor(name, DIM, 2).unwrap()
}

// ─── Scalar rules ──────────────────────────────────────────────────────

#[test]
fn scalar_power_rule() {
    // d(x^2)/dx = 2*x
    let x = symb("d_x1");
    let d = diff(&x.powi(2).unwrap(), &x).unwrap();
    assert_eq!(d, 2 * &x);
}

#[test]
fn scalar_trig_rules() {
    let x = symb("d_x2");
    assert_eq!(diff(&x.sin(), &x).unwrap(), x.cos());
    assert_eq!(diff(&x.cos(), &x).unwrap(), -x.sin());
    assert_eq!(diff(&x.exp(), &x).unwrap(), x.exp());
}

#[test]
fn scalar_log_and_sqrt_rules() {
    let x = symb("d_x3");
    // log' = 1/x
    assert_eq!(diff(&x.log(), &x).unwrap(), crate::one() / &x);
    // sqrt' = 1/(2*sqrt(x))
    let expected = crate::one() / (2 * x.sqrt());
    assert_eq!(diff(&x.sqrt(), &x).unwrap(), expected);
}

#[test]
fn scalar_linearity_and_leibniz() {
    let (x, y) = (symb("d_x4"), symb("d_y4"));
    let e = &x * &y + x.sin();
    let d = diff(&e, &x).unwrap();
    assert_eq!(d, &y + x.cos());
}

#[test]
fn scalar_chain_rule() {
    // d sin(x^2)/dx = cos(x^2) * 2x
    let x = symb("d_x5");
    let inner = x.powi(2).unwrap();
    let d = diff(&inner.sin(), &x).unwrap();
    assert_eq!(d, inner.cos() * (2 * &x));
}

#[test]
fn scalar_general_power_rule() {
    // d(x^x)/dx = x^x * (log(x) + 1)
    let x = symb("d_x6");
    let e = x.pow_expr(&x).unwrap();
    let d = diff(&e, &x).unwrap();
    let expected = &e * (x.log() + 1);
    assert_eq!(d, expected);
}

#[test]
fn scalar_independent_symbol() {
    let (x, y) = (symb("d_x7"), symb("d_y7"));
    assert!(diff(&y, &x).unwrap().is_zero_expr());
    assert!(diff(&crate::constant(5), &x).unwrap().is_zero_expr());
    let d_self = diff(&x, &x).unwrap();
    assert!(d_self.is_one_expr());
}

#[test]
fn scalar_by_tensor_is_zero() {
    let x = symb("d_x8");
    let big_x = t("d_X8");
    let d: TensorExpr = diff(&x.sin(), &big_x).unwrap();
    assert!(d.is_zero_expr());
    assert_eq!(d.shape(), (DIM, 2));
}

// ─── Tensor rules ──────────────────────────────────────────────────────

#[test]
fn tensor_self_derivative_is_identity() {
    let x = t("d_X9");
    let d = diff(&x, &x).unwrap();
    assert_eq!(d, identity_tensor(DIM, 4).unwrap());
}

#[test]
fn tensor_other_derivative_is_zero() {
    let (x, y) = (t("d_X10"), t("d_Y10"));
    let d = diff(&y, &x).unwrap();
    assert!(d.is_zero_expr());
    assert_eq!(d.shape(), (DIM, 4));
}

#[test]
fn tensor_addition_rule() {
    let (x, y) = (t("d_X11"), t("d_Y11"));
    let d = diff(&(&x + &y), &x).unwrap();
    assert_eq!(d, identity_tensor(DIM, 4).unwrap());
}

#[test]
fn tensor_negation_rule() {
    let x = t("d_X12");
    let d = diff(&-&x, &x).unwrap();
    assert_eq!(d, -identity_tensor(DIM, 4).unwrap());
}

#[test]
fn tensor_scalar_mul_rule() {
    let x = t("d_X13");
    let d = diff(&(2 * &x), &x).unwrap();
    assert_eq!(d, 2 * identity_tensor(DIM, 4).unwrap());
}

#[test]
fn tensor_constants_have_zero_derivative() {
    let x = t("d_X14");
    assert!(diff(&tensor_zero(DIM, 2), &x).unwrap().is_zero_expr());
    assert!(diff(&kronecker_delta(DIM), &x).unwrap().is_zero_expr());
}

#[test]
fn tensor_power_rule_produces_sum_of_contractions() {
    // d(X^2)/dX is a sum of two contraction terms
    let x = t("d_X15");
    let d = diff(&x.powi(2).unwrap(), &x).unwrap();
    match d.kind() {
        TensorKind::Add(map) => assert_eq!(map.len(), 2),
        other => panic!("expected Add, got {other:?}"),
    }
    assert_eq!(d.shape(), (DIM, 4));
}

#[test]
fn product_rule_leaves_no_zero_artifacts() {
    // d(X * trans(X))/dX must not retain zero terms
    let x = t("d_X16");
    let c = &x * x.trans().unwrap();
    let d = diff(&c, &x).unwrap();
    let rendered = d.to_string();
    assert!(!rendered.contains("0*"), "zero artifact in {rendered}");
    assert!(!rendered.contains("*0"), "zero artifact in {rendered}");
    assert!(
        !rendered.contains("permute_indices(0"),
        "zero artifact in {rendered}"
    );
}

#[test]
fn basis_change_rule_extends_permutation() {
    let x = t("d_X17");
    let d = diff(&x.trans().unwrap(), &x).unwrap();
    match d.kind() {
        TensorKind::BasisChange { perm, .. } => {
            assert_eq!(perm.as_slice(), &[2, 1, 3, 4]);
        }
        other => panic!("expected BasisChange, got {other:?}"),
    }
}

// ─── Space-aware self-derivatives ──────────────────────────────────────

#[test]
fn self_derivative_uses_assumed_projector() {
    let c = t("d_C18");
    c.assume_symmetric().unwrap();
    let d = diff(&c, &c).unwrap();
    assert_eq!(d, projector_sym(DIM));
    assert_eq!(d.to_string(), "P_sym{4}");

    let w = t("d_W18");
    w.assume_skew().unwrap();
    assert_eq!(diff(&w, &w).unwrap().to_string(), "P_skew{4}");

    let dtens = t("d_D18");
    dtens.assume_deviatoric().unwrap();
    assert_eq!(diff(&dtens, &dtens).unwrap().to_string(), "P_dev{4}");

    let v = t("d_V18");
    v.assume_volumetric().unwrap();
    assert_eq!(diff(&v, &v).unwrap().to_string(), "P_vol{4}");
}

#[test]
fn scalar_mul_of_symmetric_symbol() {
    let c = t("d_C19");
    c.assume_symmetric().unwrap();
    assert_eq!(diff(&(2 * &c), &c).unwrap().to_string(), "2*P_sym{4}");
    assert_eq!(diff(&-&c, &c).unwrap().to_string(), "-P_sym{4}");
    assert_eq!(diff(&(&c + &c), &c).unwrap().to_string(), "2*P_sym{4}");
}

// ─── Tensor-to-scalar rules ────────────────────────────────────────────

#[test]
fn trace_derivative_is_delta() {
    // d tr(X)/dX = I
    let x = t("d_X20");
    let d = diff(&trace(&x).unwrap(), &x).unwrap();
    assert_eq!(d, kronecker_delta(DIM));
}

#[test]
fn trace_of_independent_symbol() {
    let (x, y) = (t("d_X21"), t("d_Y21"));
    let d = diff(&trace(&x).unwrap(), &y).unwrap();
    assert!(d.is_zero_expr());
    assert_eq!(d.shape(), (DIM, 2));
}

#[test]
fn dot_derivative() {
    // d(Y : Y)/dY = 2*Y
    let y = t("d_Y22");
    let d = diff(&dot(&y).unwrap(), &y).unwrap();
    assert_eq!(d, 2 * &y);
}

#[test]
fn dot_product_normalizes_to_dot() {
    let y = t("d_Y23");
    let f = dot_product(&y, &y).unwrap();
    let d = diff(&f, &y).unwrap();
    assert_eq!(d, 2 * &y);
}

#[test]
fn norm_derivative() {
    // d norm(Y)/dY = Y / norm(Y)
    let y = t("d_Y24");
    let d = diff(&norm(&y).unwrap(), &y).unwrap();
    let expected = &y / &norm(&y).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn det_derivative() {
    // d det(X)/dX = det(X) * inv(trans(X))
    let x = t("d_X25");
    let d = diff(&det(&x).unwrap(), &x).unwrap();
    let expected = &det(&x).unwrap() * &x.trans().unwrap().inv().unwrap();
    assert_eq!(d, expected);
    assert_eq!(d.to_string(), "det(d_X25)*inv(trans(d_X25))");
}

#[test]
fn t2s_negation_and_sums() {
    let y = t("d_Y26");
    let tr = trace(&y).unwrap();
    let d = diff(&-&tr, &y).unwrap();
    assert_eq!(d, -kronecker_delta(DIM));

    let f = &tr + &norm(&y).unwrap();
    let d = diff(&f, &y).unwrap();
    let expected = kronecker_delta(DIM) + &y / &norm(&y).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn t2s_product_rule() {
    // d(tr * norm) = I * norm + tr * (Y/norm)
    let y = t("d_Y27");
    let tr = trace(&y).unwrap();
    let n = norm(&y).unwrap();
    let d = diff(&(&tr * &n), &y).unwrap();
    let expected = &n * &kronecker_delta(DIM) + &tr * &(&y / &n);
    assert_eq!(d, expected);
}

#[test]
fn t2s_with_scalar_combinations() {
    let y = t("d_Y28");
    let tr = trace(&y).unwrap();
    let three = symb("d_s28");

    // d(s * tr) = s * I
    let d = diff(&tr.with_scalar_mul(&three), &y).unwrap();
    assert_eq!(d, &three * &kronecker_delta(DIM));

    // d(s + tr) = I
    let d = diff(&tr.with_scalar_add(&three), &y).unwrap();
    assert_eq!(d, kronecker_delta(DIM));

    // d(tr / s) = I / s
    let d = diff(&tr.with_scalar_div(&three).unwrap(), &y).unwrap();
    assert_eq!(d, kronecker_delta(DIM).scalar_div(&three).unwrap());
}

#[test]
fn t2s_log_chain() {
    // d log(norm(Y)) = (Y/norm)/norm
    let y = t("d_Y29");
    let n = norm(&y).unwrap();
    let d = diff(&n.log(), &y).unwrap();
    let expected = (&y / &n) / &n;
    assert_eq!(d, expected);
}

#[test]
fn t2s_shifted_log_chain() {
    // d log(tr(Y) + 2) = I / (tr(Y) + 2)
    let y = t("d_Y30");
    let shifted = trace(&y).unwrap() + 2;
    let d = diff(&shifted.log(), &y).unwrap();
    let expected = kronecker_delta(DIM).field_div(&shifted).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn t2s_pow_with_constant_exponent() {
    // d(tr^3) = 3 * tr^2 * I
    let y = t("d_Y31");
    let tr = trace(&y).unwrap();
    let d = diff(&tr.powi(3).unwrap(), &y).unwrap();
    let front = tr.powi(2).unwrap().with_scalar_mul(&crate::constant(3));
    let expected = &front * &kronecker_delta(DIM);
    assert_eq!(d, expected);
}

#[test]
fn t2s_zero_and_one_derivatives() {
    let y = t("d_Y32");
    let d = diff(&crate::TensorScalarExpr::one(), &y).unwrap();
    assert!(d.is_zero_expr());
    let d = diff(&crate::TensorScalarExpr::zero(), &y).unwrap();
    assert!(d.is_zero_expr());
    assert_eq!(d.shape(), (DIM, 2));
}

#[test]
fn chain_rule_through_symmetric_argument() {
    // d tr(C)/dC with symmetric C: I : P_sym = sym(I) = I
    let c = t("d_C33");
    c.assume_symmetric().unwrap();
    let d = diff(&trace(&c).unwrap(), &c).unwrap();
    assert_eq!(d, kronecker_delta(DIM));

    // d(C : C)/dC = 2*C
    let d = diff(&dot(&c).unwrap(), &c).unwrap();
    assert_eq!(d, 2 * &c);
}

#[test]
fn derivative_state_does_not_leak() {
    let (x, y) = (t("d_X34"), t("d_Y34"));
    let d1 = diff(&trace(&y).unwrap(), &y).unwrap();
    assert_eq!(d1, kronecker_delta(DIM));
    // an independent follow-up call must come out zero
    let d2 = diff(&trace(&x).unwrap(), &y).unwrap();
    assert!(d2.is_zero_expr());
}
