use crate::{
    TensorScalarExpr, TensorScalarKind, det, dot, dot_product, kronecker_delta, norm, symb,
    symb_tensor, tensor_zero, trace,
};

const DIM: usize = 3;

#[test]
fn trace_of_delta_is_the_dimension() {
    let tr = trace(&kronecker_delta(DIM)).unwrap();
    assert_eq!(tr, TensorScalarExpr::constant(3));
}

#[test]
fn det_of_delta_is_one() {
    assert!(det(&kronecker_delta(DIM)).unwrap().is_one_expr());
}

#[test]
fn reductions_of_zero() {
    let zero = tensor_zero(DIM, 2);
    assert!(trace(&zero).unwrap().is_zero_expr());
    assert!(det(&zero).unwrap().is_zero_expr());
    assert!(norm(&zero).unwrap().is_zero_expr());
    assert!(dot(&zero).unwrap().is_zero_expr());
}

#[test]
fn trace_is_linear_in_scalar_coefficients() {
    let x = symb_tensor("t2s_X1", DIM, 2).unwrap();
    let tr = trace(&(2 * &x)).unwrap();
    assert_eq!(tr, trace(&x).unwrap().with_scalar_mul(&crate::constant(2)));
    assert_eq!(tr.to_string(), "2*tr(t2s_X1)");

    let negated = trace(&-&x).unwrap();
    assert_eq!(negated, -trace(&x).unwrap());
}

#[test]
fn trace_of_transpose() {
    let x = symb_tensor("t2s_X2", DIM, 2).unwrap();
    assert_eq!(trace(&x.trans().unwrap()).unwrap(), trace(&x).unwrap());
}

#[test]
fn trace_of_skew_operand_vanishes() {
    let w = symb_tensor("t2s_W1", DIM, 2).unwrap();
    w.assume_skew().unwrap();
    assert!(trace(&w).unwrap().is_zero_expr());

    let d = symb_tensor("t2s_D1", DIM, 2).unwrap();
    d.assume_deviatoric().unwrap();
    assert!(trace(&d).unwrap().is_zero_expr());
}

#[test]
fn norm_pulls_out_absolute_coefficients() {
    let x = symb_tensor("t2s_X3", DIM, 2).unwrap();
    let scaled = norm(&(-2 * &x)).unwrap();
    assert_eq!(scaled, norm(&x).unwrap().with_scalar_mul(&crate::constant(2)));
    // norm(-x) = norm(x)
    assert_eq!(norm(&-&x).unwrap(), norm(&x).unwrap());
}

#[test]
fn reductions_reject_wrong_rank() {
    let v = symb_tensor("t2s_v1", DIM, 1).unwrap();
    assert!(trace(&v).is_err());
    assert!(det(&v).is_err());
    // the Frobenius norm applies to any rank
    assert!(norm(&v).is_ok());
}

#[test]
fn like_terms_merge() {
    let x = symb_tensor("t2s_X4", DIM, 2).unwrap();
    let tr = trace(&x).unwrap();
    let doubled = &tr + &tr;
    assert_eq!(doubled.to_string(), "2*tr(t2s_X4)");
    assert!((&tr - &tr).is_zero_expr());
}

#[test]
fn products_merge_powers() {
    let x = symb_tensor("t2s_X5", DIM, 2).unwrap();
    let tr = trace(&x).unwrap();
    let squared = &tr * &tr;
    assert_eq!(squared, tr.powi(2).unwrap());
    let cubed = &squared * &tr;
    assert_eq!(cubed, tr.powi(3).unwrap());
}

#[test]
fn division_cancels() {
    let x = symb_tensor("t2s_X6", DIM, 2).unwrap();
    let tr = trace(&x).unwrap();
    assert!((&tr / &tr).is_one_expr());
    assert!(tr.div_expr(&TensorScalarExpr::zero()).is_err());
}

#[test]
fn pow_identities() {
    let x = symb_tensor("t2s_X7", DIM, 2).unwrap();
    let tr = trace(&x).unwrap();
    assert!(tr.powi(0).unwrap().is_one_expr());
    assert_eq!(tr.powi(1).unwrap(), tr);
    let nested = tr.powi(2).unwrap().powi(3).unwrap();
    assert_eq!(nested, tr.powi(6).unwrap());
}

#[test]
fn scalar_coefficients_compose() {
    let x = symb_tensor("t2s_X8", DIM, 2).unwrap();
    let s = symb("t2s_s8");
    let tr = trace(&x).unwrap();
    let combined = tr.with_scalar_mul(&s).with_scalar_mul(&s);
    match combined.kind() {
        TensorScalarKind::WithScalarMul { scalar, .. } => {
            assert_eq!(*scalar, s.powi(2).unwrap());
        }
        other => panic!("expected WithScalarMul, got {other:?}"),
    }
}

#[test]
fn wrapped_scalars_fold() {
    let s = symb("t2s_s9");
    let wrapped = TensorScalarExpr::wrap(&s);
    // wrapping is transparent for the constants
    assert!(TensorScalarExpr::wrap(&crate::zero()).is_zero_expr());
    assert!(TensorScalarExpr::wrap(&crate::one()).is_one_expr());
    // wrapped scalars multiply in the scalar domain
    let squared = (&wrapped * &wrapped).to_string();
    assert_eq!(squared, "pow(t2s_s9,2)");
}

#[test]
fn dot_product_requires_matching_shapes() {
    let x = symb_tensor("t2s_X10", DIM, 2).unwrap();
    let v = symb_tensor("t2s_v10", DIM, 1).unwrap();
    assert!(dot_product(&x, &v).is_err());
    let y = symb_tensor("t2s_Y10", DIM, 2).unwrap();
    assert!(dot_product(&x, &y).is_ok());
}

#[test]
fn log_identities() {
    let x = symb_tensor("t2s_X11", DIM, 2).unwrap();
    assert!(TensorScalarExpr::one().log().is_zero_expr());
    let tr = trace(&x).unwrap();
    assert_eq!(tr.log().to_string(), "log(tr(t2s_X11))");
}
