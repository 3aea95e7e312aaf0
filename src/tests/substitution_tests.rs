use crate::{kronecker_delta, symb, symb_tensor, tensor_zero, trace};

const DIM: usize = 3;

#[test]
fn scalar_substitution_resimplifies() {
    let (x, y) = (symb("su_x1"), symb("su_y1"));
    let e = &x * &x + x.sin();
    let replaced = e.substitute(&x, &y).unwrap();
    assert_eq!(replaced, &y * &y + y.sin());
}

#[test]
fn scalar_substitution_with_expression() {
    // substituting x := y + 1 into 2*x; the product is not expanded
    let (x, y) = (symb("su_x2"), symb("su_y2"));
    let e = 2 * &x;
    let replaced = e.substitute(&x, &(&y + 1)).unwrap();
    assert_eq!(replaced, 2 * (&y + 1));
}

#[test]
fn scalar_substitution_can_collapse_to_constant() {
    let x = symb("su_x3");
    let e = &x * &x;
    let replaced = e.substitute(&x, &crate::constant(3)).unwrap();
    assert_eq!(replaced, crate::constant(9));
}

#[test]
fn substitute_requires_symbol() {
    let x = symb("su_x4");
    let e = x.sin();
    assert!(e.substitute(&e, &x).is_err());
}

#[test]
fn tensor_substitution_resimplifies() {
    let x = symb_tensor("su_X5", DIM, 2).unwrap();
    let y = symb_tensor("su_Y5", DIM, 2).unwrap();
    let e = &x + &y;
    // X := Y turns the sum into 2*Y
    let replaced = e.substitute(&x, &y).unwrap();
    assert_eq!(replaced, 2 * &y);
}

#[test]
fn tensor_substitution_with_zero() {
    let x = symb_tensor("su_X6", DIM, 2).unwrap();
    let y = symb_tensor("su_Y6", DIM, 2).unwrap();
    let product = &x * &y;
    let replaced = product.substitute(&x, &tensor_zero(DIM, 2)).unwrap();
    assert!(replaced.is_zero_expr());
}

#[test]
fn tensor_substitution_checks_shape() {
    let x = symb_tensor("su_X7", DIM, 2).unwrap();
    let v = symb_tensor("su_v7", DIM, 1).unwrap();
    let e = 2 * &x;
    assert!(e.substitute(&x, &v).is_err());
}

#[test]
fn tensor_substitution_into_delta_collapses_trace() {
    // tr(X) with X := I becomes the dimension
    let x = symb_tensor("su_X8", DIM, 2).unwrap();
    let e = 2 * &x;
    let replaced = e.substitute(&x, &kronecker_delta(DIM)).unwrap();
    assert_eq!(replaced.to_string(), "2*I");
    let tr = trace(&replaced).unwrap();
    assert_eq!(tr, crate::TensorScalarExpr::constant(6));
}
