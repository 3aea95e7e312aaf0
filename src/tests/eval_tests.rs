use crate::{
    Bindings, DenseTensor, EvalError, det, diff, dot, eval_scalar, eval_t2s,
    eval_tensor, norm, symb, symb_tensor, trace,
};

const DIM: usize = 3;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-10
}

fn sample_matrix() -> DenseTensor {
    DenseTensor::from_data(
        DIM,
        2,
        vec![2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 4.0],
    )
    .unwrap()
}

#[test]
fn scalar_evaluation() {
    let x = symb("ev_x1");
    let e = &x * &x + x.sin();
    let mut bindings = Bindings::new();
    bindings.bind_scalar("ev_x1", 2.0);
    let value = eval_scalar(&e, &bindings).unwrap();
    assert!(close(value, 4.0 + 2.0_f64.sin()));
}

#[test]
fn unbound_symbol_is_reported() {
    let x = symb("ev_x2");
    let err = eval_scalar(&x, &Bindings::new()).unwrap_err();
    assert!(matches!(err, EvalError::SymbolUnbound { .. }));
}

#[test]
fn tensor_evaluation_of_sums_and_products() {
    let x = symb_tensor("ev_X3", DIM, 2).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X3", sample_matrix());

    // X + X doubles every entry
    let doubled = eval_tensor(&(&x + &x), &bindings).unwrap();
    assert!(close(doubled.get(&[1, 1]), 6.0));

    // X * X is the matrix square
    let squared = eval_tensor(&x.powi(2).unwrap(), &bindings).unwrap();
    // (X^2)[0][0] = 2*2 + 1*1 + 0*0
    assert!(close(squared.get(&[0, 0]), 5.0));
}

#[test]
fn t2s_evaluation() {
    let x = symb_tensor("ev_X4", DIM, 2).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X4", sample_matrix());

    assert!(close(
        eval_t2s(&trace(&x).unwrap(), &bindings).unwrap(),
        9.0
    ));
    // det of the sample matrix: 2*(12-1) - 1*(4-0) + 0 = 18
    assert!(close(eval_t2s(&det(&x).unwrap(), &bindings).unwrap(), 18.0));
    let frobenius_sq: f64 = sample_matrix().data().iter().map(|v| v * v).sum();
    assert!(close(
        eval_t2s(&norm(&x).unwrap(), &bindings).unwrap(),
        frobenius_sq.sqrt()
    ));
    assert!(close(
        eval_t2s(&dot(&x).unwrap(), &bindings).unwrap(),
        frobenius_sq
    ));
}

#[test]
fn inverse_evaluation_round_trips() {
    let x = symb_tensor("ev_X5", DIM, 2).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X5", sample_matrix());

    let product = eval_tensor(&(&x * x.inv().unwrap()), &bindings).unwrap();
    let delta = DenseTensor::delta(DIM).unwrap();
    for (a, b) in product.data().iter().zip(delta.data().iter()) {
        assert!(close(*a, *b));
    }
}

#[test]
fn symbolic_trace_derivative_matches_numerics() {
    // d tr(X)/dX evaluates to the identity
    let x = symb_tensor("ev_X6", DIM, 2).unwrap();
    let derivative = diff(&trace(&x).unwrap(), &x).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X6", sample_matrix());
    let value = eval_tensor(&derivative, &bindings).unwrap();
    let delta = DenseTensor::delta(DIM).unwrap();
    assert_eq!(value, delta);
}

#[test]
fn symbolic_dot_derivative_matches_numerics() {
    // d (X : X)/dX = 2*X numerically
    let x = symb_tensor("ev_X7", DIM, 2).unwrap();
    let derivative = diff(&dot(&x).unwrap(), &x).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X7", sample_matrix());
    let value = eval_tensor(&derivative, &bindings).unwrap();
    let expected = sample_matrix().scaled(2.0);
    for (a, b) in value.data().iter().zip(expected.data().iter()) {
        assert!(close(*a, *b));
    }
}

#[test]
fn symbolic_det_derivative_matches_numerics() {
    // d det(X)/dX = det(X) * X^-T, checked entrywise
    let x = symb_tensor("ev_X8", DIM, 2).unwrap();
    let derivative = diff(&det(&x).unwrap(), &x).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X8", sample_matrix());
    let value = eval_tensor(&derivative, &bindings).unwrap();

    let sample = sample_matrix();
    let expected = sample
        .inverse()
        .unwrap()
        .transpose()
        .unwrap()
        .scaled(sample.det().unwrap());
    for (a, b) in value.data().iter().zip(expected.data().iter()) {
        assert!(close(*a, *b));
    }
}

#[test]
fn symbolic_matrix_power_derivative_matches_finite_difference() {
    // d(X^2)/dX against a central finite difference
    let x = symb_tensor("ev_X9", DIM, 2).unwrap();
    let derivative = diff(&x.powi(2).unwrap(), &x).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X9", sample_matrix());
    let value = eval_tensor(&derivative, &bindings).unwrap();
    assert_eq!(value.rank(), 4);

    let h = 1e-6;
    let square = |m: &DenseTensor| {
        m.inner_product(
            &crate::IndexSeq::from([2]),
            m,
            &crate::IndexSeq::from([1]),
        )
        .unwrap()
    };
    for k in 0..DIM {
        for l in 0..DIM {
            let mut plus = sample_matrix();
            plus.set(&[k, l], plus.get(&[k, l]) + h);
            let mut minus = sample_matrix();
            minus.set(&[k, l], minus.get(&[k, l]) - h);
            let delta = square(&plus).sub(&square(&minus)).unwrap().scaled(0.5 / h);
            for i in 0..DIM {
                for j in 0..DIM {
                    let symbolic = value.get(&[i, j, k, l]);
                    let numeric = delta.get(&[i, j]);
                    assert!(
                        (symbolic - numeric).abs() < 1e-4,
                        "entry ({i},{j},{k},{l}): {symbolic} vs {numeric}"
                    );
                }
            }
        }
    }
}

#[test]
fn shape_mismatch_in_bindings_is_reported() {
    let x = symb_tensor("ev_X10", DIM, 2).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind_tensor("ev_X10", DenseTensor::new(2, 2).unwrap());
    assert!(eval_tensor(&x, &bindings).is_err());
}
