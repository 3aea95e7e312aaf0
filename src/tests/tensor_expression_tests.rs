use crate::{
    IndexSeq, Permutation, TensorExpr, TensorKind, identity_tensor, inner_product,
    kronecker_delta, symb, symb_tensor, tensor_zero,
};

const DIM: usize = 3;

fn t(name: &str) -> TensorExpr {
    symb_tensor(name, DIM, 2).unwrap()
}

#[test]
fn delta_is_the_product_unit() {
    let x = t("te_X1");
    let delta = kronecker_delta(DIM);
    assert_eq!(&delta * &x, x);
    assert_eq!(&x * &delta, x);
    assert_eq!(delta.to_string(), "I");
}

#[test]
fn zero_annihilates_products() {
    let x = t("te_X2");
    let zero = tensor_zero(DIM, 2);
    assert!((&zero * &x).is_zero_expr());
    assert_eq!(zero.to_string(), "0");
}

#[test]
fn add_merges_like_terms() {
    let x = t("te_X3");
    assert_eq!((&x + &x).to_string(), "2*te_X3");
}

#[test]
fn sum_prints_in_canonical_order() {
    let (x, y, z) = (t("te_A"), t("te_B"), t("te_C"));
    assert_eq!((&z + &x + &y).to_string(), "te_A+te_B+te_C");
    assert_eq!((&z + &x + &y + &x).to_string(), "2*te_A+te_B+te_C");
    let doubled = (&z + &x + &y) + (&z + &x + &y);
    assert_eq!(doubled.to_string(), "2*te_A+2*te_B+2*te_C");
}

#[test]
fn sub_self_is_zero() {
    let x = t("te_X4");
    assert!((&x - &x).is_zero_expr());
    let sum = &x + t("te_Y4");
    assert!((&sum - &sum).is_zero_expr());
}

#[test]
fn repeated_factors_become_powers() {
    let x = t("te_X5");
    let y = t("te_Y5");
    assert_eq!((&x * &x).to_string(), "pow(te_X5,2)");
    assert_eq!((&x * &x * &x).to_string(), "pow(te_X5,3)");
    // order is preserved for distinct factors
    assert_eq!((&y * &x).to_string(), "te_Y5*te_X5");
    assert_eq!((&y * &x * &x).to_string(), "te_Y5*pow(te_X5,2)");
    assert_eq!((&y * &x * &y).to_string(), "te_Y5*te_X5*te_Y5");
    // power merging is associativity-independent
    let via_pow = x.powi(2).unwrap() * &x;
    assert_eq!(via_pow.to_string(), "pow(te_X5,3)");
}

#[test]
fn scalar_coefficients_pull_out() {
    let x = t("te_X6");
    let s = symb("te_s6");
    assert_eq!((&s * &x).to_string(), "te_s6*te_X6");
    assert_eq!((&x * &s).to_string(), "te_s6*te_X6");
    let squared = &s * (&x * &s);
    assert_eq!(squared.to_string(), "pow(te_s6,2)*te_X6");
}

#[test]
fn scalar_mul_identities() {
    let x = t("te_X7");
    assert_eq!(x.scalar_mul(&crate::one()).unwrap(), x);
    assert!(x.scalar_mul(&crate::zero()).unwrap().is_zero_expr());
    // nested coefficients compose
    let nested = x
        .scalar_mul(&crate::constant(2))
        .unwrap()
        .scalar_mul(&crate::constant(3))
        .unwrap();
    assert_eq!(nested.to_string(), "6*te_X7");
}

#[test]
fn shape_mismatch_is_rejected() {
    let x = t("te_X8");
    let v = symb_tensor("te_v8", DIM, 1).unwrap();
    assert!(x.add_expr(&v).is_err());
    let other_dim = symb_tensor("te_w8", 2, 2).unwrap();
    assert!(x.add_expr(&other_dim).is_err());
}

#[test]
fn dim_and_rank_propagate() {
    let x = t("te_X9");
    let y = t("te_Y9");
    let sum = &x + &y;
    assert_eq!(sum.shape(), (DIM, 2));

    let outer = x.otimes(&y).unwrap();
    assert_eq!(outer.rank(), 4);
    assert_eq!(outer.dim(), DIM);

    // contraction over one index pair: 2 + 2 - 2 = 2
    let contracted = inner_product(&x, [2], &y, [1]).unwrap();
    assert_eq!(contracted.rank(), 2);

    // full contraction leaves rank 0
    let full = inner_product(&x, [1, 2], &y, [1, 2]).unwrap();
    assert_eq!(full.rank(), 0);
}

#[test]
fn contraction_index_validation() {
    let x = t("te_X10");
    let y = t("te_Y10");
    assert!(inner_product(&x, [3], &y, [1]).is_err());
    assert!(inner_product(&x, [1, 1], &y, [1, 2]).is_err());
    assert!(inner_product(&x, [1], &y, [1, 2]).is_err());
}

#[test]
fn delta_absorption() {
    let x = t("te_X11");
    let delta = kronecker_delta(DIM);
    // I_ia x_aj = x_ij
    let absorbed = inner_product(&delta, [2], &x, [1]).unwrap();
    assert_eq!(absorbed, x);
    let absorbed = inner_product(&x, [2], &delta, [1]).unwrap();
    assert_eq!(absorbed, x);
}

#[test]
fn identity_absorption() {
    let x = t("te_X12");
    let id4 = identity_tensor(DIM, 4).unwrap();
    let absorbed = inner_product(&x, [1, 2], &id4, [1, 2]).unwrap();
    assert_eq!(absorbed, x);
    let absorbed = inner_product(&id4, [3, 4], &x, [1, 2]).unwrap();
    assert_eq!(absorbed, x);
}

#[test]
fn identity_of_rank_two_is_delta() {
    assert_eq!(identity_tensor(DIM, 2).unwrap(), kronecker_delta(DIM));
    assert!(identity_tensor(DIM, 3).is_err());
}

#[test]
fn basis_change_composes() {
    let x = symb_tensor("te_X13", DIM, 4).unwrap();
    let p = Permutation::new([2, 1, 4, 3]).unwrap();
    let composed = x.basis_change(&p).unwrap().basis_change(&p).unwrap();
    // an involution applied twice unwraps completely
    assert_eq!(composed, x);
}

#[test]
fn identity_permutation_unwraps() {
    let x = t("te_X14");
    let unchanged = x.basis_change(&Permutation::identity(2)).unwrap();
    assert_eq!(unchanged, x);
}

#[test]
fn transpose_prints_and_folds() {
    let x = t("te_X15");
    let transposed = x.trans().unwrap();
    assert_eq!(transposed.to_string(), "trans(te_X15)");
    assert_eq!(transposed.trans().unwrap(), x);
}

#[test]
fn tensor_pow_identities() {
    let x = t("te_X16");
    // pow(t, 0) is the identity on rank 2, pow(t, 1) is t
    assert_eq!(x.powi(0).unwrap(), kronecker_delta(DIM));
    assert_eq!(x.powi(1).unwrap(), x);
    let merged = x.powi(2).unwrap().pow_expr(&crate::constant(3)).unwrap();
    assert_eq!(merged, x.powi(6).unwrap());
}

#[test]
fn inv_folds() {
    let x = t("te_X17");
    let inverse = x.inv().unwrap();
    assert_eq!(inverse.inv().unwrap(), x);
    assert_eq!(kronecker_delta(DIM).inv().unwrap(), kronecker_delta(DIM));
    assert!(tensor_zero(DIM, 2).inv().is_err());
}

#[test]
fn outer_product_normalizes_trivial_placement() {
    let x = t("te_X18");
    let y = t("te_Y18");
    let explicit = x
        .outer_product(IndexSeq::from([1, 2]), &y, IndexSeq::from([3, 4]))
        .unwrap();
    assert_eq!(explicit, x.otimes(&y).unwrap());
    match explicit.kind() {
        TensorKind::SimpleOuter(factors) => assert_eq!(factors.len(), 2),
        other => panic!("expected SimpleOuter, got {other:?}"),
    }
}

#[test]
fn zero_propagates_through_contractions() {
    let x = t("te_X19");
    let zero = tensor_zero(DIM, 2);
    assert!(inner_product(&x, [2], &zero, [1]).unwrap().is_zero_expr());
    assert!(x.otimes(&zero).unwrap().is_zero_expr());
}
