use crate::{Assumption, symb};

#[test]
fn assume_positive_sets_implied() {
    let x = symb("sa_x1");
    x.assume(Assumption::Positive).unwrap();
    assert!(x.is_positive());
    assert!(x.is_nonnegative());
    assert!(x.is_nonzero());
    assert!(x.is_real());
    assert!(!x.is_negative());
}

#[test]
fn assume_negative_sets_implied() {
    let x = symb("sa_x2");
    x.assume(Assumption::Negative).unwrap();
    assert!(x.is_negative());
    assert!(x.is_nonpositive());
    assert!(x.is_nonzero());
    assert!(x.is_real());
    assert!(!x.is_positive());
}

#[test]
fn remove_assumption_keeps_implied() {
    let x = symb("sa_x3");
    x.assume(Assumption::Positive).unwrap();
    assert!(x.is_positive());

    x.remove_assumption(Assumption::Positive).unwrap();
    assert!(!x.is_positive());
    // implied assumptions remain
    assert!(x.is_nonnegative());
    assert!(x.is_nonzero());
}

#[test]
fn even_implies_integer_chain() {
    let x = symb("sa_x4");
    x.assume(Assumption::Even).unwrap();
    assert!(x.is_even());
    assert!(x.is_integer());
    assert!(x.is_rational());
    assert!(x.is_real());
}

#[test]
fn prime_implies_positive_integer() {
    let x = symb("sa_x5");
    x.assume(Assumption::Prime).unwrap();
    assert!(x.is_integer());
    assert!(x.is_positive());
    assert!(x.is_nonzero());
}

#[test]
fn assume_on_compound_is_rejected() {
    let x = symb("sa_x6");
    let e = x.sin();
    assert!(e.assume(Assumption::Positive).is_err());
}

#[test]
fn propagation_through_add() {
    let (x, y) = (symb("sa_y1"), symb("sa_y2"));
    x.assume(Assumption::Positive).unwrap();
    y.assume(Assumption::Positive).unwrap();
    let sum = &x + &y;
    assert!(sum.is_positive());
    assert!(sum.is_real());
}

#[test]
fn propagation_through_mul_signs() {
    let (x, y) = (symb("sa_z1"), symb("sa_z2"));
    x.assume(Assumption::Positive).unwrap();
    y.assume(Assumption::Negative).unwrap();
    let product = &x * &y;
    assert!(product.is_negative());
    assert!(product.is_nonzero());
}

#[test]
fn neg_flips_sign_class() {
    let x = symb("sa_w1");
    x.assume(Assumption::Positive).unwrap();
    let negated = -&x;
    assert!(negated.is_negative());
    assert!(negated.is_nonzero());
}

#[test]
fn abs_and_sign_use_assumptions() {
    let p = symb("sa_v1");
    p.assume(Assumption::Positive).unwrap();
    assert_eq!(p.abs(), p);
    assert!(p.sign().is_one_expr());

    let n = symb("sa_v2");
    n.assume(Assumption::Negative).unwrap();
    assert_eq!(n.abs(), -&n);
    assert_eq!(n.sign(), crate::constant(-1));
}

#[test]
fn sqrt_of_square_with_nonnegative_base() {
    let x = symb("sa_u1");
    x.assume(Assumption::Nonnegative).unwrap();
    let root = x.powi(2).unwrap().sqrt();
    assert_eq!(root, x);
}

#[test]
fn assumptions_survive_construction() {
    // building new expressions never erases a symbol's assumptions
    let x = symb("sa_t1");
    x.assume(Assumption::Positive).unwrap();
    let _ = x.sin() + x.exp() * &x;
    assert!(x.is_positive());
    assert!(x.is_nonzero());
}

#[test]
fn user_mutation_invalidates_inferred_sets() {
    let x = symb("sa_s1");
    let e = x.exp() * &x;
    assert!(!e.is_positive());

    x.assume(Assumption::Positive).unwrap();
    // the cached propagation recomputes after the epoch bump
    assert!(e.is_positive());
}
