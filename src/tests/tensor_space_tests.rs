use crate::{
    SpaceKind, TensorExpr, TensorKind, inner_product, kronecker_delta, projector_dev,
    projector_skew, projector_sym, projector_vol, symb, symb_tensor,
};

const DIM: usize = 3;

fn symmetric(name: &str) -> TensorExpr {
    let t = symb_tensor(name, DIM, 2).unwrap();
    t.assume_symmetric().unwrap();
    t
}

fn deviatoric(name: &str) -> TensorExpr {
    let t = symb_tensor(name, DIM, 2).unwrap();
    t.assume_deviatoric().unwrap();
    t
}

fn skew_sym(name: &str) -> TensorExpr {
    let t = symb_tensor(name, DIM, 2).unwrap();
    t.assume_skew().unwrap();
    t
}

fn volumetric(name: &str) -> TensorExpr {
    let t = symb_tensor(name, DIM, 2).unwrap();
    t.assume_volumetric().unwrap();
    t
}

// ─── Projector elimination on symbols ──────────────────────────────────

#[test]
fn sym_of_symmetric_is_identity() {
    let c = symmetric("ts_C1");
    assert_eq!(c.sym().unwrap(), c);
    assert!(c.skew().unwrap().is_zero_expr());
}

#[test]
fn dev_of_deviatoric_is_identity() {
    let d = deviatoric("ts_D1");
    assert_eq!(d.dev().unwrap(), d);
    assert!(d.vol().unwrap().is_zero_expr());
    // deviatoric implies symmetric
    assert_eq!(d.sym().unwrap(), d);
}

#[test]
fn skew_of_skew_is_identity() {
    let w = skew_sym("ts_W1");
    assert_eq!(w.skew().unwrap(), w);
    assert!(w.sym().unwrap().is_zero_expr());
    assert!(w.vol().unwrap().is_zero_expr());
    assert!(w.dev().unwrap().is_zero_expr());
}

#[test]
fn vol_of_volumetric_is_identity() {
    let v = volumetric("ts_V1");
    assert_eq!(v.vol().unwrap(), v);
    assert!(v.dev().unwrap().is_zero_expr());
}

#[test]
fn no_assumption_no_elimination() {
    let x = symb_tensor("ts_X1", DIM, 2).unwrap();
    let projected = x.sym().unwrap();
    assert_ne!(projected, x);
    assert_eq!(projected.to_string(), "sym(ts_X1)");
}

// ─── Propagation through constructors ──────────────────────────────────

#[test]
fn scalar_mul_keeps_space() {
    let c = symmetric("ts_C2");
    let scaled = 2 * &c;
    assert_eq!(scaled.sym().unwrap().to_string(), "2*ts_C2");
    assert!(scaled.skew().unwrap().is_zero_expr());

    let x = symb("ts_x2");
    let symbolic = &x * &c;
    assert_eq!(symbolic.sym().unwrap(), symbolic);
}

#[test]
fn dev_propagates_through_scalar_mul() {
    let d = deviatoric("ts_D2");
    let scaled = 2 * &d;
    assert_eq!(scaled.dev().unwrap(), scaled);
    assert!(scaled.vol().unwrap().is_zero_expr());
}

#[test]
fn neg_keeps_space() {
    let c = symmetric("ts_C3");
    assert_eq!((-&c).sym().unwrap(), -&c);
    assert!((-&c).skew().unwrap().is_zero_expr());
    let d = deviatoric("ts_D3");
    assert_eq!((-&d).dev().unwrap(), -&d);
}

#[test]
fn pow_downgrades_skew_and_dev() {
    let c = symmetric("ts_C4");
    let squared = c.powi(2).unwrap();
    assert_eq!(squared.sym().unwrap(), squared);
    assert!(squared.skew().unwrap().is_zero_expr());

    // W^2 is symmetric, not skew
    let w = skew_sym("ts_W4");
    let w_squared = w.powi(2).unwrap();
    assert!(!w_squared.is_skew());
    assert!(w_squared.is_symmetric());

    // tr(D^2) != 0 in general, but D^2 stays symmetric
    let d = deviatoric("ts_D4");
    let d_squared = d.powi(2).unwrap();
    assert!(!d_squared.is_deviatoric());
    assert!(d_squared.is_symmetric());
    assert_eq!(d_squared.sym().unwrap(), d_squared);

    // V^n stays proportional to the identity
    let v = volumetric("ts_V4");
    assert!(v.powi(2).unwrap().is_volumetric());
}

#[test]
fn inv_keeps_perm_class() {
    let c = symmetric("ts_C5");
    let inverse = c.inv().unwrap();
    assert_eq!(inverse.sym().unwrap(), inverse);
    assert!(inverse.skew().unwrap().is_zero_expr());

    // tr(D^-1) is unconstrained, symmetry survives
    let d = deviatoric("ts_D5");
    let d_inverse = d.inv().unwrap();
    assert!(!d_inverse.is_deviatoric());
    assert!(d_inverse.is_symmetric());

    // (W^-1)^T = -W^-1
    let w = skew_sym("ts_W5");
    assert!(w.inv().unwrap().is_skew());

    let v = volumetric("ts_V5");
    assert!(v.inv().unwrap().is_volumetric());
}

#[test]
fn add_joins_spaces() {
    let c = symmetric("ts_C6");
    let v = volumetric("ts_V6");
    let sum = &c + &v;
    // join of (sym, any) and (sym, vol) keeps the symmetric class
    assert_eq!(sum.sym().unwrap(), sum);
    assert!(sum.skew().unwrap().is_zero_expr());

    let w = skew_sym("ts_W6");
    let mixed = &c + &w;
    assert!(!mixed.is_symmetric());
    assert!(!mixed.is_skew());
}

#[test]
fn transpose_resolves_by_space() {
    let c = symmetric("ts_C7");
    assert_eq!(c.trans().unwrap(), c);
    let w = skew_sym("ts_W7");
    assert_eq!(w.trans().unwrap(), -&w);
}

// ─── Kronecker delta special cases ─────────────────────────────────────

#[test]
fn parts_of_delta() {
    let delta = kronecker_delta(DIM);
    assert_eq!(delta.sym().unwrap(), delta);
    assert_eq!(delta.vol().unwrap(), delta);
    assert!(delta.skew().unwrap().is_zero_expr());
    assert!(delta.dev().unwrap().is_zero_expr());
}

// ─── Projector nodes ───────────────────────────────────────────────────

#[test]
fn projector_elimination_normal_form() {
    let x = symb_tensor("ts_X8", DIM, 2).unwrap();
    let projected = inner_product(&projector_sym(DIM), [3, 4], &x, [1, 2]).unwrap();
    assert_eq!(projected.to_string(), "sym(ts_X8)");
}

#[test]
fn reversed_projector_normalizes() {
    let x = symb_tensor("ts_X9", DIM, 2).unwrap();
    for (projector, expected) in [
        (projector_sym(DIM), x.sym().unwrap()),
        (projector_skew(DIM), x.skew().unwrap()),
        (projector_vol(DIM), x.vol().unwrap()),
        (projector_dev(DIM), x.dev().unwrap()),
    ] {
        let normalized = inner_product(&x, [1, 2], &projector, [1, 2]).unwrap();
        assert_eq!(normalized, expected);
    }
}

#[test]
fn reversed_projector_on_assumed_operand() {
    let c = symmetric("ts_C10");
    let projected = inner_product(&c, [1, 2], &projector_sym(DIM), [1, 2]).unwrap();
    assert_eq!(projected, c);

    let delta = kronecker_delta(DIM);
    let projected = inner_product(&delta, [1, 2], &projector_sym(DIM), [1, 2]).unwrap();
    assert_eq!(projected, delta);
}

#[test]
fn projector_sum_rules() {
    // P_sym + P_skew is the rank-4 identity
    let total = projector_sym(DIM).add_expr(&projector_skew(DIM)).unwrap();
    assert_eq!(total, crate::identity_tensor(DIM, 4).unwrap());

    // P_vol + P_dev = P_sym
    let recombined = projector_vol(DIM).add_expr(&projector_dev(DIM)).unwrap();
    assert_eq!(recombined, projector_sym(DIM));
}

#[test]
fn projector_composition() {
    let compose = |a: &TensorExpr, b: &TensorExpr| {
        inner_product(a, [3, 4], b, [1, 2]).unwrap()
    };
    // idempotence
    assert_eq!(
        compose(&projector_sym(DIM), &projector_sym(DIM)),
        projector_sym(DIM)
    );
    // orthogonal pairs vanish
    assert!(compose(&projector_sym(DIM), &projector_skew(DIM)).is_zero_expr());
    assert!(compose(&projector_vol(DIM), &projector_dev(DIM)).is_zero_expr());
    // subspace inclusion
    assert_eq!(
        compose(&projector_sym(DIM), &projector_vol(DIM)),
        projector_vol(DIM)
    );
}

#[test]
fn part_of_part_collapses() {
    let x = symb_tensor("ts_X11", DIM, 2).unwrap();
    let symmetrized = x.sym().unwrap();
    // sym is idempotent, skew of a symmetric part vanishes
    assert_eq!(symmetrized.sym().unwrap(), symmetrized);
    assert!(symmetrized.skew().unwrap().is_zero_expr());
    match symmetrized.kind() {
        TensorKind::Part { space, .. } => assert_eq!(*space, SpaceKind::Sym),
        other => panic!("expected Part, got {other:?}"),
    }
}
