use quickcheck::quickcheck;

use crate::{Number, ScalarExpr, symb};

fn symbol_pool(index: u8) -> ScalarExpr {
    // a small fixed pool keeps the registry bounded across runs
    symb(&format!("qp_s{}", index % 6))
}

quickcheck! {
    fn number_addition_commutes(a: i64, b: i64) -> bool {
        Number::Int(a) + Number::Int(b) == Number::Int(b) + Number::Int(a)
    }

    fn number_multiplication_commutes(a: i32, b: i32) -> bool {
        let (a, b) = (Number::Int(a as i64), Number::Int(b as i64));
        a * b == b * a
    }

    fn number_addition_associates(a: i16, b: i16, c: i16) -> bool {
        let (a, b, c) = (
            Number::Int(a as i64),
            Number::Int(b as i64),
            Number::Int(c as i64),
        );
        (a + b) + c == a + (b + c)
    }

    fn rational_normalization_is_canonical(n: i32, d: i32) -> bool {
        if d == 0 {
            return true;
        }
        let reduced = Number::rational(n as i64, d as i64).unwrap();
        match reduced {
            Number::Rational(num, den) => {
                den > 0 && {
                    let mut a = num.unsigned_abs();
                    let mut b = den.unsigned_abs();
                    while b != 0 {
                        let t = a % b;
                        a = b;
                        b = t;
                    }
                    a == 1
                }
            }
            _ => true,
        }
    }

    fn sum_is_commutative(xs: Vec<u8>) -> bool {
        let terms: Vec<ScalarExpr> = xs.iter().take(6).map(|&i| symbol_pool(i)).collect();
        if terms.is_empty() {
            return true;
        }
        let forward = terms
            .iter()
            .fold(ScalarExpr::zero(), |acc, t| acc.add_expr(t));
        let backward = terms
            .iter()
            .rev()
            .fold(ScalarExpr::zero(), |acc, t| acc.add_expr(t));
        forward == backward && forward.content_hash() == backward.content_hash()
    }

    fn product_is_commutative(xs: Vec<u8>) -> bool {
        let factors: Vec<ScalarExpr> = xs.iter().take(5).map(|&i| symbol_pool(i)).collect();
        if factors.is_empty() {
            return true;
        }
        let forward = factors
            .iter()
            .try_fold(ScalarExpr::one(), |acc, f| acc.mul_expr(f));
        let backward = factors
            .iter()
            .rev()
            .try_fold(ScalarExpr::one(), |acc, f| acc.mul_expr(f));
        match (forward, backward) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn additive_inverse_cancels(xs: Vec<u8>) -> bool {
        let terms: Vec<ScalarExpr> = xs.iter().take(5).map(|&i| symbol_pool(i)).collect();
        let e = terms
            .iter()
            .fold(ScalarExpr::zero(), |acc, t| acc.add_expr(t));
        e.sub_expr(&e).is_zero_expr()
    }

    fn hash_is_reconstruction_stable(xs: Vec<u8>, coeff: i8) -> bool {
        let build = || {
            let mut acc = ScalarExpr::constant(coeff as i64);
            for &i in xs.iter().take(5) {
                acc = acc.add_expr(&symbol_pool(i));
            }
            acc
        };
        let (a, b) = (build(), build());
        a == b && a.content_hash() == b.content_hash()
    }
}
