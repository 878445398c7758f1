//! The active backend must agree with the per-lane definitions bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lanevec::simd::backend::{self, OpTag, ScalarBackend};
use lanevec::{BinaryOp, Element, Species, UnaryOp, VectorShape};

const ARITH: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];

fn reference<E: Element>(op: BinaryOp, a: &[E], b: &[E]) -> Vec<E> {
    a.iter().zip(b).map(|(&x, &y)| E::binary(op, x, y)).collect()
}

#[test]
fn test_active_backend_matches_scalar_f32() {
    let mut rng = StdRng::seed_from_u64(3);
    println!("active backend: {}", backend::active().name());

    for len in [1usize, 4, 7, 8, 9, 31, 64, 1000] {
        let a: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0e6..1.0e6)).collect();
        let mut b: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0e3..1.0e3)).collect();
        b[0] = 0.0;

        for op in ARITH {
            let expected = reference(op, &a, &b);
            let actual = backend::evaluate(OpTag::Binary(op), &[&a[..], &b[..]], || {
                reference(op, &a, &b)
            });
            let scalar = backend::evaluate_on(&ScalarBackend, OpTag::Binary(op), &[&a[..], &b[..]], || {
                reference(op, &a, &b)
            });
            let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
            assert_eq!(bits(&actual[..]), bits(&expected[..]), "{op:?} at len {len}");
            assert_eq!(bits(&scalar[..]), bits(&expected[..]));
        }
    }
}

#[test]
fn test_active_backend_matches_scalar_f64() {
    let mut rng = StdRng::seed_from_u64(5);

    for len in [2usize, 3, 4, 5, 17, 256] {
        let a: Vec<f64> = (0..len).map(|_| rng.random_range(-1.0e9..1.0e9)).collect();
        let b: Vec<f64> = (0..len).map(|_| rng.random::<f64>() - 0.5).collect();

        for op in ARITH {
            let actual = backend::evaluate(OpTag::Binary(op), &[&a[..], &b[..]], || {
                reference(op, &a, &b)
            });
            let expected = reference(op, &a, &b);
            for (x, y) in actual.iter().zip(&expected) {
                assert_eq!(x.to_bits(), y.to_bits(), "{op:?} at len {len}");
            }
        }
    }
}

#[test]
fn test_vectors_agree_across_shapes() {
    let mut rng = StdRng::seed_from_u64(9);
    let data: Vec<f32> = (0..16).map(|_| rng.random_range(-10.0..10.0)).collect();
    let other: Vec<f32> = (0..16).map(|_| rng.random_range(0.5..10.0)).collect();

    for shape in VectorShape::ALL {
        let species = Species::<f32>::of(shape);
        let n = species.lane_count();
        let a = lanevec::Vector::from_slice(species, &data, 0).unwrap();
        let b = lanevec::Vector::from_slice(species, &other, 0).unwrap();

        let q = a.div(&b).unwrap();
        assert_eq!(q.to_vec(), reference(BinaryOp::Div, &data[..n], &other[..n]));
    }
}

#[test]
fn test_non_arithmetic_ops_use_the_fallback() {
    let a = [1.0f64, -2.0];
    let lanes = backend::evaluate(OpTag::Unary(UnaryOp::Neg), &[&a[..]], || vec![-1.0, 2.0]);
    assert_eq!(lanes, vec![-1.0, 2.0]);

    let b = [3i32, 4];
    let lanes = backend::evaluate(OpTag::Binary(BinaryOp::Add), &[&b[..], &b[..]], || vec![6, 8]);
    assert_eq!(lanes, vec![6, 8]);
}

#[test]
fn test_preferred_shape_is_backed_by_a_species() {
    let shape = VectorShape::preferred();
    assert_eq!(shape, backend::active().preferred_shape());
    assert_eq!(Species::<f32>::preferred().shape(), shape);
}
