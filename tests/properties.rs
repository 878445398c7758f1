//! Randomized checks of the algebraic laws vectors, masks and shuffles obey.
//!
//! Every test seeds its own `StdRng`, so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lanevec::{
    AssociativeOp, BinaryOp, Element, Mask, Shuffle, Species, TernaryOp, Vector, VectorShape,
};

const ROUNDS: usize = 200;

fn random_mask<E: Element>(rng: &mut StdRng, species: &'static Species<E>) -> Mask<E> {
    let bits: Vec<bool> = (0..species.lane_count()).map(|_| rng.random_bool(0.5)).collect();
    Mask::from_bools(species, &bits).unwrap()
}

fn random_ints(rng: &mut StdRng, species: &'static Species<i32>) -> Vector<i32> {
    species.from_fn(|_| rng.random_range(-1000..1000))
}

fn random_floats(rng: &mut StdRng, species: &'static Species<f64>) -> Vector<f64> {
    species.from_fn(|_| rng.random_range(-1.0e3..1.0e3))
}

#[test]
fn test_species_are_singletons() {
    for shape in VectorShape::ALL {
        let a = Species::<i16>::of(shape);
        let b = Species::<i16>::of_width(shape.bit_size()).unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.lane_count(), shape.bit_size() / 16);
        assert_eq!(a.byte_size(), shape.byte_size());

        let f = Species::<f64>::of(shape);
        assert_eq!(f.lane_count(), shape.bit_size() / 64);
    }
}

#[test]
fn test_with_lane_replaces_only_that_lane() {
    let mut rng = StdRng::seed_from_u64(7);
    let species = Species::<i32>::of(VectorShape::S256);

    for _ in 0..ROUNDS {
        let v = random_ints(&mut rng, species);
        let i = rng.random_range(0..species.lane_count());
        let x = rng.random::<i32>();

        let w = v.with_lane(i, x).unwrap();
        for j in 0..species.lane_count() {
            let expected = if j == i { x } else { v.lane(j).unwrap() };
            assert_eq!(w.lane(j).unwrap(), expected);
        }
    }
    assert!(species.zero().with_lane(8, 1).is_err());
}

#[test]
fn test_masked_lanes_keep_first_operand() {
    let mut rng = StdRng::seed_from_u64(11);
    let species = Species::<i32>::of(VectorShape::S512);
    let ops = [
        BinaryOp::Add,
        BinaryOp::Mul,
        BinaryOp::Xor,
        BinaryOp::Lshl,
        BinaryOp::Min,
        BinaryOp::SaturatingSub,
    ];

    for _ in 0..ROUNDS {
        let a = random_ints(&mut rng, species);
        let b = random_ints(&mut rng, species);
        let m = random_mask(&mut rng, species);
        let op = ops[rng.random_range(0..ops.len())];

        let full = a.lanewise(op, &b).unwrap();
        let masked = a.lanewise_masked(op, &b, &m).unwrap();
        for i in 0..species.lane_count() {
            let expected = if m.lane_is_set(i).unwrap() { full.lane(i) } else { a.lane(i) };
            assert_eq!(masked.lane(i).unwrap(), expected.unwrap());
        }
    }
}

#[test]
fn test_masked_ternary_keeps_first_operand() {
    let mut rng = StdRng::seed_from_u64(13);
    let species = Species::<f64>::of(VectorShape::S256);

    for _ in 0..ROUNDS {
        let a = random_floats(&mut rng, species);
        let b = random_floats(&mut rng, species);
        let c = random_floats(&mut rng, species);
        let m = random_mask(&mut rng, species);

        let r = a.lanewise_ternary_masked(TernaryOp::Fma, &b, &c, &m).unwrap();
        for i in 0..species.lane_count() {
            let (x, y, z) = (a.lane(i).unwrap(), b.lane(i).unwrap(), c.lane(i).unwrap());
            let expected = if m.lane_is_set(i).unwrap() { x.mul_add(y, z) } else { x };
            assert_eq!(r.lane(i).unwrap().to_bits(), expected.to_bits());
        }
    }
}

#[test]
fn test_wrap_indexes_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(17);

    for shape in VectorShape::ALL {
        let species = Species::<i8>::of(shape);
        let n = species.lane_count() as i32;
        for _ in 0..ROUNDS / 4 {
            let raw: Vec<i32> = (0..n).map(|_| rng.random_range(-n..n)).collect();
            let s = Shuffle::from_values(species, &raw).unwrap();

            let once = s.wrap_indexes();
            assert_eq!(once.wrap_indexes(), once);
            assert!(once.as_slice().iter().all(|&x| (0..n).contains(&x)));

            // exceptional selectors name the lane they wrap to
            for (i, &x) in raw.iter().enumerate() {
                let wrapped = once.lane_source(i).unwrap();
                assert_eq!(wrapped, if x < 0 { x + n } else { x });
            }
        }
    }
}

#[test]
fn test_compress_then_expand_restores_active_lanes() {
    let mut rng = StdRng::seed_from_u64(19);
    let species = Species::<i32>::of(VectorShape::S512);

    for _ in 0..ROUNDS {
        let v = random_ints(&mut rng, species);
        let m = random_mask(&mut rng, species);

        let packed = v.compress(&m).unwrap();
        let count = m.true_count();
        assert!(packed.as_slice()[count..].iter().all(|&x| x == 0));

        let restored = packed.expand(&m).unwrap();
        for i in 0..species.lane_count() {
            let expected = if m.lane_is_set(i).unwrap() { v.lane(i).unwrap() } else { 0 };
            assert_eq!(restored.lane(i).unwrap(), expected);
        }
    }
}

#[test]
fn test_reduction_neutral_elements() {
    let mut rng = StdRng::seed_from_u64(23);

    for shape in VectorShape::ALL {
        let ints = Species::<i64>::of(shape);
        assert_eq!(ints.zero().reduce_lanes(AssociativeOp::Add).unwrap(), 0);

        let x = rng.random::<i64>();
        let v = ints.broadcast(x);
        for op in [AssociativeOp::Max, AssociativeOp::Min, AssociativeOp::And, AssociativeOp::Or] {
            assert_eq!(v.reduce_lanes(op).unwrap(), x);
        }

        // a mask with no lanes set reduces to the identity
        let none = ints.mask_all(false);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::Mul, &none).unwrap(), 1);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::And, &none).unwrap(), -1);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::Max, &none).unwrap(), i64::MIN);
    }
}

#[test]
fn test_rearrange_matches_lane_sources() {
    let mut rng = StdRng::seed_from_u64(29);
    let species = Species::<f64>::of(VectorShape::S512);
    let n = species.lane_count() as i32;

    for _ in 0..ROUNDS {
        let v = random_floats(&mut rng, species);
        let raw: Vec<i32> = (0..n).map(|_| rng.random_range(-n..n)).collect();
        let s = Shuffle::from_values(species, &raw).unwrap();

        let r = v.rearrange(&s).unwrap();
        for (i, &x) in raw.iter().enumerate() {
            let expected = if x < 0 { 0.0 } else { v.lane(x as usize).unwrap() };
            assert_eq!(r.lane(i).unwrap(), expected);
        }
    }
}

#[test]
fn test_mask_long_round_trip() {
    let mut rng = StdRng::seed_from_u64(31);
    let species = Species::<i8>::of(VectorShape::S512);

    for _ in 0..ROUNDS {
        let bits = rng.random::<u64>();
        let m = Mask::from_long(species, bits);
        assert_eq!(m.to_long().unwrap(), bits);
        assert_eq!(m.true_count(), bits.count_ones() as usize);
        assert_eq!(m.not().to_long().unwrap(), !bits);
    }
}
