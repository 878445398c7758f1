//! The shaped vector type and its lane-wise and cross-lane operations.
//!
//! A [`Vector`] owns exactly `lane_count` values of one element kind. Every
//! operation returns a new vector; nothing mutates in place. Operations with a
//! second or third vector operand, a mask or a shuffle require all of them to
//! share the receiver's species and fail with `ShapeMismatch` otherwise.
//!
//! Masked lane-wise operations merge: a lane whose mask flag is unset keeps
//! the first operand's value and is never evaluated, so it cannot fault.
//!
//! ```rust
//! use lanevec::simd::ops::BinaryOp;
//! use lanevec::simd::species::{Species, VectorShape};
//!
//! let species = Species::<f32>::of(VectorShape::S128);
//! let a = species.from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = species.from_values(&[10.0, 20.0, 30.0, 40.0]).unwrap();
//! let m = lanevec::simd::mask::Mask::from_bools(species, &[true, false, true, false]).unwrap();
//!
//! let sum = a.lanewise_masked(BinaryOp::Add, &b, &m).unwrap();
//! assert_eq!(sum.to_vec(), vec![11.0, 2.0, 33.0, 4.0]);
//! ```

use std::fmt;

use crate::error::{arithmetic_error, as_index, index_out_of_range, shape_mismatch, Result};
use crate::simd::backend::{self, OpTag};
use crate::simd::element::Element;
use crate::simd::mask::Mask;
use crate::simd::memory::ByteOrder;
use crate::simd::ops::{
    ensure_supported, AssociativeOp, BinaryOp, Comparison, Conversion, TernaryOp, Test, UnaryOp,
};
use crate::simd::shuffle::{wrap_index, Shuffle};
use crate::simd::species::Species;

/// Immutable fixed-width sequence of lane values.
pub struct Vector<E: Element> {
    species: &'static Species<E>,
    lanes: Box<[E]>,
}

/// Window of a shape change: `(source offset, target offset, count)`.
///
/// With more source units than target units, `part` in `[0, ratio)` picks the
/// source slab. With fewer, `part` in `(-ratio, 0]` picks the target slot.
fn part_window(source: usize, target: usize, part: i32) -> Result<(usize, usize, usize)> {
    let p = i64::from(part);
    if source > target {
        let ratio = (source / target) as i64;
        if (0..ratio).contains(&p) {
            return Ok((p as usize * target, 0, target));
        }
    } else if source < target {
        let ratio = (target / source) as i64;
        if (1 - ratio..=0).contains(&p) {
            return Ok((0, (-p) as usize * source, source));
        }
    } else if p == 0 {
        return Ok((0, 0, source));
    }
    Err(shape_mismatch(format!(
        "part {part} is out of range when converting {source} units into {target}"
    )))
}

/// Pairwise fold of a non-empty lane sequence.
fn fold_pairwise<E: Element>(op: BinaryOp, lanes: &[E]) -> E {
    match lanes {
        [] => E::ZERO,
        [only] => *only,
        _ => {
            let (lo, hi) = lanes.split_at(lanes.len() / 2);
            E::binary(op, fold_pairwise(op, lo), fold_pairwise(op, hi))
        }
    }
}

impl<E: Element> Vector<E> {
    pub(crate) fn from_lanes(species: &'static Species<E>, lanes: Vec<E>) -> Self {
        debug_assert_eq!(lanes.len(), species.lane_count());
        Self {
            species,
            lanes: lanes.into_boxed_slice(),
        }
    }

    fn with_lanes(&self, lanes: Vec<E>) -> Self {
        Self::from_lanes(self.species, lanes)
    }

    fn check(&self, other: &Vector<E>) -> Result<()> {
        self.species.check(other.species)
    }

    fn check_mask(&self, m: &Mask<E>) -> Result<()> {
        self.species.check(m.species())
    }

    #[inline(always)]
    pub fn species(&self) -> &'static Species<E> {
        self.species
    }

    #[inline(always)]
    pub fn length(&self) -> usize {
        self.lanes.len()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.lanes
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.lanes.to_vec()
    }

    /// Lane bytes in little-endian order.
    pub(crate) fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.species.byte_size()];
        for (chunk, lane) in bytes.chunks_exact_mut(E::BYTES).zip(self.lanes.iter()) {
            lane.write_bytes(chunk, ByteOrder::LittleEndian);
        }
        bytes
    }

    // ================================================================================================
    // LANE ACCESS
    // ================================================================================================

    pub fn lane(&self, i: usize) -> Result<E> {
        self.lanes
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_range(as_index(i), self.length()))
    }

    /// Copy of this vector with lane `i` replaced by `value`.
    pub fn with_lane(&self, i: usize, value: E) -> Result<Self> {
        if i >= self.length() {
            return Err(index_out_of_range(as_index(i), self.length()));
        }
        let mut lanes = self.to_vec();
        lanes[i] = value;
        Ok(self.with_lanes(lanes))
    }

    // ================================================================================================
    // LANE-WISE
    // ================================================================================================

    pub fn lanewise_unary(&self, op: UnaryOp) -> Result<Self> {
        ensure_supported::<E>(op)?;
        let lanes = backend::evaluate(OpTag::Unary(op), &[&self.lanes[..]], || {
            self.lanes.iter().map(|&a| E::unary(op, a)).collect()
        });
        Ok(self.with_lanes(lanes))
    }

    pub fn lanewise_unary_masked(&self, op: UnaryOp, m: &Mask<E>) -> Result<Self> {
        ensure_supported::<E>(op)?;
        self.check_mask(m)?;
        let lanes = self
            .lanes
            .iter()
            .zip(m.as_slice())
            .map(|(&a, &active)| if active { E::unary(op, a) } else { a })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// Applies `op` lane by lane to `self` and `other`.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` if `op` is not defined for `E`, `ShapeMismatch`
    /// if the species differ, `ArithmeticError` for an integral `Div` with a
    /// zero divisor lane.
    pub fn lanewise(&self, op: BinaryOp, other: &Self) -> Result<Self> {
        ensure_supported::<E>(op)?;
        self.check(other)?;
        if op.is_division() && !E::KIND.is_floating() {
            if let Some(lane) = other.lanes.iter().position(|&b| b == E::ZERO) {
                return Err(arithmetic_error(lane, "integer division by zero"));
            }
        }
        let lanes = backend::evaluate(OpTag::Binary(op), &[&self.lanes[..], &other.lanes[..]], || {
            self.lanes
                .iter()
                .zip(other.lanes.iter())
                .map(|(&a, &b)| E::binary(op, a, b))
                .collect()
        });
        Ok(self.with_lanes(lanes))
    }

    /// Like [`lanewise`](Self::lanewise), evaluating only the lanes set in `m`.
    ///
    /// Unset lanes keep `self`'s value. A zero divisor in an unset lane is
    /// never looked at.
    pub fn lanewise_masked(&self, op: BinaryOp, other: &Self, m: &Mask<E>) -> Result<Self> {
        ensure_supported::<E>(op)?;
        self.check(other)?;
        self.check_mask(m)?;
        let integral_div = op.is_division() && !E::KIND.is_floating();
        let mut lanes = Vec::with_capacity(self.length());
        for (i, ((&a, &b), &active)) in self
            .lanes
            .iter()
            .zip(other.lanes.iter())
            .zip(m.as_slice())
            .enumerate()
        {
            if !active {
                lanes.push(a);
                continue;
            }
            if integral_div && b == E::ZERO {
                return Err(arithmetic_error(i, "integer division by zero"));
            }
            lanes.push(E::binary(op, a, b));
        }
        Ok(self.with_lanes(lanes))
    }

    pub fn lanewise_scalar(&self, op: BinaryOp, e: E) -> Result<Self> {
        self.lanewise(op, &self.species.broadcast(e))
    }

    pub fn lanewise_scalar_masked(&self, op: BinaryOp, e: E, m: &Mask<E>) -> Result<Self> {
        self.lanewise_masked(op, &self.species.broadcast(e), m)
    }

    pub fn lanewise_ternary(&self, op: TernaryOp, b: &Self, c: &Self) -> Result<Self> {
        ensure_supported::<E>(op)?;
        self.check(b)?;
        self.check(c)?;
        let lanes = backend::evaluate(
            OpTag::Ternary(op),
            &[&self.lanes[..], &b.lanes[..], &c.lanes[..]],
            || {
                (0..self.length())
                    .map(|i| E::ternary(op, self.lanes[i], b.lanes[i], c.lanes[i]))
                    .collect()
            },
        );
        Ok(self.with_lanes(lanes))
    }

    pub fn lanewise_ternary_masked(
        &self,
        op: TernaryOp,
        b: &Self,
        c: &Self,
        m: &Mask<E>,
    ) -> Result<Self> {
        ensure_supported::<E>(op)?;
        self.check(b)?;
        self.check(c)?;
        self.check_mask(m)?;
        let lanes = (0..self.length())
            .map(|i| {
                if m.as_slice()[i] {
                    E::ternary(op, self.lanes[i], b.lanes[i], c.lanes[i])
                } else {
                    self.lanes[i]
                }
            })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Add, other)
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Sub, other)
    }

    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Mul, other)
    }

    pub fn div(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Div, other)
    }

    pub fn min(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Min, other)
    }

    pub fn max(&self, other: &Self) -> Result<Self> {
        self.lanewise(BinaryOp::Max, other)
    }

    pub fn neg(&self) -> Result<Self> {
        self.lanewise_unary(UnaryOp::Neg)
    }

    pub fn abs(&self) -> Result<Self> {
        self.lanewise_unary(UnaryOp::Abs)
    }

    // ================================================================================================
    // COMPARISONS AND TESTS
    // ================================================================================================

    pub fn compare(&self, op: Comparison, other: &Self) -> Result<Mask<E>> {
        ensure_supported::<E>(op)?;
        self.check(other)?;
        let bits = self
            .lanes
            .iter()
            .zip(other.lanes.iter())
            .map(|(&a, &b)| E::compare(op, a, b))
            .collect();
        Ok(Mask::from_lanes(self.species, bits))
    }

    pub fn compare_scalar(&self, op: Comparison, e: E) -> Result<Mask<E>> {
        self.compare(op, &self.species.broadcast(e))
    }

    /// Comparison restricted to the lanes set in `m`; other lanes are unset.
    pub fn compare_masked(&self, op: Comparison, other: &Self, m: &Mask<E>) -> Result<Mask<E>> {
        self.check_mask(m)?;
        self.compare(op, other)?.and(m)
    }

    pub fn test(&self, op: Test) -> Result<Mask<E>> {
        ensure_supported::<E>(op)?;
        let bits = self.lanes.iter().map(|&a| E::test(op, a)).collect();
        Ok(Mask::from_lanes(self.species, bits))
    }

    pub fn test_masked(&self, op: Test, m: &Mask<E>) -> Result<Mask<E>> {
        self.check_mask(m)?;
        self.test(op)?.and(m)
    }

    // ================================================================================================
    // REDUCTIONS
    // ================================================================================================

    /// Folds every lane with `op`.
    ///
    /// Lanes are combined pairwise, as a balanced tree. For floating `Add` and
    /// `Mul` the result may differ in the last bits from a left-to-right fold;
    /// the combination order is not part of the contract.
    pub fn reduce_lanes(&self, op: AssociativeOp) -> Result<E> {
        ensure_supported::<E>(op)?;
        Ok(fold_pairwise(op.as_binary(), &self.lanes))
    }

    /// Folds the lanes set in `m`; unset lanes count as the identity of `op`.
    pub fn reduce_lanes_masked(&self, op: AssociativeOp, m: &Mask<E>) -> Result<E> {
        ensure_supported::<E>(op)?;
        self.check_mask(m)?;
        let identity = op.identity::<E>();
        let lanes: Vec<E> = self
            .lanes
            .iter()
            .zip(m.as_slice())
            .map(|(&a, &active)| if active { a } else { identity })
            .collect();
        Ok(fold_pairwise(op.as_binary(), &lanes))
    }

    // ================================================================================================
    // REORGANIZATION
    // ================================================================================================

    /// Lane `i` from `other` where `m` is set, else from `self`.
    pub fn blend(&self, other: &Self, m: &Mask<E>) -> Result<Self> {
        self.check(other)?;
        self.check_mask(m)?;
        let lanes = (0..self.length())
            .map(|i| {
                if m.as_slice()[i] {
                    other.lanes[i]
                } else {
                    self.lanes[i]
                }
            })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    fn check_origin(&self, origin: usize) -> Result<()> {
        if origin > self.length() {
            return Err(index_out_of_range(as_index(origin), self.length()));
        }
        Ok(())
    }

    /// Shifts lanes down by `origin`, filling the top with zeros.
    pub fn slice(&self, origin: usize) -> Result<Self> {
        self.slice_with(origin, &self.species.zero())
    }

    /// Lanes `origin..` of the concatenation `self ++ v`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` unless `origin <= lane_count`.
    pub fn slice_with(&self, origin: usize, v: &Self) -> Result<Self> {
        self.check(v)?;
        self.check_origin(origin)?;
        let n = self.length();
        let lanes = (origin..origin + n)
            .map(|j| if j < n { self.lanes[j] } else { v.lanes[j - n] })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// [`slice_with`](Self::slice_with), then zero the lanes unset in `m`.
    pub fn slice_masked(&self, origin: usize, v: &Self, m: &Mask<E>) -> Result<Self> {
        let sliced = self.slice_with(origin, v)?;
        self.species.zero().blend(&sliced, m)
    }

    /// Shifts lanes up by `origin`, filling the bottom with zeros.
    pub fn unslice(&self, origin: usize) -> Result<Self> {
        self.unslice_into(origin, &self.species.zero(), 0)
    }

    /// Inserts `self` into the pair `(w, w)` at lane `origin` and returns
    /// half `part` of the pair.
    ///
    /// Part 0 holds `w`'s lanes below `origin` followed by `self`'s first lanes.
    /// Part 1 holds `self`'s last `origin` lanes followed by `w`'s upper lanes.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` unless `origin <= lane_count` and `part` is 0 or 1.
    pub fn unslice_into(&self, origin: usize, w: &Self, part: usize) -> Result<Self> {
        self.check(w)?;
        self.check_origin(origin)?;
        let n = self.length();
        let lanes = match part {
            0 => (0..n)
                .map(|i| {
                    if i >= origin {
                        self.lanes[i - origin]
                    } else {
                        w.lanes[i]
                    }
                })
                .collect(),
            1 => (0..n)
                .map(|i| {
                    if i < origin {
                        self.lanes[n - origin + i]
                    } else {
                        w.lanes[i]
                    }
                })
                .collect(),
            _ => return Err(index_out_of_range(as_index(part), 2)),
        };
        Ok(self.with_lanes(lanes))
    }

    /// [`unslice_into`](Self::unslice_into) writing only the lanes of `self`
    /// set in `m`; the other positions keep `w`'s lanes.
    pub fn unslice_masked(&self, origin: usize, w: &Self, part: usize, m: &Mask<E>) -> Result<Self> {
        self.check_mask(m)?;
        let kept = w.slice_with(origin, w)?.blend(self, m)?;
        kept.unslice_into(origin, w, part)
    }

    fn check_shuffle(&self, s: &Shuffle<E>) -> Result<()> {
        self.species.check(s.species())
    }

    /// Lane `i` becomes `self[s[i]]`, or zero where `s[i]` is exceptional.
    pub fn rearrange(&self, s: &Shuffle<E>) -> Result<Self> {
        self.check_shuffle(s)?;
        let lanes = s
            .as_slice()
            .iter()
            .map(|&j| if j < 0 { E::ZERO } else { self.lanes[j as usize] })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// [`rearrange`](Self::rearrange) with the lanes unset in `m` zeroed.
    pub fn rearrange_masked(&self, s: &Shuffle<E>, m: &Mask<E>) -> Result<Self> {
        self.check_mask(m)?;
        let moved = self.rearrange(s)?;
        self.species.zero().blend(&moved, m)
    }

    /// Two-source rearrange: valid selectors read `self`, exceptional
    /// selectors `j` read `v[j + n]`.
    pub fn rearrange_with(&self, s: &Shuffle<E>, v: &Self) -> Result<Self> {
        self.check_shuffle(s)?;
        self.check(v)?;
        let n = self.length() as i32;
        let lanes = s
            .as_slice()
            .iter()
            .map(|&j| {
                if j < 0 {
                    v.lanes[(j + n) as usize]
                } else {
                    self.lanes[j as usize]
                }
            })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// Packs the lanes set in `m` to the front, in order; the rest are zero.
    pub fn compress(&self, m: &Mask<E>) -> Result<Self> {
        self.check_mask(m)?;
        let mut lanes: Vec<E> = self
            .lanes
            .iter()
            .zip(m.as_slice())
            .filter(|&(_, &active)| active)
            .map(|(&a, _)| a)
            .collect();
        lanes.resize(self.length(), E::ZERO);
        Ok(self.with_lanes(lanes))
    }

    /// Inverse of [`compress`](Self::compress): the front lanes are spread,
    /// in order, onto the lanes set in `m`; the rest are zero.
    pub fn expand(&self, m: &Mask<E>) -> Result<Self> {
        self.check_mask(m)?;
        let mut next = 0;
        let lanes = m
            .as_slice()
            .iter()
            .map(|&active| {
                if active {
                    let lane = self.lanes[next];
                    next += 1;
                    lane
                } else {
                    E::ZERO
                }
            })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// Uses the lane values of `indexes` as a wrapped shuffle over `self`.
    pub fn select_from(&self, indexes: &Self) -> Result<Self> {
        self.check(indexes)?;
        self.rearrange(&indexes.to_shuffle())
    }

    pub fn select_from_masked(&self, indexes: &Self, m: &Mask<E>) -> Result<Self> {
        self.check(indexes)?;
        self.rearrange_masked(&indexes.to_shuffle(), m)
    }

    /// Selects from the concatenation `self ++ second`, with each index lane
    /// wrapped into `[0, 2n)`.
    pub fn select_from_pair(&self, second: &Self, indexes: &Self) -> Result<Self> {
        self.check(second)?;
        self.check(indexes)?;
        let n = self.length();
        let lanes = indexes
            .lanes
            .iter()
            .map(|&x| {
                let j = wrap_index(x.to_i64(), 2 * n) as usize;
                if j < n {
                    self.lanes[j]
                } else {
                    second.lanes[j - n]
                }
            })
            .collect();
        Ok(self.with_lanes(lanes))
    }

    /// Shuffle whose selectors are this vector's lanes wrapped into `[0, n)`.
    pub fn to_shuffle(&self) -> Shuffle<E> {
        let n = self.length();
        let indexes = self
            .lanes
            .iter()
            .map(|&x| wrap_index(x.to_i64(), n))
            .collect();
        Shuffle::from_indexes(self.species, indexes)
    }

    // ================================================================================================
    // SHAPE CHANGES
    // ================================================================================================

    /// Moves this vector into the `target` species.
    ///
    /// `Convert` converts each lane value with `as` semantics and windows by
    /// lane count. `Reinterpret` copies the little-endian lane bytes and
    /// windows by byte size. When the source is larger, `part` in `[0, ratio)`
    /// picks the slab that is kept. When it is smaller, `part` in
    /// `(-ratio, 0]` picks where it lands and every other lane is zero.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` for a `part` outside its range.
    pub fn convert_shape<F: Element>(
        &self,
        conversion: Conversion,
        target: &'static Species<F>,
        part: i32,
    ) -> Result<Vector<F>> {
        match conversion {
            Conversion::Convert => {
                let (src, dst, count) = part_window(self.length(), target.lane_count(), part)?;
                let mut lanes = vec![F::ZERO; target.lane_count()];
                for (out, &lane) in lanes[dst..dst + count]
                    .iter_mut()
                    .zip(&self.lanes[src..src + count])
                {
                    *out = F::from_lane(lane);
                }
                Ok(Vector::from_lanes(target, lanes))
            }
            Conversion::Reinterpret => {
                let bytes = self.to_le_bytes();
                let (src, dst, count) = part_window(bytes.len(), target.byte_size(), part)?;
                let mut out = vec![0u8; target.byte_size()];
                out[dst..dst + count].copy_from_slice(&bytes[src..src + count]);
                let lanes = out
                    .chunks_exact(F::BYTES)
                    .map(|chunk| F::read_bytes(chunk, ByteOrder::LittleEndian))
                    .collect();
                Ok(Vector::from_lanes(target, lanes))
            }
        }
    }

    pub fn cast_shape<F: Element>(&self, target: &'static Species<F>, part: i32) -> Result<Vector<F>> {
        self.convert_shape(Conversion::Convert, target, part)
    }

    pub fn reinterpret_shape<F: Element>(
        &self,
        target: &'static Species<F>,
        part: i32,
    ) -> Result<Vector<F>> {
        self.convert_shape(Conversion::Reinterpret, target, part)
    }
}

impl<E: Element> Clone for Vector<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            lanes: self.lanes.clone(),
        }
    }
}

impl<E: Element> PartialEq for Vector<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.lanes == other.lanes
    }
}

impl<E: Element> fmt::Debug for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>", self.species)?;
        f.debug_list().entries(self.lanes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LanevecError;
    use crate::simd::species::VectorShape;

    fn f32x4() -> &'static Species<f32> {
        Species::of(VectorShape::S128)
    }

    fn i32x4() -> &'static Species<i32> {
        Species::of(VectorShape::S128)
    }

    fn ints(values: [i32; 4]) -> Vector<i32> {
        i32x4().from_values(&values).unwrap()
    }

    fn mask(bits: [bool; 4]) -> Mask<i32> {
        Mask::from_bools(i32x4(), &bits).unwrap()
    }

    #[test]
    fn test_masked_add_merges_first_operand() {
        let a = f32x4().from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = f32x4().from_values(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        let m = Mask::from_bools(f32x4(), &[true, false, true, false]).unwrap();
        let sum = a.lanewise_masked(BinaryOp::Add, &b, &m).unwrap();
        assert_eq!(sum.to_vec(), vec![11.0, 2.0, 33.0, 4.0]);
    }

    #[test]
    fn test_integer_division_by_zero() {
        let a = ints([10, 20, 30, 40]);
        let b = ints([2, 0, 5, 4]);
        assert_eq!(
            a.div(&b).unwrap_err(),
            LanevecError::ArithmeticError {
                lane: 1,
                message: "integer division by zero".to_string()
            }
        );

        let q = a
            .lanewise_masked(BinaryOp::Div, &b, &mask([true, false, true, true]))
            .unwrap();
        assert_eq!(q.to_vec(), vec![5, 20, 6, 10]);
    }

    #[test]
    fn test_float_division_by_zero_is_a_value() {
        let a = f32x4().from_values(&[1.0, -1.0, 0.0, 2.0]).unwrap();
        let q = a.div(&f32x4().zero()).unwrap().to_vec();
        assert_eq!(q[0], f32::INFINITY);
        assert_eq!(q[1], f32::NEG_INFINITY);
        assert!(q[2].is_nan());
    }

    #[test]
    fn test_species_mismatch() {
        let a = Species::<i32>::of(VectorShape::S128).iota();
        let b = Species::<i32>::of(VectorShape::S256).iota();
        assert!(matches!(a.add(&b), Err(LanevecError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_unsupported_operator() {
        let v = f32x4().iota();
        assert!(matches!(
            v.lanewise(BinaryOp::Xor, &v),
            Err(LanevecError::UnsupportedOperation { .. })
        ));
        assert!(ints([1, 2, 3, 4]).lanewise_unary(UnaryOp::Sqrt).is_err());
    }

    #[test]
    fn test_scalar_and_ternary_forms() {
        let v = ints([1, 2, 3, 4]);
        assert_eq!(
            v.lanewise_scalar(BinaryOp::Lshl, 2).unwrap().to_vec(),
            vec![4, 8, 12, 16]
        );
        assert_eq!(
            v.lanewise_scalar_masked(BinaryOp::Mul, 10, &mask([false, true, false, true]))
                .unwrap()
                .to_vec(),
            vec![1, 20, 3, 40]
        );

        let a = f32x4().broadcast(2.0);
        let b = f32x4().iota();
        let c = f32x4().broadcast(1.0);
        assert_eq!(
            a.lanewise_ternary(TernaryOp::Fma, &b, &c).unwrap().to_vec(),
            vec![1.0, 3.0, 5.0, 7.0]
        );
        let m = Mask::from_bools(f32x4(), &[true, true, false, false]).unwrap();
        assert_eq!(
            a.lanewise_ternary_masked(TernaryOp::Fma, &b, &c, &m)
                .unwrap()
                .to_vec(),
            vec![1.0, 3.0, 2.0, 2.0]
        );
    }

    #[test]
    fn test_unary_forms() {
        let v = ints([-3, 0, i32::MIN, 7]);
        assert_eq!(v.abs().unwrap().to_vec(), vec![3, 0, i32::MIN, 7]);
        assert_eq!(v.neg().unwrap(), v.lanewise_unary(UnaryOp::Neg).unwrap());
        assert_eq!(v.neg().unwrap().to_vec(), vec![3, 0, i32::MIN, -7]);

        let f = Species::<f64>::of(VectorShape::S128).from_values(&[-0.0, 2.5]).unwrap();
        assert!(f.abs().unwrap().lane(0).unwrap().is_sign_positive());
        assert_eq!(f.neg().unwrap().to_vec(), vec![0.0, -2.5]);
        assert_eq!(
            v.lanewise_unary_masked(UnaryOp::Not, &mask([true, false, false, false]))
                .unwrap()
                .to_vec(),
            vec![2, 0, i32::MIN, 7]
        );
    }

    #[test]
    fn test_compare_and_test() {
        let a = ints([1, 5, 3, 8]);
        let b = ints([2, 5, 1, 9]);
        assert_eq!(
            a.compare(Comparison::Lt, &b).unwrap().to_vec(),
            vec![true, false, false, true]
        );
        assert_eq!(
            a.compare_scalar(Comparison::Ge, 5).unwrap().to_vec(),
            vec![false, true, false, true]
        );
        assert_eq!(
            a.compare_masked(Comparison::Lt, &b, &mask([false, true, true, true]))
                .unwrap()
                .to_vec(),
            vec![false, false, false, true]
        );

        let f = f32x4().from_values(&[f32::NAN, -0.0, 1.0, f32::INFINITY]).unwrap();
        assert_eq!(
            f.test(Test::IsNan).unwrap().to_vec(),
            vec![true, false, false, false]
        );
        let m = Mask::from_bools(f32x4(), &[true, true, false, true]).unwrap();
        assert_eq!(
            f.test_masked(Test::IsNegative, &m).unwrap().to_vec(),
            vec![false, true, false, false]
        );
    }

    #[test]
    fn test_reductions() {
        let v = ints([3, -7, 12, 5]);
        assert_eq!(v.reduce_lanes(AssociativeOp::Add).unwrap(), 13);
        assert_eq!(v.reduce_lanes(AssociativeOp::Min).unwrap(), -7);
        assert_eq!(v.reduce_lanes(AssociativeOp::Max).unwrap(), 12);
        assert_eq!(v.reduce_lanes(AssociativeOp::Mul).unwrap(), -1260);

        let m = mask([true, false, false, true]);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::Add, &m).unwrap(), 8);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::And, &m).unwrap(), 3 & 5);

        let none = i32x4().mask_all(false);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::Max, &none).unwrap(), i32::MIN);
        assert_eq!(v.reduce_lanes_masked(AssociativeOp::And, &none).unwrap(), -1);

        assert!(f32x4().iota().reduce_lanes(AssociativeOp::Or).is_err());
    }

    #[test]
    fn test_first_nonzero_reduction_keeps_lane_order() {
        let v = ints([0, 0, 9, 4]);
        assert_eq!(v.reduce_lanes(AssociativeOp::FirstNonzero).unwrap(), 9);
    }

    #[test]
    fn test_lane_access() {
        let v = ints([1, 2, 3, 4]);
        assert_eq!(v.lane(2).unwrap(), 3);
        assert!(matches!(
            v.lane(4),
            Err(LanevecError::IndexOutOfRange {
                index: 4,
                lane_count: 4
            })
        ));
        let w = v.with_lane(0, 9).unwrap();
        assert_eq!(w.to_vec(), vec![9, 2, 3, 4]);
        assert_eq!(v.to_vec(), vec![1, 2, 3, 4]);
        assert!(v.with_lane(7, 0).is_err());
    }

    #[test]
    fn test_blend() {
        let a = ints([1, 2, 3, 4]);
        let b = ints([5, 6, 7, 8]);
        assert_eq!(
            a.blend(&b, &mask([true, false, false, true])).unwrap().to_vec(),
            vec![5, 2, 3, 8]
        );
    }

    #[test]
    fn test_slice() {
        let a = ints([1, 2, 3, 4]);
        let b = ints([5, 6, 7, 8]);
        assert_eq!(a.slice(1).unwrap().to_vec(), vec![2, 3, 4, 0]);
        assert_eq!(a.slice_with(3, &b).unwrap().to_vec(), vec![4, 5, 6, 7]);
        assert_eq!(a.slice_with(0, &b).unwrap(), a);
        assert_eq!(a.slice_with(4, &b).unwrap(), b);
        assert!(a.slice(5).is_err());
        assert_eq!(
            a.slice_masked(1, &b, &mask([true, true, false, true]))
                .unwrap()
                .to_vec(),
            vec![2, 3, 0, 5]
        );
    }

    #[test]
    fn test_unslice() {
        let v = ints([1, 2, 3, 4]);
        let w = ints([5, 6, 7, 8]);
        assert_eq!(v.unslice(1).unwrap().to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(v.unslice_into(1, &w, 0).unwrap().to_vec(), vec![5, 1, 2, 3]);
        assert_eq!(v.unslice_into(1, &w, 1).unwrap().to_vec(), vec![4, 6, 7, 8]);
        assert!(v.unslice_into(1, &w, 2).is_err());

        let m = mask([true, false, true, true]);
        assert_eq!(
            v.unslice_masked(1, &w, 0, &m).unwrap().to_vec(),
            vec![5, 1, 7, 3]
        );
        assert_eq!(
            v.unslice_masked(1, &w, 1, &m).unwrap().to_vec(),
            vec![4, 6, 7, 8]
        );
    }

    #[test]
    fn test_slice_undoes_unslice() {
        let v = ints([1, 2, 3, 4]);
        for origin in 0..=4 {
            let hi = v.unslice_into(origin, &i32x4().zero(), 0).unwrap();
            let lo = v.unslice_into(origin, &i32x4().zero(), 1).unwrap();
            assert_eq!(hi.slice_with(origin, &lo).unwrap(), v);
        }
    }

    #[test]
    fn test_rearrange() {
        let v = ints([10, 20, 30, 40]);
        let s = Shuffle::from_values(i32x4(), &[3, -1, 0, 0]).unwrap();
        assert_eq!(v.rearrange(&s).unwrap().to_vec(), vec![40, 0, 10, 10]);
        assert_eq!(
            v.rearrange_masked(&s, &mask([false, true, true, true]))
                .unwrap()
                .to_vec(),
            vec![0, 0, 10, 10]
        );
        let other = ints([50, 60, 70, 80]);
        assert_eq!(
            v.rearrange_with(&s, &other).unwrap().to_vec(),
            vec![40, 80, 10, 10]
        );
    }

    #[test]
    fn test_compress_expand() {
        let v = ints([1, 2, 3, 4]);
        let m = mask([false, true, false, true]);
        let packed = v.compress(&m).unwrap();
        assert_eq!(packed.to_vec(), vec![2, 4, 0, 0]);
        assert_eq!(packed.expand(&m).unwrap().to_vec(), vec![0, 2, 0, 4]);
    }

    #[test]
    fn test_select_from() {
        let v = ints([10, 20, 30, 40]);
        let idx = ints([3, -1, 6, 1]);
        assert_eq!(v.select_from(&idx).unwrap().to_vec(), vec![40, 40, 30, 20]);
        assert_eq!(
            v.select_from_masked(&idx, &mask([true, false, true, false]))
                .unwrap()
                .to_vec(),
            vec![40, 0, 30, 0]
        );

        let second = ints([50, 60, 70, 80]);
        let idx = ints([7, 0, -1, 12]);
        assert_eq!(
            v.select_from_pair(&second, &idx).unwrap().to_vec(),
            vec![80, 10, 80, 50]
        );
    }

    #[test]
    fn test_to_shuffle_wraps() {
        let v = ints([5, -1, 2, -6]);
        assert_eq!(v.to_shuffle().to_vec(), vec![1, 3, 2, 2]);
        let f = f32x4().from_values(&[1.9, -0.5, 3.0, 7.0]).unwrap();
        assert_eq!(f.to_shuffle().to_vec(), vec![1, 0, 3, 3]);
    }

    #[test]
    fn test_convert_widening_parts() {
        let bytes = Species::<i8>::of(VectorShape::S64)
            .from_values(&[1, -2, 3, -4, 5, -6, 7, -8])
            .unwrap();
        let wide = Species::<i32>::of(VectorShape::S128);

        assert_eq!(bytes.cast_shape(wide, 0).unwrap().to_vec(), vec![1, -2, 3, -4]);
        assert_eq!(bytes.cast_shape(wide, 1).unwrap().to_vec(), vec![5, -6, 7, -8]);
        assert!(matches!(
            bytes.cast_shape(wide, 2),
            Err(LanevecError::ShapeMismatch { .. })
        ));
        assert!(bytes.cast_shape(wide, -1).is_err());
    }

    #[test]
    fn test_convert_narrowing_parts() {
        let v = ints([1, 2, 3, 4]);
        let narrow = Species::<f64>::of(VectorShape::S512);
        assert_eq!(
            v.cast_shape(narrow, 0).unwrap().to_vec(),
            vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            v.cast_shape(narrow, -1).unwrap().to_vec(),
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]
        );
        assert!(v.cast_shape(narrow, 1).is_err());
    }

    #[test]
    fn test_convert_uses_as_semantics() {
        let f = f32x4()
            .from_values(&[1.9, -2.9, f32::NAN, f32::INFINITY])
            .unwrap();
        assert_eq!(
            f.cast_shape(i32x4(), 0).unwrap().to_vec(),
            vec![1, -2, 0, i32::MAX]
        );
    }

    #[test]
    fn test_reinterpret() {
        let v = ints([1, 0x0102_0304, -1, 0]);
        let bytes = v
            .reinterpret_shape(Species::<i8>::of(VectorShape::S128), 0)
            .unwrap();
        assert_eq!(bytes.to_vec()[..8], [1i8, 0, 0, 0, 4, 3, 2, 1]);

        let halves = v
            .reinterpret_shape(Species::<i64>::of(VectorShape::S64), 1)
            .unwrap();
        assert_eq!(halves.to_vec(), vec![0x0000_0000_ffff_ffff]);

        let floats = v.reinterpret_shape(f32x4(), 0).unwrap();
        assert_eq!(floats.lane(0).unwrap().to_bits(), 1);
    }
}
