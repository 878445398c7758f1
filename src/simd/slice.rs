//! Slice kernels built from shaped vectors.
//!
//! Every kernel here is the same strip-mined loop: full vectors of
//! [`Species::preferred`] up to [`Species::loop_bound`], then one masked
//! vector covering the tail, guarded by [`Species::index_in_range`]. Tails
//! never read or write past the end of a slice.
//!
//! Size thresholds pick between three strategies, as in the crate-level
//! constants:
//!
//! - below [`SIMD_THRESHOLD`] a scalar loop is cheaper than building vectors,
//! - above [`PARALLEL_SIMD_THRESHOLD`] the slice is split into chunks of
//!   about [`PARALLEL_CHUNK_SIZE`] elements, each strip-mined on rayon's
//!   thread pool.

use rayon::prelude::*;

use crate::error::{arithmetic_error, shape_mismatch, LanevecError, Result};
use crate::simd::element::Element;
use crate::simd::ops::{ensure_supported, AssociativeOp, BinaryOp};
use crate::simd::species::Species;
use crate::simd::traits::{SimdLanewise, SimdReduce};
use crate::simd::vector::Vector;
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD, SIMD_THRESHOLD};

fn check_lengths<E>(a: &[E], b: &[E]) -> Result<()> {
    if a.len() != b.len() {
        return Err(shape_mismatch(format!(
            "slices of length {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Shifts a lane-relative arithmetic error to an element index.
fn at_offset(err: LanevecError, offset: usize) -> LanevecError {
    match err {
        LanevecError::ArithmeticError { lane, message } => LanevecError::ArithmeticError {
            lane: offset + lane,
            message,
        },
        other => other,
    }
}

/// Fails with the element index of the first zero divisor of an integer
/// division, so every strategy reports the same element.
fn first_zero_divisor<E: Element>(op: BinaryOp, b: &[E]) -> Result<()> {
    if op.is_division() && !E::KIND.is_floating() {
        if let Some(i) = b.iter().position(|&x| x == E::ZERO) {
            return Err(arithmetic_error(i, "integer division by zero"));
        }
    }
    Ok(())
}

/// Chunk length for the parallel kernels: a whole number of vectors.
#[inline(always)]
fn chunk_size(step: usize) -> usize {
    ((PARALLEL_CHUNK_SIZE / step) * step).max(step)
}

// ================================================================================================
// LANE-WISE
// ================================================================================================

pub(crate) fn scalar_lanewise<E: Element>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    ensure_supported::<E>(op)?;
    check_lengths(a, b)?;
    first_zero_divisor(op, b)?;
    Ok(a.iter().zip(b).map(|(&x, &y)| E::binary(op, x, y)).collect())
}

/// Strip-mined `a op b` into `out`. All three slices have the same length.
fn strip_lanewise<E: Element>(op: BinaryOp, a: &[E], b: &[E], out: &mut [E]) -> Result<()> {
    let species = Species::<E>::preferred();
    let step = species.lane_count();
    let bound = species.loop_bound(a.len());

    for i in (0..bound).step_by(step) {
        let va = Vector::from_slice(species, a, i)?;
        let vb = Vector::from_slice(species, b, i)?;
        va.lanewise(op, &vb)
            .map_err(|e| at_offset(e, i))?
            .into_slice(out, i)?;
    }

    if bound < a.len() {
        let m = species.index_in_range(bound, a.len());
        let va = Vector::from_slice_masked(species, a, bound, &m)?;
        let vb = Vector::from_slice_masked(species, b, bound, &m)?;
        va.lanewise_masked(op, &vb, &m)
            .map_err(|e| at_offset(e, bound))?
            .into_slice_masked(out, bound, &m)?;
    }
    Ok(())
}

pub(crate) fn simd_lanewise<E: Element>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    // For small slices, fall back to scalar to avoid vector setup overhead
    if a.len() < SIMD_THRESHOLD {
        return scalar_lanewise(op, a, b);
    }
    ensure_supported::<E>(op)?;
    check_lengths(a, b)?;

    let mut out = vec![E::ZERO; a.len()];
    strip_lanewise(op, a, b, &mut out)?;
    Ok(out)
}

pub(crate) fn parallel_simd_lanewise<E: Element>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return simd_lanewise(op, a, b);
    }
    ensure_supported::<E>(op)?;
    check_lengths(a, b)?;
    // chunks fail in any order, so find the lowest faulting element up front
    first_zero_divisor(op, b)?;

    let chunk_size = chunk_size(Species::<E>::preferred().lane_count());
    let mut out = vec![E::ZERO; a.len()];

    out.par_chunks_mut(chunk_size)
        .enumerate()
        .try_for_each(|(chunk_idx, out_chunk)| {
            let start = chunk_idx * chunk_size;
            let end = start + out_chunk.len();
            strip_lanewise(op, &a[start..end], &b[start..end], out_chunk)
                .map_err(|e| at_offset(e, start))
        })?;
    Ok(out)
}

impl<E: Element> SimdLanewise<&[E]> for &[E] {
    type Output = Result<Vec<E>>;

    #[inline(always)]
    fn simd_lanewise(self, op: BinaryOp, rhs: &[E]) -> Self::Output {
        simd_lanewise(op, self, rhs)
    }

    #[inline(always)]
    fn par_simd_lanewise(self, op: BinaryOp, rhs: &[E]) -> Self::Output {
        parallel_simd_lanewise(op, self, rhs)
    }

    #[inline(always)]
    fn scalar_lanewise(self, op: BinaryOp, rhs: &[E]) -> Self::Output {
        scalar_lanewise(op, self, rhs)
    }
}

// ================================================================================================
// REDUCTIONS
// ================================================================================================

pub(crate) fn scalar_reduce<E: Element>(op: AssociativeOp, a: &[E]) -> Result<E> {
    ensure_supported::<E>(op)?;
    let binary = op.as_binary();
    Ok(a.iter().fold(op.identity::<E>(), |acc, &x| E::binary(binary, acc, x)))
}

/// Strip-mined reduction of `a`: one accumulator vector, folded at the end.
fn strip_reduce<E: Element>(op: AssociativeOp, a: &[E]) -> Result<E> {
    if op == AssociativeOp::FirstNonzero {
        return strip_first_nonzero(a);
    }

    let species = Species::<E>::preferred();
    let step = species.lane_count();
    let bound = species.loop_bound(a.len());
    let identity = op.identity::<E>();
    let binary = op.as_binary();

    let mut acc = species.broadcast(identity);
    for i in (0..bound).step_by(step) {
        acc = acc.lanewise(binary, &Vector::from_slice(species, a, i)?)?;
    }

    if bound < a.len() {
        let m = species.index_in_range(bound, a.len());
        let tail = Vector::from_slice_masked_or(species, a, bound, &m, identity)?;
        acc = acc.lanewise(binary, &tail)?;
    }
    acc.reduce_lanes(op)
}

/// `FirstNonzero` is not commutative, so vectors are folded in element order
/// and the scan stops at the first vector holding a non-zero lane.
fn strip_first_nonzero<E: Element>(a: &[E]) -> Result<E> {
    let species = Species::<E>::preferred();
    let step = species.lane_count();

    for i in (0..a.len()).step_by(step) {
        let m = species.index_in_range(i, a.len());
        let v = Vector::from_slice_masked(species, a, i, &m)?;
        let r = v.reduce_lanes(AssociativeOp::FirstNonzero)?;
        if r.to_raw_bits() != 0 {
            return Ok(r);
        }
    }
    Ok(E::ZERO)
}

pub(crate) fn simd_reduce<E: Element>(op: AssociativeOp, a: &[E]) -> Result<E> {
    if a.len() < SIMD_THRESHOLD {
        return scalar_reduce(op, a);
    }
    ensure_supported::<E>(op)?;
    strip_reduce(op, a)
}

pub(crate) fn parallel_simd_reduce<E: Element>(op: AssociativeOp, a: &[E]) -> Result<E> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return simd_reduce(op, a);
    }
    ensure_supported::<E>(op)?;

    let chunk_size = chunk_size(Species::<E>::preferred().lane_count());
    let partials = a
        .par_chunks(chunk_size)
        .map(|chunk| strip_reduce(op, chunk))
        .collect::<Result<Vec<E>>>()?;

    let binary = op.as_binary();
    Ok(partials
        .into_iter()
        .fold(op.identity::<E>(), |acc, x| E::binary(binary, acc, x)))
}

impl<E: Element> SimdReduce for &[E] {
    type Output = Result<E>;

    #[inline(always)]
    fn simd_reduce(self, op: AssociativeOp) -> Self::Output {
        simd_reduce(op, self)
    }

    #[inline(always)]
    fn par_simd_reduce(self, op: AssociativeOp) -> Self::Output {
        parallel_simd_reduce(op, self)
    }

    #[inline(always)]
    fn scalar_reduce(self, op: AssociativeOp) -> Self::Output {
        scalar_reduce(op, self)
    }
}
