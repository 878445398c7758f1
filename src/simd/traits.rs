use crate::simd::ops::{AssociativeOp, BinaryOp};

/// Lane-wise binary operators over whole slices.
///
/// Three strategies are offered: strip-mined vector loops, the same loops
/// split across rayon's thread pool, and a plain scalar loop. All three
/// produce identical results, and a failing integer division reports the
/// first zero divisor in element order.
pub trait SimdLanewise<Rhs = Self> {
    type Output;

    fn simd_lanewise(self, op: BinaryOp, rhs: Rhs) -> Self::Output;
    fn par_simd_lanewise(self, op: BinaryOp, rhs: Rhs) -> Self::Output;
    fn scalar_lanewise(self, op: BinaryOp, rhs: Rhs) -> Self::Output;
}

/// Associative reductions over whole slices.
///
/// Floating `Add` and `Mul` combine elements in a different order per
/// strategy, so their results may differ in the last bits.
pub trait SimdReduce {
    type Output;

    fn simd_reduce(self, op: AssociativeOp) -> Self::Output;
    fn par_simd_reduce(self, op: AssociativeOp) -> Self::Output;
    fn scalar_reduce(self, op: AssociativeOp) -> Self::Output;
}
