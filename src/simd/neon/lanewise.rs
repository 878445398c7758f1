#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::simd::backend::Arith;

/// Number of f32 lanes in a 128-bit register.
pub(crate) const F32_LANES: usize = 4;

/// Number of f64 lanes in a 128-bit register.
pub(crate) const F64_LANES: usize = 2;

#[inline(always)]
fn scalar_f32(arith: Arith, x: f32, y: f32) -> f32 {
    match arith {
        Arith::Add => x + y,
        Arith::Sub => x - y,
        Arith::Mul => x * y,
        Arith::Div => x / y,
    }
}

#[inline(always)]
fn scalar_f64(arith: Arith, x: f64, y: f64) -> f64 {
    match arith {
        Arith::Add => x + y,
        Arith::Sub => x - y,
        Arith::Mul => x * y,
        Arith::Div => x / y,
    }
}

/// Lane-wise `arith` over two equally long f32 slices.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn binary_f32(arith: Arith, a: &[f32], b: &[f32]) -> Vec<f32> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = vec![0.0f32; a.len()];

    let mut dst = out.chunks_exact_mut(F32_LANES);
    let mut lhs = a.chunks_exact(F32_LANES);
    let mut rhs = b.chunks_exact(F32_LANES);
    for ((d, x), y) in (&mut dst).zip(&mut lhs).zip(&mut rhs) {
        // SAFETY: every chunk holds exactly F32_LANES elements.
        let x = vld1q_f32(x.as_ptr());
        let y = vld1q_f32(y.as_ptr());
        let r = match arith {
            Arith::Add => vaddq_f32(x, y),
            Arith::Sub => vsubq_f32(x, y),
            Arith::Mul => vmulq_f32(x, y),
            Arith::Div => vdivq_f32(x, y),
        };
        vst1q_f32(d.as_mut_ptr(), r);
    }

    for ((d, &x), &y) in dst
        .into_remainder()
        .iter_mut()
        .zip(lhs.remainder())
        .zip(rhs.remainder())
    {
        *d = scalar_f32(arith, x, y);
    }
    out
}

/// Lane-wise `arith` over two equally long f64 slices.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn binary_f64(arith: Arith, a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = vec![0.0f64; a.len()];

    let mut dst = out.chunks_exact_mut(F64_LANES);
    let mut lhs = a.chunks_exact(F64_LANES);
    let mut rhs = b.chunks_exact(F64_LANES);
    for ((d, x), y) in (&mut dst).zip(&mut lhs).zip(&mut rhs) {
        // SAFETY: every chunk holds exactly F64_LANES elements.
        let x = vld1q_f64(x.as_ptr());
        let y = vld1q_f64(y.as_ptr());
        let r = match arith {
            Arith::Add => vaddq_f64(x, y),
            Arith::Sub => vsubq_f64(x, y),
            Arith::Mul => vmulq_f64(x, y),
            Arith::Div => vdivq_f64(x, y),
        };
        vst1q_f64(d.as_mut_ptr(), r);
    }

    for ((d, &x), &y) in dst
        .into_remainder()
        .iter_mut()
        .zip(lhs.remainder())
        .zip(rhs.remainder())
    {
        *d = scalar_f64(arith, x, y);
    }
    out
}
