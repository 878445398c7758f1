#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::backend::Arith;

/// Number of f32 lanes in a 256-bit register.
pub(crate) const F32_LANES: usize = 8;

/// Number of f64 lanes in a 256-bit register.
pub(crate) const F64_LANES: usize = 4;

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
/// The CPU must support AVX.
#[target_feature(enable = "avx")]
pub(crate) unsafe fn binary_f32(arith: Arith, a: &[f32], b: &[f32]) -> Vec<f32> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = vec![0.0f32; a.len()];

    let mut dst = out.chunks_exact_mut(F32_LANES);
    let mut lhs = a.chunks_exact(F32_LANES);
    let mut rhs = b.chunks_exact(F32_LANES);
    for ((d, x), y) in (&mut dst).zip(&mut lhs).zip(&mut rhs) {
        // SAFETY: every chunk holds exactly F32_LANES elements; loads and
        // stores are unaligned.
        let x = _mm256_loadu_ps(x.as_ptr());
        let y = _mm256_loadu_ps(y.as_ptr());
        let r = match arith {
            Arith::Add => _mm256_add_ps(x, y),
            Arith::Sub => _mm256_sub_ps(x, y),
            Arith::Mul => _mm256_mul_ps(x, y),
            Arith::Div => _mm256_div_ps(x, y),
        };
        _mm256_storeu_ps(d.as_mut_ptr(), r);
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
/// The CPU must support AVX.
#[target_feature(enable = "avx")]
pub(crate) unsafe fn binary_f64(arith: Arith, a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = vec![0.0f64; a.len()];

    let mut dst = out.chunks_exact_mut(F64_LANES);
    let mut lhs = a.chunks_exact(F64_LANES);
    let mut rhs = b.chunks_exact(F64_LANES);
    for ((d, x), y) in (&mut dst).zip(&mut lhs).zip(&mut rhs) {
        // SAFETY: every chunk holds exactly F64_LANES elements.
        let x = _mm256_loadu_pd(x.as_ptr());
        let y = _mm256_loadu_pd(y.as_ptr());
        let r = match arith {
            Arith::Add => _mm256_add_pd(x, y),
            Arith::Sub => _mm256_sub_pd(x, y),
            Arith::Mul => _mm256_mul_pd(x, y),
            Arith::Div => _mm256_div_pd(x, y),
        };
        _mm256_storeu_pd(d.as_mut_ptr(), r);
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
