//! AVX kernels for 256-bit registers.
//!
//! This module is only compiled when `build.rs` finds AVX2 on the build host
//! (`cfg(avx2)`). The instructions used here need only AVX, which is checked
//! again at runtime by [`Avx2Backend::detect`] before any kernel runs.
//!
//! # Available Kernels
//!
//! - `f32`: add, sub, mul, div over 8 lanes per register
//! - `f64`: add, sub, mul, div over 4 lanes per register
//!
//! Lanes left over after the last full register are computed with scalar
//! arithmetic, which rounds identically.

pub(crate) mod lanewise;

use crate::simd::backend::{Arith, Backend};
use crate::simd::ops::BinaryOp;
use crate::simd::species::VectorShape;

/// Backend running f32/f64 arithmetic on AVX registers.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Backend {
    _detected: (),
}

impl Avx2Backend {
    /// The backend, if the running CPU supports AVX.
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx") {
            Some(Self { _detected: () })
        } else {
            log::debug!("AVX not reported by the CPU, skipping the avx2 backend");
            None
        }
    }
}

impl Backend for Avx2Backend {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn preferred_shape(&self) -> VectorShape {
        VectorShape::S256
    }

    fn binary_f32(&self, op: BinaryOp, a: &[f32], b: &[f32]) -> Option<Vec<f32>> {
        let arith = Arith::from_op(op)?;
        if a.len() != b.len() {
            return None;
        }
        // SAFETY: an `Avx2Backend` only exists after `detect` saw AVX.
        Some(unsafe { lanewise::binary_f32(arith, a, b) })
    }

    fn binary_f64(&self, op: BinaryOp, a: &[f64], b: &[f64]) -> Option<Vec<f64>> {
        let arith = Arith::from_op(op)?;
        if a.len() != b.len() {
            return None;
        }
        // SAFETY: as above.
        Some(unsafe { lanewise::binary_f64(arith, a, b) })
    }
}
