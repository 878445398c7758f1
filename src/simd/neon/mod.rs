//! NEON kernels for 128-bit registers.
//!
//! This module is only compiled when `build.rs` finds NEON on the build host
//! (`cfg(neon)`). NEON is mandatory on AArch64, but [`NeonBackend::detect`]
//! still asks the CPU before any kernel runs.
//!
//! # Available Kernels
//!
//! - `f32`: add, sub, mul, div over 4 lanes per register
//! - `f64`: add, sub, mul, div over 2 lanes per register

pub(crate) mod lanewise;

use crate::simd::backend::{Arith, Backend};
use crate::simd::ops::BinaryOp;
use crate::simd::species::VectorShape;

/// Backend running f32/f64 arithmetic on NEON registers.
#[derive(Debug, Clone, Copy)]
pub struct NeonBackend {
    _detected: (),
}

impl NeonBackend {
    /// The backend, if the running CPU supports NEON.
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(Self { _detected: () })
        } else {
            log::debug!("NEON not reported by the CPU, skipping the neon backend");
            None
        }
    }
}

impl Backend for NeonBackend {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn preferred_shape(&self) -> VectorShape {
        VectorShape::S128
    }

    fn binary_f32(&self, op: BinaryOp, a: &[f32], b: &[f32]) -> Option<Vec<f32>> {
        let arith = Arith::from_op(op)?;
        if a.len() != b.len() {
            return None;
        }
        // SAFETY: a `NeonBackend` only exists after `detect` saw NEON.
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
