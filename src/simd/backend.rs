//! Evaluation backends.
//!
//! The per-lane definitions in [`Element`] are the only source of truth for
//! what an operation computes. A [`Backend`] may offer a faster route for some
//! operations, but only where its output is identical to that definition for
//! every input; for anything else it declines by returning `None` and the
//! portable fallback runs.
//!
//! The backend is chosen once per process, on first use:
//!
//! - `LANEVEC_FORCE_SCALAR=1` forces the scalar backend,
//! - otherwise the kernels compiled in by `build.rs` (`cfg(avx2)` or
//!   `cfg(neon)`) are used if the running CPU supports them,
//! - otherwise the scalar backend is used.

use std::sync::OnceLock;

use crate::simd::element::Element;
use crate::simd::ops::{BinaryOp, TernaryOp, UnaryOp};
use crate::simd::species::VectorShape;

/// Environment variable that forces the scalar backend when set to `1`.
pub const FORCE_SCALAR_ENV: &str = "LANEVEC_FORCE_SCALAR";

/// Name of a primitive operation handed to [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Unary(UnaryOp),
    Binary(BinaryOp),
    Ternary(TernaryOp),
}

/// Operators with accelerated kernels. Their IEEE-754 results are exact, so
/// every kernel agrees with the scalar definition bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(fallback, allow(dead_code))]
pub(crate) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

#[cfg_attr(fallback, allow(dead_code))]
impl Arith {
    pub(crate) fn from_op(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Add => Some(Arith::Add),
            BinaryOp::Sub => Some(Arith::Sub),
            BinaryOp::Mul => Some(Arith::Mul),
            BinaryOp::Div => Some(Arith::Div),
            _ => None,
        }
    }
}

/// An execution strategy for primitive lane-wise operations.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Widest shape this backend handles in one register.
    fn preferred_shape(&self) -> VectorShape;

    /// Lane-wise `op` over two equally long `f32` slices, or `None` to decline.
    fn binary_f32(&self, _op: BinaryOp, _a: &[f32], _b: &[f32]) -> Option<Vec<f32>> {
        None
    }

    /// Lane-wise `op` over two equally long `f64` slices, or `None` to decline.
    fn binary_f64(&self, _op: BinaryOp, _a: &[f64], _b: &[f64]) -> Option<Vec<f64>> {
        None
    }
}

/// Backend that always declines, leaving every operation to the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl Backend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn preferred_shape(&self) -> VectorShape {
        VectorShape::S128
    }
}

static ACTIVE: OnceLock<Box<dyn Backend>> = OnceLock::new();

fn force_scalar() -> bool {
    std::env::var(FORCE_SCALAR_ENV)
        .map(|v| v == "1")
        .unwrap_or(false)
}

fn accelerated() -> Option<Box<dyn Backend>> {
    #[cfg(all(avx2, target_arch = "x86_64"))]
    {
        if let Some(backend) = crate::simd::avx2::Avx2Backend::detect() {
            return Some(Box::new(backend));
        }
    }

    #[cfg(all(neon, target_arch = "aarch64"))]
    {
        if let Some(backend) = crate::simd::neon::NeonBackend::detect() {
            return Some(Box::new(backend));
        }
    }

    None
}

fn select() -> Box<dyn Backend> {
    if force_scalar() {
        log::info!("{FORCE_SCALAR_ENV}=1: using the scalar backend");
        return Box::new(ScalarBackend);
    }

    match accelerated() {
        Some(backend) => {
            log::info!(
                "using the {} backend ({} registers)",
                backend.name(),
                backend.preferred_shape()
            );
            backend
        }
        None => {
            log::info!("no accelerated kernels for this CPU, using the scalar backend");
            Box::new(ScalarBackend)
        }
    }
}

/// The process-wide backend, selected on first call.
pub fn active() -> &'static dyn Backend {
    ACTIVE.get_or_init(select).as_ref()
}

/// Runs `tag` over `operands` on the active backend, or runs `fallback`.
///
/// `fallback` must compute the per-lane definition of `tag`; its result is
/// what the caller gets whenever the backend declines.
pub fn evaluate<E: Element>(
    tag: OpTag,
    operands: &[&[E]],
    fallback: impl FnOnce() -> Vec<E>,
) -> Vec<E> {
    evaluate_on(active(), tag, operands, fallback)
}

/// [`evaluate`] on an explicit backend.
pub fn evaluate_on<E: Element>(
    backend: &dyn Backend,
    tag: OpTag,
    operands: &[&[E]],
    fallback: impl FnOnce() -> Vec<E>,
) -> Vec<E> {
    if let (OpTag::Binary(op), [a, b]) = (tag, operands) {
        if let Some(lanes) = binary(backend, op, a, b) {
            return lanes;
        }
    }
    fallback()
}

fn binary<E: Element>(backend: &dyn Backend, op: BinaryOp, a: &[E], b: &[E]) -> Option<Vec<E>> {
    if a.len() != b.len() {
        return None;
    }
    if let (Some(a), Some(b)) = (E::as_f32_lanes(a), E::as_f32_lanes(b)) {
        return backend.binary_f32(op, a, b).and_then(E::from_f32_lanes);
    }
    if let (Some(a), Some(b)) = (E::as_f64_lanes(a), E::as_f64_lanes(b)) {
        return backend.binary_f64(op, a, b).and_then(E::from_f64_lanes);
    }
    None
}
