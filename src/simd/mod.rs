//! Shaped vectors, masks and shuffles.
//!
//! The types here are generic over an [`Element`] kind and carry their
//! [`Species`] at run time, so one piece of code can run at any
//! [`VectorShape`]. Accelerated kernels for the host CPU are compiled in
//! through `cfg(avx2)` or `cfg(neon)`, set by `build.rs`.

#[cfg(all(avx2, target_arch = "x86_64"))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod backend;
pub mod element;
pub mod mask;
pub mod memory;
pub mod ops;
pub mod shuffle;
pub mod slice;
pub mod species;
pub mod traits;
pub mod vector;

pub use backend::{Backend, OpTag, ScalarBackend};
pub use element::{Element, ElementKind};
pub use mask::Mask;
pub use memory::ByteOrder;
pub use ops::{AssociativeOp, BinaryOp, Comparison, Conversion, TernaryOp, Test, UnaryOp};
pub use shuffle::Shuffle;
pub use species::{Species, VectorShape};
pub use traits::{SimdLanewise, SimdReduce};
pub use vector::Vector;
