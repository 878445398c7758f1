//! # lanevec
//!
//! Shaped SIMD vectors with lane-exact portable semantics.
//!
//! A [`Vector`] holds a fixed number of lanes of one primitive [`Element`]
//! kind. Its [`Species`] (element kind plus [`VectorShape`]) is carried at run
//! time, so the same code runs at 64, 128, 256 or 512 bits. [`Mask`] selects
//! lanes for masked operations and memory transfers; [`Shuffle`] rearranges
//! them.
//!
//! Every operation has a portable per-lane definition. Where the host CPU
//! offers a faster route with identical results (see [`simd::backend`]), it is
//! taken automatically.
//!
//! ```rust
//! use lanevec::{BinaryOp, Species, Vector, VectorShape};
//!
//! let species = Species::<f32>::of(VectorShape::S128);
//! let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let mut out = vec![0.0f32; 6];
//!
//! let bound = species.loop_bound(data.len());
//! let mut i = 0;
//! while i < bound {
//!     let v = Vector::from_slice(species, &data, i)?;
//!     v.lanewise(BinaryOp::Mul, &v)?.into_slice(&mut out, i)?;
//!     i += species.lane_count();
//! }
//! let m = species.index_in_range(i, data.len());
//! let v = Vector::from_slice_masked(species, &data, i, &m)?;
//! v.lanewise_masked(BinaryOp::Mul, &v, &m)?.into_slice_masked(&mut out, i, &m)?;
//!
//! assert_eq!(out, vec![1.0, 4.0, 9.0, 16.0, 25.0, 36.0]);
//! # Ok::<(), lanevec::LanevecError>(())
//! ```

pub mod error;
pub mod simd;

pub use error::{LanevecError, Result};
pub use simd::{
    AssociativeOp, BinaryOp, ByteOrder, Comparison, Conversion, Element, ElementKind, Mask,
    Shuffle, SimdLanewise, SimdReduce, Species, TernaryOp, Test, UnaryOp, Vector, VectorShape,
};

/// Slices shorter than this use the scalar loop in the slice kernels.
pub const SIMD_THRESHOLD: usize = 2048;

/// Slices longer than this are split across rayon's thread pool.
pub const PARALLEL_SIMD_THRESHOLD: usize = 262_144;

/// Target number of elements per parallel chunk.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;
