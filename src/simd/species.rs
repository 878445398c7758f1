//! Vector shapes and species.
//!
//! A [`Species`] is the pairing of an element type with a [`VectorShape`]. It
//! fixes the lane count (`shape bits / element bits`) and is the factory for
//! vectors, masks and shuffles of that pairing.
//!
//! Species are singletons. Each (element kind, shape) slot is published once,
//! on first use, through a `OnceLock`; concurrent first callers all observe the
//! same `&'static Species`.
//!
//! ```rust
//! use lanevec::simd::species::{Species, VectorShape};
//!
//! let species = Species::<f32>::of(VectorShape::S128);
//! assert_eq!(species.lane_count(), 4);
//! assert!(std::ptr::eq(species, Species::<f32>::of(VectorShape::S128)));
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::error::{shape_mismatch, unsupported_shape, Result};
use crate::simd::backend;
use crate::simd::element::{Element, ElementKind};
use crate::simd::mask::Mask;
use crate::simd::shuffle::Shuffle;
use crate::simd::vector::Vector;

/// Physical vector width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VectorShape {
    S64,
    S128,
    S256,
    S512,
}

impl VectorShape {
    /// Number of supported shapes.
    pub const COUNT: usize = 4;

    /// All supported shapes, narrowest first.
    pub const ALL: [VectorShape; VectorShape::COUNT] = [
        VectorShape::S64,
        VectorShape::S128,
        VectorShape::S256,
        VectorShape::S512,
    ];

    /// Width in bits.
    pub const fn bit_size(self) -> usize {
        match self {
            VectorShape::S64 => 64,
            VectorShape::S128 => 128,
            VectorShape::S256 => 256,
            VectorShape::S512 => 512,
        }
    }

    pub const fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    pub(crate) const fn ordinal(self) -> usize {
        match self {
            VectorShape::S64 => 0,
            VectorShape::S128 => 1,
            VectorShape::S256 => 2,
            VectorShape::S512 => 3,
        }
    }

    /// Shape with exactly `bits` bits, if one exists.
    pub fn from_bits(bits: usize) -> Option<VectorShape> {
        VectorShape::ALL
            .into_iter()
            .find(|shape| shape.bit_size() == bits)
    }

    /// The widest shape the active backend accelerates.
    pub fn preferred() -> VectorShape {
        backend::active().preferred_shape()
    }
}

impl fmt::Display for VectorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bit_size())
    }
}

/// The (element type, shape) identity of a vector family.
pub struct Species<E: Element> {
    shape: VectorShape,
    lane_count: usize,
    _element: PhantomData<E>,
}

impl<E: Element> Species<E> {
    fn new(shape: VectorShape) -> Self {
        let lane_count = shape.bit_size() / E::KIND.bit_size();
        debug_assert!(lane_count >= 1, "lane count must be at least one");

        Self {
            shape,
            lane_count,
            _element: PhantomData,
        }
    }

    /// Returns the singleton species for `E` and `shape`.
    pub fn of(shape: VectorShape) -> &'static Species<E> {
        E::species_slot(shape).get_or_init(|| {
            log::debug!("publishing species {} x {}", E::KIND, shape);
            Species::new(shape)
        })
    }

    /// Returns the singleton species for `E` with a vector width of `bits`.
    ///
    /// # Errors
    ///
    /// `UnsupportedShape` when no shape has exactly `bits` bits.
    pub fn of_width(bits: usize) -> Result<&'static Species<E>> {
        VectorShape::from_bits(bits)
            .map(Species::of)
            .ok_or_else(|| unsupported_shape(E::KIND, bits))
    }

    /// Species of the backend's preferred shape.
    pub fn preferred() -> &'static Species<E> {
        Species::of(VectorShape::preferred())
    }

    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    #[inline(always)]
    pub fn shape(&self) -> VectorShape {
        self.shape
    }

    pub fn element_kind(&self) -> ElementKind {
        E::KIND
    }

    /// Size of one lane in bytes.
    pub fn element_size(&self) -> usize {
        E::BYTES
    }

    pub fn bit_size(&self) -> usize {
        self.shape.bit_size()
    }

    /// Size of a whole vector in bytes.
    pub fn byte_size(&self) -> usize {
        self.shape.byte_size()
    }

    /// Largest multiple of the lane count that does not exceed `len`.
    ///
    /// This is where a strip-mined loop over `len` elements stops taking full
    /// vectors and hands over to a masked tail.
    pub fn loop_bound(&self, len: usize) -> usize {
        len - len % self.lane_count
    }

    /// Fails with `ShapeMismatch` unless `other` is this species.
    pub(crate) fn check(&self, other: &Species<E>) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(shape_mismatch(format!(
                "species {} does not match species {}",
                self, other
            )))
        }
    }

    /// Fails with `ShapeMismatch` unless `len` equals the lane count.
    pub(crate) fn check_length(&self, len: usize) -> Result<()> {
        if len == self.lane_count {
            Ok(())
        } else {
            Err(shape_mismatch(format!(
                "species {} needs {} lanes, found {}",
                self, self.lane_count, len
            )))
        }
    }

    // ================================================================================================
    // FACTORIES
    // ================================================================================================

    /// Vector with every lane zero.
    pub fn zero(&'static self) -> Vector<E> {
        self.broadcast(E::ZERO)
    }

    /// Vector with every lane set to `value`.
    pub fn broadcast(&'static self, value: E) -> Vector<E> {
        Vector::from_lanes(self, vec![value; self.lane_count])
    }

    /// Vector whose lane `i` holds `i`.
    pub fn iota(&'static self) -> Vector<E> {
        self.from_fn(|i| E::from_lane(i as i64))
    }

    /// Vector assembled from exactly `lane_count` values.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when `values` does not hold exactly `lane_count` values.
    pub fn from_values(&'static self, values: &[E]) -> Result<Vector<E>> {
        self.check_length(values.len())?;
        Ok(Vector::from_lanes(self, values.to_vec()))
    }

    /// Vector whose lane `i` holds `f(i)`.
    pub fn from_fn(&'static self, f: impl FnMut(usize) -> E) -> Vector<E> {
        Vector::from_lanes(self, (0..self.lane_count).map(f).collect())
    }

    /// Mask with every lane set to `bit`.
    pub fn mask_all(&'static self, bit: bool) -> Mask<E> {
        Mask::all(self, bit)
    }

    /// The identity shuffle `[0, 1, ..., lane_count - 1]`.
    pub fn iota_shuffle(&'static self) -> Shuffle<E> {
        Shuffle::iota(self)
    }

    /// Mask whose lane `i` is set iff `offset + i < limit`.
    pub fn index_in_range(&'static self, offset: usize, limit: usize) -> Mask<E> {
        Mask::index_in_upper_range(self, offset, limit)
    }
}

impl<E: Element> PartialEq for Species<E> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl<E: Element> Eq for Species<E> {}

impl<E: Element> fmt::Debug for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Species")
            .field("element", &E::KIND)
            .field("shape", &self.shape)
            .field("lane_count", &self.lane_count)
            .finish()
    }
}

impl<E: Element> fmt::Display for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", E::KIND, self.lane_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LanevecError;

    #[test]
    fn test_lane_counts() {
        for shape in VectorShape::ALL {
            assert_eq!(Species::<i8>::of(shape).lane_count(), shape.bit_size() / 8);
            assert_eq!(Species::<i16>::of(shape).lane_count(), shape.bit_size() / 16);
            assert_eq!(Species::<f32>::of(shape).lane_count(), shape.bit_size() / 32);
            assert_eq!(Species::<f64>::of(shape).lane_count(), shape.bit_size() / 64);
        }
        assert_eq!(Species::<i64>::of(VectorShape::S64).lane_count(), 1);
    }

    #[test]
    fn test_singleton_identity() {
        let a = Species::<i32>::of(VectorShape::S256);
        let b = Species::<i32>::of_width(256).unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.byte_size(), 32);
        assert_eq!(a.element_kind(), ElementKind::I32);
        assert_eq!(a.element_size(), 4);
    }

    #[test]
    fn test_unsupported_width() {
        let err = Species::<f32>::of_width(96).unwrap_err();
        assert_eq!(
            err,
            LanevecError::UnsupportedShape {
                kind: ElementKind::F32,
                bits: 96
            }
        );
        assert!(Species::<i8>::of_width(1024).is_err());
    }

    #[test]
    fn test_concurrent_first_use_publishes_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| Species::<i16>::of(VectorShape::S512) as *const _ as usize)
            })
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_loop_bound() {
        let species = Species::<f32>::of(VectorShape::S128);
        assert_eq!(species.loop_bound(0), 0);
        assert_eq!(species.loop_bound(3), 0);
        assert_eq!(species.loop_bound(4), 4);
        assert_eq!(species.loop_bound(11), 8);
    }

    #[test]
    fn test_factories() {
        let species = Species::<i32>::of(VectorShape::S128);
        assert_eq!(species.zero().to_vec(), vec![0, 0, 0, 0]);
        assert_eq!(species.broadcast(7).to_vec(), vec![7, 7, 7, 7]);
        assert_eq!(species.iota().to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(species.from_fn(|i| (i * i) as i32).to_vec(), vec![0, 1, 4, 9]);
        assert!(species.from_values(&[1, 2, 3]).is_err());
        assert!(species.mask_all(true).all_true());
        assert_eq!(species.iota_shuffle().to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(species.index_in_range(2, 5).to_vec(), vec![true, true, true, false]);
    }

    #[test]
    fn test_display() {
        let species = Species::<f64>::of(VectorShape::S256);
        assert_eq!(species.to_string(), "f64x4");
        assert_eq!(VectorShape::S256.to_string(), "256-bit");
    }
}
