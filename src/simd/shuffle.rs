//! Lane selectors.
//!
//! A [`Shuffle`] holds one source-lane selector per lane. Selectors live in
//! `[-n, n)` where `n` is the lane count: `[0, n)` names a source lane and
//! `[-n, 0)` is an exceptional marker for "no valid source", which
//! [`Vector::rearrange`](crate::simd::vector::Vector::rearrange) turns into a
//! zero lane. Adding `n` to an exceptional selector recovers the lane it would
//! name after wrapping.
//!
//! Only [`Shuffle::from_values`] rejects out-of-range input.
//! [`Shuffle::from_slice`] and [`Shuffle::from_fn`] keep selectors already in
//! `[-n, n)`, exceptional ones included, and wrap the rest into `[0, n)`.
//! [`Shuffle::from_values_wrapped`] wraps every selector into `[0, n)`.

use std::fmt;

use crate::error::{as_index, index_out_of_range, invalid_index, out_of_bounds, Result};
use crate::simd::element::Element;
use crate::simd::mask::Mask;
use crate::simd::species::Species;
use crate::simd::vector::Vector;

/// Immutable lane selector of a species.
pub struct Shuffle<E: Element> {
    species: &'static Species<E>,
    indexes: Box<[i32]>,
}

/// Reduces any selector into `[0, n)`.
#[inline]
pub(crate) fn wrap_index(index: i64, n: usize) -> i32 {
    // n <= 64, so the result always fits
    index.rem_euclid(n as i64) as i32
}

/// Keeps a selector in `[-n, n)`, wraps anything else into `[0, n)`.
#[inline]
fn partially_wrap_index(index: i64, n: usize) -> i32 {
    let n_i = n as i64;
    if (-n_i..n_i).contains(&index) {
        index as i32
    } else {
        wrap_index(index, n)
    }
}

/// Maps a selector in `[-n, n)` into `[0, n)` by masking; `n` is a power of two.
#[inline]
fn wrap_pow2(s: i32, n: usize) -> i32 {
    debug_assert!(n.is_power_of_two());
    s & (n as i32 - 1)
}

/// Maps a selector in `[-n, n)` into `[0, n)` for any `n`.
#[inline]
fn wrap_general(s: i32, n: usize) -> i32 {
    if s < 0 {
        s + n as i32
    } else {
        s
    }
}

impl<E: Element> Shuffle<E> {
    pub(crate) fn from_indexes(species: &'static Species<E>, indexes: Vec<i32>) -> Self {
        debug_assert_eq!(indexes.len(), species.lane_count());
        Self {
            species,
            indexes: indexes.into_boxed_slice(),
        }
    }

    /// The identity shuffle `[0, 1, ..., n - 1]`.
    pub fn iota(species: &'static Species<E>) -> Self {
        Self::from_indexes(species, (0..species.lane_count() as i32).collect())
    }

    /// Shuffle from exactly `n` selectors, each in `[-n, n)`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` for the wrong number of selectors, `InvalidIndex` for
    /// the first selector outside `[-n, n)`.
    pub fn from_values(species: &'static Species<E>, indexes: &[i32]) -> Result<Self> {
        species.check_length(indexes.len())?;
        let n = species.lane_count() as i32;
        if let Some(&bad) = indexes.iter().find(|&&s| s < -n || s >= n) {
            return Err(invalid_index(bad, species.lane_count()));
        }
        Ok(Self::from_indexes(species, indexes.to_vec()))
    }

    /// Shuffle from exactly `n` selectors, each reduced into `[0, n)`.
    pub fn from_values_wrapped(species: &'static Species<E>, indexes: &[i32]) -> Result<Self> {
        species.check_length(indexes.len())?;
        Ok(Self::wrapped(species, indexes.iter().copied()))
    }

    /// Shuffle from `indexes[offset..offset + n]`.
    ///
    /// Selectors in `[-n, n)` are kept as given; others are reduced into
    /// `[0, n)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when the window runs past the end of `indexes`.
    pub fn from_slice(species: &'static Species<E>, indexes: &[i32], offset: usize) -> Result<Self> {
        let end = offset.saturating_add(species.lane_count());
        match indexes.get(offset..end) {
            Some(window) => Ok(Self::partially_wrapped(species, window.iter().copied())),
            None => Err(out_of_bounds(as_index(end - 1), indexes.len())),
        }
    }

    /// Shuffle whose lane `i` selects `f(i)`.
    ///
    /// Selectors in `[-n, n)` are kept as given, so a negative result marks
    /// the lane exceptional; others are reduced into `[0, n)`.
    pub fn from_fn(species: &'static Species<E>, f: impl FnMut(usize) -> i32) -> Self {
        Self::partially_wrapped(species, (0..species.lane_count()).map(f))
    }

    /// Arithmetic sequence `start + i * step`.
    ///
    /// With `wrap` every selector is reduced into `[0, n)`. Without it,
    /// selectors already in range are kept and the others become the
    /// exceptional value `wrapped - n`.
    pub fn iota_from(species: &'static Species<E>, start: i32, step: i32, wrap: bool) -> Self {
        let n = species.lane_count();
        let indexes = (0..n)
            .map(|i| {
                let raw = i64::from(start) + i as i64 * i64::from(step);
                let wrapped = wrap_index(raw, n);
                if wrap || (0..n as i64).contains(&raw) {
                    wrapped
                } else {
                    wrapped - n as i32
                }
            })
            .collect();
        Self::from_indexes(species, indexes)
    }

    fn wrapped(species: &'static Species<E>, indexes: impl Iterator<Item = i32>) -> Self {
        let n = species.lane_count();
        let indexes = indexes.map(|s| wrap_index(i64::from(s), n)).collect();
        Self::from_indexes(species, indexes)
    }

    fn partially_wrapped(species: &'static Species<E>, indexes: impl Iterator<Item = i32>) -> Self {
        let n = species.lane_count();
        let indexes = indexes
            .map(|s| partially_wrap_index(i64::from(s), n))
            .collect();
        Self::from_indexes(species, indexes)
    }

    #[inline(always)]
    pub fn species(&self) -> &'static Species<E> {
        self.species
    }

    #[inline(always)]
    pub fn length(&self) -> usize {
        self.indexes.len()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.indexes
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.indexes.to_vec()
    }

    /// Copies the selectors into `dst[offset..offset + n]`.
    pub fn into_slice(&self, dst: &mut [i32], offset: usize) -> Result<()> {
        let len = dst.len();
        let end = offset.saturating_add(self.length());
        match dst.get_mut(offset..end) {
            Some(window) => {
                window.copy_from_slice(&self.indexes);
                Ok(())
            }
            None => Err(out_of_bounds(as_index(end - 1), len)),
        }
    }

    /// Raw selector of lane `i`, possibly exceptional.
    pub fn lane_source(&self, i: usize) -> Result<i32> {
        self.indexes
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_range(as_index(i), self.length()))
    }

    /// Equivalent shuffle with every selector in `[0, n)`.
    pub fn wrap_indexes(&self) -> Self {
        let n = self.length();
        let indexes = if n.is_power_of_two() {
            self.indexes.iter().map(|&s| wrap_pow2(s, n)).collect()
        } else {
            self.indexes.iter().map(|&s| wrap_general(s, n)).collect()
        };
        Self::from_indexes(self.species, indexes)
    }

    /// Mask of the lanes whose selector is not exceptional.
    pub fn lane_is_valid(&self) -> Mask<E> {
        let bits = self.indexes.iter().map(|&s| s >= 0).collect();
        Mask::from_lanes(self.species, bits)
    }

    /// Composes two shuffles: lane `i` of the result is this shuffle's
    /// selector at lane `other[i]`.
    ///
    /// An exceptional selector in `other` yields selector 0 in the result.
    pub fn rearrange(&self, other: &Shuffle<E>) -> Result<Self> {
        self.species.check(other.species)?;
        let indexes = other
            .indexes
            .iter()
            .map(|&s| if s < 0 { 0 } else { self.indexes[s as usize] })
            .collect();
        Ok(Self::from_indexes(self.species, indexes))
    }

    /// Selectors as a vector of lane values.
    pub fn to_vector(&self) -> Vector<E> {
        let lanes = self.indexes.iter().map(|&s| E::from_lane(s)).collect();
        Vector::from_lanes(self.species, lanes)
    }

    /// The same selectors under a species of another element kind.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` unless `target` has the same lane count.
    pub fn cast<F: Element>(&self, target: &'static Species<F>) -> Result<Shuffle<F>> {
        target.check_length(self.length())?;
        Ok(Shuffle::from_indexes(target, self.indexes.to_vec()))
    }
}

impl<E: Element> Clone for Shuffle<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            indexes: self.indexes.clone(),
        }
    }
}

impl<E: Element> PartialEq for Shuffle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.indexes == other.indexes
    }
}

impl<E: Element> Eq for Shuffle<E> {}

impl<E: Element> fmt::Debug for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shuffle<{}>", self.species)?;
        f.debug_list().entries(self.indexes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LanevecError;
    use crate::simd::species::VectorShape;

    fn species4() -> &'static Species<f32> {
        Species::of(VectorShape::S128)
    }

    #[test]
    fn test_from_values_strict() {
        let s = Shuffle::from_values(species4(), &[3, -4, 0, -1]).unwrap();
        assert_eq!(s.to_vec(), vec![3, -4, 0, -1]);

        assert_eq!(
            Shuffle::from_values(species4(), &[0, 1, 4, 2]).unwrap_err(),
            LanevecError::InvalidIndex {
                index: 4,
                lane_count: 4
            }
        );
        assert!(Shuffle::from_values(species4(), &[0, -5, 1, 2]).is_err());
        assert!(matches!(
            Shuffle::from_values(species4(), &[0, 1]),
            Err(LanevecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_wrapping_constructors() {
        let s = Shuffle::from_values_wrapped(species4(), &[2, -1, 0, 5]).unwrap();
        assert_eq!(s.to_vec(), vec![2, 3, 0, 1]);

        let s = Shuffle::from_fn(species4(), |i| i as i32 * 3 - 9);
        assert_eq!(s.to_vec(), vec![3, 2, -3, 0]);

        let s = Shuffle::from_slice(species4(), &[9, 9, 7, -6, 1, 2], 2).unwrap();
        assert_eq!(s.to_vec(), vec![3, 2, 1, 2]);
        assert!(Shuffle::from_slice(species4(), &[0, 1, 2], 0).is_err());
    }

    #[test]
    fn test_in_range_selectors_are_kept() {
        let s = Shuffle::from_fn(species4(), |_| -1);
        assert_eq!(s.to_vec(), vec![-1, -1, -1, -1]);
        assert!(!s.lane_is_valid().any_true());
        assert_eq!(s.wrap_indexes().to_vec(), vec![3, 3, 3, 3]);

        let s = Shuffle::from_slice(species4(), &[0, -2, 1, -4], 0).unwrap();
        assert_eq!(s.to_vec(), vec![0, -2, 1, -4]);
        assert_eq!(s.lane_is_valid().to_vec(), vec![true, false, true, false]);

        let v = species4().iota();
        assert_eq!(v.rearrange(&s).unwrap().to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_iota_from() {
        let s = Shuffle::iota_from(species4(), 1, 2, true);
        assert_eq!(s.to_vec(), vec![1, 3, 1, 3]);

        let s = Shuffle::iota_from(species4(), 1, 2, false);
        assert_eq!(s.to_vec(), vec![1, 3, -3, -1]);
        assert_eq!(s.lane_is_valid().to_vec(), vec![true, true, false, false]);
    }

    #[test]
    fn test_wrap_indexes_at_two_and_four_lanes() {
        let s = Shuffle::from_values(species4(), &[-4, -1, 2, 3]).unwrap();
        assert_eq!(s.wrap_indexes().to_vec(), vec![0, 3, 2, 3]);

        let two = Species::<f32>::of(VectorShape::S64);
        let s = Shuffle::from_values(two, &[-2, 1]).unwrap();
        assert_eq!(s.wrap_indexes().to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_wrap_paths_agree_for_every_lane_count() {
        for n in 1..=64usize {
            for s in -(n as i32)..n as i32 {
                let general = wrap_general(s, n);
                assert!((0..n as i32).contains(&general), "{s} at {n} lanes");
                assert_eq!(general, wrap_index(i64::from(s), n));
                if n.is_power_of_two() {
                    assert_eq!(wrap_pow2(s, n), general, "{s} at {n} lanes");
                }
            }
        }
    }

    #[test]
    fn test_lane_source() {
        let s = Shuffle::from_values(species4(), &[3, -2, 0, 1]).unwrap();
        assert_eq!(s.lane_source(1).unwrap(), -2);
        assert!(s.lane_source(4).is_err());
    }

    #[test]
    fn test_rearrange_composes() {
        let s = Shuffle::from_values(species4(), &[3, 2, 1, 0]).unwrap();
        let t = Shuffle::from_values(species4(), &[1, 1, -1, 3]).unwrap();
        assert_eq!(s.rearrange(&t).unwrap().to_vec(), vec![2, 2, 0, 0]);

        let iota = Shuffle::iota(species4());
        assert_eq!(iota.rearrange(&s).unwrap(), s);
    }

    #[test]
    fn test_to_vector_and_cast() {
        let s = Shuffle::from_values(species4(), &[3, -2, 0, 1]).unwrap();
        assert_eq!(s.to_vector().to_vec(), vec![3.0, -2.0, 0.0, 1.0]);

        let cast = s.cast(Species::<i64>::of(VectorShape::S256)).unwrap();
        assert_eq!(cast.to_vec(), s.to_vec());
        assert!(s.cast(Species::<i8>::of(VectorShape::S128)).is_err());
    }

    #[test]
    fn test_into_slice() {
        let s = Shuffle::iota(species4());
        let mut out = [9; 5];
        s.into_slice(&mut out, 1).unwrap();
        assert_eq!(out, [9, 0, 1, 2, 3]);
        assert!(s.into_slice(&mut out, 2).is_err());
    }
}
