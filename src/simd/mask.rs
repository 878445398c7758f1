//! Per-lane boolean predicates.
//!
//! A [`Mask`] carries one flag per lane of its species. Masks come out of
//! comparisons and tests, out of explicit boolean sequences, and out of the
//! range predicate [`Mask::index_in_upper_range`] that guards the partial last
//! iteration of a strip-mined loop.

use std::fmt;

use crate::error::{as_index, index_out_of_range, out_of_bounds, unsupported_operation, Result};
use crate::simd::element::Element;
use crate::simd::species::Species;
use crate::simd::vector::Vector;

/// Immutable per-lane boolean predicate of a species.
pub struct Mask<E: Element> {
    species: &'static Species<E>,
    bits: Box<[bool]>,
}

impl<E: Element> Mask<E> {
    pub(crate) fn from_lanes(species: &'static Species<E>, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), species.lane_count());
        Self {
            species,
            bits: bits.into_boxed_slice(),
        }
    }

    /// Mask with every lane set to `bit`.
    pub fn all(species: &'static Species<E>, bit: bool) -> Self {
        Self::from_lanes(species, vec![bit; species.lane_count()])
    }

    /// Mask built from exactly `lane_count` flags.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when `bits` does not hold exactly `lane_count` flags.
    pub fn from_bools(species: &'static Species<E>, bits: &[bool]) -> Result<Self> {
        species.check_length(bits.len())?;
        Ok(Self::from_lanes(species, bits.to_vec()))
    }

    /// Mask built from `bits[offset..offset + lane_count]`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when the window runs past the end of `bits`.
    pub fn from_slice(species: &'static Species<E>, bits: &[bool], offset: usize) -> Result<Self> {
        let n = species.lane_count();
        match bits.get(offset..offset.saturating_add(n)) {
            Some(window) => Ok(Self::from_lanes(species, window.to_vec())),
            None => Err(out_of_bounds(
                as_index(offset.saturating_add(n) - 1),
                bits.len(),
            )),
        }
    }

    /// Mask whose lane `i` is bit `i` of `bits`. Lanes past 64 are unset.
    pub fn from_long(species: &'static Species<E>, bits: u64) -> Self {
        let flags = (0..species.lane_count())
            .map(|i| i < 64 && (bits >> i) & 1 == 1)
            .collect();
        Self::from_lanes(species, flags)
    }

    /// Mask whose lane `i` is set iff `offset + i < limit`.
    ///
    /// With `offset` the start of the current stride and `limit` the element
    /// count, this selects exactly the lanes that still hold data.
    pub fn index_in_upper_range(species: &'static Species<E>, offset: usize, limit: usize) -> Self {
        let flags = (0..species.lane_count())
            .map(|i| offset.checked_add(i).is_some_and(|j| j < limit))
            .collect();
        Self::from_lanes(species, flags)
    }

    /// This mask restricted to the lanes where `offset + i < limit`.
    pub fn index_in_range(&self, offset: usize, limit: usize) -> Self {
        let range = Self::index_in_upper_range(self.species, offset, limit);
        self.zip(&range, |a, b| a && b)
    }

    #[inline(always)]
    pub fn species(&self) -> &'static Species<E> {
        self.species
    }

    #[inline(always)]
    pub fn length(&self) -> usize {
        self.bits.len()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn to_vec(&self) -> Vec<bool> {
        self.bits.to_vec()
    }

    /// Copies the flags into `dst[offset..offset + lane_count]`.
    pub fn into_slice(&self, dst: &mut [bool], offset: usize) -> Result<()> {
        let len = dst.len();
        match dst.get_mut(offset..offset.saturating_add(self.length())) {
            Some(window) => {
                window.copy_from_slice(&self.bits);
                Ok(())
            }
            None => Err(out_of_bounds(
                as_index(offset.saturating_add(self.length()) - 1),
                len,
            )),
        }
    }

    fn zip(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> Self {
        let bits = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self::from_lanes(self.species, bits)
    }

    fn combine(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> Result<Self> {
        self.species.check(other.species)?;
        Ok(self.zip(other, f))
    }

    // ================================================================================================
    // BOOLEAN ALGEBRA
    // ================================================================================================

    pub fn and(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a ^ b)
    }

    /// `self & !other`.
    pub fn and_not(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a & !b)
    }

    /// Lane-wise equality of two masks.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a == b)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        let bits = self.bits.iter().map(|&b| !b).collect();
        Self::from_lanes(self.species, bits)
    }

    // ================================================================================================
    // QUERIES
    // ================================================================================================

    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Index of the first set lane, or `lane_count` if none is set.
    pub fn first_true(&self) -> usize {
        self.bits
            .iter()
            .position(|&b| b)
            .unwrap_or(self.length())
    }

    /// Index of the last set lane, or `-1` if none is set.
    pub fn last_true(&self) -> isize {
        self.bits
            .iter()
            .rposition(|&b| b)
            .map_or(-1, |i| i as isize)
    }

    pub fn any_true(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub fn all_true(&self) -> bool {
        self.bits.iter().all(|&b| b)
    }

    /// Packs the flags into a bit field, lane `i` at bit `i`.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when the mask has more than 64 lanes.
    pub fn to_long(&self) -> Result<u64> {
        if self.length() > 64 {
            return Err(unsupported_operation(format!(
                "a {}-lane mask does not fit in 64 bits",
                self.length()
            )));
        }
        Ok(self
            .bits
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &b)| if b { acc | (1 << i) } else { acc }))
    }

    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        self.bits
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_range(as_index(i), self.length()))
    }

    /// Vector with all-ones lanes where set and zero lanes elsewhere.
    pub fn to_vector(&self) -> Vector<E> {
        let ones = E::from_raw_bits(u64::MAX);
        let lanes = self
            .bits
            .iter()
            .map(|&b| if b { ones } else { E::ZERO })
            .collect();
        Vector::from_lanes(self.species, lanes)
    }

    /// Mask with the first `true_count` lanes set.
    pub fn compress(&self) -> Self {
        let count = self.true_count();
        let bits = (0..self.length()).map(|i| i < count).collect();
        Self::from_lanes(self.species, bits)
    }

    /// The same flags under a species of another element kind.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` unless `target` has the same lane count.
    pub fn cast<F: Element>(&self, target: &'static Species<F>) -> Result<Mask<F>> {
        target.check_length(self.length())?;
        Ok(Mask::from_lanes(target, self.bits.to_vec()))
    }
}

impl<E: Element> Clone for Mask<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            bits: self.bits.clone(),
        }
    }
}

impl<E: Element> PartialEq for Mask<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.bits == other.bits
    }
}

impl<E: Element> Eq for Mask<E> {}

impl<E: Element> fmt::Debug for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask<{}>", self.species)?;
        f.debug_list().entries(self.bits.iter()).finish()
    }
}
