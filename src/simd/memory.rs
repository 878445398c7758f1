//! Moving vectors to and from linear memory.
//!
//! Three families of transfers are provided on [`Vector`]:
//!
//! - element slices (`from_slice`, `into_slice` and masked forms),
//! - gather and scatter through an index map (`*_indexed`),
//! - raw byte buffers with an explicit [`ByteOrder`] (`from_bytes`, `into_bytes`).
//!
//! When the whole vector width fits inside the buffer the transfer copies
//! lanes without per-lane bounds checks. Otherwise a masked transfer walks
//! the lanes one by one and only touches the active ones, so a mask built
//! with [`Mask::index_in_upper_range`] makes the tail of a loop safe. An
//! active lane outside the buffer fails with `OutOfBounds`; stores check
//! every active lane before writing anything.

use crate::error::{as_index, out_of_bounds, Result};
use crate::simd::element::Element;
use crate::simd::mask::Mask;
use crate::simd::species::Species;
use crate::simd::vector::Vector;

/// Byte order of lanes in a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the target platform.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }
}

/// True when `count` units of `width` starting at `offset` fit in `len`.
#[inline(always)]
fn offset_in_range(offset: usize, count: usize, width: usize, len: usize) -> bool {
    count
        .checked_mul(width)
        .and_then(|size| offset.checked_add(size))
        .is_some_and(|end| end <= len)
}

/// Start of lane `lane` in a buffer of `len` units, or `OutOfBounds`.
fn lane_start(offset: usize, lane: usize, width: usize, len: usize) -> Result<usize> {
    let start = lane
        .checked_mul(width)
        .and_then(|delta| offset.checked_add(delta));
    match start {
        Some(start) if offset_in_range(start, 1, width, len) => Ok(start),
        Some(start) => Err(out_of_bounds(as_index(start), len)),
        None => Err(out_of_bounds(i64::MAX, len)),
    }
}

/// Element position `offset + index` for a gather or scatter, or `OutOfBounds`.
fn gather_position(offset: usize, index: i32, len: usize) -> Result<usize> {
    let position = as_index(offset).saturating_add(i64::from(index));
    usize::try_from(position)
        .ok()
        .filter(|&p| p < len)
        .ok_or_else(|| out_of_bounds(position, len))
}

/// The `n` index-map entries used by a gather or scatter.
fn index_window(index_map: &[i32], map_offset: usize, n: usize) -> Result<&[i32]> {
    let end = map_offset.saturating_add(n);
    index_map
        .get(map_offset..end)
        .ok_or_else(|| out_of_bounds(as_index(end - 1), index_map.len()))
}

fn first_out_of_range(offset: usize, n: usize, len: usize) -> i64 {
    as_index(offset.max(len).min(offset.saturating_add(n)))
}

impl<E: Element> Vector<E> {
    // ================================================================================================
    // ELEMENT SLICES
    // ================================================================================================

    /// Loads `data[offset..offset + n]`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` unless the whole window lies inside `data`.
    pub fn from_slice(species: &'static Species<E>, data: &[E], offset: usize) -> Result<Self> {
        let n = species.lane_count();
        if !offset_in_range(offset, n, 1, data.len()) {
            return Err(out_of_bounds(
                first_out_of_range(offset, n, data.len()),
                data.len(),
            ));
        }
        Ok(Vector::from_lanes(species, data[offset..offset + n].to_vec()))
    }

    /// Loads the lanes set in `m`; unset lanes are zero.
    pub fn from_slice_masked(
        species: &'static Species<E>,
        data: &[E],
        offset: usize,
        m: &Mask<E>,
    ) -> Result<Self> {
        Self::from_slice_masked_or(species, data, offset, m, E::ZERO)
    }

    /// Loads the lanes set in `m`; unset lanes hold `default`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when a set lane falls outside `data`.
    pub fn from_slice_masked_or(
        species: &'static Species<E>,
        data: &[E],
        offset: usize,
        m: &Mask<E>,
        default: E,
    ) -> Result<Self> {
        species.check(m.species())?;
        let n = species.lane_count();

        if offset_in_range(offset, n, 1, data.len()) {
            let lanes = data[offset..offset + n]
                .iter()
                .zip(m.as_slice())
                .map(|(&x, &active)| if active { x } else { default })
                .collect();
            return Ok(Vector::from_lanes(species, lanes));
        }

        log::trace!(
            "masked load of {} lanes at {} exceeds {} elements, loading per lane",
            n,
            offset,
            data.len()
        );
        let mut lanes = vec![default; n];
        for (i, lane) in lanes.iter_mut().enumerate() {
            if m.as_slice()[i] {
                *lane = data[lane_start(offset, i, 1, data.len())?];
            }
        }
        Ok(Vector::from_lanes(species, lanes))
    }

    /// Stores all lanes into `data[offset..offset + n]`.
    pub fn into_slice(&self, data: &mut [E], offset: usize) -> Result<()> {
        let n = self.length();
        if !offset_in_range(offset, n, 1, data.len()) {
            return Err(out_of_bounds(
                first_out_of_range(offset, n, data.len()),
                data.len(),
            ));
        }
        data[offset..offset + n].copy_from_slice(self.as_slice());
        Ok(())
    }

    /// Stores the lanes set in `m`; elements under unset lanes are untouched.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when a set lane falls outside `data`. Nothing is written
    /// in that case.
    pub fn into_slice_masked(&self, data: &mut [E], offset: usize, m: &Mask<E>) -> Result<()> {
        self.species().check(m.species())?;
        let n = self.length();

        if offset_in_range(offset, n, 1, data.len()) {
            let window = &mut data[offset..offset + n];
            for ((slot, &value), &active) in window.iter_mut().zip(self.as_slice()).zip(m.as_slice()) {
                if active {
                    *slot = value;
                }
            }
            return Ok(());
        }

        log::trace!(
            "masked store of {} lanes at {} exceeds {} elements, storing per lane",
            n,
            offset,
            data.len()
        );
        let mut targets = Vec::with_capacity(m.true_count());
        for (i, &active) in m.as_slice().iter().enumerate() {
            if active {
                targets.push((lane_start(offset, i, 1, data.len())?, self.as_slice()[i]));
            }
        }
        for (position, value) in targets {
            data[position] = value;
        }
        Ok(())
    }

    // ================================================================================================
    // GATHER / SCATTER
    // ================================================================================================

    /// Gathers lane `i` from `data[offset + index_map[map_offset + i]]`.
    pub fn from_slice_indexed(
        species: &'static Species<E>,
        data: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<Self> {
        let indexes = index_window(index_map, map_offset, species.lane_count())?;
        let lanes = indexes
            .iter()
            .map(|&index| -> Result<E> { Ok(data[gather_position(offset, index, data.len())?]) })
            .collect::<Result<Vec<E>>>()?;
        Ok(Vector::from_lanes(species, lanes))
    }

    /// Gathers the lanes set in `m`; unset lanes are zero and read nothing.
    pub fn from_slice_indexed_masked(
        species: &'static Species<E>,
        data: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        m: &Mask<E>,
    ) -> Result<Self> {
        Self::from_slice_indexed_masked_or(species, data, offset, index_map, map_offset, m, E::ZERO)
    }

    /// Gathers the lanes set in `m`; unset lanes hold `default` and read
    /// nothing.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when the index window or a set lane's element falls
    /// outside its slice.
    pub fn from_slice_indexed_masked_or(
        species: &'static Species<E>,
        data: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        m: &Mask<E>,
        default: E,
    ) -> Result<Self> {
        species.check(m.species())?;
        let indexes = index_window(index_map, map_offset, species.lane_count())?;
        let lanes = indexes
            .iter()
            .zip(m.as_slice())
            .map(|(&index, &active)| -> Result<E> {
                if active {
                    Ok(data[gather_position(offset, index, data.len())?])
                } else {
                    Ok(default)
                }
            })
            .collect::<Result<Vec<E>>>()?;
        Ok(Vector::from_lanes(species, lanes))
    }

    /// Scatters lane `i` to `data[offset + index_map[map_offset + i]]`.
    ///
    /// Lanes are written in order, so a later lane wins when two lanes map to
    /// the same element.
    pub fn into_slice_indexed(
        &self,
        data: &mut [E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<()> {
        let m = self.species().mask_all(true);
        self.into_slice_indexed_masked(data, offset, index_map, map_offset, &m)
    }

    /// Scatters the lanes set in `m`; unset lanes write nothing.
    pub fn into_slice_indexed_masked(
        &self,
        data: &mut [E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        m: &Mask<E>,
    ) -> Result<()> {
        self.species().check(m.species())?;
        let indexes = index_window(index_map, map_offset, self.length())?;

        let mut targets = Vec::with_capacity(m.true_count());
        for (i, (&index, &active)) in indexes.iter().zip(m.as_slice()).enumerate() {
            if active {
                targets.push((
                    gather_position(offset, index, data.len())?,
                    self.as_slice()[i],
                ));
            }
        }
        for (position, value) in targets {
            data[position] = value;
        }
        Ok(())
    }

    // ================================================================================================
    // BYTE BUFFERS
    // ================================================================================================

    /// Decodes `n` lanes from `bytes` starting at byte `offset`.
    pub fn from_bytes(
        species: &'static Species<E>,
        bytes: &[u8],
        offset: usize,
        order: ByteOrder,
    ) -> Result<Self> {
        let n = species.lane_count();
        if !offset_in_range(offset, n, E::BYTES, bytes.len()) {
            return Err(out_of_bounds(
                first_out_of_range(offset, n * E::BYTES, bytes.len()),
                bytes.len(),
            ));
        }
        let lanes = bytes[offset..offset + species.byte_size()]
            .chunks_exact(E::BYTES)
            .map(|chunk| E::read_bytes(chunk, order))
            .collect();
        Ok(Vector::from_lanes(species, lanes))
    }

    /// Decodes the lanes set in `m`; unset lanes are zero and read nothing.
    pub fn from_bytes_masked(
        species: &'static Species<E>,
        bytes: &[u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<E>,
    ) -> Result<Self> {
        species.check(m.species())?;
        let n = species.lane_count();

        if offset_in_range(offset, n, E::BYTES, bytes.len()) {
            let full = Self::from_bytes(species, bytes, offset, order)?;
            return species.zero().blend(&full, m);
        }

        log::trace!(
            "masked decode of {} bytes at {} exceeds {} bytes, decoding per lane",
            species.byte_size(),
            offset,
            bytes.len()
        );
        let mut lanes = vec![E::ZERO; n];
        for (i, lane) in lanes.iter_mut().enumerate() {
            if m.as_slice()[i] {
                let start = lane_start(offset, i, E::BYTES, bytes.len())?;
                *lane = E::read_bytes(&bytes[start..], order);
            }
        }
        Ok(Vector::from_lanes(species, lanes))
    }

    /// Encodes all lanes into `bytes` starting at byte `offset`.
    pub fn into_bytes(&self, bytes: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        let n = self.length();
        if !offset_in_range(offset, n, E::BYTES, bytes.len()) {
            return Err(out_of_bounds(
                first_out_of_range(offset, n * E::BYTES, bytes.len()),
                bytes.len(),
            ));
        }
        let window = &mut bytes[offset..offset + n * E::BYTES];
        for (chunk, lane) in window.chunks_exact_mut(E::BYTES).zip(self.as_slice()) {
            lane.write_bytes(chunk, order);
        }
        Ok(())
    }

    /// Encodes the lanes set in `m`; bytes under unset lanes are untouched.
    pub fn into_bytes_masked(
        &self,
        bytes: &mut [u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<E>,
    ) -> Result<()> {
        self.species().check(m.species())?;
        let n = self.length();

        if offset_in_range(offset, n, E::BYTES, bytes.len()) {
            let window = &mut bytes[offset..offset + n * E::BYTES];
            for ((chunk, &value), &active) in window
                .chunks_exact_mut(E::BYTES)
                .zip(self.as_slice())
                .zip(m.as_slice())
            {
                if active {
                    value.write_bytes(chunk, order);
                }
            }
            return Ok(());
        }

        log::trace!(
            "masked encode of {} lanes at {} exceeds {} bytes, encoding per lane",
            n,
            offset,
            bytes.len()
        );
        let mut targets = Vec::with_capacity(m.true_count());
        for (i, &active) in m.as_slice().iter().enumerate() {
            if active {
                targets.push((lane_start(offset, i, E::BYTES, bytes.len())?, self.as_slice()[i]));
            }
        }
        for (start, value) in targets {
            value.write_bytes(&mut bytes[start..], order);
        }
        Ok(())
    }
}
