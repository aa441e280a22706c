//! Free-list allocator for pick ids.
//!
//! Each pickable element needs an id that is unique across everything drawn
//! into the same pick buffer. The [`IndexAllocator`] hands out contiguous
//! bands of the 31-bit id space and takes them back when a renderable is
//! destroyed, so ids are recycled instead of growing without bound.

use std::collections::HashMap;

use crate::error::{GraphscopeError, Result};
use crate::pick::{encode_pick_id, ID_SPACE_END};

/// A half-open band `[start, end)` of pick ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    /// First id in the range.
    pub start: u32,
    /// One past the last id in the range.
    pub end: u32,
}

impl IndexRange {
    /// Creates a new range.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Returns the number of ids in the range.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the range holds no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if `id` lies inside the range.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        (self.start..self.end).contains(&id)
    }
}

/// The result of an allocation: encoded colors plus the bookkeeping needed
/// to map decoded ids back to element ordinals.
///
/// The colors are laid out in request order, four bytes per element, which
/// is the order of `ranges` and of the ids inside each range.
#[derive(Debug, Default)]
pub struct PickingColors {
    colors: Vec<u8>,
    ranges: Vec<IndexRange>,
    map: HashMap<u32, usize>,
}

impl PickingColors {
    /// Returns the RGBA pick colors, four bytes per element.
    #[must_use]
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Returns the id ranges backing this allocation, in request order.
    #[must_use]
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Returns the map from allocated id to element ordinal.
    #[must_use]
    pub fn map(&self) -> &HashMap<u32, usize> {
        &self.map
    }

    /// Returns the number of elements covered by this allocation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the allocation is empty (never filled or released).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up the element ordinal for a decoded pick id.
    #[must_use]
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.map.get(&id).copied()
    }

    /// Returns the pick id assigned to the element at `ordinal`.
    #[must_use]
    pub fn id_at(&self, ordinal: usize) -> Option<u32> {
        let mut offset = ordinal;
        for range in &self.ranges {
            let len = range.len() as usize;
            if offset < len {
                return u32::try_from(offset).ok().map(|o| range.start + o);
            }
            offset -= len;
        }
        None
    }
}

/// Allocator over the pick id space.
///
/// The free-list is kept sorted by `start` with no two ranges overlapping or
/// touching; touching ranges are always coalesced on release.
#[derive(Debug, Clone)]
pub struct IndexAllocator {
    free: Vec<IndexRange>,
    id_space_end: u32,
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexAllocator {
    /// Creates an allocator over the full id space `[0, 0x7FFF_FFFF)`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_space_end(ID_SPACE_END)
    }

    /// Creates an allocator over `[0, end)`.
    ///
    /// `end` is clamped to [`ID_SPACE_END`].
    #[must_use]
    pub fn with_id_space_end(end: u32) -> Self {
        let end = end.min(ID_SPACE_END);
        let free = if end == 0 {
            Vec::new()
        } else {
            vec![IndexRange::new(0, end)]
        };
        Self {
            free,
            id_space_end: end,
        }
    }

    /// Returns the exclusive end of the managed id space.
    #[must_use]
    pub fn id_space_end(&self) -> u32 {
        self.id_space_end
    }

    /// Returns the free ranges in ascending order.
    #[must_use]
    pub fn free_ranges(&self) -> &[IndexRange] {
        &self.free
    }

    /// Returns the total number of free ids.
    #[must_use]
    pub fn free_capacity(&self) -> u64 {
        self.free.iter().map(|r| u64::from(r.len())).sum()
    }

    /// Returns the number of ids currently handed out.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        u64::from(self.id_space_end) - self.free_capacity()
    }

    /// Allocates `count` ids and encodes their pick colors.
    ///
    /// Ids are taken from the lowest free ranges first. If the first free
    /// range is too short the allocation spills into the next one, so the
    /// result may span several ranges.
    pub fn allocate(&mut self, count: usize) -> Result<PickingColors> {
        if count == 0 {
            return Err(GraphscopeError::InvalidCount);
        }

        let available = self.free_capacity();
        let requested = u32::try_from(count)
            .ok()
            .filter(|&n| u64::from(n) <= available)
            .ok_or_else(|| {
                log::error!(
                    "pick id space exhausted: requested {count}, {available} available"
                );
                GraphscopeError::CapacityExhausted {
                    requested: count as u64,
                    available,
                }
            })?;

        let mut remaining = requested;
        let mut ranges = Vec::with_capacity(1);
        let mut consumed = 0;
        for free in &mut self.free {
            let len = free.len();
            if len > remaining {
                ranges.push(IndexRange::new(free.start, free.start + remaining));
                free.start += remaining;
                break;
            }
            ranges.push(*free);
            remaining -= len;
            consumed += 1;
            if remaining == 0 {
                break;
            }
        }
        self.free.drain(..consumed);

        let mut colors = Vec::with_capacity(count * 4);
        let mut map = HashMap::with_capacity(count);
        for id in ranges.iter().flat_map(|r| r.start..r.end) {
            map.insert(id, map.len());
            colors.extend_from_slice(&encode_pick_id(id));
        }

        log::debug!(
            "allocated {count} pick ids in {} range(s): {ranges:?}",
            ranges.len()
        );

        Ok(PickingColors {
            colors,
            ranges,
            map,
        })
    }

    /// Returns the ids of `allocation` to the free-list and clears it.
    ///
    /// Every range is validated before the free-list is touched, so a
    /// rejected call leaves both the allocator and the allocation unchanged.
    /// Releasing an already-cleared allocation is a no-op.
    pub fn deallocate(&mut self, allocation: &mut PickingColors) -> Result<()> {
        for range in &allocation.ranges {
            self.check_releasable(*range)?;
        }

        let ranges = std::mem::take(&mut allocation.ranges);
        log::debug!(
            "released {} pick ids in {} range(s)",
            allocation.len(),
            ranges.len()
        );
        for range in ranges {
            self.release(range);
        }
        allocation.colors.clear();
        allocation.map.clear();
        Ok(())
    }

    fn check_releasable(&self, range: IndexRange) -> Result<()> {
        let invalid = GraphscopeError::InvalidDeallocation {
            start: range.start,
            end: range.end,
        };
        if range.is_empty() || range.end > self.id_space_end {
            return Err(invalid);
        }

        let idx = self.free.partition_point(|f| f.start < range.start);
        let overlaps_prev = idx > 0 && self.free[idx - 1].end > range.start;
        let overlaps_next = self.free.get(idx).is_some_and(|f| f.start < range.end);
        if overlaps_prev || overlaps_next {
            return Err(invalid);
        }
        Ok(())
    }

    fn release(&mut self, range: IndexRange) {
        let idx = self.free.partition_point(|f| f.start < range.start);
        let merge_prev = idx > 0 && self.free[idx - 1].end == range.start;
        let merge_next = self.free.get(idx).is_some_and(|f| f.start == range.end);

        match (merge_prev, merge_next) {
            (true, true) => {
                self.free[idx - 1].end = self.free[idx].end;
                self.free.remove(idx);
            }
            (true, false) => self.free[idx - 1].end = range.end,
            (false, true) => self.free[idx].start = range.start,
            (false, false) => self.free.insert(idx, range),
        }
    }
}
