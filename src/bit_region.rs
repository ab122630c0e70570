// SPDX-License-Identifier: Apache-2.0

//! Weighted partition of the 32-bit encoding space used by the stratified
//! random sampler.

use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;
use serde::Deserialize;

/// An inclusive range of bit patterns with a relative sampling weight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitRegion {
    pub start: u32,
    pub end: u32,
    pub label: String,
    pub weight: u32,
}

impl BitRegion {
    pub fn new(start: u32, end: u32, label: &str, weight: u32) -> Self {
        BitRegion {
            start,
            end,
            label: label.to_string(),
            weight,
        }
    }

    /// Number of patterns in the region, as `u64` since the full space does
    /// not fit in `u32`.
    pub fn span(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn is_singleton(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, bits: u32) -> bool {
        self.start <= bits && bits <= self.end
    }
}

const DIVIDER_POSITIVE: [(u32, u32, &str, u32); 7] = [
    (0x0000_0000, 0x0080_0000, "subnormals", 10),
    (0x0080_0000, 0x3400_0000, "small_normals", 8),
    (0x3400_0000, 0x3f00_0000, "medium_normals", 5),
    (0x3f00_0000, 0x4080_0000, "near_one", 15),
    (0x4080_0000, 0x7f00_0000, "large_normals", 8),
    (0x7f00_0000, 0x7f80_0000, "near_overflow", 10),
    (0x7f80_0000, 0x7fff_ffff, "special_values", 12),
];

// Every negative non-zero input is invalid for sqrt, so the negative half
// collapses into one class next to the -0 singleton.
const SQRT_REGIONS: [(u32, u32, &str, u32); 9] = [
    (0x0000_0000, 0x0080_0000, "subnormals", 15),
    (0x0080_0000, 0x3400_0000, "small_normals", 10),
    (0x3400_0000, 0x3f00_0000, "medium_normals", 8),
    (0x3f00_0000, 0x4080_0000, "near_one", 20),
    (0x4080_0000, 0x7f00_0000, "large_normals", 12),
    (0x7f00_0000, 0x7f80_0000, "near_overflow", 10),
    (0x7f80_0000, 0x7fff_ffff, "special_values", 15),
    (0x8000_0000, 0x8000_0000, "neg_zero", 5),
    (0x8000_0001, 0xffff_ffff, "negative_vals", 5),
];

/// Ordered, validated list of regions covering all 2^32 encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitRegionTable {
    regions: Vec<BitRegion>,
    total_weight: u64,
}

impl BitRegionTable {
    /// Validates and wraps `regions`.
    ///
    /// Regions must be listed in ascending order, start at `0x00000000`, end
    /// at `0xffffffff`, and each region must begin at most one pattern after
    /// the previous one ends. Touching regions may share their boundary
    /// pattern.
    pub fn new(regions: Vec<BitRegion>) -> Result<Self, FpdiffError> {
        if regions.is_empty() {
            return Err(FpdiffError::new("region table is empty"));
        }
        for region in &regions {
            if region.start > region.end {
                return Err(FpdiffError::new(format!(
                    "region {:?} has start 0x{:08x} > end 0x{:08x}",
                    region.label, region.start, region.end
                )));
            }
            if region.weight == 0 {
                return Err(FpdiffError::new(format!(
                    "region {:?} has zero weight",
                    region.label
                )));
            }
        }
        if regions[0].start != 0 {
            return Err(FpdiffError::new(format!(
                "first region {:?} starts at 0x{:08x}; patterns below it are never sampled",
                regions[0].label, regions[0].start
            )));
        }
        for pair in regions.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let no_gap = u64::from(next.start) <= u64::from(prev.end) + 1;
            let at_most_boundary_overlap = next.start >= prev.end;
            if !no_gap || !at_most_boundary_overlap {
                return Err(FpdiffError::new(format!(
                    "regions {:?} [0x{:08x}, 0x{:08x}] and {:?} [0x{:08x}, 0x{:08x}] neither touch nor share a boundary",
                    prev.label, prev.start, prev.end, next.label, next.start, next.end
                )));
            }
        }
        let last = &regions[regions.len() - 1];
        if last.end != u32::MAX {
            return Err(FpdiffError::new(format!(
                "last region {:?} ends at 0x{:08x}; patterns above it are never sampled",
                last.label, last.end
            )));
        }
        let total_weight = regions.iter().map(|r| u64::from(r.weight)).sum();
        Ok(BitRegionTable {
            regions,
            total_weight,
        })
    }

    /// 14 regions: seven magnitude bands mirrored across the sign bit.
    pub fn divider() -> Self {
        let mut regions: Vec<BitRegion> = DIVIDER_POSITIVE
            .iter()
            .map(|&(start, end, label, weight)| BitRegion::new(start, end, label, weight))
            .collect();
        let negative: Vec<BitRegion> = DIVIDER_POSITIVE
            .iter()
            .map(|&(start, end, label, weight)| {
                BitRegion::new(
                    start | 0x8000_0000,
                    end | 0x8000_0000,
                    &format!("neg_{}", label),
                    weight,
                )
            })
            .collect();
        regions.extend(negative);
        Self::from_validated(regions)
    }

    /// 9 regions: seven positive bands, negative zero, and all other
    /// negatives.
    pub fn square_root() -> Self {
        let regions = SQRT_REGIONS
            .iter()
            .map(|&(start, end, label, weight)| BitRegion::new(start, end, label, weight))
            .collect();
        Self::from_validated(regions)
    }

    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Divide => Self::divider(),
            Operation::Sqrt => Self::square_root(),
        }
    }

    fn from_validated(regions: Vec<BitRegion>) -> Self {
        let total_weight = regions.iter().map(|r| u64::from(r.weight)).sum();
        BitRegionTable {
            regions,
            total_weight,
        }
    }

    pub fn regions(&self) -> &[BitRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BitRegion> {
        self.regions.get(index)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Maps a uniform draw in `[0, total_weight)` to a region index by
    /// walking the cumulative weights. Draws at or beyond the total clamp to
    /// the last region.
    pub fn region_for_draw(&self, draw: u64) -> usize {
        let mut cumulative = 0u64;
        for (index, region) in self.regions.iter().enumerate() {
            cumulative += u64::from(region.weight);
            if draw < cumulative {
                return index;
            }
        }
        self.regions.len() - 1
    }

    /// Percentage of random draws each region is expected to receive, derived
    /// from the configured weights.
    pub fn expected_distribution(&self) -> Vec<(&str, f64)> {
        self.regions
            .iter()
            .map(|r| {
                (
                    r.label.as_str(),
                    f64::from(r.weight) / self.total_weight as f64 * 100.0,
                )
            })
            .collect()
    }
}
