// SPDX-License-Identifier: Apache-2.0

//! Deterministic sweeps over the regions where divider and square-root
//! implementations most often go wrong: subnormal operands and the
//! neighbourhood of 1.0.

use crate::fp32;
use crate::operation::Operation;
use crate::vector::{TestVector, VectorLabel};

pub const DEFAULT_SUBNORMAL_STRIDE: u32 = 0x1111;
pub const DEFAULT_DIVISORS: [u32; 5] = [
    0x3f80_0000, // 1.0
    0x4000_0000, // 2.0
    0x3f00_0000, // 0.5
    0x4120_0000, // 10.0
    0x3e80_0000, // 0.25
];
pub const DEFAULT_PARTNER_STRIDE: u32 = 17;

/// Widest near-one window that stays within the positive half of the
/// encoding space: `1.0 - w` must not cross below `+0`.
pub const MAX_NEAR_ONE_HALF_WIDTH: u32 = fp32::ONE;

/// Walks `[start, end]` in steps of `stride`. When the last step falls
/// short of `end`, `end` itself is yielded as a final partial step. A zero
/// stride yields nothing.
#[derive(Debug, Clone)]
pub struct StridedRange {
    next: Option<u32>,
    end: u32,
    stride: u32,
}

impl StridedRange {
    pub fn new(start: u32, end: u32, stride: u32) -> Self {
        StridedRange {
            next: if start <= end && stride > 0 {
                Some(start)
            } else {
                None
            },
            end,
            stride,
        }
    }
}

impl Iterator for StridedRange {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        self.next = if current == self.end {
            None
        } else {
            match current.checked_add(self.stride) {
                Some(n) if n <= self.end => Some(n),
                _ => Some(self.end),
            }
        };
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub subnormal_stride: u32,
    /// Second operands paired with every subnormal dividend. Ignored for
    /// unary operations.
    pub divisors: Vec<u32>,
    /// Half-width `w` of the window `[1.0 - w, 1.0 + w]` in encoding units.
    pub near_one_half_width: u32,
    /// Linear stride of the second operand across the near-one window.
    pub partner_stride: u32,
}

impl SweepConfig {
    pub fn for_operation(operation: Operation) -> Self {
        SweepConfig {
            subnormal_stride: DEFAULT_SUBNORMAL_STRIDE,
            divisors: DEFAULT_DIVISORS.to_vec(),
            near_one_half_width: match operation {
                Operation::Divide => 0x8000,
                Operation::Sqrt => 0x1000,
            },
            partner_stride: DEFAULT_PARTNER_STRIDE,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::for_operation(Operation::Divide)
    }
}

/// Operand patterns visited by the subnormal sweep.
pub fn subnormal_operands(stride: u32) -> StridedRange {
    StridedRange::new(fp32::MIN_SUBNORMAL, fp32::MAX_SUBNORMAL, stride)
}

/// Every subnormal operand, crossed with the configured divisors when the
/// operation is binary.
pub fn subnormal_sweep(
    operation: Operation,
    config: &SweepConfig,
) -> impl Iterator<Item = (VectorLabel, TestVector)> + '_ {
    let binary = operation.is_binary();
    subnormal_operands(config.subnormal_stride)
        .flat_map(move |a| {
            let vectors: Vec<TestVector> = if binary {
                config
                    .divisors
                    .iter()
                    .map(|&b| TestVector::binary(a, b))
                    .collect()
            } else {
                vec![TestVector::unary(a)]
            };
            vectors
        })
        .enumerate()
        .map(|(i, v)| (VectorLabel::Subnormal(i), v))
}

/// The contiguous window around the encoding of 1.0. For binary operations
/// the i-th vector pairs `1.0 - w + i` with `1.0 - w + partner_stride * i`.
/// `w` is clamped to `MAX_NEAR_ONE_HALF_WIDTH`.
pub fn near_one_sweep(
    operation: Operation,
    config: &SweepConfig,
) -> impl Iterator<Item = (VectorLabel, TestVector)> {
    let w = config.near_one_half_width.min(MAX_NEAR_ONE_HALF_WIDTH);
    let low = fp32::ONE.wrapping_sub(w);
    let count = 2 * u64::from(w) + 1;
    let binary = operation.is_binary();
    let partner_stride = config.partner_stride;
    (0..count).map(move |i| {
        let i32_index = i as u32;
        let a = low.wrapping_add(i32_index);
        let vector = if binary {
            TestVector::binary(a, low.wrapping_add(i32_index.wrapping_mul(partner_stride)))
        } else {
            TestVector::unary(a)
        };
        (VectorLabel::NearOne(i as usize), vector)
    })
}

/// Both sweeps, subnormal first.
pub fn systematic_sweep(
    operation: Operation,
    config: &SweepConfig,
) -> impl Iterator<Item = (VectorLabel, TestVector)> + '_ {
    subnormal_sweep(operation, config).chain(near_one_sweep(operation, config))
}
