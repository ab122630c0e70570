// SPDX-License-Identifier: Apache-2.0

//! Stratified random sampling over the FP32 encoding space.

use crate::bit_region::{BitRegion, BitRegionTable};
use crate::operation::Operation;
use crate::vector::TestVector;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Offsets applied to the run seed to derive the operand streams.
const FIRST_OPERAND_SEED_OFFSET: u64 = 12345;
const SECOND_OPERAND_SEED_OFFSET: u64 = 67890;

/// Default cadence for drawing the second operand from the same region as
/// the first: every third draw.
pub const DEFAULT_SAME_REGION_ONE_IN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub seed: u64,
    /// Every n-th draw takes its second operand from the first operand's
    /// region; the rest draw it from the full 32-bit space. Zero disables
    /// same-region draws.
    pub same_region_one_in: u32,
}

/// One sample: the chosen region and the vector drawn from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub region: usize,
    pub same_region_partner: bool,
    pub vector: TestVector,
}

/// Weighted region selection followed by uniform draws within the region.
///
/// Region selection, the first operand, and the second operand each use
/// their own generator so the operand distributions stay decorrelated.
pub struct StratifiedSampler<'t> {
    table: &'t BitRegionTable,
    operation: Operation,
    same_region_one_in: u32,
    selector: Xoshiro256PlusPlus,
    first: Xoshiro256PlusPlus,
    second: Xoshiro256PlusPlus,
    draws: u64,
}

impl<'t> StratifiedSampler<'t> {
    pub fn new(table: &'t BitRegionTable, operation: Operation, config: SamplerConfig) -> Self {
        StratifiedSampler {
            table,
            operation,
            same_region_one_in: config.same_region_one_in,
            selector: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            first: Xoshiro256PlusPlus::seed_from_u64(
                config.seed.wrapping_add(FIRST_OPERAND_SEED_OFFSET),
            ),
            second: Xoshiro256PlusPlus::seed_from_u64(
                config.seed.wrapping_add(SECOND_OPERAND_SEED_OFFSET),
            ),
            draws: 0,
        }
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    fn pick_region(&mut self) -> usize {
        let draw = self.selector.gen_range(0..self.table.total_weight());
        self.table.region_for_draw(draw)
    }

    fn uniform_in(rng: &mut Xoshiro256PlusPlus, region: &BitRegion) -> u32 {
        if region.is_singleton() {
            region.start
        } else {
            rng.gen_range(region.start..=region.end)
        }
    }

    pub fn draw(&mut self) -> Draw {
        let table = self.table;
        let region_index = self.pick_region();
        let region = &table.regions()[region_index];
        let a = Self::uniform_in(&mut self.first, region);

        let same_region_partner = self.operation.is_binary()
            && self.same_region_one_in != 0
            && self.draws % u64::from(self.same_region_one_in) == 0;
        let vector = if !self.operation.is_binary() {
            TestVector::unary(a)
        } else if same_region_partner {
            TestVector::binary(a, Self::uniform_in(&mut self.second, region))
        } else {
            TestVector::binary(a, self.second.gen::<u32>())
        };

        self.draws += 1;
        Draw {
            region: region_index,
            same_region_partner,
            vector,
        }
    }
}

impl Iterator for StratifiedSampler<'_> {
    type Item = Draw;

    fn next(&mut self) -> Option<Draw> {
        Some(self.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn config(seed: u64) -> SamplerConfig {
        SamplerConfig {
            seed,
            same_region_one_in: DEFAULT_SAME_REGION_ONE_IN,
        }
    }

    #[test_case(Operation::Divide; "divider table")]
    #[test_case(Operation::Sqrt; "sqrt table")]
    fn test_region_frequencies_converge_to_weights(operation: Operation) {
        const DRAWS: usize = 100_000;
        let table = BitRegionTable::for_operation(operation);
        let mut sampler = StratifiedSampler::new(&table, operation, config(0xdead_beef));
        let mut counts = vec![0usize; table.len()];
        for _ in 0..DRAWS {
            counts[sampler.draw().region] += 1;
        }
        for (index, region) in table.regions().iter().enumerate() {
            let expected = f64::from(region.weight) / table.total_weight() as f64;
            let observed = counts[index] as f64 / DRAWS as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "region {} observed {:.4} expected {:.4}",
                region.label,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_operands_fall_in_selected_region() {
        let table = BitRegionTable::divider();
        let mut sampler = StratifiedSampler::new(&table, Operation::Divide, config(7));
        for _ in 0..10_000 {
            let draw = sampler.draw();
            let region = &table.regions()[draw.region];
            assert!(region.contains(draw.vector.a), "{:?} not in {:?}", draw, region);
            if draw.same_region_partner {
                assert!(region.contains(draw.vector.b.unwrap()));
            }
        }
    }

    #[test]
    fn test_same_region_cadence() {
        let table = BitRegionTable::divider();
        let sampler = StratifiedSampler::new(&table, Operation::Divide, config(1));
        let partners: Vec<bool> = sampler.take(9).map(|d| d.same_region_partner).collect();
        assert_eq!(
            partners,
            vec![true, false, false, true, false, false, true, false, false]
        );

        let disabled = SamplerConfig {
            seed: 1,
            same_region_one_in: 0,
        };
        let mut sampler = StratifiedSampler::new(&table, Operation::Divide, disabled);
        assert!((0..100).all(|_| !sampler.draw().same_region_partner));
    }

    #[test]
    fn test_sqrt_draws_are_unary_and_hit_negative_zero() {
        let table = BitRegionTable::square_root();
        let mut sampler = StratifiedSampler::new(&table, Operation::Sqrt, config(3));
        let mut saw_negative_zero = false;
        for _ in 0..2_000 {
            let draw = sampler.draw();
            assert!(draw.vector.b.is_none());
            assert!(!draw.same_region_partner);
            if draw.region == 7 {
                assert_eq!(draw.vector.a, 0x8000_0000);
                saw_negative_zero = true;
            }
        }
        assert!(saw_negative_zero);
        assert_eq!(sampler.draws(), 2_000);
    }

    #[test]
    fn test_same_seed_reproduces_sequence() {
        let table = BitRegionTable::divider();
        let a: Vec<Draw> = StratifiedSampler::new(&table, Operation::Divide, config(42))
            .take(64)
            .collect();
        let b: Vec<Draw> = StratifiedSampler::new(&table, Operation::Divide, config(42))
            .take(64)
            .collect();
        let c: Vec<Draw> = StratifiedSampler::new(&table, Operation::Divide, config(43))
            .take(64)
            .collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
