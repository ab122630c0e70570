// SPDX-License-Identifier: Apache-2.0

//! Hand-curated corner-case catalogs.
//!
//! Entries are literal bit patterns. Inputs that once exposed a defect stay
//! here permanently so the defect cannot come back unnoticed.

use crate::operation::Operation;
use crate::vector::TestVector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerCase {
    pub vector: TestVector,
    pub note: String,
    /// Set when the entry documents a discrepancy that has not been triaged
    /// yet. The entry is still judged under the full equivalence policy.
    pub open_defect: Option<String>,
}

impl CornerCase {
    pub fn new(vector: TestVector, note: &str) -> Self {
        CornerCase {
            vector,
            note: note.to_string(),
            open_defect: None,
        }
    }
}

#[rustfmt::skip]
const DIVIDER_CASES: &[(u32, u32, &str)] = &[
    // Special values.
    (0x0000_0000, 0x0000_0000, "0/0 -> NaN (invalid)"),
    (0x0000_0000, 0x3f80_0000, "0/1 -> 0"),
    (0x8000_0000, 0x3f80_0000, "-0/1 -> -0"),
    (0x3f80_0000, 0x0000_0000, "1/0 -> inf (divzero)"),
    (0x3f80_0000, 0x8000_0000, "1/-0 -> -inf (divzero)"),
    (0x7f80_0000, 0x3f80_0000, "inf/1 -> inf"),
    (0xff80_0000, 0x3f80_0000, "-inf/1 -> -inf"),
    (0x7f80_0000, 0x7f80_0000, "inf/inf -> NaN (invalid)"),
    (0x7f80_0000, 0xff80_0000, "inf/-inf -> NaN (invalid)"),
    (0x3f80_0000, 0x7f80_0000, "1/inf -> 0"),
    (0x3f80_0000, 0xff80_0000, "1/-inf -> -0"),
    (0x7fc0_0000, 0x3f80_0000, "qNaN/1 -> qNaN"),
    (0x7fa0_0000, 0x3f80_0000, "sNaN/1 -> qNaN (invalid)"),
    (0x3f80_0000, 0x7fc0_0000, "1/qNaN -> qNaN"),
    (0x3f80_0000, 0x7fa0_0000, "1/sNaN -> qNaN (invalid)"),
    // Subnormal boundaries.
    (0x0000_0001, 0x0000_0001, "min subnormal / min subnormal -> 1.0"),
    (0x0000_0001, 0x3f80_0000, "min subnormal / 1.0"),
    (0x007f_ffff, 0x3f80_0000, "max subnormal / 1.0"),
    (0x0080_0000, 0x0080_0000, "min normal / min normal -> 1.0"),
    (0x0080_0000, 0x4000_0000, "min normal / 2.0 -> gradual underflow"),
    (0x0080_0001, 0x4000_0000, "just above min normal / 2.0"),
    (0x007f_ffff, 0x4000_0000, "max subnormal / 2.0"),
    // Overflow boundaries.
    (0x7f7f_ffff, 0x3f80_0000, "max finite / 1.0"),
    (0x7f7f_ffff, 0x3f00_0000, "max finite / 0.5 -> overflow"),
    (0x7f00_0000, 0x3f00_0000, "large / 0.5 -> overflow"),
    (0x7e80_0000, 0x3e80_0000, "overflow boundary"),
    // Exact quotients.
    (0x3f80_0000, 0x3f80_0000, "1/1"),
    (0x4000_0000, 0x4000_0000, "2/2"),
    (0x4040_0000, 0x4000_0000, "3/2 -> 1.5"),
    (0x4080_0000, 0x4000_0000, "4/2 -> 2"),
    (0x4120_0000, 0x4080_0000, "10/4 -> 2.5"),
    (0x42c8_0000, 0x4120_0000, "100/10 -> 10"),
    // Rounding-critical ratios.
    (0x3f80_0000, 0x4040_0000, "1/3"),
    (0x4000_0000, 0x4040_0000, "2/3"),
    (0x3f80_0000, 0x4120_0000, "1/10"),
    (0x3f80_0000, 0x40e0_0000, "1/7"),
    (0x4120_0000, 0x4040_0000, "10/3"),
    // Tie-to-even candidates.
    (0x4040_0000, 0x4800_0000, "3/32768"),
    (0x40a0_0000, 0x4880_0000, "5/65536"),
    (0x3f80_0001, 0x4800_0000, "just above 1 / 32768"),
    (0x3f7f_ffff, 0x4800_0000, "just below 1 / 32768"),
    // Quotient normalization depth.
    (0x3f80_0000, 0x4f80_0000, "1 / 2^32"),
    (0x3f80_0000, 0x7000_0000, "1 / 2^97"),
    (0x3880_0000, 0x7f00_0000, "small / large -> deep subnormal"),
    (0x0800_0000, 0x4f80_0000, "tiny / 2^32 -> deep underflow"),
    // Sticky bit.
    (0x4000_0001, 0x4040_0000, "2.0000002/3"),
    (0x4040_0001, 0x4000_0000, "3.0000002/2"),
    (0x7f7f_fffe, 0x4000_0000, "near max / 2"),
    // Sign combinations.
    (0x8000_0000, 0x8000_0000, "-0/-0 -> NaN (invalid)"),
    (0xbf80_0000, 0x3f80_0000, "-1/1"),
    (0x3f80_0000, 0xbf80_0000, "1/-1"),
    (0xbf80_0000, 0xbf80_0000, "-1/-1"),
    (0xff80_0000, 0x8000_0000, "-inf/-0 -> inf"),
    (0x7f80_0000, 0x8000_0000, "inf/-0 -> -inf"),
    // Regressions.
    (0x3781_fd3f, 0xf848_0000, "regression: underflow"),
    (0xaacf_58b8, 0xeae1_320a, "regression: subnormal result"),
    (0x9604_2d06, 0x5d04_2d06, "regression"),
    (0x9be3_4bb1, 0xe098_8600, "regression"),
    (0x0f87_46fe, 0x514c_0000, "regression"),
    (0x920c_6be1, 0x517d_a98a, "regression"),
    (0x057e_2068, 0xc4b4_9df2, "regression"),
    (0xa8ec_1495, 0x68a4_5fad, "regression"),
    (0x325c_d2c3, 0xf620_9948, "regression: exact subnormal"),
    (0x29ee_d5eb, 0xefbb_fc00, "regression: subnormal rounding"),
    // Extreme exponent spread.
    (0x3400_0000, 0x7f7f_ffff, "small / max -> underflow"),
    (0x7f7f_ffff, 0x3400_0000, "max / small -> overflow"),
    (0x0080_0000, 0x7f7f_ffff, "min normal / max"),
    (0x7f7f_ffff, 0x0080_0000, "max / min normal"),
    (0x0000_0001, 0x7f7f_ffff, "min subnormal / max"),
    (0x7f7f_ffff, 0x0000_0001, "max / min subnormal"),
    // Power-of-two dividends.
    (0x3f00_0000, 0x3f80_0000, "0.5/1"),
    (0x3e80_0000, 0x3f80_0000, "0.25/1"),
    (0x3e00_0000, 0x3f80_0000, "0.125/1"),
    (0x3d80_0000, 0x3f80_0000, "0.0625/1"),
    // Guard/round/sticky boundaries.
    (0x4000_0003, 0x4040_0000, "guard boundary"),
    (0x4000_0005, 0x4040_0000, "round boundary"),
    (0x4000_0007, 0x4040_0000, "sticky boundary"),
    (0x4000_000f, 0x4040_0000, "multiple sticky bits"),
];

/// Divider entries whose history records an unresolved disagreement.
const DIVIDER_OPEN_DEFECTS: &[(u32, u32, &str)] = &[(
    0x29ee_d5eb,
    0xefbb_fc00,
    "recorded as \"expected 0x8000028a, got 0x8000028b\"; authoritative side not established",
)];

#[rustfmt::skip]
const SQRT_CASES: &[(u32, &str)] = &[
    // Special values.
    (0x0000_0000, "+0 -> +0"),
    (0x8000_0000, "-0 -> -0"),
    (0x3f80_0000, "1 -> 1"),
    (0x7f80_0000, "+inf -> +inf"),
    (0xff80_0000, "-inf -> NaN (invalid)"),
    (0x7fc0_0000, "qNaN -> qNaN"),
    (0x7fa0_0000, "sNaN -> qNaN (invalid)"),
    (0xbf80_0000, "-1 -> NaN (invalid)"),
    (0x8000_0001, "-min subnormal -> NaN (invalid)"),
    (0x8080_0000, "-min normal -> NaN (invalid)"),
    (0xff7f_ffff, "-max finite -> NaN (invalid)"),
    // Subnormal boundaries.
    (0x0000_0001, "min subnormal"),
    (0x0000_0002, "2 * min subnormal"),
    (0x0000_0004, "4 * min subnormal"),
    (0x0000_0100, "medium subnormal"),
    (0x007f_ffff, "max subnormal"),
    (0x0080_0000, "min normal"),
    (0x0080_0001, "just above min normal"),
    (0x0080_0100, "slightly above min normal"),
    // Perfect and imperfect squares.
    (0x4000_0000, "2"),
    (0x4080_0000, "4 -> 2"),
    (0x4110_0000, "9 -> 3"),
    (0x4180_0000, "16 -> 4"),
    (0x4248_0000, "50"),
    (0x42c8_0000, "100 -> 10"),
    (0x447a_0000, "1000"),
    (0x461c_4000, "10000 -> 100"),
    (0x4b00_0000, "2^23 (odd exponent)"),
    (0x4c00_0000, "2^24 -> 4096"),
    // Powers of two.
    (0x3e80_0000, "0.25 -> 0.5"),
    (0x3f00_0000, "0.5"),
    (0x4100_0000, "8"),
    (0x4200_0000, "32"),
    // Boundary values.
    (0x7f7f_ffff, "max finite"),
    (0x3f7f_ffff, "just below 1"),
    (0x3f80_0001, "just above 1"),
    (0x3400_0000, "small normal"),
    (0x7f00_0000, "large value near overflow"),
    // Rounding-critical values.
    (0x3f49_0fdb, "pi/2"),
    (0x4049_0fdb, "pi"),
    (0x402d_f854, "e"),
    (0x40c9_0fdb, "2 pi"),
    (0x3eaa_aaab, "1/3"),
    (0x3f2a_aaab, "2/3"),
    // Tie-to-even candidates.
    (0x3f80_0100, "slightly above 1"),
    (0x3f80_0200, "slightly above 1"),
    (0x3f80_0300, "slightly above 1"),
    (0x4000_0100, "slightly above 2"),
    (0x4000_0200, "slightly above 2"),
    // Normalization stress.
    (0x3380_0000, "very small normal"),
    (0x4f80_0000, "2^32"),
    (0x7000_0000, "2^97"),
    (0x0f80_0000, "small value"),
    (0x0800_0000, "very small value"),
    // Root digit selection.
    (0x3f40_0000, "0.75"),
    (0x3fc0_0000, "1.5"),
    (0x4020_0000, "2.5"),
    (0x4060_0000, "3.5"),
    (0x40a0_0000, "5"),
    (0x40e0_0000, "7"),
    // Guard/round/sticky boundaries.
    (0x3f80_0003, "3 ulp above 1"),
    (0x3f80_0007, "7 ulp above 1"),
    (0x3f80_000f, "15 ulp above 1"),
    (0x4000_0001, "1 ulp above 2"),
    (0x4000_0003, "3 ulp above 2"),
    // Regressions.
    (0x40e4_006e, "regression"),
    (0x016f_609c, "regression"),
    (0x2812_c1b1, "regression"),
    (0x67be_e97d, "regression"),
    (0x1ab8_2050, "regression"),
    (0x5904_2172, "regression"),
    (0x321b_bcdd, "regression"),
    (0x36a9_405f, "regression"),
    (0x3fab_6860, "regression"),
    (0x72cb_1062, "regression"),
    (0x6e00_2f83, "regression"),
    (0x2605_ba5a, "regression"),
    (0x4298_50b4, "regression"),
    (0x696c_0b48, "regression"),
    (0x01cd_f635, "regression"),
    (0x4b97_5f95, "regression"),
    (0x3b2c_6f35, "regression"),
    // Small fractions.
    (0x3d80_0000, "0.0625 -> 0.25"),
    (0x3e00_0000, "0.125"),
    (0x3ec0_0000, "0.375"),
    // Subnormal inputs of increasing size.
    (0x0000_0010, "tiny subnormal"),
    (0x0000_1000, "medium subnormal"),
    (0x0001_0000, "larger subnormal"),
    (0x0010_0000, "near-normal subnormal"),
    (0x007f_0000, "large subnormal"),
    // Exponent extremes.
    (0x0100_0000, "tiny normal"),
    (0x7e00_0000, "near-overflow input"),
    (0x0200_0000, "small normal, even exponent"),
    // Mantissa bit patterns.
    (0x3fe0_0000, "1.75"),
    (0x3ff0_0000, "1.875"),
    (0x3ff8_0000, "1.9375"),
    (0x3ffc_0000, "1.96875"),
    (0x3ffe_0000, "1.984375"),
    (0x3fff_0000, "1.9921875"),
];

/// Returns the built-in catalog for `operation`, in evaluation order.
pub fn catalog(operation: Operation) -> Vec<CornerCase> {
    match operation {
        Operation::Divide => DIVIDER_CASES
            .iter()
            .map(|&(a, b, note)| {
                let mut case = CornerCase::new(TestVector::binary(a, b), note);
                case.open_defect = DIVIDER_OPEN_DEFECTS
                    .iter()
                    .find(|&&(da, db, _)| da == a && db == b)
                    .map(|&(_, _, annotation)| annotation.to_string());
                case
            })
            .collect(),
        Operation::Sqrt => SQRT_CASES
            .iter()
            .map(|&(a, note)| CornerCase::new(TestVector::unary(a), note))
            .collect(),
    }
}
