// SPDX-License-Identifier: Apache-2.0

//! Bit-level models of combinational FP32 divider and square-root units.
//!
//! These mirror the datapath of the RTL they stand in for: special-value
//! decode, subnormal normalization by leading-zero count, an integer
//! quotient / root with three extra bits plus a sticky bit, and a single
//! round-to-nearest-even / pack stage. No host floating point is used, so
//! they are independent of `reference::HostReference`.

use crate::fp32::{self, ExceptionFlags};
use crate::unit::{ArithmeticUnit, DebugTaps};

/// Number of bits kept below the 24-bit significand: guard, round, and one
/// sticky position.
const EXTRA_BITS: u32 = 3;

/// Outputs of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutput {
    pub bits: u32,
    pub flags: ExceptionFlags,
    pub taps: DebugTaps,
}

impl UnitOutput {
    fn special(bits: u32, flags: ExceptionFlags) -> Self {
        UnitOutput {
            bits,
            flags,
            taps: DebugTaps::new(),
        }
    }
}

/// Finite non-zero operand as (biased exponent, 24-bit significand with the
/// leading one at bit 23, normalization shift). Subnormals get exponents
/// below 1.
fn normalize(bits: u32) -> (i32, u32, u32) {
    let exponent = fp32::biased_exponent(bits) as i32;
    let fraction = fp32::fraction(bits);
    if exponent == 0 {
        let lz = fraction.leading_zeros() - (32 - fp32::FRACTION_BITS - 1);
        (1 - lz as i32, fraction << lz, lz)
    } else {
        (exponent, fraction | (1 << fp32::FRACTION_BITS), 0)
    }
}

/// Logical right shift that ORs every shifted-out bit into bit 0.
fn shift_right_jam(value: u32, shift: u32) -> u32 {
    if shift == 0 {
        value
    } else if shift < 32 {
        (value >> shift) | ((value << (32 - shift) != 0) as u32)
    } else {
        (value != 0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rounded {
    bits: u32,
    flags: ExceptionFlags,
    mantissa: u32,
    guard: bool,
    sticky: bool,
    round_up: bool,
}

fn overflow(sign: u32) -> Rounded {
    Rounded {
        bits: sign | fp32::POS_INFINITY,
        flags: ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT,
        mantissa: 0,
        guard: false,
        sticky: false,
        round_up: false,
    }
}

/// Rounds and packs `sig / 2^26 * 2^(exp - 127)`, where `sig` has its
/// leading one at bit 26 and carries any remainder in bit 0.
fn round_pack(negative: bool, exp: i32, sig: u32) -> Rounded {
    debug_assert!(sig >> (fp32::FRACTION_BITS + EXTRA_BITS) == 1);
    let sign = if negative { fp32::SIGN_MASK } else { 0 };
    if exp >= 255 {
        return overflow(sign);
    }

    // Tininess after rounding: only values in [2^-127, 2^-126) whose 24-bit
    // rounding carries up to 2^-126 escape.
    let tiny = exp < 0
        || (exp == 0 && !((sig >> EXTRA_BITS) == 0x00ff_ffff && sig & 0b100 != 0));
    let (sig, exp) = if exp < 1 {
        (shift_right_jam(sig, (1 - exp) as u32), 0)
    } else {
        (sig, exp)
    };

    let kept = sig >> EXTRA_BITS;
    let guard = sig & 0b100 != 0;
    let sticky = sig & 0b011 != 0;
    let round_up = guard && (sticky || kept & 1 != 0);
    let inexact = guard || sticky;
    let mut mantissa = kept + round_up as u32;
    let mut exp = exp;
    // For subnormals a carry out of the fraction lands in the exponent
    // field and yields the smallest normal, so only normals renormalize.
    if exp != 0 && mantissa == 1 << (fp32::FRACTION_BITS + 1) {
        mantissa >>= 1;
        exp += 1;
        if exp >= 255 {
            return overflow(sign);
        }
    }

    let mut flags = ExceptionFlags::NONE;
    if inexact {
        flags |= ExceptionFlags::INEXACT;
        if tiny {
            flags |= ExceptionFlags::UNDERFLOW;
        }
    }
    let bits = if exp == 0 {
        sign | mantissa
    } else {
        sign | ((exp as u32) << fp32::FRACTION_BITS) | (mantissa & fp32::FRACTION_MASK)
    };
    Rounded {
        bits,
        flags,
        mantissa,
        guard,
        sticky,
        round_up,
    }
}

/// Combinational FP32 division.
pub fn divide(a: u32, b: u32) -> UnitOutput {
    if fp32::is_nan(a) || fp32::is_nan(b) {
        let flags = if fp32::is_signaling_nan(a) || fp32::is_signaling_nan(b) {
            ExceptionFlags::INVALID
        } else {
            ExceptionFlags::NONE
        };
        return UnitOutput::special(fp32::DEFAULT_NAN, flags);
    }
    let negative = fp32::sign(a) ^ fp32::sign(b);
    let (a_inf, b_inf) = (fp32::is_infinite(a), fp32::is_infinite(b));
    let (a_zero, b_zero) = (fp32::is_zero(a), fp32::is_zero(b));
    if (a_inf && b_inf) || (a_zero && b_zero) {
        return UnitOutput::special(fp32::DEFAULT_NAN, ExceptionFlags::INVALID);
    }
    if a_inf {
        return UnitOutput::special(fp32::infinity(negative), ExceptionFlags::NONE);
    }
    if b_inf || a_zero {
        return UnitOutput::special(fp32::zero(negative), ExceptionFlags::NONE);
    }
    if b_zero {
        return UnitOutput::special(fp32::infinity(negative), ExceptionFlags::DIVIDE_BY_ZERO);
    }

    let (exp_a, sig_a, lz_a) = normalize(a);
    let (exp_b, sig_b, lz_b) = normalize(b);
    // Pre-shift the dividend so the quotient always has its leading one at
    // bit 26.
    let (dividend, exp) = if sig_a >= sig_b {
        ((sig_a as u64) << 26, exp_a - exp_b + 127)
    } else {
        ((sig_a as u64) << 27, exp_a - exp_b + 126)
    };
    let quotient = dividend / sig_b as u64;
    let remainder = dividend % sig_b as u64;
    let sig = quotient as u32 | (remainder != 0) as u32;
    let rounded = round_pack(negative, exp, sig);

    let mut taps = DebugTaps::new();
    taps.hex("dbg_final", rounded.mantissa as u64, 6)
        .bit("guard", rounded.guard)
        .bit("sticky", rounded.sticky)
        .hex("raw_div", quotient, 7)
        .bit("rem_nonzero", remainder != 0)
        .dec("lz_a", lz_a as u64)
        .dec("lz_b", lz_b as u64)
        .bit("round_up", rounded.round_up);
    UnitOutput {
        bits: rounded.bits,
        flags: rounded.flags,
        taps,
    }
}

/// Integer square root by the digit-by-digit (restoring) method. Returns
/// `(floor(sqrt(n)), n - floor(sqrt(n))^2)`.
fn isqrt_rem(n: u64) -> (u64, u64) {
    let mut remainder = n;
    let mut root = 0u64;
    let mut bit = 1u64 << 62;
    while bit > remainder {
        bit >>= 2;
    }
    while bit != 0 {
        if remainder >= root + bit {
            remainder -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    (root, remainder)
}

/// Combinational FP32 square root.
pub fn sqrt(a: u32) -> UnitOutput {
    if fp32::is_nan(a) {
        let flags = if fp32::is_signaling_nan(a) {
            ExceptionFlags::INVALID
        } else {
            ExceptionFlags::NONE
        };
        return UnitOutput::special(fp32::DEFAULT_NAN, flags);
    }
    if fp32::is_zero(a) {
        return UnitOutput::special(a, ExceptionFlags::NONE);
    }
    if fp32::sign(a) {
        return UnitOutput::special(fp32::DEFAULT_NAN, ExceptionFlags::INVALID);
    }
    if fp32::is_infinite(a) {
        return UnitOutput::special(a, ExceptionFlags::NONE);
    }

    let (exp_a, sig_a, lz_a) = normalize(a);
    let mut unbiased = exp_a - fp32::EXPONENT_BIAS;
    // Make the exponent even so it halves exactly; the radicand then lies
    // in [1, 4).
    let radicand_sig = if unbiased & 1 != 0 {
        unbiased -= 1;
        (sig_a as u64) << 1
    } else {
        sig_a as u64
    };
    let (root, remainder) = isqrt_rem(radicand_sig << 29);
    let sig = root as u32 | (remainder != 0) as u32;
    let rounded = round_pack(false, unbiased / 2 + fp32::EXPONENT_BIAS, sig);

    let mut taps = DebugTaps::new();
    taps.hex("dbg_final", rounded.mantissa as u64, 6)
        .bit("guard", rounded.guard)
        .bit("sticky", rounded.sticky)
        .hex("raw_root", root, 7)
        .bit("rem_nonzero", remainder != 0)
        .dec("lz", lz_a as u64)
        .bit("round_up", rounded.round_up);
    UnitOutput {
        bits: rounded.bits,
        flags: rounded.flags,
        taps,
    }
}

/// Register-level wrapper around `divide`.
#[derive(Debug, Clone, Default)]
pub struct Fp32DivComb {
    a: u32,
    b: u32,
    y: u32,
    flags: ExceptionFlags,
    taps: DebugTaps,
}

impl Fp32DivComb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArithmeticUnit for Fp32DivComb {
    fn set_inputs(&mut self, a: u32, b: Option<u32>) {
        self.a = a;
        self.b = b.unwrap_or(fp32::POS_ZERO);
    }

    fn evaluate(&mut self) {
        let out = divide(self.a, self.b);
        self.y = out.bits;
        self.flags = out.flags;
        self.taps = out.taps;
    }

    fn result(&self) -> u32 {
        self.y
    }

    fn exc_invalid(&self) -> bool {
        self.flags.invalid()
    }

    fn exc_divzero(&self) -> bool {
        self.flags.divide_by_zero()
    }

    fn exc_overflow(&self) -> bool {
        self.flags.overflow()
    }

    fn exc_underflow(&self) -> bool {
        self.flags.underflow()
    }

    fn exc_inexact(&self) -> bool {
        self.flags.inexact()
    }

    fn debug_taps(&self) -> Option<DebugTaps> {
        if self.taps.is_empty() {
            None
        } else {
            Some(self.taps.clone())
        }
    }
}

/// Register-level wrapper around `sqrt`.
#[derive(Debug, Clone, Default)]
pub struct Fp32SqrtComb {
    a: u32,
    y: u32,
    flags: ExceptionFlags,
    taps: DebugTaps,
}

impl Fp32SqrtComb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArithmeticUnit for Fp32SqrtComb {
    fn set_inputs(&mut self, a: u32, _b: Option<u32>) {
        self.a = a;
    }

    fn evaluate(&mut self) {
        let out = sqrt(self.a);
        self.y = out.bits;
        self.flags = out.flags;
        self.taps = out.taps;
    }

    fn result(&self) -> u32 {
        self.y
    }

    fn exc_invalid(&self) -> bool {
        self.flags.invalid()
    }

    fn exc_divzero(&self) -> bool {
        self.flags.divide_by_zero()
    }

    fn exc_overflow(&self) -> bool {
        self.flags.overflow()
    }

    fn exc_underflow(&self) -> bool {
        self.flags.underflow()
    }

    fn exc_inexact(&self) -> bool {
        self.flags.inexact()
    }

    fn debug_taps(&self) -> Option<DebugTaps> {
        if self.taps.is_empty() {
            None
        } else {
            Some(self.taps.clone())
        }
    }
}
