// SPDX-License-Identifier: Apache-2.0

//! Bit-level helpers for IEEE-754 binary32 encodings.
//!
//! Operands and results travel through the harness as raw `u32` patterns so
//! that NaN payloads, the signalling bit, and the sign of zero are preserved
//! exactly. Conversions to `f32` only happen through `f32::from_bits`, which
//! is a pure reinterpretation of the storage.

pub const SIGN_MASK: u32 = 0x8000_0000;
pub const MAGNITUDE_MASK: u32 = 0x7fff_ffff;
pub const EXPONENT_MASK: u32 = 0x7f80_0000;
pub const FRACTION_MASK: u32 = 0x007f_ffff;
pub const QUIET_BIT: u32 = 0x0040_0000;

pub const FRACTION_BITS: u32 = 23;
pub const EXPONENT_BIAS: i32 = 127;

pub const POS_ZERO: u32 = 0x0000_0000;
pub const NEG_ZERO: u32 = 0x8000_0000;
pub const ONE: u32 = 0x3f80_0000;
pub const POS_INFINITY: u32 = 0x7f80_0000;
pub const NEG_INFINITY: u32 = 0xff80_0000;
pub const MIN_SUBNORMAL: u32 = 0x0000_0001;
pub const MAX_SUBNORMAL: u32 = 0x007f_ffff;
pub const MIN_NORMAL: u32 = 0x0080_0000;
pub const MAX_FINITE: u32 = 0x7f7f_ffff;

/// Canonical quiet NaN produced by the bundled reference and unit models.
pub const DEFAULT_NAN: u32 = 0x7fc0_0000;

/// Reinterprets the bit pattern as an `f32` without numeric conversion.
#[inline]
pub fn to_f32(bits: u32) -> f32 {
    f32::from_bits(bits)
}

#[inline]
pub fn sign(bits: u32) -> bool {
    bits & SIGN_MASK != 0
}

/// The encoding with the sign bit cleared; monotonic in the absolute value
/// for all non-NaN encodings.
#[inline]
pub fn magnitude(bits: u32) -> u32 {
    bits & MAGNITUDE_MASK
}

#[inline]
pub fn biased_exponent(bits: u32) -> u32 {
    (bits & EXPONENT_MASK) >> FRACTION_BITS
}

#[inline]
pub fn fraction(bits: u32) -> u32 {
    bits & FRACTION_MASK
}

#[inline]
pub fn is_nan(bits: u32) -> bool {
    magnitude(bits) > POS_INFINITY
}

#[inline]
pub fn is_signaling_nan(bits: u32) -> bool {
    is_nan(bits) && bits & QUIET_BIT == 0
}

#[inline]
pub fn is_infinite(bits: u32) -> bool {
    magnitude(bits) == POS_INFINITY
}

#[inline]
pub fn is_zero(bits: u32) -> bool {
    magnitude(bits) == 0
}

#[inline]
pub fn is_subnormal(bits: u32) -> bool {
    biased_exponent(bits) == 0 && fraction(bits) != 0
}

/// Returns an infinity carrying the given sign.
#[inline]
pub fn infinity(negative: bool) -> u32 {
    if negative {
        NEG_INFINITY
    } else {
        POS_INFINITY
    }
}

/// Returns a zero carrying the given sign.
#[inline]
pub fn zero(negative: bool) -> u32 {
    if negative {
        NEG_ZERO
    } else {
        POS_ZERO
    }
}

/// IEEE-754 exception status as a 5-bit set.
///
/// Packed in the order the unit under test exposes its outputs:
/// invalid=bit4, divide-by-zero=bit3, overflow=bit2, underflow=bit1,
/// inexact=bit0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExceptionFlags(u8);

impl ExceptionFlags {
    pub const NONE: ExceptionFlags = ExceptionFlags(0);
    pub const INEXACT: ExceptionFlags = ExceptionFlags(1 << 0);
    pub const UNDERFLOW: ExceptionFlags = ExceptionFlags(1 << 1);
    pub const OVERFLOW: ExceptionFlags = ExceptionFlags(1 << 2);
    pub const DIVIDE_BY_ZERO: ExceptionFlags = ExceptionFlags(1 << 3);
    pub const INVALID: ExceptionFlags = ExceptionFlags(1 << 4);

    const NAMED: [(ExceptionFlags, &'static str); 5] = [
        (ExceptionFlags::INVALID, "invalid"),
        (ExceptionFlags::DIVIDE_BY_ZERO, "divzero"),
        (ExceptionFlags::OVERFLOW, "overflow"),
        (ExceptionFlags::UNDERFLOW, "underflow"),
        (ExceptionFlags::INEXACT, "inexact"),
    ];

    /// Builds the set from the five single-bit outputs of a unit.
    pub fn from_outputs(
        invalid: bool,
        divide_by_zero: bool,
        overflow: bool,
        underflow: bool,
        inexact: bool,
    ) -> Self {
        ExceptionFlags(
            (invalid as u8) << 4
                | (divide_by_zero as u8) << 3
                | (overflow as u8) << 2
                | (underflow as u8) << 1
                | inexact as u8,
        )
    }

    /// Builds the set from its packed representation; bits above bit 4 are
    /// dropped.
    pub fn from_bits(bits: u8) -> Self {
        ExceptionFlags(bits & 0x1f)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: ExceptionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ExceptionFlags) {
        self.0 |= other.0;
    }

    /// Flags present in `self` but not in `other`.
    pub fn difference(self, other: ExceptionFlags) -> ExceptionFlags {
        ExceptionFlags(self.0 & !other.0)
    }

    pub fn invalid(self) -> bool {
        self.contains(ExceptionFlags::INVALID)
    }

    pub fn divide_by_zero(self) -> bool {
        self.contains(ExceptionFlags::DIVIDE_BY_ZERO)
    }

    pub fn overflow(self) -> bool {
        self.contains(ExceptionFlags::OVERFLOW)
    }

    pub fn underflow(self) -> bool {
        self.contains(ExceptionFlags::UNDERFLOW)
    }

    pub fn inexact(self) -> bool {
        self.contains(ExceptionFlags::INEXACT)
    }

    /// Names of the set flags, most significant first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::ops::BitOr for ExceptionFlags {
    type Output = ExceptionFlags;

    fn bitor(self, rhs: ExceptionFlags) -> ExceptionFlags {
        ExceptionFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ExceptionFlags {
    fn bitor_assign(&mut self, rhs: ExceptionFlags) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for ExceptionFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{{}}}", self.names().join(","))
    }
}

impl std::fmt::LowerHex for ExceptionFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_packing_order() {
        let flags = ExceptionFlags::from_outputs(true, false, false, false, true);
        assert_eq!(flags.bits(), 0x11);
        assert!(flags.invalid());
        assert!(flags.inexact());
        assert!(!flags.divide_by_zero());

        let all = ExceptionFlags::from_outputs(true, true, true, true, true);
        assert_eq!(all.bits(), 0x1f);
        assert_eq!(
            all.names(),
            vec!["invalid", "divzero", "overflow", "underflow", "inexact"]
        );
    }

    #[test]
    fn test_flag_difference_and_display() {
        let rtl = ExceptionFlags::UNDERFLOW | ExceptionFlags::INEXACT;
        let reference = ExceptionFlags::INEXACT;
        assert_eq!(rtl.difference(reference), ExceptionFlags::UNDERFLOW);
        assert!(reference.difference(rtl).is_empty());
        assert_eq!(format!("{}", rtl), "{underflow,inexact}");
        assert_eq!(format!("{}", ExceptionFlags::NONE), "{}");
        assert_eq!(format!("{:x}", rtl), "3");
    }

    #[test]
    fn test_from_bits_masks_high_bits() {
        assert_eq!(ExceptionFlags::from_bits(0xff).bits(), 0x1f);
    }

    #[test]
    fn test_classification() {
        assert!(is_nan(DEFAULT_NAN));
        assert!(is_nan(0xffc0_0000));
        assert!(!is_signaling_nan(DEFAULT_NAN));
        assert!(is_signaling_nan(0x7fa0_0000));
        assert!(!is_nan(POS_INFINITY));
        assert!(is_infinite(NEG_INFINITY));
        assert!(is_zero(NEG_ZERO));
        assert!(is_subnormal(MAX_SUBNORMAL));
        assert!(!is_subnormal(MIN_NORMAL));
        assert_eq!(magnitude(0xbf80_0000), ONE);
        assert!(sign(0xbf80_0000));
    }

    #[test]
    fn test_to_f32_preserves_payload() {
        let snan = 0x7fa0_0001;
        assert_eq!(to_f32(snan).to_bits(), snan);
        assert_eq!(to_f32(NEG_ZERO).to_bits(), NEG_ZERO);
        assert_eq!(to_f32(ONE), 1.0);
    }
}
