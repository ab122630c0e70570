// SPDX-License-Identifier: Apache-2.0

//! The seam between the oracle and the arithmetic unit being verified.

use crate::fp32::ExceptionFlags;

/// A combinational FP32 arithmetic unit with register-style ports.
///
/// The expected sequence is `set_inputs`, `evaluate`, then reads of the
/// result and flag outputs. Implementations must not carry state from one
/// evaluation into the next.
pub trait ArithmeticUnit {
    /// Drives the operand registers. `b` is `None` for unary units and is
    /// ignored by them if supplied.
    fn set_inputs(&mut self, a: u32, b: Option<u32>);

    fn evaluate(&mut self);

    fn result(&self) -> u32;

    fn exc_invalid(&self) -> bool;
    fn exc_divzero(&self) -> bool;
    fn exc_overflow(&self) -> bool;
    fn exc_underflow(&self) -> bool;
    fn exc_inexact(&self) -> bool;

    /// Internal signals of the most recent evaluation, if the unit exposes
    /// any.
    fn debug_taps(&self) -> Option<DebugTaps> {
        None
    }
}

/// Packs the unit's five exception outputs into an ordered flag set.
pub fn read_flags<U: ArithmeticUnit + ?Sized>(unit: &U) -> ExceptionFlags {
    ExceptionFlags::from_outputs(
        unit.exc_invalid(),
        unit.exc_divzero(),
        unit.exc_overflow(),
        unit.exc_underflow(),
        unit.exc_inexact(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugTap {
    pub name: &'static str,
    pub value: u64,
    /// Hex digits used when printing; zero prints the value in decimal.
    pub hex_digits: u8,
}

/// Named internal signals, printed in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugTaps {
    taps: Vec<DebugTap>,
}

impl DebugTaps {
    pub fn new() -> Self {
        DebugTaps { taps: Vec::new() }
    }

    pub fn hex(&mut self, name: &'static str, value: u64, hex_digits: u8) -> &mut Self {
        self.taps.push(DebugTap {
            name,
            value,
            hex_digits,
        });
        self
    }

    pub fn dec(&mut self, name: &'static str, value: u64) -> &mut Self {
        self.hex(name, value, 0)
    }

    pub fn bit(&mut self, name: &'static str, value: bool) -> &mut Self {
        self.dec(name, value as u64)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.taps.iter().find(|t| t.name == name).map(|t| t.value)
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebugTap> {
        self.taps.iter()
    }
}

impl std::fmt::Display for DebugTaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|")?;
        for (i, tap) in self.taps.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            if tap.hex_digits == 0 {
                write!(f, "{}={}", tap.name, tap.value)?;
            } else {
                write!(
                    f,
                    "{}=0x{:0width$x}",
                    tap.name,
                    tap.value,
                    width = tap.hex_digits as usize
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_taps_display() {
        let mut taps = DebugTaps::new();
        taps.hex("dbg_final", 0xabc, 6)
            .bit("guard", true)
            .dec("lz", 3);
        assert_eq!(format!("{}", taps), "|dbg_final=0x000abc guard=1 lz=3");
        assert_eq!(taps.get("lz"), Some(3));
        assert_eq!(taps.get("missing"), None);
    }
}
