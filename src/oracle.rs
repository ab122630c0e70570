// SPDX-License-Identifier: Apache-2.0

//! Drives one vector through the unit under test and the reference and
//! judges whether they agree.

use crate::fp32::{self, ExceptionFlags};
use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;
use crate::reference::ReferenceModel;
use crate::unit::{read_flags, ArithmeticUnit, DebugTaps};
use crate::vector::{TestVector, VectorLabel};

/// Distance between two encodings in units in the last place.
///
/// Any two NaNs are at distance zero, as are `+0` and `-0`. Across the sign
/// boundary the distance is the sum of both magnitudes; on the same side it
/// is the difference of the magnitudes.
pub fn ulp_diff(rtl: u32, reference: u32) -> u32 {
    if fp32::is_nan(rtl) && fp32::is_nan(reference) {
        return 0;
    }
    if rtl == reference {
        return 0;
    }
    if fp32::is_zero(rtl) && fp32::is_zero(reference) {
        return 0;
    }
    let (m_rtl, m_ref) = (fp32::magnitude(rtl), fp32::magnitude(reference));
    if fp32::sign(rtl) != fp32::sign(reference) {
        // Both magnitudes are below 2^31, so the sum fits.
        m_rtl + m_ref
    } else {
        m_rtl.abs_diff(m_ref)
    }
}

/// How far a unit result may stray from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquivalencePolicy {
    pub max_ulp: u32,
}

impl EquivalencePolicy {
    /// Bit-exact agreement, modulo NaN payloads and the sign of zero.
    pub fn strict() -> Self {
        EquivalencePolicy { max_ulp: 0 }
    }

    pub fn tolerant(max_ulp: u32) -> Self {
        EquivalencePolicy { max_ulp }
    }

    pub fn is_strict(&self) -> bool {
        self.max_ulp == 0
    }

    /// Whether `rtl` is an acceptable stand-in for `reference`. A NaN is
    /// never accepted in place of a number, nor the reverse, and an infinity
    /// only matches itself, however close the encodings are.
    pub fn accepts(&self, rtl: u32, reference: u32) -> bool {
        let (rtl_nan, ref_nan) = (fp32::is_nan(rtl), fp32::is_nan(reference));
        if rtl_nan || ref_nan {
            return rtl_nan && ref_nan;
        }
        if fp32::is_infinite(rtl) || fp32::is_infinite(reference) {
            return rtl == reference;
        }
        ulp_diff(rtl, reference) <= self.max_ulp
    }
}

impl Default for EquivalencePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Everything observed for one vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub vector: TestVector,
    pub rtl_bits: u32,
    pub rtl_flags: ExceptionFlags,
    pub ref_bits: u32,
    pub ref_flags: ExceptionFlags,
    pub ulp_diff: u32,
    pub nan_equivalent: bool,
    pub value_pass: bool,
    pub flag_pass: bool,
    pub debug_taps: Option<DebugTaps>,
}

impl EvaluationRecord {
    pub fn passed(&self) -> bool {
        self.value_pass && self.flag_pass
    }

    /// Flags the reference raised that the unit did not.
    pub fn missing_flags(&self) -> ExceptionFlags {
        self.ref_flags.difference(self.rtl_flags)
    }

    /// Flags the unit raised that the reference did not.
    pub fn extra_flags(&self) -> ExceptionFlags {
        self.rtl_flags.difference(self.ref_flags)
    }

    /// The single-line diagnostic, prefixed with `label`.
    pub fn diagnostic(&self, label: &VectorLabel) -> String {
        let verdict = |ok: bool| if ok { "PASS" } else { "FAIL" };
        let mut line = format!(
            "[{}] {} RTL={}(0x{:08x}) Ref={}(0x{:08x}) ulp_diff={} {} |FLAG={} RTL_flags=0x{:02x} Ref_flags=0x{:02x}",
            label,
            self.vector,
            fp32::to_f32(self.rtl_bits),
            self.rtl_bits,
            fp32::to_f32(self.ref_bits),
            self.ref_bits,
            self.ulp_diff,
            verdict(self.value_pass),
            verdict(self.flag_pass),
            self.rtl_flags,
            self.ref_flags,
        );
        if !self.flag_pass {
            line.push_str(&format!(
                " missing=[{}] extra=[{}]",
                self.missing_flags().names().join(","),
                self.extra_flags().names().join(",")
            ));
        }
        if let Some(taps) = &self.debug_taps {
            line.push(' ');
            line.push_str(&taps.to_string());
        }
        line
    }
}

/// Binds a unit and a reference for one operation.
pub struct Oracle<'a, U: ArithmeticUnit + ?Sized, R: ReferenceModel + ?Sized> {
    operation: Operation,
    unit: &'a mut U,
    reference: &'a R,
    policy: EquivalencePolicy,
}

impl<'a, U: ArithmeticUnit + ?Sized, R: ReferenceModel + ?Sized> Oracle<'a, U, R> {
    pub fn new(
        operation: Operation,
        unit: &'a mut U,
        reference: &'a R,
        policy: EquivalencePolicy,
    ) -> Self {
        Oracle {
            operation,
            unit,
            reference,
            policy,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn policy(&self) -> EquivalencePolicy {
        self.policy
    }

    /// Presents `vector` to the unit, computes the reference on the same
    /// bits, and compares. Errors only when the vector does not fit the
    /// operation.
    pub fn evaluate(&mut self, vector: TestVector) -> Result<EvaluationRecord, FpdiffError> {
        vector.check_arity(self.operation)?;
        self.unit.set_inputs(vector.a, vector.b);
        self.unit.evaluate();
        let rtl_bits = self.unit.result();
        let rtl_flags = read_flags(&*self.unit);
        let debug_taps = self.unit.debug_taps();

        let (ref_bits, ref_flags) = self.reference.compute(self.operation, vector)?;

        let nan_equivalent = fp32::is_nan(rtl_bits) && fp32::is_nan(ref_bits);
        let record = EvaluationRecord {
            vector,
            rtl_bits,
            rtl_flags,
            ref_bits,
            ref_flags,
            ulp_diff: ulp_diff(rtl_bits, ref_bits),
            nan_equivalent,
            value_pass: nan_equivalent || self.policy.accepts(rtl_bits, ref_bits),
            flag_pass: rtl_flags == ref_flags,
            debug_taps,
        };
        log::trace!("{} -> rtl=0x{:08x} ref=0x{:08x}", vector, rtl_bits, ref_bits);
        Ok(record)
    }
}
