// SPDX-License-Identifier: Apache-2.0

//! Software reference for FP32 division and square root.

use crate::fp32::{self, ExceptionFlags};
use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;
use crate::vector::TestVector;

/// A bit-exact IEEE-754 binary32 reference (round to nearest, ties to even).
///
/// Every call returns a freshly computed flag set; no status accumulates
/// between calls.
pub trait ReferenceModel {
    fn divide(&self, a: u32, b: u32) -> (u32, ExceptionFlags);
    fn sqrt(&self, a: u32) -> (u32, ExceptionFlags);

    fn compute(
        &self,
        operation: Operation,
        vector: TestVector,
    ) -> Result<(u32, ExceptionFlags), FpdiffError> {
        vector.check_arity(operation)?;
        Ok(match (operation, vector.b) {
            (Operation::Divide, Some(b)) => self.divide(vector.a, b),
            (Operation::Sqrt, _) => self.sqrt(vector.a),
            (Operation::Divide, None) => unreachable!("arity checked above"),
        })
    }
}

/// Reference built on the host's correctly rounded `f32` division and
/// square root.
///
/// Exception flags are derived from the operands and the rounded result.
/// Exactness is decided by multiplying back in `f64`, where the product of
/// two 24-bit significands is exact. Tininess is detected after rounding,
/// matching SoftFloat's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostReference;

/// Largest value that still rounds below the smallest normal when rounded
/// to 24 bits with an unbounded exponent: 2^-126 - 2^-151.
fn tininess_threshold() -> f64 {
    f64::from((1u32 << 25) - 1) * 2f64.powi(-151)
}

impl HostReference {
    pub fn new() -> Self {
        HostReference
    }
}

impl ReferenceModel for HostReference {
    fn divide(&self, a: u32, b: u32) -> (u32, ExceptionFlags) {
        let mut flags = ExceptionFlags::NONE;
        if fp32::is_nan(a) || fp32::is_nan(b) {
            if fp32::is_signaling_nan(a) || fp32::is_signaling_nan(b) {
                flags |= ExceptionFlags::INVALID;
            }
            return (fp32::DEFAULT_NAN, flags);
        }
        let negative = fp32::sign(a) != fp32::sign(b);
        if (fp32::is_infinite(a) && fp32::is_infinite(b)) || (fp32::is_zero(a) && fp32::is_zero(b))
        {
            return (fp32::DEFAULT_NAN, ExceptionFlags::INVALID);
        }
        if fp32::is_infinite(a) {
            return (fp32::infinity(negative), flags);
        }
        if fp32::is_infinite(b) {
            return (fp32::zero(negative), flags);
        }
        if fp32::is_zero(b) {
            return (fp32::infinity(negative), ExceptionFlags::DIVIDE_BY_ZERO);
        }
        if fp32::is_zero(a) {
            return (fp32::zero(negative), flags);
        }

        let x = fp32::to_f32(a);
        let y = fp32::to_f32(b);
        let q = x / y;
        if q.is_infinite() {
            return (q.to_bits(), ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
        }
        let exact = f64::from(q) * f64::from(y) == f64::from(x);
        if !exact {
            flags |= ExceptionFlags::INEXACT;
            let tiny = f64::from(x).abs() < tininess_threshold() * f64::from(y).abs();
            if tiny {
                flags |= ExceptionFlags::UNDERFLOW;
            }
        }
        (q.to_bits(), flags)
    }

    fn sqrt(&self, a: u32) -> (u32, ExceptionFlags) {
        if fp32::is_nan(a) {
            let flags = if fp32::is_signaling_nan(a) {
                ExceptionFlags::INVALID
            } else {
                ExceptionFlags::NONE
            };
            return (fp32::DEFAULT_NAN, flags);
        }
        if fp32::is_zero(a) {
            return (a, ExceptionFlags::NONE);
        }
        if fp32::sign(a) {
            return (fp32::DEFAULT_NAN, ExceptionFlags::INVALID);
        }
        if fp32::is_infinite(a) {
            return (a, ExceptionFlags::NONE);
        }
        let x = fp32::to_f32(a);
        let r = x.sqrt();
        let r_wide = f64::from(r);
        let flags = if r_wide * r_wide == f64::from(x) {
            ExceptionFlags::NONE
        } else {
            ExceptionFlags::INEXACT
        };
        (r.to_bits(), flags)
    }
}
