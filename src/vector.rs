// SPDX-License-Identifier: Apache-2.0

use crate::fp32;
use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;

/// One stimulus for the unit under test: raw IEEE-754 operand patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestVector {
    pub a: u32,
    pub b: Option<u32>,
}

impl TestVector {
    pub fn unary(a: u32) -> Self {
        TestVector { a, b: None }
    }

    pub fn binary(a: u32, b: u32) -> Self {
        TestVector { a, b: Some(b) }
    }

    /// Checks that the vector carries exactly the operands `operation`
    /// consumes.
    pub fn check_arity(&self, operation: Operation) -> Result<(), FpdiffError> {
        let got = if self.b.is_some() { 2 } else { 1 };
        if got != operation.arity() {
            return Err(FpdiffError::new(format!(
                "{} takes {} operand(s) but vector {} has {}",
                operation,
                operation.arity(),
                self,
                got
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TestVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a={}(0x{:08x})", fp32::to_f32(self.a), self.a)?;
        if let Some(b) = self.b {
            write!(f, " b={}(0x{:08x})", fp32::to_f32(b), b)?;
        }
        Ok(())
    }
}

/// Identifies where a vector came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorLabel {
    Corner(usize),
    Subnormal(usize),
    NearOne(usize),
    Random(u64),
}

impl std::fmt::Display for VectorLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorLabel::Corner(i) => write!(f, "CASE {}", i),
            VectorLabel::Subnormal(i) => write!(f, "SYSTEMATIC {}", i),
            VectorLabel::NearOne(i) => write!(f, "BOUNDARY {}", i),
            VectorLabel::Random(i) => write!(f, "Time:{}", i),
        }
    }
}
