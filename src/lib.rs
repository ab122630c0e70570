// SPDX-License-Identifier: Apache-2.0

//! Differential-testing oracle for IEEE-754 single-precision divider and
//! square-root units.
//!
//! A run feeds a unit under test (`ArithmeticUnit`) with corner cases,
//! systematic sweeps, and stratified random vectors, compares every result
//! and exception flag set against a `ReferenceModel`, and stops at the first
//! disagreement.

pub mod bit_region;
pub mod comb_model;
pub mod config;
pub mod corner_cases;
pub mod fp32;
pub mod fpdiff_error;
pub mod operation;
pub mod oracle;
pub mod reference;
pub mod report;
pub mod run;
pub mod sampler;
pub mod sweep;
pub mod unit;
pub mod vector;

pub use bit_region::{BitRegion, BitRegionTable};
pub use comb_model::{Fp32DivComb, Fp32SqrtComb};
pub use config::OracleConfig;
pub use corner_cases::CornerCase;
pub use fp32::ExceptionFlags;
pub use fpdiff_error::FpdiffError;
pub use operation::Operation;
pub use oracle::{ulp_diff, EquivalencePolicy, EvaluationRecord, Oracle};
pub use reference::{HostReference, ReferenceModel};
pub use report::ConsoleReporter;
pub use run::{Phase, Reporter, RunController, RunError, RunFailure, RunPlan, RunTally};
pub use sampler::{SamplerConfig, StratifiedSampler};
pub use sweep::SweepConfig;
pub use unit::{ArithmeticUnit, DebugTaps};
pub use vector::{TestVector, VectorLabel};
