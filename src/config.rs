// SPDX-License-Identifier: Apache-2.0

//! TOML run configuration.
//!
//! Every field is optional; anything left out falls back to the built-in
//! tables for the selected operation. Integers may be written in hex
//! (`0x3f800000`), which is how bit patterns are usually quoted.

use std::path::Path;

use serde::Deserialize;

use crate::bit_region::{BitRegion, BitRegionTable};
use crate::corner_cases::CornerCase;
use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;
use crate::oracle::EquivalencePolicy;
use crate::run::RunPlan;
use crate::vector::TestVector;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// `"divide"` or `"sqrt"`.
    pub operation: Option<Operation>,

    /// Number of stratified random vectors.
    pub vector_count: Option<u64>,

    /// Seed for the random phase. A fresh seed is drawn (and logged) when
    /// absent so that failures can still be replayed.
    pub seed: Option<u64>,

    /// Every n-th random divider vector draws both operands from the same
    /// region. Zero disables it.
    pub same_region_one_in: Option<u32>,

    /// Accept results within this many ulp of the reference. Anything but
    /// zero is for triage only.
    pub max_ulp: Option<u32>,

    /// Random vectors between progress log lines; zero disables them.
    pub progress_every: Option<u64>,

    #[serde(default)]
    pub sweep: SweepOverrides,

    /// Replaces the built-in region table when present.
    pub regions: Option<Vec<BitRegion>>,

    /// Appended to the built-in corner-case catalog.
    #[serde(default)]
    pub corner_cases: Vec<ExtraCornerCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepOverrides {
    pub subnormal_stride: Option<u32>,
    pub divisors: Option<Vec<u32>>,
    pub near_one_half_width: Option<u32>,
    pub partner_stride: Option<u32>,
}

/// A regression input recorded after triage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraCornerCase {
    pub a: u32,
    pub b: Option<u32>,
    #[serde(default)]
    pub note: String,
}

impl OracleConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, FpdiffError> {
        toml::from_str(text).map_err(|e| FpdiffError::new(format!("invalid config: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self, FpdiffError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FpdiffError::new(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| FpdiffError::new(format!("{}: {}", path.display(), e.0)))
    }

    pub fn operation(&self) -> Operation {
        self.operation.unwrap_or(Operation::Divide)
    }

    /// Resolves the configuration into a validated plan.
    pub fn plan(&self) -> Result<RunPlan, FpdiffError> {
        let operation = self.operation();
        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                log::info!("no seed configured; using seed={}", seed);
                seed
            }
        };
        let mut plan = RunPlan::builtin(operation, seed);

        if let Some(count) = self.vector_count {
            plan.vector_count = count;
        }
        if let Some(n) = self.same_region_one_in {
            plan.sampler.same_region_one_in = n;
        }
        if let Some(max_ulp) = self.max_ulp {
            plan.policy = EquivalencePolicy::tolerant(max_ulp);
        }
        if let Some(every) = self.progress_every {
            plan.progress_every = every;
        }

        let sweep = &self.sweep;
        if let Some(stride) = sweep.subnormal_stride {
            plan.sweep.subnormal_stride = stride;
        }
        if let Some(divisors) = &sweep.divisors {
            plan.sweep.divisors = divisors.clone();
        }
        if let Some(w) = sweep.near_one_half_width {
            plan.sweep.near_one_half_width = w;
        }
        if let Some(stride) = sweep.partner_stride {
            plan.sweep.partner_stride = stride;
        }

        if let Some(regions) = &self.regions {
            plan.regions = BitRegionTable::new(regions.clone())?;
        }
        for extra in &self.corner_cases {
            let vector = TestVector {
                a: extra.a,
                b: extra.b,
            };
            plan.corner_cases.push(CornerCase::new(vector, &extra.note));
        }

        plan.validate()?;
        Ok(plan)
    }
}
