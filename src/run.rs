// SPDX-License-Identifier: Apache-2.0

//! Sequences the vector sources through the oracle and stops at the first
//! disagreement.

use crate::bit_region::BitRegionTable;
use crate::corner_cases::{self, CornerCase};
use crate::fpdiff_error::FpdiffError;
use crate::operation::Operation;
use crate::oracle::{EquivalencePolicy, EvaluationRecord, Oracle};
use crate::reference::ReferenceModel;
use crate::sampler::{SamplerConfig, StratifiedSampler, DEFAULT_SAME_REGION_ONE_IN};
use crate::sweep::{self, SweepConfig};
use crate::unit::ArithmeticUnit;
use crate::vector::{TestVector, VectorLabel};

pub const DEFAULT_VECTOR_COUNT: u64 = 60_000_000;
pub const DEFAULT_PROGRESS_EVERY: u64 = 1_000_000;

/// Phases of a run, in the only order they execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    CornerCases,
    SystematicSweep,
    StratifiedRandom,
    Report,
}

impl Phase {
    pub const FIRST: Phase = Phase::CornerCases;

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::CornerCases => Some(Phase::SystematicSweep),
            Phase::SystematicSweep => Some(Phase::StratifiedRandom),
            Phase::StratifiedRandom => Some(Phase::Report),
            Phase::Report => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::CornerCases => "corner cases",
            Phase::SystematicSweep => "systematic sweep",
            Phase::StratifiedRandom => "stratified random",
            Phase::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Vectors executed per source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub corner_cases: u64,
    pub systematic: u64,
    pub random: u64,
}

impl RunTally {
    pub fn total(&self) -> u64 {
        self.corner_cases + self.systematic + self.random
    }
}

/// Everything a run needs besides the unit and the reference.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub operation: Operation,
    pub regions: BitRegionTable,
    pub corner_cases: Vec<CornerCase>,
    pub sweep: SweepConfig,
    pub sampler: SamplerConfig,
    /// Number of stratified random vectors.
    pub vector_count: u64,
    pub policy: EquivalencePolicy,
    /// Random vectors between progress log lines; zero disables them.
    pub progress_every: u64,
}

impl RunPlan {
    /// The built-in tables, catalog, and sweeps for `operation` under the
    /// strict policy.
    pub fn builtin(operation: Operation, seed: u64) -> Self {
        RunPlan {
            operation,
            regions: BitRegionTable::for_operation(operation),
            corner_cases: corner_cases::catalog(operation),
            sweep: SweepConfig::for_operation(operation),
            sampler: SamplerConfig {
                seed,
                same_region_one_in: DEFAULT_SAME_REGION_ONE_IN,
            },
            vector_count: DEFAULT_VECTOR_COUNT,
            policy: EquivalencePolicy::strict(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    /// Rejects plans that could not run to completion.
    pub fn validate(&self) -> Result<(), FpdiffError> {
        for (i, case) in self.corner_cases.iter().enumerate() {
            case.vector.check_arity(self.operation).map_err(|e| {
                FpdiffError::new(format!("corner case {} ({}): {}", i, case.note, e))
            })?;
        }
        if self.sweep.subnormal_stride == 0 {
            return Err(FpdiffError::new("subnormal sweep stride must be positive"));
        }
        if self.sweep.near_one_half_width > sweep::MAX_NEAR_ONE_HALF_WIDTH {
            return Err(FpdiffError::new(format!(
                "near-one half-width 0x{:08x} leaves the positive half of the encoding space (max 0x{:08x})",
                self.sweep.near_one_half_width,
                sweep::MAX_NEAR_ONE_HALF_WIDTH
            )));
        }
        if self.operation.is_binary() && self.sweep.divisors.is_empty() {
            return Err(FpdiffError::new(
                "subnormal sweep needs at least one divisor for a binary operation",
            ));
        }
        Ok(())
    }
}

/// The first disagreement of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub phase: Phase,
    pub label: VectorLabel,
    pub record: EvaluationRecord,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mismatch during {}: {}",
            self.phase,
            self.record.diagnostic(&self.label)
        )
    }
}

#[derive(Debug)]
pub enum RunError {
    /// The unit disagreed with the reference.
    Mismatch(Box<RunFailure>),
    /// The run could not be carried out as planned.
    Harness(FpdiffError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Mismatch(failure) => write!(f, "{}", failure),
            RunError::Harness(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<FpdiffError> for RunError {
    fn from(e: FpdiffError) -> Self {
        RunError::Harness(e)
    }
}

/// Receives the events of a run. Only `on_failure` and `on_summary` carry
/// information that must reach the user; the rest default to no-ops.
pub trait Reporter {
    fn on_start(&mut self, _plan: &RunPlan) {}

    fn on_phase_start(&mut self, _phase: Phase) {}

    fn on_vector(&mut self, _label: &VectorLabel, _record: &EvaluationRecord) {}

    fn on_phase_done(&mut self, _phase: Phase, _tally: &RunTally) {}

    fn on_failure(&mut self, failure: &RunFailure);

    fn on_summary(&mut self, tally: &RunTally, distribution: &[(&str, f64)]);
}

/// Discards everything except what goes to the log.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_failure(&mut self, failure: &RunFailure) {
        log::error!("{}", failure);
    }

    fn on_summary(&mut self, tally: &RunTally, _distribution: &[(&str, f64)]) {
        log::info!("{} vectors passed", tally.total());
    }
}

pub struct RunController {
    plan: RunPlan,
}

impl RunController {
    pub fn new(plan: RunPlan) -> Self {
        RunController { plan }
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Runs every phase against `unit`. Returns the tally when every vector
    /// passed, or the first failure.
    pub fn run<U, R>(
        &self,
        unit: &mut U,
        reference: &R,
        reporter: &mut dyn Reporter,
    ) -> Result<RunTally, RunError>
    where
        U: ArithmeticUnit + ?Sized,
        R: ReferenceModel + ?Sized,
    {
        let plan = &self.plan;
        plan.validate()?;
        if !plan.policy.is_strict() {
            log::warn!(
                "tolerant equivalence policy: results within {} ulp are accepted",
                plan.policy.max_ulp
            );
        }
        for (i, case) in plan.corner_cases.iter().enumerate() {
            if let Some(annotation) = &case.open_defect {
                log::warn!(
                    "corner case {} ({}) is an open defect: {}",
                    i,
                    case.vector,
                    annotation
                );
            }
        }
        log::info!(
            "{} run: seed={} vectors={} regions={}",
            plan.operation,
            plan.sampler.seed,
            plan.vector_count,
            plan.regions.len()
        );

        reporter.on_start(plan);
        let mut oracle = Oracle::new(plan.operation, unit, reference, plan.policy);
        let mut tally = RunTally::default();
        let mut phase = Phase::FIRST;
        loop {
            reporter.on_phase_start(phase);
            match phase {
                Phase::CornerCases => {
                    for (i, case) in plan.corner_cases.iter().enumerate() {
                        check(&mut oracle, reporter, phase, VectorLabel::Corner(i), case.vector)?;
                        tally.corner_cases += 1;
                    }
                }
                Phase::SystematicSweep => {
                    for (label, vector) in sweep::systematic_sweep(plan.operation, &plan.sweep) {
                        check(&mut oracle, reporter, phase, label, vector)?;
                        tally.systematic += 1;
                    }
                }
                Phase::StratifiedRandom => {
                    let mut sampler =
                        StratifiedSampler::new(&plan.regions, plan.operation, plan.sampler);
                    for i in 0..plan.vector_count {
                        let draw = sampler.draw();
                        check(&mut oracle, reporter, phase, VectorLabel::Random(i), draw.vector)?;
                        tally.random += 1;
                        if plan.progress_every != 0 && tally.random % plan.progress_every == 0 {
                            log::info!(
                                "{} / {} random vectors passed",
                                tally.random,
                                plan.vector_count
                            );
                        }
                    }
                }
                Phase::Report => {
                    reporter.on_summary(&tally, &plan.regions.expected_distribution());
                }
            }
            log::debug!("phase {} done: {:?}", phase, tally);
            reporter.on_phase_done(phase, &tally);
            match phase.next() {
                Some(next) => phase = next,
                None => break,
            }
        }
        Ok(tally)
    }
}

fn check<U, R>(
    oracle: &mut Oracle<'_, U, R>,
    reporter: &mut dyn Reporter,
    phase: Phase,
    label: VectorLabel,
    vector: TestVector,
) -> Result<(), RunError>
where
    U: ArithmeticUnit + ?Sized,
    R: ReferenceModel + ?Sized,
{
    let record = oracle.evaluate(vector)?;
    reporter.on_vector(&label, &record);
    if record.passed() {
        return Ok(());
    }
    let failure = RunFailure {
        phase,
        label,
        record,
    };
    reporter.on_failure(&failure);
    Err(RunError::Mismatch(Box::new(failure)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comb_model::{Fp32DivComb, Fp32SqrtComb};
    use crate::reference::HostReference;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingReporter {
        phases: Vec<Phase>,
        vectors: u64,
        failures: Vec<RunFailure>,
        summary: Option<(RunTally, usize)>,
    }

    impl Reporter for RecordingReporter {
        fn on_phase_start(&mut self, phase: Phase) {
            self.phases.push(phase);
        }

        fn on_vector(&mut self, _label: &VectorLabel, _record: &EvaluationRecord) {
            self.vectors += 1;
        }

        fn on_failure(&mut self, failure: &RunFailure) {
            self.failures.push(failure.clone());
        }

        fn on_summary(&mut self, tally: &RunTally, distribution: &[(&str, f64)]) {
            self.summary = Some((*tally, distribution.len()));
        }
    }

    /// Divider that truncates instead of rounding when dividing by three.
    #[derive(Default)]
    struct TruncatingDivider {
        inner: Fp32DivComb,
        b: Option<u32>,
    }

    impl ArithmeticUnit for TruncatingDivider {
        fn set_inputs(&mut self, a: u32, b: Option<u32>) {
            self.b = b;
            self.inner.set_inputs(a, b);
        }
        fn evaluate(&mut self) {
            self.inner.evaluate();
        }
        fn result(&self) -> u32 {
            let y = self.inner.result();
            if self.b == Some(0x4040_0000) && y == 0x3eaa_aaab {
                y - 1
            } else {
                y
            }
        }
        fn exc_invalid(&self) -> bool {
            self.inner.exc_invalid()
        }
        fn exc_divzero(&self) -> bool {
            self.inner.exc_divzero()
        }
        fn exc_overflow(&self) -> bool {
            self.inner.exc_overflow()
        }
        fn exc_underflow(&self) -> bool {
            self.inner.exc_underflow()
        }
        fn exc_inexact(&self) -> bool {
            self.inner.exc_inexact()
        }
    }

    fn small_plan(operation: Operation) -> RunPlan {
        let mut plan = RunPlan::builtin(operation, 99);
        plan.sweep.subnormal_stride = 0x10_0001;
        plan.sweep.near_one_half_width = 16;
        plan.vector_count = 5_000;
        plan.progress_every = 1_000;
        plan
    }

    #[test]
    fn test_phases_run_in_order_and_tally() {
        let _ = env_logger::builder().is_test(true).try_init();
        let plan = small_plan(Operation::Divide);
        let corner_count = plan.corner_cases.len() as u64;
        let controller = RunController::new(plan);
        let mut reporter = RecordingReporter::default();
        let tally = controller
            .run(&mut Fp32DivComb::new(), &HostReference, &mut reporter)
            .unwrap();

        assert_eq!(
            reporter.phases,
            vec![
                Phase::CornerCases,
                Phase::SystematicSweep,
                Phase::StratifiedRandom,
                Phase::Report
            ]
        );
        // 9 subnormal operands (8 full strides plus the range end) times 5
        // divisors, then 33 near-one vectors.
        assert_eq!(
            tally,
            RunTally {
                corner_cases: corner_count,
                systematic: 9 * 5 + 33,
                random: 5_000,
            }
        );
        assert_eq!(reporter.vectors, tally.total());
        assert!(reporter.failures.is_empty());
        assert_eq!(reporter.summary, Some((tally, 14)));
    }

    #[test]
    fn test_sqrt_run_passes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let controller = RunController::new(small_plan(Operation::Sqrt));
        let tally = controller
            .run(&mut Fp32SqrtComb::new(), &HostReference, &mut SilentReporter)
            .unwrap();
        assert_eq!(tally.systematic, 9 + 33);
    }

    #[test]
    fn test_first_mismatch_aborts_run() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut plan = small_plan(Operation::Divide);
        plan.corner_cases = vec![
            CornerCase::new(TestVector::binary(0x3f80_0000, 0x3f80_0000), "1/1"),
            CornerCase::new(TestVector::binary(0x3f80_0000, 0x4040_0000), "1/3"),
            CornerCase::new(TestVector::binary(0x4000_0000, 0x4040_0000), "2/3"),
        ];
        let controller = RunController::new(plan);
        let mut reporter = RecordingReporter::default();
        let err = controller
            .run(&mut TruncatingDivider::default(), &HostReference, &mut reporter)
            .unwrap_err();

        let failure = match err {
            RunError::Mismatch(failure) => failure,
            RunError::Harness(e) => panic!("unexpected harness error: {}", e),
        };
        assert_eq!(failure.phase, Phase::CornerCases);
        assert_eq!(failure.label, VectorLabel::Corner(1));
        assert_eq!(failure.record.rtl_bits, 0x3eaa_aaaa);
        assert_eq!(reporter.vectors, 2);
        assert_eq!(reporter.phases, vec![Phase::CornerCases]);
        assert_eq!(reporter.failures.len(), 1);
        assert!(reporter.summary.is_none());
    }

    #[test]
    fn test_invalid_plan_is_a_harness_error() {
        let mut plan = small_plan(Operation::Sqrt);
        plan.corner_cases
            .push(CornerCase::new(TestVector::binary(0, 0), "binary vector for sqrt"));
        let err = RunController::new(plan)
            .run(&mut Fp32SqrtComb::new(), &HostReference, &mut SilentReporter)
            .unwrap_err();
        assert!(matches!(err, RunError::Harness(_)), "{}", err);

        let mut plan = small_plan(Operation::Divide);
        plan.sweep.subnormal_stride = 0;
        assert!(plan.validate().is_err());

        let mut plan = small_plan(Operation::Divide);
        plan.sweep.near_one_half_width = sweep::MAX_NEAR_ONE_HALF_WIDTH;
        assert!(plan.validate().is_ok());
        plan.sweep.near_one_half_width = sweep::MAX_NEAR_ONE_HALF_WIDTH + 1;
        let err = plan.validate().unwrap_err();
        assert!(err.0.contains("near-one half-width"), "{}", err);
        plan.sweep.near_one_half_width = 0x8000_0000;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_phase_next() {
        let mut phase = Phase::FIRST;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(format!("{}", seen[2]), "stratified random");
    }
}
