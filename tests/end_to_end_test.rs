// SPDX-License-Identifier: Apache-2.0

use fpdiff::{
    corner_cases, ArithmeticUnit, CornerCase, EquivalencePolicy, ExceptionFlags, Fp32DivComb,
    Fp32SqrtComb, HostReference, Operation, Phase, ReferenceModel, Reporter, RunController,
    RunError, RunFailure, RunPlan, RunTally, TestVector, VectorLabel,
};
use pretty_assertions::assert_eq;

/// Divider whose divide-by-zero output is stuck low.
#[derive(Default)]
struct NoDivZeroFlag(Fp32DivComb);

impl ArithmeticUnit for NoDivZeroFlag {
    fn set_inputs(&mut self, a: u32, b: Option<u32>) {
        self.0.set_inputs(a, b);
    }
    fn evaluate(&mut self) {
        self.0.evaluate();
    }
    fn result(&self) -> u32 {
        self.0.result()
    }
    fn exc_invalid(&self) -> bool {
        self.0.exc_invalid()
    }
    fn exc_divzero(&self) -> bool {
        false
    }
    fn exc_overflow(&self) -> bool {
        self.0.exc_overflow()
    }
    fn exc_underflow(&self) -> bool {
        self.0.exc_underflow()
    }
    fn exc_inexact(&self) -> bool {
        self.0.exc_inexact()
    }
}

/// Square-root unit that answers NaNs with a non-canonical payload.
#[derive(Default)]
struct NegativeNanSqrt(Fp32SqrtComb);

impl ArithmeticUnit for NegativeNanSqrt {
    fn set_inputs(&mut self, a: u32, b: Option<u32>) {
        self.0.set_inputs(a, b);
    }
    fn evaluate(&mut self) {
        self.0.evaluate();
    }
    fn result(&self) -> u32 {
        let y = self.0.result();
        if fpdiff::fp32::is_nan(y) {
            0xffc0_0001
        } else {
            y
        }
    }
    fn exc_invalid(&self) -> bool {
        self.0.exc_invalid()
    }
    fn exc_divzero(&self) -> bool {
        self.0.exc_divzero()
    }
    fn exc_overflow(&self) -> bool {
        self.0.exc_overflow()
    }
    fn exc_underflow(&self) -> bool {
        self.0.exc_underflow()
    }
    fn exc_inexact(&self) -> bool {
        self.0.exc_inexact()
    }
}

/// Divider that saturates infinities to the largest finite magnitude while
/// still raising the right flags.
#[derive(Default)]
struct SaturatingDivider(Fp32DivComb);

impl ArithmeticUnit for SaturatingDivider {
    fn set_inputs(&mut self, a: u32, b: Option<u32>) {
        self.0.set_inputs(a, b);
    }
    fn evaluate(&mut self) {
        self.0.evaluate();
    }
    fn result(&self) -> u32 {
        let y = self.0.result();
        if fpdiff::fp32::is_infinite(y) {
            y - 1
        } else {
            y
        }
    }
    fn exc_invalid(&self) -> bool {
        self.0.exc_invalid()
    }
    fn exc_divzero(&self) -> bool {
        self.0.exc_divzero()
    }
    fn exc_overflow(&self) -> bool {
        self.0.exc_overflow()
    }
    fn exc_underflow(&self) -> bool {
        self.0.exc_underflow()
    }
    fn exc_inexact(&self) -> bool {
        self.0.exc_inexact()
    }
}

#[derive(Default)]
struct Collect {
    lines: Vec<String>,
    failure: Option<RunFailure>,
    tally: Option<RunTally>,
}

impl Reporter for Collect {
    fn on_vector(&mut self, label: &VectorLabel, record: &fpdiff::EvaluationRecord) {
        self.lines.push(record.diagnostic(label));
    }

    fn on_failure(&mut self, failure: &RunFailure) {
        self.failure = Some(failure.clone());
    }

    fn on_summary(&mut self, tally: &RunTally, _distribution: &[(&str, f64)]) {
        self.tally = Some(*tally);
    }
}

/// A plan that runs only the given corner cases.
fn corner_only(operation: Operation, cases: Vec<CornerCase>) -> RunPlan {
    let mut plan = RunPlan::builtin(operation, 0);
    plan.corner_cases = cases;
    plan.sweep.subnormal_stride = u32::MAX;
    plan.sweep.divisors = vec![0x3f80_0000];
    plan.sweep.near_one_half_width = 0;
    plan.vector_count = 0;
    plan
}

#[test]
fn test_one_third_passes_strictly() {
    let _ = env_logger::builder().is_test(true).try_init();
    let plan = corner_only(
        Operation::Divide,
        vec![CornerCase::new(TestVector::binary(0x3f80_0000, 0x4040_0000), "1/3")],
    );
    let mut reporter = Collect::default();
    let tally = RunController::new(plan)
        .run(&mut Fp32DivComb::new(), &HostReference, &mut reporter)
        .unwrap();
    assert_eq!(tally.corner_cases, 1);
    assert!(reporter.lines[0].contains("RTL=0.33333334(0x3eaaaaab)"));
    assert!(reporter.lines[0].contains("ulp_diff=0 PASS |FLAG=PASS RTL_flags=0x01 Ref_flags=0x01"));
}

#[test]
fn test_missing_divide_by_zero_flag_aborts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let plan = corner_only(
        Operation::Divide,
        vec![
            CornerCase::new(TestVector::binary(0x4000_0000, 0x3f80_0000), "2/1"),
            CornerCase::new(TestVector::binary(0x3f80_0000, 0x0000_0000), "1/0"),
            CornerCase::new(TestVector::binary(0x3f80_0000, 0x3f80_0000), "1/1"),
        ],
    );
    let mut reporter = Collect::default();
    let err = RunController::new(plan)
        .run(&mut NoDivZeroFlag::default(), &HostReference, &mut reporter)
        .unwrap_err();
    let failure = match err {
        RunError::Mismatch(failure) => failure,
        RunError::Harness(e) => panic!("unexpected harness error: {}", e),
    };
    assert_eq!(failure.phase, Phase::CornerCases);
    assert_eq!(failure.label, VectorLabel::Corner(1));
    assert!(failure.record.value_pass);
    assert!(!failure.record.flag_pass);
    assert_eq!(failure.record.missing_flags(), ExceptionFlags::DIVIDE_BY_ZERO);
    assert_eq!(reporter.lines.len(), 2);
    assert!(reporter.tally.is_none());
    let line = failure.record.diagnostic(&failure.label);
    assert!(line.contains("missing=[divzero] extra=[]"), "{}", line);
}

#[test]
fn test_finite_result_for_one_over_zero_aborts_even_when_tolerant() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut plan = corner_only(
        Operation::Divide,
        vec![
            CornerCase::new(TestVector::binary(0x4000_0000, 0x3f80_0000), "2/1"),
            CornerCase::new(TestVector::binary(0x3f80_0000, 0x0000_0000), "1/0"),
        ],
    );
    plan.policy = EquivalencePolicy::tolerant(1);
    let mut reporter = Collect::default();
    let err = RunController::new(plan)
        .run(&mut SaturatingDivider::default(), &HostReference, &mut reporter)
        .unwrap_err();
    let failure = match err {
        RunError::Mismatch(failure) => failure,
        RunError::Harness(e) => panic!("unexpected harness error: {}", e),
    };
    assert_eq!(failure.label, VectorLabel::Corner(1));
    assert_eq!(failure.record.rtl_bits, 0x7f7f_ffff);
    assert_eq!(failure.record.ulp_diff, 1);
    assert!(failure.record.flag_pass);
    assert!(!failure.record.value_pass);
}

#[test]
fn test_sqrt_of_negative_accepts_any_nan() {
    let _ = env_logger::builder().is_test(true).try_init();
    let plan = corner_only(
        Operation::Sqrt,
        vec![
            CornerCase::new(TestVector::unary(0xbf80_0000), "sqrt(-1)"),
            CornerCase::new(TestVector::unary(0x7fa0_0000), "sqrt(sNaN)"),
        ],
    );
    let mut reporter = Collect::default();
    let tally = RunController::new(plan)
        .run(&mut NegativeNanSqrt::default(), &HostReference, &mut reporter)
        .unwrap();
    assert_eq!(tally.corner_cases, 2);
    assert_eq!(reporter.tally, Some(tally));
}

#[test]
fn test_bundled_models_pass_full_catalogs() {
    for operation in [Operation::Divide, Operation::Sqrt] {
        let cases = corner_cases::catalog(operation);
        let count = cases.len() as u64;
        let plan = corner_only(operation, cases);
        let controller = RunController::new(plan);
        let mut reporter = Collect::default();
        let tally = match operation {
            Operation::Divide => {
                controller.run(&mut Fp32DivComb::new(), &HostReference, &mut reporter)
            }
            Operation::Sqrt => {
                controller.run(&mut Fp32SqrtComb::new(), &HostReference, &mut reporter)
            }
        }
        .unwrap_or_else(|e| panic!("{}: {}", operation, e));
        assert_eq!(tally.corner_cases, count);
    }
}

#[test]
fn test_default_sweeps_and_random_phase_pass() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut plan = RunPlan::builtin(Operation::Divide, 2024);
    plan.vector_count = 20_000;
    let tally = RunController::new(plan)
        .run(&mut Fp32DivComb::new(), &HostReference, &mut fpdiff::run::SilentReporter)
        .unwrap();
    // 1922 subnormal operands times 5 divisors, then the 2 * 0x8000 + 1
    // near-one window.
    assert_eq!(tally.systematic, 1922 * 5 + 0x1_0001);
    assert_eq!(tally.random, 20_000);
}

#[test]
fn test_reference_divides_self_to_one() {
    for bits in [0x0000_0001u32, 0x0080_0000, 0x3f80_0001, 0x7f7f_ffff, 0xc2f6_e979] {
        assert_eq!(HostReference.divide(bits, bits), (0x3f80_0000, ExceptionFlags::NONE));
    }
}
