// SPDX-License-Identifier: Apache-2.0

//! Human-readable run report.

use std::io::Write;

use crate::oracle::EvaluationRecord;
use crate::run::{Phase, Reporter, RunFailure, RunPlan, RunTally};
use crate::vector::VectorLabel;

const RULE: &str = "=======================================================";

/// Writes banners, per-vector diagnostics, and the closing summary to `W`.
///
/// Diagnostics for passing vectors are written only in verbose mode; the
/// failing vector is always written. The first write error is kept and
/// later output is dropped, see `take_error`.
pub struct ConsoleReporter<W: Write> {
    writer: W,
    verbose: bool,
    write_error: Option<String>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        ConsoleReporter::new(std::io::stdout(), verbose)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W, verbose: bool) -> Self {
        ConsoleReporter {
            writer,
            verbose,
            write_error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.write_error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, text: &str) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{}", text) {
            self.write_error = Some(format!("Failed to write report: {}", e));
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_start(&mut self, plan: &RunPlan) {
        self.line(&format!(
            "=== IEEE-754 FP32 Combinational {} Test Suite ===",
            plan.operation.title()
        ));
        self.line(&format!("Target test vectors: {}", plan.vector_count));
        self.line(&format!("Seed: {}", plan.sampler.seed));
        self.line(&format!(
            "Verbose mode: {}",
            if self.verbose { "ON" } else { "OFF" }
        ));
        self.line(RULE);
    }

    fn on_phase_start(&mut self, phase: Phase) {
        match phase {
            Phase::SystematicSweep => self.line("=== Systematic boundary testing ==="),
            Phase::StratifiedRandom => self.line("=== Stratified random testing ==="),
            Phase::CornerCases | Phase::Report => {}
        }
    }

    fn on_vector(&mut self, label: &VectorLabel, record: &EvaluationRecord) {
        if self.verbose && record.passed() {
            self.line(&record.diagnostic(label));
        }
    }

    fn on_phase_done(&mut self, phase: Phase, tally: &RunTally) {
        match phase {
            Phase::CornerCases => self.line("=== Corner-case tests done ==="),
            Phase::SystematicSweep => {
                self.line(&format!("Systematic tests completed: {}", tally.systematic))
            }
            Phase::StratifiedRandom | Phase::Report => {}
        }
    }

    fn on_failure(&mut self, failure: &RunFailure) {
        self.line(&failure.record.diagnostic(&failure.label));
        self.line(&format!(
            "[{} FAIL] aborting {} phase on first mismatch",
            failure.label, failure.phase
        ));
    }

    fn on_summary(&mut self, tally: &RunTally, distribution: &[(&str, f64)]) {
        self.line("");
        self.line("=== Test Coverage Summary ===");
        self.line(&format!("Corner cases: {}", tally.corner_cases));
        self.line(&format!("Systematic tests: {}", tally.systematic));
        self.line(&format!("Stratified random tests: {}", tally.random));
        self.line(&format!("Total test vectors: {}", tally.total()));
        self.line("");
        self.line("=== Random Test Distribution ===");
        for (label, percent) in distribution {
            self.line(&format!("{}: {:.1}%", label, percent));
        }
    }
}
