// SPDX-License-Identifier: Apache-2.0

mod report_cli_error;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use fpdiff::{
    ConsoleReporter, Fp32DivComb, Fp32SqrtComb, HostReference, Operation, OracleConfig,
    RunController, RunError,
};

use crate::report_cli_error::report_cli_error_and_exit;

/// Differential test of a combinational FP32 divider or square-root unit
/// against a software reference. Exits 0 when every vector passes and 1 on
/// the first mismatch.
#[derive(Debug, Parser)]
#[command(name = "fpdiff-driver")]
struct Args {
    /// Print the diagnostic line for passing vectors too. Failures are always
    /// printed.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Unit to test: "div" or "sqrt". Overrides the config file; defaults to
    /// "div".
    #[arg(long)]
    op: Option<Operation>,

    /// TOML run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of stratified random vectors. Overrides the config file.
    #[arg(long)]
    vectors: Option<u64>,

    /// Seed for the random phase. Overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let _ = env_logger::try_init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => report_cli_error_and_exit(e.to_string().trim_end(), None, vec![]),
        },
    };

    let mut config = match &args.config {
        Some(path) => OracleConfig::from_path(path).unwrap_or_else(|e| {
            report_cli_error_and_exit(&e.0, None, vec![("config", path.display().to_string())])
        }),
        None => OracleConfig::default(),
    };
    if args.op.is_some() {
        config.operation = args.op;
    }
    if args.vectors.is_some() {
        config.vector_count = args.vectors;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let operation = config.operation();
    let plan = config
        .plan()
        .unwrap_or_else(|e| report_cli_error_and_exit(&e.0, Some(&operation.to_string()), vec![]));
    let controller = RunController::new(plan);
    let reference = HostReference::new();
    let mut reporter = ConsoleReporter::stdout(args.verbose);

    let result = match operation {
        Operation::Divide => controller.run(&mut Fp32DivComb::new(), &reference, &mut reporter),
        Operation::Sqrt => controller.run(&mut Fp32SqrtComb::new(), &reference, &mut reporter),
    };
    if let Some(e) = reporter.take_error() {
        log::error!("{}", e);
    }

    match result {
        Ok(tally) => {
            log::info!("all {} vectors passed", tally.total());
        }
        Err(RunError::Mismatch(failure)) => {
            let record = &failure.record;
            report_cli_error_and_exit(
                "mismatch against reference",
                Some(&operation.to_string()),
                vec![
                    ("phase", failure.phase.to_string()),
                    ("vector", format!("[{}] {}", failure.label, record.vector)),
                    (
                        "rtl",
                        format!("0x{:08x} flags {}", record.rtl_bits, record.rtl_flags),
                    ),
                    (
                        "reference",
                        format!("0x{:08x} flags {}", record.ref_bits, record.ref_flags),
                    ),
                    ("seed", controller.plan().sampler.seed.to_string()),
                ],
            );
        }
        Err(RunError::Harness(e)) => {
            report_cli_error_and_exit(&e.0, Some(&operation.to_string()), vec![]);
        }
    }
}
