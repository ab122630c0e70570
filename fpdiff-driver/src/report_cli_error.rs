// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;

/// Prints `message` in bold red with one indented line per detail and exits
/// with status 1.
pub fn report_cli_error_and_exit(
    message: &str,
    context: Option<&str>,
    details: Vec<(&str, String)>,
) -> ! {
    let context_str = match context {
        Some(context) => format!("{}: ", context),
        None => String::new(),
    };
    eprintln!("fpdiff-driver: {}{}", context_str, message.red().bold());
    for (key, value) in details {
        eprintln!("  {}: {}", key, value);
    }
    std::process::exit(1);
}
