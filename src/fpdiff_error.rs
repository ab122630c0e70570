// SPDX-License-Identifier: Apache-2.0

/// Harness-level error: bad configuration, malformed region tables, or a
/// vector whose arity does not match the operation under test.
///
/// Oracle mismatches are not errors of this kind; see `run::RunError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpdiffError(pub String);

impl FpdiffError {
    pub fn new(message: impl Into<String>) -> Self {
        FpdiffError(message.into())
    }
}

impl std::fmt::Display for FpdiffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fpdiff error: {}", self.0)
    }
}

impl std::error::Error for FpdiffError {}
