// SPDX-License-Identifier: Apache-2.0

use crate::fpdiff_error::FpdiffError;
use serde::Deserialize;

/// The arithmetic operation implemented by the unit under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Divide,
    Sqrt,
}

impl Operation {
    /// Number of operands the unit consumes.
    pub fn arity(self) -> usize {
        match self {
            Operation::Divide => 2,
            Operation::Sqrt => 1,
        }
    }

    pub fn is_binary(self) -> bool {
        self.arity() == 2
    }

    /// Human-readable title used in report banners.
    pub fn title(self) -> &'static str {
        match self {
            Operation::Divide => "Divider",
            Operation::Sqrt => "Square Root",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Divide => write!(f, "div"),
            Operation::Sqrt => write!(f, "sqrt"),
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = FpdiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "div" | "divide" => Ok(Operation::Divide),
            "sqrt" => Ok(Operation::Sqrt),
            _ => Err(FpdiffError::new(format!(
                "unknown operation {:?}; expected \"div\" or \"sqrt\"",
                s
            ))),
        }
    }
}
