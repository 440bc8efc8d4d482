// purchase_flow/src/core/phase.rs

use std::fmt;
use std::str::FromStr;

use crate::error::FlowError;

/// A named stage of processing. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
  Validate,
  Prepare,
  Commit,
}

impl Phase {
  pub const ALL: [Phase; 3] = [Phase::Validate, Phase::Prepare, Phase::Commit];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Phase::Validate => "validate",
      Phase::Prepare => "prepare",
      Phase::Commit => "commit",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Phase {
  type Err = FlowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Phase::ALL
      .into_iter()
      .find(|phase| phase.as_str() == s)
      .ok_or_else(|| FlowError::Configuration(format!("Unknown phase '{}'", s)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phase_parses_its_own_name() {
    for phase in Phase::ALL {
      assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
    }
    assert!("checkout".parse::<Phase>().is_err());
  }
}
