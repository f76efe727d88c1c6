use crate::common::error::W2nerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Dataset split being prepared
/// Selects the maximum sequence length and batch size, and whether reference labels are
/// collected for scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Train,
    Eval,
    Test,
}

impl FromStr for DataMode {
    type Err = W2nerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(DataMode::Train),
            "eval" | "dev" => Ok(DataMode::Eval),
            "test" => Ok(DataMode::Test),
            _ => Err(W2nerError::InvalidConfigurationError(format!(
                "unknown data mode {}, expected one of train, eval, test",
                s
            ))),
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataMode::Train => "train",
            DataMode::Eval => "eval",
            DataMode::Test => "test",
        };
        f.write_str(name)
    }
}
