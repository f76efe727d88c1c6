use crate::common::error::W2nerError;
use crate::common::file_utils::read_json_lines;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A sentence pair of the AFQMC corpus, `label` is `"0"` or `"1"` and absent for test data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub sentence1: String,
    pub sentence2: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Loads all sentence pairs of the given newline-delimited JSON files, in file order.
pub fn read_pair_corpus<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PairRecord>, W2nerError> {
    read_json_lines(paths, |value: Value, location| {
        serde_json::from_value::<PairRecord>(value)
            .map(Some)
            .map_err(|e| W2nerError::ParseError(format!("{}: {}", location, e)))
    })
}
