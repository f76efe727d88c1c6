use crate::common::error::W2nerError;
use crate::common::mode::DataMode;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// # Data configuration for CoSENT sentence pairs
/// Defaults reproduce the AFQMC setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairDataConfig {
    pub train_file: Option<PathBuf>,
    pub eval_file: Option<PathBuf>,
    pub test_file: Option<PathBuf>,
    pub max_seq_length: usize,
    pub train_batch_size: usize,
    pub eval_batch_size: usize,
    pub test_batch_size: usize,
    pub do_lower_case: bool,
}

impl Config for PairDataConfig {}

impl Default for PairDataConfig {
    fn default() -> Self {
        PairDataConfig {
            train_file: None,
            eval_file: None,
            test_file: None,
            max_seq_length: 140,
            train_batch_size: 64,
            eval_batch_size: 2,
            test_batch_size: 2,
            do_lower_case: true,
        }
    }
}

impl PairDataConfig {
    pub fn validate(self) -> Result<Self, W2nerError> {
        if self.max_seq_length < 2 {
            return Err(W2nerError::InvalidConfigurationError(format!(
                "max sequence length must be at least 2, got {}",
                self.max_seq_length
            )));
        }
        for mode in [DataMode::Train, DataMode::Eval, DataMode::Test].iter() {
            if self.batch_size(*mode) == 0 {
                return Err(W2nerError::InvalidConfigurationError(format!(
                    "{} batch size must be positive",
                    mode
                )));
            }
        }
        Ok(self)
    }

    pub fn batch_size(&self, mode: DataMode) -> usize {
        match mode {
            DataMode::Train => self.train_batch_size,
            DataMode::Eval => self.eval_batch_size,
            DataMode::Test => self.test_batch_size,
        }
    }

    pub fn file(&self, mode: DataMode) -> Option<&Path> {
        match mode {
            DataMode::Train => self.train_file.as_deref(),
            DataMode::Eval => self.eval_file.as_deref(),
            DataMode::Test => self.test_file.as_deref(),
        }
    }
}
