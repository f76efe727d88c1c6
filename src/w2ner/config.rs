use crate::common::error::W2nerError;
use crate::common::mode::DataMode;
use crate::w2ner::labels::LabelVocabulary;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// # Data configuration for the W2NER task
/// Defaults reproduce the CLUENER setup: character tokens, sequences of 90 tokens for training
/// and 120 for evaluation and test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct W2nerDataConfig {
    pub train_file: Option<PathBuf>,
    pub eval_file: Option<PathBuf>,
    pub test_file: Option<PathBuf>,
    pub train_max_seq_length: usize,
    pub eval_max_seq_length: usize,
    pub test_max_seq_length: usize,
    pub train_batch_size: usize,
    pub eval_batch_size: usize,
    pub test_batch_size: usize,
    pub do_lower_case: bool,
    /// Entity types, CLUENER types when absent
    pub labels: Option<Vec<String>>,
}

impl Config for W2nerDataConfig {}

impl Default for W2nerDataConfig {
    fn default() -> Self {
        W2nerDataConfig {
            train_file: None,
            eval_file: None,
            test_file: None,
            train_max_seq_length: 90,
            eval_max_seq_length: 120,
            test_max_seq_length: 120,
            train_batch_size: 40,
            eval_batch_size: 2,
            test_batch_size: 1,
            do_lower_case: false,
            labels: None,
        }
    }
}

impl W2nerDataConfig {
    pub fn validate(self) -> Result<Self, W2nerError> {
        for mode in [DataMode::Train, DataMode::Eval, DataMode::Test].iter() {
            if self.max_seq_length(*mode) < 2 {
                return Err(W2nerError::InvalidConfigurationError(format!(
                    "{} max sequence length must be at least 2, got {}",
                    mode,
                    self.max_seq_length(*mode)
                )));
            }
            if self.batch_size(*mode) == 0 {
                return Err(W2nerError::InvalidConfigurationError(format!(
                    "{} batch size must be positive",
                    mode
                )));
            }
        }
        Ok(self)
    }

    pub fn max_seq_length(&self, mode: DataMode) -> usize {
        match mode {
            DataMode::Train => self.train_max_seq_length,
            DataMode::Eval => self.eval_max_seq_length,
            DataMode::Test => self.test_max_seq_length,
        }
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

    pub fn label_vocabulary(&self) -> Result<LabelVocabulary, W2nerError> {
        match &self.labels {
            Some(labels) => LabelVocabulary::from_labels(labels),
            None => Ok(LabelVocabulary::cluener()),
        }
    }
}
