// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Sentence to grid features
//!
//! Sentences are tokenized one character per token (the CLUENER offsets are character offsets),
//! each character looked up in a BERT WordPiece vocabulary.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use rust_w2ner::resources::LocalResource;
//! use rust_w2ner::w2ner::{read_ner_corpus, EvalLabels, LabelVocabulary, W2nerPreprocessor};
//! use rust_w2ner::DataMode;
//! use std::path::PathBuf;
//!
//! let vocab = LocalResource::from(PathBuf::from("path/to/vocab.txt"));
//! let preprocessor = W2nerPreprocessor::from_vocab_resource(&vocab, LabelVocabulary::cluener(), false)?;
//!
//! let records = read_ner_corpus(&["path/to/dev.json"])?;
//! let mut eval_labels = EvalLabels::new();
//! let features = preprocessor.process_all(&records, 120, DataMode::Eval, &mut eval_labels)?;
//! # Ok(())
//! # }
//! ```

use crate::common::error::W2nerError;
use crate::common::mode::DataMode;
use crate::common::tokenizer::{load_bert_tokenizer, special_token_ids, SpecialTokenIds};
use crate::resources::ResourceProvider;
use crate::w2ner::corpus::NerRecord;
use crate::w2ner::grid::{GridFeatures, GridLabelBuilder, LabeledSpan};
use crate::w2ner::labels::LabelVocabulary;
use rust_tokenizers::tokenizer::{BertTokenizer, Tokenizer};

/// Number of evaluation examples echoed to the log at the start of a pass.
const LOGGED_EVAL_EXAMPLES: usize = 3;

/// # Reference spans collected while preparing evaluation data
/// Owned by the caller of the preprocessing pass; read back when scoring predictions.
#[derive(Debug, Clone, Default)]
pub struct EvalLabels {
    processed: usize,
    labels: Vec<Vec<LabeledSpan>>,
}

impl EvalLabels {
    pub fn new() -> EvalLabels {
        EvalLabels::default()
    }

    /// Resets the per-pass example counter. Collected labels are kept.
    pub fn start_pass(&mut self) {
        self.processed = 0;
    }

    /// Index of the example about to be processed in the current pass.
    pub fn next_index(&mut self) -> usize {
        let index = self.processed;
        self.processed += 1;
        index
    }

    pub fn push(&mut self, spans: Vec<LabeledSpan>) {
        self.labels.push(spans);
    }

    pub fn labels(&self) -> &[Vec<LabeledSpan>] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<Vec<LabeledSpan>> {
        self.labels
    }

    /// Reference spans of the `batch_index`-th batch of `batch_size` examples.
    pub fn batch(&self, batch_index: usize, batch_size: usize) -> &[Vec<LabeledSpan>] {
        let start = (batch_index * batch_size).min(self.labels.len());
        let end = (start + batch_size).min(self.labels.len());
        &self.labels[start..end]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// # Converts CLUENER records into padded grid features
pub struct W2nerPreprocessor {
    tokenizer: BertTokenizer,
    label_vocabulary: LabelVocabulary,
    special_tokens: SpecialTokenIds,
    do_lower_case: bool,
}

impl W2nerPreprocessor {
    /// Creates a preprocessor from an existing tokenizer.
    ///
    /// # Arguments
    ///
    /// * `tokenizer` - WordPiece tokenizer whose vocabulary contains `[CLS]`, `[SEP]` and `[PAD]`
    /// * `label_vocabulary` - entity types
    /// * `do_lower_case` - lower case sentences before the vocabulary lookup
    pub fn new(
        tokenizer: BertTokenizer,
        label_vocabulary: LabelVocabulary,
        do_lower_case: bool,
    ) -> Result<W2nerPreprocessor, W2nerError> {
        let special_tokens = special_token_ids(&tokenizer)?;
        Ok(W2nerPreprocessor {
            tokenizer,
            label_vocabulary,
            special_tokens,
            do_lower_case,
        })
    }

    pub fn from_vocab_resource(
        vocab_resource: &dyn ResourceProvider,
        label_vocabulary: LabelVocabulary,
        do_lower_case: bool,
    ) -> Result<W2nerPreprocessor, W2nerError> {
        let tokenizer = load_bert_tokenizer(vocab_resource, false)?;
        W2nerPreprocessor::new(tokenizer, label_vocabulary, do_lower_case)
    }

    pub fn label_vocabulary(&self) -> &LabelVocabulary {
        &self.label_vocabulary
    }

    pub fn special_tokens(&self) -> SpecialTokenIds {
        self.special_tokens
    }

    /// Character-level token ids, without boundary tokens. Unknown characters map to `[UNK]`.
    pub fn tokenize(&self, text: &str) -> Vec<i64> {
        let text = if self.do_lower_case {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<String> = text.chars().map(|c| c.to_string()).collect();
        self.tokenizer.convert_tokens_to_ids(&tokens)
    }

    /// Grid builder for sequences padded to `max_seq_length`.
    pub fn grid_builder(&self, max_seq_length: usize) -> Result<GridLabelBuilder, W2nerError> {
        GridLabelBuilder::new(
            max_seq_length,
            self.special_tokens.cls,
            self.special_tokens.sep,
            self.special_tokens.pad,
        )
    }

    /// Processes a single record.
    ///
    /// In `DataMode::Eval`, the record's spans (original offsets, before truncation) are appended
    /// to `eval_labels`, and the first examples of the pass are logged.
    pub fn process(
        &self,
        record: &NerRecord,
        builder: &GridLabelBuilder,
        mode: DataMode,
        eval_labels: &mut EvalLabels,
    ) -> Result<GridFeatures, W2nerError> {
        let index = eval_labels.next_index();
        let spans = record.labeled_spans(&self.label_vocabulary)?;
        let token_ids = self.tokenize(&record.text);
        let features = builder.build(&token_ids, spans.as_deref())?;

        if mode == DataMode::Eval {
            if index < LOGGED_EVAL_EXAMPLES {
                tracing::info!(
                    index,
                    text = record.text.as_str(),
                    entities = ?record.entities,
                    "evaluation example"
                );
            }
            eval_labels.push(spans.unwrap_or_default());
        }
        Ok(features)
    }

    /// Processes all records of a dataset pass, in order.
    pub fn process_all(
        &self,
        records: &[NerRecord],
        max_seq_length: usize,
        mode: DataMode,
        eval_labels: &mut EvalLabels,
    ) -> Result<Vec<GridFeatures>, W2nerError> {
        let builder = self.grid_builder(max_seq_length)?;
        eval_labels.start_pass();
        let features = records
            .iter()
            .map(|record| self.process(record, &builder, mode, eval_labels))
            .collect::<Result<Vec<_>, W2nerError>>()?;
        tracing::debug!(
            examples = features.len(),
            %mode,
            max_seq_length,
            "prepared grid features"
        );
        Ok(features)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_eval_labels_batches() {
        let mut eval_labels = EvalLabels::new();
        for start in 0..5 {
            eval_labels.push(vec![LabeledSpan::new(0, start, start)]);
        }

        assert_eq!(eval_labels.batch(0, 2).len(), 2);
        assert_eq!(eval_labels.batch(2, 2), &[vec![LabeledSpan::new(0, 4, 4)]]);
        assert!(eval_labels.batch(3, 2).is_empty());
    }

    #[test]
    fn test_pass_counter_resets() {
        let mut eval_labels = EvalLabels::new();
        assert_eq!(eval_labels.next_index(), 0);
        assert_eq!(eval_labels.next_index(), 1);
        eval_labels.start_pass();
        assert_eq!(eval_labels.next_index(), 0);
    }
}
