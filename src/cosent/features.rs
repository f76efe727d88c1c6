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

use crate::common::error::W2nerError;
use crate::common::tokenizer::{load_bert_tokenizer, special_token_ids};
use crate::cosent::corpus::PairRecord;
use crate::resources::ResourceProvider;
use crate::w2ner::LabelVocabulary;
use rust_tokenizers::tokenizer::{BertTokenizer, Tokenizer, TruncationStrategy};

/// Similarity classes of the AFQMC corpus.
pub const PAIR_LABELS: [&str; 2] = ["0", "1"];

/// # Model inputs for a sentence pair
/// Both sides are padded to the same `max_seq_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFeatures {
    /// Training target, `1 - label_id`, 0 for unlabeled pairs
    pub labels: i64,
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub seqlen: usize,
    pub input_ids_2: Vec<i64>,
    pub attention_mask_2: Vec<i64>,
    pub seqlen_2: usize,
}

/// # Encodes AFQMC sentence pairs for CoSENT training
pub struct PairPreprocessor {
    tokenizer: BertTokenizer,
    label_vocabulary: LabelVocabulary,
    pad_token_id: i64,
}

impl PairPreprocessor {
    pub fn new(tokenizer: BertTokenizer) -> Result<PairPreprocessor, W2nerError> {
        let pad_token_id = special_token_ids(&tokenizer)?.pad;
        Ok(PairPreprocessor {
            tokenizer,
            label_vocabulary: LabelVocabulary::from_labels(PAIR_LABELS.iter())?,
            pad_token_id,
        })
    }

    pub fn from_vocab_resource(
        vocab_resource: &dyn ResourceProvider,
        lower_case: bool,
    ) -> Result<PairPreprocessor, W2nerError> {
        PairPreprocessor::new(load_bert_tokenizer(vocab_resource, lower_case)?)
    }

    /// Token ids with `[CLS]`/`[SEP]`, truncated and padded to `max_seq_length`, the attention
    /// mask and the unpadded length.
    pub fn encode_padded(&self, sentence: &str, max_seq_length: usize) -> (Vec<i64>, Vec<i64>, usize) {
        let tokenized = self.tokenizer.encode(
            sentence,
            None,
            max_seq_length,
            &TruncationStrategy::LongestFirst,
            0,
        );
        let mut input_ids = tokenized.token_ids;
        input_ids.truncate(max_seq_length);
        let seqlen = input_ids.len();
        let mut attention_mask = vec![1i64; seqlen];
        input_ids.resize(max_seq_length, self.pad_token_id);
        attention_mask.resize(max_seq_length, 0);
        (input_ids, attention_mask, seqlen)
    }

    pub fn process(
        &self,
        record: &PairRecord,
        max_seq_length: usize,
    ) -> Result<PairFeatures, W2nerError> {
        if max_seq_length < 2 {
            return Err(W2nerError::InvalidConfigurationError(format!(
                "max_seq_length must leave room for the special tokens, got {}",
                max_seq_length
            )));
        }
        let labels = match &record.label {
            Some(label) => 1 - self.label_vocabulary.id(label)?,
            None => 0,
        };
        let (input_ids, attention_mask, seqlen) =
            self.encode_padded(&record.sentence1, max_seq_length);
        let (input_ids_2, attention_mask_2, seqlen_2) =
            self.encode_padded(&record.sentence2, max_seq_length);
        Ok(PairFeatures {
            labels,
            input_ids,
            attention_mask,
            seqlen,
            input_ids_2,
            attention_mask_2,
            seqlen_2,
        })
    }

    pub fn process_all(
        &self,
        records: &[PairRecord],
        max_seq_length: usize,
    ) -> Result<Vec<PairFeatures>, W2nerError> {
        records
            .iter()
            .map(|record| self.process(record, max_seq_length))
            .collect()
    }
}
