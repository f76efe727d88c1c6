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
use crate::cosent::features::PairFeatures;
use tch::{Device, Kind, Tensor};

/// # Batch of sentence pairs
/// Each side is trimmed to its own longest unpadded sequence.
#[derive(Debug)]
pub struct PairBatch {
    /// Shape (*batch size*)
    pub labels: Tensor,
    /// Shape (*batch size*, *sequence_length*)
    pub input_ids: Tensor,
    /// Shape (*batch size*, *sequence_length*)
    pub attention_mask: Tensor,
    /// Shape (*batch size*, *sequence_length_2*)
    pub input_ids_2: Tensor,
    /// Shape (*batch size*, *sequence_length_2*)
    pub attention_mask_2: Tensor,
}

impl PairBatch {
    /// Named tensors for `Tensor::save_multi`, keys prefixed with `prefix.`.
    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{}.labels", prefix), self.labels.shallow_clone()),
            (format!("{}.input_ids", prefix), self.input_ids.shallow_clone()),
            (
                format!("{}.attention_mask", prefix),
                self.attention_mask.shallow_clone(),
            ),
            (format!("{}.input_ids_2", prefix), self.input_ids_2.shallow_clone()),
            (
                format!("{}.attention_mask_2", prefix),
                self.attention_mask_2.shallow_clone(),
            ),
        ]
    }
}

fn stack_side<'a, I>(sequences: I, length: i64) -> Tensor
where
    I: Iterator<Item = &'a Vec<i64>>,
{
    let tensors = sequences
        .map(|sequence| Tensor::from_slice(sequence.as_slice()))
        .collect::<Vec<_>>();
    Tensor::stack(&tensors, 0).narrow(1, 0, length)
}

/// Stacks sentence pairs into a batch. The first and second sentences are trimmed independently.
pub fn collate_pairs(features: &[PairFeatures], device: Device) -> Result<PairBatch, W2nerError> {
    let padded_length = match features.first() {
        Some(first) => first.input_ids.len(),
        None => {
            return Err(W2nerError::ValueError(
                "cannot collate an empty batch".to_string(),
            ));
        }
    };
    if features
        .iter()
        .any(|f| f.input_ids.len() != padded_length || f.input_ids_2.len() != padded_length)
    {
        return Err(W2nerError::ValueError(format!(
            "all sentences of a batch must be padded to {} tokens",
            padded_length
        )));
    }

    let length = features.iter().map(|f| f.seqlen).max().unwrap_or(0) as i64;
    let length_2 = features.iter().map(|f| f.seqlen_2).max().unwrap_or(0) as i64;
    let labels: Vec<i64> = features.iter().map(|f| f.labels).collect();

    Ok(PairBatch {
        labels: Tensor::from_slice(&labels).to_device(device),
        input_ids: stack_side(features.iter().map(|f| &f.input_ids), length).to_device(device),
        attention_mask: stack_side(features.iter().map(|f| &f.attention_mask), length)
            .to_device(device),
        input_ids_2: stack_side(features.iter().map(|f| &f.input_ids_2), length_2)
            .to_device(device),
        attention_mask_2: stack_side(features.iter().map(|f| &f.attention_mask_2), length_2)
            .to_device(device),
    })
}

/// Concatenates the sentence embeddings of both sides and reorders the rows for the CoSENT loss:
/// row `k` moves to position `index[k]`, with `index` the even row numbers followed by the odd
/// ones.
///
/// # Arguments
///
/// * `logits1` - embeddings of the first sentences, shape (*batch size*, *hidden size*)
/// * `logits2` - embeddings of the second sentences, shape (*batch size*, *hidden size*)
///
/// # Returns
///
/// * Tensor of shape (*batch size*, 2 x *hidden size*)
pub fn interleave_pair_rows(logits1: &Tensor, logits2: &Tensor) -> Result<Tensor, W2nerError> {
    let (size1, size2) = (logits1.size(), logits2.size());
    if size1.len() != 2 || size2.len() != 2 || size1[0] != size2[0] {
        return Err(W2nerError::ValueError(format!(
            "expected two 2D tensors with the same batch size, got {:?} and {:?}",
            size1, size2
        )));
    }
    let batch_size = size1[0];
    let pairs = Tensor::cat(&[logits1, logits2], 1);
    let rows = Tensor::arange(batch_size, (Kind::Int64, pairs.device()));
    let index = Tensor::cat(
        &[
            rows.slice(0, 0, batch_size, 2),
            rows.slice(0, 1, batch_size, 2),
        ],
        0,
    )
    .unsqueeze(1)
    .expand_as(&pairs);
    Ok(pairs.zeros_like().scatter(0, &index, &pairs))
}
