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
use crate::w2ner::grid::{GridFeatures, SquareGrid};
use tch::kind::Element;
use tch::{Device, Tensor};

/// # Batch of grid features
/// Sequences are trimmed to the longest unpadded sequence of the batch.
#[derive(Debug)]
pub struct GridBatch {
    /// Shape (*batch size*, *sequence_length*)
    pub input_ids: Tensor,
    /// Shape (*batch size*, *sequence_length*)
    pub attention_mask: Tensor,
    /// Shape (*batch size*, *sequence_length*, *sequence_length*)
    pub labels: Tensor,
    /// Shape (*batch size*, *sequence_length*, *sequence_length*), boolean
    pub pieces2word: Tensor,
    /// Shape (*batch size*, *sequence_length*, *sequence_length*)
    pub dist_inputs: Tensor,
    /// Shape (*batch size*, *sequence_length*, *sequence_length*), boolean
    pub grid_mask2d: Tensor,
    /// Shape (*batch size*)
    pub seqlens: Tensor,
}

impl GridBatch {
    /// Sequence length of the batch after trimming.
    pub fn sequence_length(&self) -> i64 {
        self.input_ids.size()[1]
    }

    /// Named tensors for `Tensor::save_multi`, keys prefixed with `prefix.`.
    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{}.input_ids", prefix), self.input_ids.shallow_clone()),
            (
                format!("{}.attention_mask", prefix),
                self.attention_mask.shallow_clone(),
            ),
            (format!("{}.labels", prefix), self.labels.shallow_clone()),
            (format!("{}.pieces2word", prefix), self.pieces2word.shallow_clone()),
            (format!("{}.dist_inputs", prefix), self.dist_inputs.shallow_clone()),
            (format!("{}.grid_mask2d", prefix), self.grid_mask2d.shallow_clone()),
            (format!("{}.seqlens", prefix), self.seqlens.shallow_clone()),
        ]
    }
}

fn stack_grids<T: Element + Copy>(grids: &[&SquareGrid<T>], length: i64) -> Tensor {
    let tensors = grids
        .iter()
        .map(|grid| {
            let size = grid.size() as i64;
            Tensor::from_slice(grid.as_slice()).view([size, size])
        })
        .collect::<Vec<_>>();
    Tensor::stack(&tensors, 0)
        .narrow(1, 0, length)
        .narrow(2, 0, length)
}

fn stack_sequences(sequences: &[&[i64]], length: i64) -> Tensor {
    let tensors = sequences
        .iter()
        .map(|sequence| Tensor::from_slice(*sequence))
        .collect::<Vec<_>>();
    Tensor::stack(&tensors, 0).narrow(1, 0, length)
}

/// Stacks examples into a batch, trimming every sequence and plane to the batch's longest
/// unpadded sequence.
///
/// All examples must share the same padded length.
pub fn collate_grids(features: &[GridFeatures], device: Device) -> Result<GridBatch, W2nerError> {
    let padded_length = match features.first() {
        Some(first) => first.input_ids.len(),
        None => {
            return Err(W2nerError::ValueError(
                "cannot collate an empty batch".to_string(),
            ));
        }
    };
    if let Some(example) = features.iter().find(|example| {
        example.input_ids.len() != padded_length || example.grid_labels.size() != padded_length
    }) {
        return Err(W2nerError::ValueError(format!(
            "all examples of a batch must be padded to {} tokens, found one padded to {}",
            padded_length,
            example.input_ids.len()
        )));
    }

    let max_length = features
        .iter()
        .map(|example| example.seqlen)
        .max()
        .unwrap_or(0)
        .min(padded_length) as i64;

    let input_ids: Vec<&[i64]> = features.iter().map(|f| f.input_ids.as_slice()).collect();
    let attention_mask: Vec<&[i64]> = features
        .iter()
        .map(|f| f.attention_mask.as_slice())
        .collect();
    let labels: Vec<&SquareGrid<i64>> = features.iter().map(|f| &f.grid_labels).collect();
    let pieces2word: Vec<&SquareGrid<bool>> = features.iter().map(|f| &f.pieces2word).collect();
    let dist_inputs: Vec<&SquareGrid<i64>> = features.iter().map(|f| &f.dist_inputs).collect();
    let grid_mask2d: Vec<&SquareGrid<bool>> = features.iter().map(|f| &f.grid_mask2d).collect();
    let seqlens: Vec<i64> = features.iter().map(|f| f.seqlen as i64).collect();

    Ok(GridBatch {
        input_ids: stack_sequences(&input_ids, max_length).to_device(device),
        attention_mask: stack_sequences(&attention_mask, max_length).to_device(device),
        labels: stack_grids(&labels, max_length).to_device(device),
        pieces2word: stack_grids(&pieces2word, max_length).to_device(device),
        dist_inputs: stack_grids(&dist_inputs, max_length).to_device(device),
        grid_mask2d: stack_grids(&grid_mask2d, max_length).to_device(device),
        seqlens: Tensor::from_slice(&seqlens).to_device(device),
    })
}
