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

//! # Entity extraction from predicted grids
//!
//! An entity `(label, start, end)` is read back from a grid when the cell `(end, start)` holds
//! `LABEL_OFFSET + label` and every cell of the chain `(start, start + 1) ... (end - 1, end)`
//! holds `CONTINUATION`. Any other geometry is ignored.
//!
//! ```no_run
//! # fn main() -> Result<(), rust_w2ner::W2nerError> {
//! use rust_w2ner::w2ner::{GridDecoder, GridLabelBuilder, LabeledSpan};
//!
//! let builder = GridLabelBuilder::new(8, 101, 102, 0)?;
//! let spans = [LabeledSpan::new(4, 0, 2)];
//! let features = builder.build(&[10, 11, 12, 13], Some(&spans[..]))?;
//!
//! let decoded = GridDecoder.decode(&features.grid_labels, features.seqlen);
//! assert_eq!(decoded, vec![LabeledSpan::new(4, 0, 2)]);
//! # Ok(())
//! # }
//! ```

use crate::common::error::W2nerError;
use crate::w2ner::grid::{LabeledSpan, SquareGrid, CONTINUATION, LABEL_OFFSET};
use std::collections::BTreeSet;
use std::convert::TryFrom;
use tch::{Device, Kind, Tensor};

/// # Reconstructs entity spans from grid labels
#[derive(Debug, Clone, Copy, Default)]
pub struct GridDecoder;

impl GridDecoder {
    /// Decodes the entities of one sentence.
    ///
    /// # Arguments
    ///
    /// * `grid_labels` - predicted (or reference) grid, possibly padded
    /// * `sequence_length` - unpadded length including the two boundary tokens
    ///
    /// # Returns
    ///
    /// * Sorted, deduplicated spans in sentence offsets (boundary shift removed)
    pub fn decode(&self, grid_labels: &SquareGrid<i64>, sequence_length: usize) -> Vec<LabeledSpan> {
        let length = sequence_length.min(grid_labels.size());
        let mut entities = BTreeSet::new();
        if length < 3 {
            return Vec::new();
        }
        // Positions 0 and length - 1 hold the boundary tokens.
        for end in 1..length - 1 {
            for start in 1..=end {
                let value = grid_labels.get(end, start);
                if value < LABEL_OFFSET {
                    continue;
                }
                let chained = (start..end).all(|i| grid_labels.get(i, i + 1) == CONTINUATION);
                if chained {
                    entities.insert(LabeledSpan::new(value - LABEL_OFFSET, start - 1, end - 1));
                }
            }
        }
        entities.into_iter().collect()
    }

    /// Decodes a batch of model outputs.
    ///
    /// # Arguments
    ///
    /// * `logits` - `Tensor` of shape (*batch size*, *sequence_length*, *sequence_length*, *num_relations*)
    /// * `seqlens` - `Tensor` of shape (*batch size*) with the unpadded lengths
    ///
    /// # Returns
    ///
    /// * One list of spans per example
    pub fn decode_batch(
        &self,
        logits: &Tensor,
        seqlens: &Tensor,
    ) -> Result<Vec<Vec<LabeledSpan>>, W2nerError> {
        let logits_shape = logits.size();
        if logits_shape.len() != 4
            || logits_shape[1] != logits_shape[2]
            || logits_shape[3] == 0
        {
            return Err(W2nerError::ValueError(format!(
                "expected logits of shape (batch, length, length, relations), got {:?}",
                logits_shape
            )));
        }
        let predictions = logits.f_argmax(-1, false)?;
        self.decode_predictions(&predictions, seqlens)
    }

    /// Decodes a batch of predicted relation ids of shape (*batch size*, *sequence_length*,
    /// *sequence_length*).
    pub fn decode_predictions(
        &self,
        predictions: &Tensor,
        seqlens: &Tensor,
    ) -> Result<Vec<Vec<LabeledSpan>>, W2nerError> {
        let shape = predictions.size();
        if shape.len() != 3 || shape[1] != shape[2] {
            return Err(W2nerError::ValueError(format!(
                "expected predictions of shape (batch, length, length), got {:?}",
                shape
            )));
        }
        let (batch_size, grid_size) = (shape[0], shape[1]);
        if seqlens.size() != [batch_size] {
            return Err(W2nerError::ValueError(format!(
                "expected {} sequence lengths, got a tensor of shape {:?}",
                batch_size,
                seqlens.size()
            )));
        }
        let predictions = predictions.to_device(Device::Cpu).to_kind(Kind::Int64);
        let seqlens = seqlens.to_device(Device::Cpu).to_kind(Kind::Int64);

        let mut output = Vec::with_capacity(batch_size as usize);
        for example in 0..batch_size {
            let values = Vec::<i64>::try_from(&predictions.get(example).flatten(0, -1))?;
            let grid = SquareGrid::from_vec(grid_size as usize, values)?;
            let sequence_length = seqlens.int64_value(&[example]).max(0) as usize;
            output.push(self.decode(&grid, sequence_length));
        }
        Ok(output)
    }
}
