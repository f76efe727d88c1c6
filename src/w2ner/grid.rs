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

//! # Word-relation grid construction
//!
//! Every entity of a sentence is written into an `L x L` grid indexed by token positions:
//! - the cells `(i, i + 1)` along an entity hold `CONTINUATION`,
//! - the cell `(end, start)` holds `LABEL_OFFSET + label_id` and closes the entity.
//!
//! The grid comes with three companion planes (sub-word adjacency, relative distance buckets and
//! a validity mask). All four planes are padded to `max_seq_length x max_seq_length`.

use crate::common::error::W2nerError;
use crate::w2ner::distance::distance_inputs;
use serde::{Deserialize, Serialize};

/// Grid value of cells carrying no relation.
pub const NO_RELATION: i64 = 0;
/// Grid value linking a token to its successor within the same entity.
pub const CONTINUATION: i64 = 1;
/// Offset between a label id and the grid value of its entity-end marker.
pub const LABEL_OFFSET: i64 = 2;

/// Square matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareGrid<T> {
    size: usize,
    values: Vec<T>,
}

impl<T: Copy> SquareGrid<T> {
    /// Creates a `size x size` grid with every cell set to `fill`.
    pub fn new(size: usize, fill: T) -> Self {
        SquareGrid {
            size,
            values: vec![fill; size * size],
        }
    }

    /// Wraps row-major values into a grid, failing if `values` does not hold `size * size` cells.
    pub fn from_vec(size: usize, values: Vec<T>) -> Result<Self, W2nerError> {
        if values.len() != size * size {
            return Err(W2nerError::ValueError(format!(
                "expected {} values for a {}x{} grid, got {}",
                size * size,
                size,
                size,
                values.len()
            )));
        }
        Ok(SquareGrid { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Value of the cell at `(row, column)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, row: usize, column: usize) -> T {
        assert!(
            row < self.size && column < self.size,
            "cell ({}, {}) out of bounds for a grid of size {}",
            row,
            column,
            self.size
        );
        self.values[row * self.size + column]
    }

    /// Value of the cell at `(row, column)`, `None` when out of bounds.
    pub fn try_get(&self, row: usize, column: usize) -> Option<T> {
        if row < self.size && column < self.size {
            Some(self.values[row * self.size + column])
        } else {
            None
        }
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, row: usize, column: usize, value: T) {
        assert!(
            row < self.size && column < self.size,
            "cell ({}, {}) out of bounds for a grid of size {}",
            row,
            column,
            self.size
        );
        self.values[row * self.size + column] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.values[row * self.size..(row + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Returns a copy extended on the high-index end (rows and columns) to `size x size`,
    /// new cells set to `fill`. Grids already at least `size` wide are returned unchanged.
    pub fn padded(&self, size: usize, fill: T) -> Self {
        if size <= self.size {
            return self.clone();
        }
        let mut padded = SquareGrid::new(size, fill);
        for row in 0..self.size {
            padded.values[row * size..row * size + self.size].copy_from_slice(self.row(row));
        }
        padded
    }
}

/// Entity span expressed with a label id and inclusive token offsets into the sentence (before
/// boundary token insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabeledSpan {
    pub label_id: i64,
    pub start: usize,
    pub end: usize,
}

impl LabeledSpan {
    pub fn new(label_id: i64, start: usize, end: usize) -> LabeledSpan {
        LabeledSpan {
            label_id,
            start,
            end,
        }
    }

    /// Rejects inverted spans and negative label ids.
    pub fn validate(&self) -> Result<(), W2nerError> {
        if self.start > self.end {
            return Err(W2nerError::ValueError(format!(
                "span start {} is after span end {}",
                self.start, self.end
            )));
        }
        if self.label_id < 0 {
            return Err(W2nerError::ValueError(format!(
                "invalid label id {} for span ({}, {})",
                self.label_id, self.start, self.end
            )));
        }
        Ok(())
    }
}

/// # Model inputs and targets for a single sentence
/// All sequences are padded to `max_seq_length` and all planes to
/// `max_seq_length x max_seq_length`.
#[derive(Debug, Clone)]
pub struct GridFeatures {
    /// Token ids including the boundary tokens
    pub input_ids: Vec<i64>,
    /// 1 for real tokens, 0 for padding
    pub attention_mask: Vec<i64>,
    /// Relation labels (`NO_RELATION`, `CONTINUATION` or `LABEL_OFFSET + label_id`)
    pub grid_labels: SquareGrid<i64>,
    /// `true` at `(i, i + 1)` when token `i + 1` is the next piece after token `i`
    pub pieces2word: SquareGrid<bool>,
    /// Relative distance buckets
    pub dist_inputs: SquareGrid<i64>,
    /// `true` inside the unpadded region
    pub grid_mask2d: SquareGrid<bool>,
    /// Unpadded sequence length (boundary tokens included)
    pub seqlen: usize,
}

/// Writes the entity spans into a fresh `length x length` label grid.
///
/// Offsets are shifted by one for the leading boundary token. Spans whose shifted end reaches
/// the trailing boundary token or beyond are dropped. Cells shared by several spans keep the
/// value of the last span written.
pub fn encode_grid_labels(
    length: usize,
    spans: &[LabeledSpan],
) -> Result<SquareGrid<i64>, W2nerError> {
    let mut grid_labels = SquareGrid::new(length, NO_RELATION);
    for span in spans {
        span.validate()?;
        // Shifted end must stay before the trailing boundary token: span.end + 2 < length.
        if span.end >= length.saturating_sub(2) {
            tracing::debug!(
                label_id = span.label_id,
                start = span.start,
                end = span.end,
                length,
                "dropping span beyond the truncated sequence"
            );
            continue;
        }
        let start = span.start + 1;
        let end = span.end + 1;
        for offset in 0..(end - start) {
            grid_labels.set(start + offset, start + offset + 1, CONTINUATION);
        }
        grid_labels.set(end, start, span.label_id + LABEL_OFFSET);
    }
    Ok(grid_labels)
}

/// # Builds padded W2NER grids from token ids and entity spans
#[derive(Debug, Clone)]
pub struct GridLabelBuilder {
    max_seq_length: usize,
    cls_token_id: i64,
    sep_token_id: i64,
    pad_token_id: i64,
}

impl GridLabelBuilder {
    /// Creates a new builder.
    ///
    /// # Arguments
    ///
    /// * `max_seq_length` - padded length, boundary tokens included (at least 2)
    /// * `cls_token_id` - id prepended to every sequence
    /// * `sep_token_id` - id appended to every sequence
    /// * `pad_token_id` - id used to pad `input_ids`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> Result<(), rust_w2ner::W2nerError> {
    /// use rust_w2ner::w2ner::{GridLabelBuilder, LabeledSpan};
    ///
    /// let builder = GridLabelBuilder::new(16, 101, 102, 0)?;
    /// let spans = [LabeledSpan::new(0, 1, 2)];
    /// let features = builder.build(&[2769, 4263, 1266], Some(&spans[..]))?;
    /// assert_eq!(features.seqlen, 5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        max_seq_length: usize,
        cls_token_id: i64,
        sep_token_id: i64,
        pad_token_id: i64,
    ) -> Result<GridLabelBuilder, W2nerError> {
        if max_seq_length < 2 {
            return Err(W2nerError::InvalidConfigurationError(format!(
                "max_seq_length must leave room for the two boundary tokens, got {}",
                max_seq_length
            )));
        }
        Ok(GridLabelBuilder {
            max_seq_length,
            cls_token_id,
            sep_token_id,
            pad_token_id,
        })
    }

    pub fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    /// Builds the padded grid features for one sentence.
    ///
    /// `token_ids` excludes boundary tokens and is truncated to `max_seq_length - 2`.
    /// `entities` is `None` for unlabeled (inference) data. Inverted spans are rejected.
    pub fn build(
        &self,
        token_ids: &[i64],
        entities: Option<&[LabeledSpan]>,
    ) -> Result<GridFeatures, W2nerError> {
        let kept = token_ids.len().min(self.max_seq_length - 2);
        let mut input_ids = Vec::with_capacity(self.max_seq_length);
        input_ids.push(self.cls_token_id);
        input_ids.extend_from_slice(&token_ids[..kept]);
        input_ids.push(self.sep_token_id);
        let length = input_ids.len();

        let mut pieces2word = SquareGrid::new(length, false);
        for position in 0..length - 1 {
            pieces2word.set(position, position + 1, true);
        }
        let dist_inputs = distance_inputs(length);
        let grid_mask2d = SquareGrid::new(length, true);
        let grid_labels = encode_grid_labels(length, entities.unwrap_or(&[]))?;

        let mut attention_mask = vec![1i64; length];
        input_ids.resize(self.max_seq_length, self.pad_token_id);
        attention_mask.resize(self.max_seq_length, 0);

        Ok(GridFeatures {
            input_ids,
            attention_mask,
            grid_labels: grid_labels.padded(self.max_seq_length, NO_RELATION),
            pieces2word: pieces2word.padded(self.max_seq_length, false),
            dist_inputs: dist_inputs.padded(self.max_seq_length, 0),
            grid_mask2d: grid_mask2d.padded(self.max_seq_length, false),
            seqlen: length,
        })
    }
}
