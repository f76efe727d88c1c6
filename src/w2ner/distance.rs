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

//! Relative position features: signed token distances binned into exponentially spaced buckets.

use crate::w2ner::grid::SquareGrid;

/// Number of distinct distance bucket ids (size of the distance embedding table).
pub const NUM_DISTANCE_BUCKETS: usize = 20;

/// Offset added to the bucket of a negative distance.
pub const NEGATIVE_DISTANCE_OFFSET: i64 = 9;

/// Bucket id assigned to every cell whose bucket would otherwise be 0 (the diagonal).
pub const SAME_POSITION_BUCKET: i64 = 19;

/// Bins an absolute distance: 0, 1, [2,3], [4,7], [8,15], [16,31], [32,63], [64,127], >=128.
pub fn distance_bucket(distance: usize) -> i64 {
    match distance {
        0 => 0,
        1 => 1,
        2..=3 => 2,
        4..=7 => 3,
        8..=15 => 4,
        16..=31 => 5,
        32..=63 => 6,
        64..=127 => 7,
        _ => 8,
    }
}

/// Bucket id for the signed distance `column - row`.
///
/// Negative distances are shifted by `NEGATIVE_DISTANCE_OFFSET`. A resulting id of 0 is replaced
/// by `SAME_POSITION_BUCKET`, so the zero-distance bucket never appears in the output.
pub fn signed_distance_bucket(distance: i64) -> i64 {
    let bucket = if distance < 0 {
        distance_bucket(distance.unsigned_abs() as usize) + NEGATIVE_DISTANCE_OFFSET
    } else {
        distance_bucket(distance as usize)
    };
    if bucket == 0 {
        SAME_POSITION_BUCKET
    } else {
        bucket
    }
}

/// Builds the `length x length` plane of distance bucket ids.
pub fn distance_inputs(length: usize) -> SquareGrid<i64> {
    let mut grid = SquareGrid::new(length, 0i64);
    for row in 0..length {
        for column in 0..length {
            grid.set(
                row,
                column,
                signed_distance_bucket(column as i64 - row as i64),
            );
        }
    }
    grid
}
