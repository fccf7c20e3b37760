// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! `BatchIndex` joins one row batch's worth of per-column decode state
//! (values, null bitmaps, level offsets) across every projected column, once
//! each column's [`ColumnReader::next_batch`] has returned for this batch.
//! It is the fork-join barrier's output: built once per batch, replaced
//! atomically by the next, and borrowed by every flyweight row/list/map
//! cursor for that batch's lifetime (§3's ownership rule — cursors must not
//! outlive the `BatchIndex` that produced them).

use crate::column::reader::{ColumnReader, TypedBatch};
use crate::data_type::ByteArray;
use crate::errors::{ParquetError, Result};
use crate::general_err;
use crate::levels::BitSet;
use crate::row::value::Value;

/// One projected column's decoded values for the current batch, type-erased
/// behind [`Value`] access by position.
#[derive(Debug, Clone)]
pub enum LeafValues {
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Bytes(Vec<ByteArray>),
}

impl LeafValues {
    pub fn len(&self) -> usize {
        match self {
            LeafValues::Int(v) => v.len(),
            LeafValues::Long(v) => v.len(),
            LeafValues::Float(v) => v.len(),
            LeafValues::Double(v) => v.len(),
            LeafValues::Bool(v) => v.len(),
            LeafValues::Bytes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Value {
        match self {
            LeafValues::Int(v) => Value::Int(v[idx]),
            LeafValues::Long(v) => Value::Long(v[idx]),
            LeafValues::Float(v) => Value::Float(v[idx]),
            LeafValues::Double(v) => Value::Double(v[idx]),
            LeafValues::Bool(v) => Value::Bool(v[idx]),
            LeafValues::Bytes(v) => Value::Bytes(v[idx].clone()),
        }
    }
}

/// One projected column's full level bookkeeping for the current batch,
/// mirroring spec §3's per-column `BatchIndex` entry.
#[derive(Debug, Clone)]
pub struct ColumnBatchData {
    pub values: LeafValues,
    pub element_nulls: Option<BitSet>,
    /// `level_nulls[k]`, parallel to `multi_level_offsets[k]`.
    pub level_nulls: Vec<Option<BitSet>>,
    pub multi_level_offsets: Vec<Vec<i32>>,
    pub record_offsets: Option<Vec<i32>>,
    /// Raw per-value definition levels, `None` iff `max_def_level == 0`.
    /// Row cursors use this to test nullity against an ancestor struct or
    /// list/map's own threshold, which may sit below this column's full
    /// `max_def_level` and so cannot be read off `element_nulls` alone.
    pub def_levels: Option<Vec<i32>>,
    pub max_rep_level: i32,
    pub max_def_level: i32,
}

impl ColumnBatchData {
    pub fn is_null(&self, value_idx: usize) -> bool {
        self.element_nulls.as_ref().map(|b| b.test(value_idx)).unwrap_or(false)
    }

    /// The definition level recorded at `value_idx`, or this column's own
    /// `max_def_level` when it has no optional ancestor at all (so every
    /// value is implicitly present at the only level there is).
    pub fn def_level_at(&self, value_idx: usize) -> i32 {
        self.def_levels.as_ref().map(|d| d[value_idx]).unwrap_or(self.max_def_level)
    }

    /// Whether the value at `value_idx` is null relative to `threshold`
    /// (an ancestor's own definition level), per spec §4.7's nullity rules:
    /// null iff `def_level_at(value_idx) < threshold`.
    pub fn is_null_at(&self, value_idx: usize, threshold: i32) -> bool {
        self.def_level_at(value_idx) < threshold
    }

    pub fn value(&self, value_idx: usize) -> Value {
        self.values.get(value_idx)
    }

    /// First leaf value index of record `row_idx`; `row_idx` itself when the
    /// column carries no repeated ancestor.
    pub fn record_offset(&self, row_idx: usize) -> i32 {
        self.record_offsets.as_ref().map(|o| o[row_idx]).unwrap_or(row_idx as i32)
    }

    /// Whether the level-`k` item at `item_idx` is null (its boundary
    /// definition level fell below that level's threshold).
    pub fn level_is_null(&self, k: usize, item_idx: usize) -> bool {
        self.level_nulls.get(k).and_then(|n| n.as_ref()).map(|b| b.test(item_idx)).unwrap_or(false)
    }

    /// The `[start, end)` range that level-`k` item `item_idx` covers in the
    /// level-`(k+1)` offsets array (or, at `k == R-1`, in the leaf value
    /// array). Spec §4.5: ranges are derived from consecutive offset
    /// entries, with the source array's own length (or the leaf value
    /// count) standing in for a final item's missing "next" entry.
    pub fn level_range(&self, k: usize, item_idx: usize) -> (i32, i32) {
        let offsets = &self.multi_level_offsets[k];
        let start = offsets[item_idx];
        let end = if item_idx + 1 < offsets.len() {
            offsets[item_idx + 1]
        } else if k + 1 == self.multi_level_offsets.len() {
            self.values.len() as i32
        } else {
            self.multi_level_offsets[k + 1].len() as i32
        };
        (start, end)
    }

    /// Chases `start` (an item index valid at `multi_level_offsets[from_level]`)
    /// down to an item index valid at `multi_level_offsets[to_level]`, by
    /// repeated offset lookups. A row index is always valid at level 0
    /// directly, so `from_level == 0` with `start == row_idx` is the row
    /// case; any other `from_level` is a position already resolved by a
    /// containing list/map cursor to that level.
    fn chase(&self, from_level: usize, start: i32, to_level: usize) -> i32 {
        let mut cur = start;
        for k in from_level..to_level {
            cur = self.multi_level_offsets[k][cur as usize];
        }
        cur
    }

    /// Resolves an item index valid at level `from_level` all the way down
    /// to this column's own leaf value index. When `from_level` already
    /// reaches or exceeds this column's repeated-ancestor count `R`
    /// (flat columns, or a position already addressing this column's
    /// leaf space directly — e.g. a list element with no further nesting),
    /// `start` already is the leaf index.
    pub fn resolve_to_leaf(&self, from_level: usize, start: i32) -> i32 {
        let r = self.multi_level_offsets.len();
        if from_level >= r {
            return start;
        }
        let cur = self.chase(from_level, start, r - 1);
        self.multi_level_offsets[r - 1][cur as usize]
    }

    /// The `[start, end)` range of level-`own_level` items belonging to the
    /// item addressed by `(from_level, item_idx)` — used to resolve a
    /// list/map field's own element range from its containing cursor's
    /// address, chasing through any intervening levels first.
    pub fn resolve_range(&self, from_level: usize, item_idx: i32, own_level: usize) -> (i32, i32) {
        let resolved = self.chase(from_level, item_idx, own_level);
        self.level_range(own_level, resolved as usize)
    }
}

/// One row batch's joined per-column state across every projected column.
#[derive(Debug, Clone)]
pub struct BatchIndex {
    columns: Vec<ColumnBatchData>,
    record_count: usize,
}

fn leaf_values_of(batch: &TypedBatch) -> LeafValues {
    match batch {
        TypedBatch::IntCol(b) => LeafValues::Int(b.values.clone()),
        TypedBatch::LongCol(b) => LeafValues::Long(b.values.clone()),
        TypedBatch::FloatCol(b) => LeafValues::Float(b.values.clone()),
        TypedBatch::DoubleCol(b) => LeafValues::Double(b.values.clone()),
        TypedBatch::BoolCol(b) => LeafValues::Bool(b.values.clone()),
        TypedBatch::ByteCol(b) => LeafValues::Bytes(b.values.clone()),
    }
}

impl BatchIndex {
    /// Joins the just-produced batch of every reader in `readers` (in
    /// projected-column order) into one `BatchIndex`. Every reader must have
    /// already returned `true` from `next_batch()` for this batch; callers
    /// assemble this after the fork-join barrier on per-column futures
    /// (§5), once every column's batch has actually landed.
    pub fn build(readers: &[&ColumnReader]) -> Result<Self> {
        if readers.is_empty() {
            return Err(general_err!("cannot build a BatchIndex over zero projected columns"));
        }
        let mut columns = Vec::with_capacity(readers.len());
        let mut record_count = None;
        for reader in readers {
            let rc = reader.record_count();
            match record_count {
                None => record_count = Some(rc),
                Some(expected) if expected != rc => {
                    return Err(ParquetError::General(format!(
                        "projected columns disagree on record count in this batch: {} vs {}",
                        expected, rc
                    )));
                }
                _ => {}
            }

            let values = leaf_values_of(reader.current_batch()?);
            let element_nulls = reader.get_element_nulls()?;
            let depth = reader.get_nesting_depth().max(0) as usize;
            let mut level_nulls = Vec::with_capacity(depth);
            let mut multi_level_offsets = Vec::with_capacity(depth);
            for k in 0..depth {
                level_nulls.push(reader.get_level_nulls(k)?);
                multi_level_offsets.push(reader.get_offsets(k)?);
            }
            let record_offsets = reader.record_offsets()?.map(|s| s.to_vec());
            let def_levels = reader.current_def_levels()?.map(|s| s.to_vec());
            let descr = reader.column_descriptor();

            columns.push(ColumnBatchData {
                values,
                element_nulls,
                level_nulls,
                multi_level_offsets,
                record_offsets,
                def_levels,
                max_rep_level: descr.max_rep_level,
                max_def_level: descr.max_def_level,
            });
        }
        Ok(BatchIndex { columns, record_count: record_count.unwrap_or(0) })
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn column(&self, projected_col: usize) -> &ColumnBatchData {
        &self.columns[projected_col]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
