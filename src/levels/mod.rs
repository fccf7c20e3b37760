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

//! Turns a column's flat repetition/definition-level arrays into the
//! structures a nested reader needs: the leaf null bitmap, one offset array
//! per repeated nesting level, a null bitmap per level, and top-level record
//! boundaries. Dremel's own paper describes the read side of this; the
//! two-pass construction here mirrors how `arrow-rs`'s `ColumnReaderImpl`
//! derives array offsets from levels, generalized to arbitrary nesting depth.

/// A growable bitmap, one bit per item. `None` in the surrounding structures
/// means "this bitmap would be all-zero" — callers should treat a missing
/// bitmap as "nothing is null here" rather than allocate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bits: Vec<u64>,
    len: usize,
}

impl BitSet {
    pub fn with_len(len: usize) -> Self {
        BitSet { bits: vec![0u64; (len + 63) / 64], len }
    }

    pub fn set(&mut self, i: usize) {
        assert!(i < self.len, "bit index {} out of range (len {})", i, self.len);
        self.bits[i / 64] |= 1 << (i % 64);
    }

    pub fn test(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of range (len {})", i, self.len);
        self.bits[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of every set bit, ascending. Used by tests and by callers
    /// that want a compact view rather than poking individual bits.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.test(i))
    }
}

/// Output of the Nested-Level Computer for one column's current batch.
#[derive(Debug, Clone)]
pub struct ColumnLevels {
    /// Set bit at `v` iff `defLevels[v] < maxDefLevel`. `None` iff `maxDefLevel == 0`.
    pub element_nulls: Option<BitSet>,
    /// `multi_level_offsets[k]`, one entry per level-`k` item. Entries at
    /// `k == R-1` are leaf value indices; entries at `k < R-1` are start
    /// indices into `multi_level_offsets[k+1]`. Empty when `R == 0`.
    pub multi_level_offsets: Vec<Vec<i32>>,
    /// Null bitmap per level, parallel to `multi_level_offsets`.
    pub level_nulls: Vec<Option<BitSet>>,
    /// `record_offsets[i]`: the first leaf value index of record `i`.
    /// `None` when `R == 0` (flat columns need no indirection).
    pub record_offsets: Option<Vec<i32>>,
}

/// `threshold(k) = maxDefLevel - R + k + 1`: a level-`k` item is null iff its
/// boundary value's definition level falls below this.
fn null_threshold(max_def_level: i32, max_rep_level: i32, k: i32) -> i32 {
    max_def_level - max_rep_level + k + 1
}

/// Computes every nested-level structure for one column given its decoded
/// level streams. `rep_levels`/`def_levels` must each have `value_count`
/// entries (`def_levels` is required whenever `max_def_level > 0`;
/// `rep_levels` whenever `max_rep_level > 0`).
pub fn compute_column_levels(
    rep_levels: Option<&[i32]>,
    def_levels: Option<&[i32]>,
    value_count: usize,
    max_rep_level: i32,
    max_def_level: i32,
) -> ColumnLevels {
    let element_nulls = match def_levels {
        Some(defs) if max_def_level > 0 => {
            let mut bs = BitSet::with_len(value_count);
            for (i, &d) in defs.iter().enumerate() {
                if d < max_def_level {
                    bs.set(i);
                }
            }
            Some(bs)
        }
        _ => None,
    };

    if max_rep_level == 0 {
        return ColumnLevels {
            element_nulls,
            multi_level_offsets: Vec::new(),
            level_nulls: Vec::new(),
            record_offsets: None,
        };
    }

    let rep_levels = rep_levels.expect("rep_levels required when max_rep_level > 0");
    let def_levels = def_levels.expect("def_levels required when max_rep_level > 0 implies max_def_level > 0");
    let r = max_rep_level as usize;

    let mut offsets: Vec<Vec<i32>> = vec![Vec::new(); r];
    let mut nulls: Vec<Option<BitSet>> = vec![None; r];
    // Staged as Vec<bool> keyed by (level, item index), upgraded to a BitSet
    // only for levels that actually saw a null, matching "None means no bit
    // set" without knowing each level's final length up front.
    let mut staged_nulls: Vec<Vec<bool>> = vec![Vec::new(); r];

    for i in 0..value_count {
        let rep = rep_levels[i] as usize;
        let def = def_levels[i];
        for k in rep..r {
            let is_null = def < null_threshold(max_def_level, max_rep_level, k as i32);
            if k == r - 1 {
                offsets[k].push(i as i32);
            } else {
                offsets[k].push(offsets[k + 1].len() as i32);
            }
            staged_nulls[k].push(is_null);
        }
    }

    for k in 0..r {
        if staged_nulls[k].iter().any(|&b| b) {
            let mut bs = BitSet::with_len(staged_nulls[k].len());
            for (i, &is_null) in staged_nulls[k].iter().enumerate() {
                if is_null {
                    bs.set(i);
                }
            }
            nulls[k] = Some(bs);
        }
    }

    let record_count = offsets[0].len();
    let mut record_offsets = Vec::with_capacity(record_count);
    for i in 0..record_count {
        let mut cur = i;
        for k in 0..r - 1 {
            cur = offsets[k][cur] as usize;
        }
        record_offsets.push(offsets[r - 1][cur]);
    }

    ColumnLevels {
        element_nulls,
        multi_level_offsets: offsets,
        level_nulls: nulls,
        record_offsets: Some(record_offsets),
    }
}
