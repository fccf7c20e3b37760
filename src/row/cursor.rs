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

//! Flyweight cursors over a [`BatchIndex`] for nested-mode row access: a
//! cursor is a borrow plus an address, never a copy of the batch's data.
//! Constructing one does no decoding; all the decoding already happened
//! when the `BatchIndex` was built.
//!
//! Every cursor resolves a field down to a leaf value index through one of
//! two addressing modes (`Addr`): `Record` for a row accessed directly by
//! index, and `Position` for an item reached by walking into a list or
//! map's elements, where the item index is only valid at the repetition
//! level the walk landed on. A struct never changes this address — the
//! fields of a struct reached at some address are read at that same
//! address, since grouping a struct around fields does not introduce a new
//! repetition level. Only descending into a list/map's elements advances
//! the level by one.

use crate::errors::Result;
use crate::general_err;
use crate::row::batch_index::{BatchIndex, ColumnBatchData};
use crate::row::field_desc::FieldDesc;
use crate::row::value::Value;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Addr {
    Record(usize),
    Position { level: usize, item_idx: i32 },
}

impl Addr {
    fn level(&self) -> usize {
        match *self {
            Addr::Record(_) => 0,
            Addr::Position { level, .. } => level,
        }
    }

    fn item_idx(&self) -> i32 {
        match *self {
            Addr::Record(row) => row as i32,
            Addr::Position { item_idx, .. } => item_idx,
        }
    }

    fn leaf_index(&self, col: &ColumnBatchData) -> i32 {
        match *self {
            Addr::Record(row) => col.record_offset(row),
            Addr::Position { level, item_idx } => col.resolve_to_leaf(level, item_idx),
        }
    }
}

fn field_is_null(batch: &BatchIndex, addr: Addr, field: &FieldDesc) -> bool {
    match field {
        FieldDesc::Primitive { projected_col, .. } => {
            let col = batch.column(*projected_col);
            col.is_null(addr.leaf_index(col) as usize)
        }
        FieldDesc::Struct { first_primitive_col, group, .. } => {
            let col = batch.column(*first_primitive_col);
            col.is_null_at(addr.leaf_index(col) as usize, group.max_def_level)
        }
        FieldDesc::ListOf { first_leaf_col, null_def_level, .. } => {
            let col = batch.column(*first_leaf_col);
            col.is_null_at(addr.leaf_index(col) as usize, *null_def_level)
        }
        FieldDesc::MapOf { key_col, null_def_level, .. } => {
            let col = batch.column(*key_col);
            col.is_null_at(addr.leaf_index(col) as usize, *null_def_level)
        }
    }
}

fn field_value(batch: &BatchIndex, addr: Addr, field: &FieldDesc) -> Result<Option<Value>> {
    match field {
        FieldDesc::Primitive { projected_col, .. } => {
            let col = batch.column(*projected_col);
            let idx = addr.leaf_index(col) as usize;
            Ok(if col.is_null(idx) { None } else { Some(col.value(idx)) })
        }
        _ => Err(general_err!("field is not a primitive")),
    }
}

fn field_struct<'b>(batch: &'b BatchIndex, addr: Addr, field: &'b FieldDesc) -> Result<StructCursor<'b>> {
    match field {
        FieldDesc::Struct { children, .. } => Ok(StructCursor { batch, fields: children, addr }),
        _ => Err(general_err!("field is not a struct")),
    }
}

fn field_list<'b>(batch: &'b BatchIndex, addr: Addr, field: &'b FieldDesc) -> Result<Option<ListCursor<'b>>> {
    match field {
        FieldDesc::ListOf { group, element, first_leaf_col, null_def_level, .. } => {
            let probe = batch.column(*first_leaf_col);
            let leaf_idx = addr.leaf_index(probe);
            if probe.is_null_at(leaf_idx as usize, *null_def_level) {
                return Ok(None);
            }
            let own_level = group.max_rep_level as usize;
            let (start, end) = probe.resolve_range(addr.level(), addr.item_idx(), own_level);
            Ok(Some(ListCursor { batch, element, level: own_level + 1, start, end }))
        }
        _ => Err(general_err!("field is not a list")),
    }
}

fn field_map<'b>(batch: &'b BatchIndex, addr: Addr, field: &'b FieldDesc) -> Result<Option<MapCursor<'b>>> {
    match field {
        FieldDesc::MapOf { group, key_col, value_col, null_def_level, .. } => {
            let probe = batch.column(*key_col);
            let leaf_idx = addr.leaf_index(probe);
            if probe.is_null_at(leaf_idx as usize, *null_def_level) {
                return Ok(None);
            }
            let own_level = group.max_rep_level as usize;
            let (start, end) = probe.resolve_range(addr.level(), addr.item_idx(), own_level);
            Ok(Some(MapCursor { batch, key_col: *key_col, value_col: *value_col, level: own_level + 1, start, end }))
        }
        _ => Err(general_err!("field is not a map")),
    }
}

/// A view onto one struct instance's fields, addressed either by row (the
/// top-level record) or by a position reached by descending into a
/// containing list/map's elements.
#[derive(Clone, Copy)]
pub struct StructCursor<'b> {
    batch: &'b BatchIndex,
    fields: &'b [(String, FieldDesc)],
    addr: Addr,
}

impl<'b> StructCursor<'b> {
    pub(crate) fn new_record(batch: &'b BatchIndex, fields: &'b [(String, FieldDesc)], row_idx: usize) -> Self {
        StructCursor { batch, fields, addr: Addr::Record(row_idx) }
    }

    fn field(&self, name: &str) -> Result<&'b FieldDesc> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, d)| d).ok_or_else(|| general_err!("no such field `{}`", name))
    }

    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(field_is_null(self.batch, self.addr, self.field(name)?))
    }

    /// Reads a primitive field; `Ok(None)` when it is null.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        field_value(self.batch, self.addr, self.field(name)?)
    }

    pub fn get_struct(&self, name: &str) -> Result<StructCursor<'b>> {
        field_struct(self.batch, self.addr, self.field(name)?)
    }

    /// `Ok(None)` when the list field itself is null (as opposed to present
    /// but empty, which returns a zero-length cursor).
    pub fn get_list(&self, name: &str) -> Result<Option<ListCursor<'b>>> {
        field_list(self.batch, self.addr, self.field(name)?)
    }

    pub fn get_map(&self, name: &str) -> Result<Option<MapCursor<'b>>> {
        field_map(self.batch, self.addr, self.field(name)?)
    }
}

/// A view onto one list field's elements, as a `[start, end)` range over
/// whichever level the list's repeated child occupies. Constructing this
/// does not require the element type to be known ahead of time — the
/// accessor called determines how `element` is interpreted, and returns an
/// error if it doesn't match.
#[derive(Clone, Copy)]
pub struct ListCursor<'b> {
    batch: &'b BatchIndex,
    element: &'b FieldDesc,
    level: usize,
    start: i32,
    end: i32,
}

impl<'b> ListCursor<'b> {
    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    fn addr(&self, i: usize) -> Addr {
        Addr::Position { level: self.level, item_idx: self.start + i as i32 }
    }

    fn check_bounds(&self, i: usize) -> Result<()> {
        if i >= self.len() {
            return Err(general_err!("list index {} out of bounds (len {})", i, self.len()));
        }
        Ok(())
    }

    pub fn is_null(&self, i: usize) -> Result<bool> {
        self.check_bounds(i)?;
        Ok(field_is_null(self.batch, self.addr(i), self.element))
    }

    pub fn get(&self, i: usize) -> Result<Option<Value>> {
        self.check_bounds(i)?;
        field_value(self.batch, self.addr(i), self.element)
    }

    pub fn get_struct(&self, i: usize) -> Result<StructCursor<'b>> {
        self.check_bounds(i)?;
        field_struct(self.batch, self.addr(i), self.element)
    }

    pub fn get_list(&self, i: usize) -> Result<Option<ListCursor<'b>>> {
        self.check_bounds(i)?;
        field_list(self.batch, self.addr(i), self.element)
    }

    pub fn get_map(&self, i: usize) -> Result<Option<MapCursor<'b>>> {
        self.check_bounds(i)?;
        field_map(self.batch, self.addr(i), self.element)
    }
}

/// A view onto one map field's entries. Keys and values are restricted to
/// a single primitive projected column each (see `FieldDesc::MapOf`); a
/// null value entry is a present key with an absent value, not a missing
/// entry.
#[derive(Clone, Copy)]
pub struct MapCursor<'b> {
    batch: &'b BatchIndex,
    key_col: usize,
    value_col: usize,
    level: usize,
    start: i32,
    end: i32,
}

impl<'b> MapCursor<'b> {
    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn entry(&self, i: usize) -> Result<(Value, Option<Value>)> {
        if i >= self.len() {
            return Err(general_err!("map index {} out of bounds (len {})", i, self.len()));
        }
        let item_idx = self.start + i as i32;
        let key_col = self.batch.column(self.key_col);
        let value_col = self.batch.column(self.value_col);
        let key_leaf = key_col.resolve_to_leaf(self.level, item_idx) as usize;
        let value_leaf = value_col.resolve_to_leaf(self.level, item_idx) as usize;
        let key = key_col.value(key_leaf);
        let value = if value_col.is_null(value_leaf) { None } else { Some(value_col.value(value_leaf)) };
        Ok((key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{Repetition, Type as PhysicalType};
    use crate::column::page::{Page, PageReader};
    use crate::column::reader::ColumnReader;
    use crate::schema::types::{BasicTypeInfo, ColumnDescriptor, PrimitiveNode};
    use crate::util::memory::ByteBufferPtr;
    use crate::util::test_common::write_plain_i32;
    use std::sync::Arc;

    fn flat_descr(name: &str, max_def_level: i32) -> ColumnDescriptor {
        let repetition = if max_def_level > 0 { Repetition::OPTIONAL } else { Repetition::REQUIRED };
        let primitive = Arc::new(PrimitiveNode {
            info: BasicTypeInfo { name: name.to_string(), repetition: Some(repetition), id: None, logical_type: None },
            physical_type: PhysicalType::INT32,
            type_length: 0,
            precision: 0,
            scale: 0,
            column_index: 0,
            max_rep_level: 0,
            max_def_level,
        });
        ColumnDescriptor { path: vec![name.to_string()], primitive, max_def_level, max_rep_level: 0, column_index: 0 }
    }

    struct OnePage(Option<Page>);

    impl Iterator for OnePage {
        type Item = Result<Page>;
        fn next(&mut self) -> Option<Self::Item> {
            self.get_next_page().transpose()
        }
    }

    impl PageReader for OnePage {
        fn get_next_page(&mut self) -> Result<Option<Page>> {
            Ok(self.0.take())
        }
    }

    fn one_flat_batch() -> BatchIndex {
        let payload = write_plain_i32(&[10, 20, 30]);
        let page = Page::DataPage {
            buf: ByteBufferPtr::new(payload),
            num_values: 3,
            encoding: crate::basic::Encoding::PLAIN,
            def_level_encoding: crate::basic::Encoding::RLE,
            rep_level_encoding: crate::basic::Encoding::RLE,
        };
        let mut reader = ColumnReader::try_new(flat_descr("x", 0), Box::new(OnePage(Some(page))), 10).unwrap();
        assert!(reader.next_batch().unwrap());
        BatchIndex::build(&[&reader]).unwrap()
    }

    #[test]
    fn test_struct_cursor_record_mode_reads_flat_field() {
        let batch = one_flat_batch();
        let fields = vec![("x".to_string(), FieldDesc::Primitive { projected_col: 0, leaf: flat_descr("x", 0) })];
        let cursor = StructCursor::new_record(&batch, &fields, 1);
        assert_eq!(cursor.get("x").unwrap().unwrap().as_i32().unwrap(), 20);
        assert!(!cursor.is_null("x").unwrap());
    }

    #[test]
    fn test_struct_cursor_rejects_unknown_field() {
        let batch = one_flat_batch();
        let fields = vec![("x".to_string(), FieldDesc::Primitive { projected_col: 0, leaf: flat_descr("x", 0) })];
        let cursor = StructCursor::new_record(&batch, &fields, 0);
        assert!(cursor.get("y").is_err());
    }
}
