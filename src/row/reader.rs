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

//! `RowReader`: the row-oriented public surface over a set of projected
//! [`ColumnReader`]s. Picks its representation once, at construction, from
//! whether the projected schema has any nesting at all:
//!
//! - **Flat mode** — every projected field is a primitive directly at the
//!   top level. Each row access reads straight off a column's typed array
//!   and null bitmap at `rowIndex`; there is no `BatchIndex` and no cursor
//!   object, just an index into slices already sitting in memory.
//! - **Nested mode** — builds a [`BatchIndex`] once per batch and hands out
//!   [`StructCursor`] flyweights that resolve fields through it.

use crate::column::page::PageReader;
use crate::column::reader::ColumnReader;
use crate::errors::Result;
use crate::general_err;
use crate::row::batch_index::BatchIndex;
use crate::row::cursor::StructCursor;
use crate::row::field_desc::{build_projected_fields, FieldDesc};
use crate::row::value::Value;
use crate::schema::projection::ProjectedSchema;
use crate::schema::types::{ColumnDescriptor, SchemaDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Nested,
}

pub struct RowReader {
    fields: Vec<(String, FieldDesc)>,
    readers: Vec<ColumnReader>,
    mode: Mode,
    batch: Option<BatchIndex>,
    row_idx: usize,
    row_count: usize,
}

impl RowReader {
    /// Builds a reader over one page-reader per projected column, in
    /// `projection`'s order.
    pub fn try_new(
        schema: &SchemaDescriptor,
        projection: &ProjectedSchema,
        page_readers: Vec<Box<dyn PageReader>>,
        batch_size: usize,
    ) -> Result<Self> {
        if page_readers.len() != projection.len() {
            return Err(general_err!(
                "expected {} page readers for {} projected columns, got {}",
                projection.len(),
                projection.len(),
                page_readers.len()
            ));
        }
        let fields = build_projected_fields(schema, projection)?;
        let mut readers = Vec::with_capacity(page_readers.len());
        for (pc, pr) in projection.columns().iter().zip(page_readers) {
            readers.push(ColumnReader::try_new(pc.descriptor.clone(), pr, batch_size)?);
        }
        let mode = if fields.iter().all(|(_, f)| matches!(f, FieldDesc::Primitive { .. })) {
            Mode::Flat
        } else {
            Mode::Nested
        };
        Ok(RowReader { fields, readers, mode, batch: None, row_idx: 0, row_count: 0 })
    }

    /// Pulls the next batch for every projected column and, in nested mode,
    /// rebuilds the `BatchIndex` over it. Returns `false` at end of stream.
    pub fn load_next_batch(&mut self) -> Result<bool> {
        let mut available = None;
        for reader in self.readers.iter_mut() {
            let got = reader.next_batch()?;
            match available {
                None => available = Some(got),
                Some(expected) if expected != got => {
                    return Err(general_err!("projected columns disagree on batch availability"));
                }
                _ => {}
            }
        }
        let available = available.unwrap_or(false);
        self.row_idx = 0;
        if !available {
            self.row_count = 0;
            self.batch = None;
            return Ok(false);
        }
        self.row_count = self.readers[0].record_count();
        self.batch = match self.mode {
            Mode::Flat => None,
            Mode::Nested => {
                let refs: Vec<&ColumnReader> = self.readers.iter().collect();
                Some(BatchIndex::build(&refs)?)
            }
        };
        Ok(true)
    }

    pub fn has_next(&self) -> bool {
        self.row_idx < self.row_count
    }

    /// Advances to and returns the next row, crossing a batch boundary (and
    /// synchronously loading the next batch) if needed.
    pub fn next(&mut self) -> Result<RowView<'_>> {
        if !self.has_next() && !self.load_next_batch()? {
            return Err(general_err!("no more rows"));
        }
        let idx = self.row_idx;
        self.row_idx += 1;
        Ok(match self.mode {
            Mode::Flat => RowView::Flat(FlatRow { fields: &self.fields, readers: &self.readers, row_idx: idx }),
            Mode::Nested => {
                RowView::Nested(StructCursor::new_record(self.batch.as_ref().expect("nested mode always has a batch after load"), &self.fields, idx))
            }
        })
    }
}

/// One row, in whichever representation its `RowReader` picked.
pub enum RowView<'r> {
    Flat(FlatRow<'r>),
    Nested(StructCursor<'r>),
}

impl<'r> RowView<'r> {
    pub fn is_null(&self, name: &str) -> Result<bool> {
        match self {
            RowView::Flat(f) => f.is_null(name),
            RowView::Nested(s) => s.is_null(name),
        }
    }

    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        match self {
            RowView::Flat(f) => f.get(name),
            RowView::Nested(s) => s.get(name),
        }
    }

    pub fn get_struct(&self, name: &str) -> Result<StructCursor<'r>> {
        match self {
            RowView::Flat(_) => Err(general_err!("flat-mode row has no nested fields")),
            RowView::Nested(s) => s.get_struct(name),
        }
    }

    pub fn get_list(&self, name: &str) -> Result<Option<crate::row::cursor::ListCursor<'r>>> {
        match self {
            RowView::Flat(_) => Err(general_err!("flat-mode row has no nested fields")),
            RowView::Nested(s) => s.get_list(name),
        }
    }

    pub fn get_map(&self, name: &str) -> Result<Option<crate::row::cursor::MapCursor<'r>>> {
        match self {
            RowView::Flat(_) => Err(general_err!("flat-mode row has no nested fields")),
            RowView::Nested(s) => s.get_map(name),
        }
    }
}

/// Flat-mode row: reads directly off a projected column's typed array and
/// null bitmap at `row_idx`, with no intervening `BatchIndex`.
pub struct FlatRow<'r> {
    fields: &'r [(String, FieldDesc)],
    readers: &'r [ColumnReader],
    row_idx: usize,
}

impl<'r> FlatRow<'r> {
    fn field(&self, name: &str) -> Result<(usize, &'r ColumnDescriptor)> {
        match self.fields.iter().find(|(n, _)| n == name).map(|(_, d)| d) {
            Some(FieldDesc::Primitive { projected_col, leaf }) => Ok((*projected_col, leaf)),
            Some(_) => Err(general_err!("field `{}` is nested; flat-mode schemas are all-primitive", name)),
            None => Err(general_err!("no such field `{}`", name)),
        }
    }

    pub fn is_null(&self, name: &str) -> Result<bool> {
        let (col, _) = self.field(name)?;
        Ok(self.readers[col].get_element_nulls()?.map(|b| b.test(self.row_idx)).unwrap_or(false))
    }

    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let (col, descr) = self.field(name)?;
        if self.is_null(name)? {
            return Ok(None);
        }
        let reader = &self.readers[col];
        use crate::basic::Type as PhysicalType;
        let value = match descr.primitive.physical_type {
            PhysicalType::BOOLEAN => Value::Bool(reader.get_booleans()?[self.row_idx]),
            PhysicalType::INT32 => Value::Int(reader.get_ints()?[self.row_idx]),
            PhysicalType::INT64 => Value::Long(reader.get_longs()?[self.row_idx]),
            PhysicalType::FLOAT => Value::Float(reader.get_floats()?[self.row_idx]),
            PhysicalType::DOUBLE => Value::Double(reader.get_doubles()?[self.row_idx]),
            PhysicalType::INT96 | PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => {
                Value::Bytes(reader.get_binaries()?[self.row_idx].clone())
            }
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{Encoding, Repetition};
    use crate::column::page::Page;
    use crate::schema::from_thrift::schema_from_thrift;
    use crate::util::memory::ByteBufferPtr;
    use crate::util::test_common::write_plain_i32;
    use crate::format::SchemaElement;

    fn elem(name: &str, ty: Option<i32>, rep: Option<i32>, num_children: Option<i32>) -> SchemaElement {
        SchemaElement {
            type_: ty,
            type_length: None,
            repetition_type: rep,
            name: name.to_string(),
            num_children,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
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

    fn page_of(values: &[i32]) -> Box<dyn PageReader> {
        let payload = write_plain_i32(values);
        Box::new(OnePage(Some(Page::DataPage {
            buf: ByteBufferPtr::new(payload),
            num_values: values.len() as u32,
            encoding: Encoding::PLAIN,
            def_level_encoding: Encoding::RLE,
            rep_level_encoding: Encoding::RLE,
        })))
    }

    #[test]
    fn test_flat_row_reader_reads_rows_in_order() {
        let mut root = elem("schema", None, None, Some(2));
        root.num_children = Some(2);
        let elements = vec![root, elem("a", Some(1), Some(Repetition::REQUIRED as i32), None), elem("b", Some(1), Some(Repetition::REQUIRED as i32), None)];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::all(&schema);

        let mut reader = RowReader::try_new(&schema, &projection, vec![page_of(&[1, 2]), page_of(&[10, 20])], 10).unwrap();

        let row0 = reader.next().unwrap();
        assert_eq!(row0.get("a").unwrap().unwrap().as_i32().unwrap(), 1);
        assert_eq!(row0.get("b").unwrap().unwrap().as_i32().unwrap(), 10);
        assert!(!row0.is_null("a").unwrap());

        let row1 = reader.next().unwrap();
        assert_eq!(row1.get("a").unwrap().unwrap().as_i32().unwrap(), 2);
        assert_eq!(row1.get("b").unwrap().unwrap().as_i32().unwrap(), 20);

        assert!(!reader.has_next());
    }

    #[test]
    fn test_flat_row_reader_rejects_unknown_field() {
        let mut root = elem("schema", None, None, Some(1));
        root.num_children = Some(1);
        let elements = vec![root, elem("a", Some(1), Some(Repetition::REQUIRED as i32), None)];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::all(&schema);
        let mut reader = RowReader::try_new(&schema, &projection, vec![page_of(&[1])], 10).unwrap();
        let row = reader.next().unwrap();
        assert!(row.get("nope").is_err());
        assert!(row.get_struct("a").is_err());
    }
}
