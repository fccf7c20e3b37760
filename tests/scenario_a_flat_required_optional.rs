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

//! A required INT64 `id` plus an optional STRING `name`, three rows with
//! one null name in the middle. Exercises both the `ColumnReader` typed
//! accessors directly and the flat-mode `RowReader` over the same pages.

mod common;

use common::{elem, OnePage};
use parquet_core::basic::{Encoding, Repetition};
use parquet_core::column::page::Page;
use parquet_core::column::reader::ColumnReader;
use parquet_core::row::reader::RowReader;
use parquet_core::schema::from_thrift::schema_from_thrift;
use parquet_core::schema::projection::ProjectedSchema;
use parquet_core::util::memory::ByteBufferPtr;
use parquet_core::util::test_common::{write_levels_v1, write_plain_byte_array, write_plain_i64};

fn schema() -> parquet_core::schema::types::SchemaDescriptor {
    let mut root = elem("schema", None, None, Some(2));
    root.num_children = Some(2);
    let elements = vec![
        root,
        elem("id", Some(2), Some(Repetition::REQUIRED as i32), None),
        elem("name", Some(6), Some(Repetition::OPTIONAL as i32), None),
    ];
    schema_from_thrift(&elements).unwrap()
}

fn id_page() -> Box<dyn parquet_core::column::page::PageReader> {
    OnePage::new(Page::DataPage {
        buf: ByteBufferPtr::new(write_plain_i64(&[1, 2, 3])),
        num_values: 3,
        encoding: Encoding::PLAIN,
        def_level_encoding: Encoding::RLE,
        rep_level_encoding: Encoding::RLE,
    })
}

fn name_page() -> Box<dyn parquet_core::column::page::PageReader> {
    let mut buf = write_levels_v1(&[1, 0, 1], 1);
    buf.extend(write_plain_byte_array(&["alice", "charlie"]));
    OnePage::new(Page::DataPage {
        buf: ByteBufferPtr::new(buf),
        num_values: 3,
        encoding: Encoding::PLAIN,
        def_level_encoding: Encoding::RLE,
        rep_level_encoding: Encoding::RLE,
    })
}

#[test]
fn column_reader_exposes_typed_arrays_and_null_bitmap() {
    let schema = schema();

    let mut id_reader = ColumnReader::try_new(schema.column(0).clone(), id_page(), 10).unwrap();
    assert!(id_reader.next_batch().unwrap());
    assert_eq!(id_reader.get_longs().unwrap(), &[1, 2, 3]);
    assert!(id_reader.get_element_nulls().unwrap().is_none());

    let mut name_reader = ColumnReader::try_new(schema.column(1).clone(), name_page(), 10).unwrap();
    assert!(name_reader.next_batch().unwrap());
    assert_eq!(name_reader.get_strings().unwrap(), vec![Some("alice".to_string()), None, Some("charlie".to_string())]);
    let nulls = name_reader.get_element_nulls().unwrap().unwrap();
    assert_eq!(nulls.iter_ones().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn row_reader_flat_mode_reads_same_rows() {
    let schema = schema();
    let projection = ProjectedSchema::all(&schema);
    let mut reader = RowReader::try_new(&schema, &projection, vec![id_page(), name_page()], 10).unwrap();

    let expected = [(1i64, Some("alice")), (2, None), (3, Some("charlie"))];
    for (id, name) in expected {
        let row = reader.next().unwrap();
        assert_eq!(row.get("id").unwrap().unwrap().as_i64().unwrap(), id);
        match name {
            Some(s) => assert_eq!(row.get("name").unwrap().unwrap().as_str().unwrap(), s),
            None => assert!(row.get("name").unwrap().is_none()),
        }
    }
    assert!(!reader.has_next());
}
