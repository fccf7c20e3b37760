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

//! `matrix: LIST<LIST<INT32>>`, two rows `[[1,2],[3]]` and `[[4]]`. Every
//! value is present (no nulls anywhere in the column), so the only thing
//! this exercises is repetition-level-driven record and list boundary
//! resolution across two nesting levels.

mod common;

use common::{elem, elem_converted, OnePage};
use parquet_core::basic::{Encoding, Repetition};
use parquet_core::column::page::Page;
use parquet_core::row::reader::RowReader;
use parquet_core::schema::from_thrift::schema_from_thrift;
use parquet_core::schema::projection::ProjectedSchema;
use parquet_core::util::bit_util::num_required_bits;
use parquet_core::util::memory::ByteBufferPtr;
use parquet_core::util::test_common::{write_bit_packed_run, write_plain_i32};

fn schema() -> parquet_core::schema::types::SchemaDescriptor {
    let mut root = elem("schema", None, None, Some(1));
    root.num_children = Some(1);

    let mut outer_list = elem_converted("matrix", None, Some(Repetition::REQUIRED as i32), Some(1), Some(3));
    outer_list.num_children = Some(1);
    let mut outer_repeated = elem("list", None, Some(Repetition::REPEATED as i32), Some(1));
    outer_repeated.num_children = Some(1);

    let mut inner_list = elem_converted("element", None, Some(Repetition::REQUIRED as i32), Some(1), Some(3));
    inner_list.num_children = Some(1);
    let mut inner_repeated = elem("list", None, Some(Repetition::REPEATED as i32), Some(1));
    inner_repeated.num_children = Some(1);

    let leaf = elem("element", Some(1), Some(Repetition::REQUIRED as i32), None);

    let elements = vec![root, outer_list, outer_repeated, inner_list, inner_repeated, leaf];
    schema_from_thrift(&elements).unwrap()
}

fn page() -> Box<dyn parquet_core::column::page::PageReader> {
    let rep: Vec<i16> = vec![0, 2, 1, 0];
    let def: Vec<i16> = vec![2, 2, 2, 2];
    let rep_bits = num_required_bits(2) as usize;
    let def_bits = num_required_bits(2) as usize;
    let rep_body = write_bit_packed_run(&rep.iter().map(|&v| v as u32).collect::<Vec<_>>(), rep_bits);
    let def_body = write_bit_packed_run(&def.iter().map(|&v| v as u32).collect::<Vec<_>>(), def_bits);
    let mut buf = rep_body.clone();
    buf.extend(def_body.clone());
    buf.extend(write_plain_i32(&[1, 2, 3, 4]));
    OnePage::new(Page::DataPageV2 {
        buf: ByteBufferPtr::new(buf),
        num_values: 4,
        num_nulls: 0,
        num_rows: 2,
        encoding: Encoding::PLAIN,
        def_levels_byte_len: def_body.len() as u32,
        rep_levels_byte_len: rep_body.len() as u32,
    })
}

#[test]
fn nested_row_reader_resolves_two_levels_of_lists() {
    let schema = schema();
    let projection = ProjectedSchema::all(&schema);
    let mut reader = RowReader::try_new(&schema, &projection, vec![page()], 10).unwrap();

    let row0 = reader.next().unwrap();
    let outer0 = row0.get_list("matrix").unwrap().unwrap();
    assert_eq!(outer0.len(), 2);
    let inner00 = outer0.get_list(0).unwrap().unwrap();
    assert_eq!(inner00.len(), 2);
    assert_eq!(inner00.get(0).unwrap().unwrap().as_i32().unwrap(), 1);
    assert_eq!(inner00.get(1).unwrap().unwrap().as_i32().unwrap(), 2);
    let inner01 = outer0.get_list(1).unwrap().unwrap();
    assert_eq!(inner01.len(), 1);
    assert_eq!(inner01.get(0).unwrap().unwrap().as_i32().unwrap(), 3);

    let row1 = reader.next().unwrap();
    let outer1 = row1.get_list("matrix").unwrap().unwrap();
    assert_eq!(outer1.len(), 1);
    let inner10 = outer1.get_list(0).unwrap().unwrap();
    assert_eq!(inner10.len(), 1);
    assert_eq!(inner10.get(0).unwrap().unwrap().as_i32().unwrap(), 4);

    assert!(!reader.has_next());
}
