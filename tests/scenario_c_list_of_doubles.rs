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

//! `fare_components: LIST<DOUBLE>`, four rows `[[1.0,2.0],[],NULL,[3.0]]`:
//! a non-empty list, a present-but-empty list, a null list, and a
//! one-element list. The canonical 3-level shape is `fare_components`
//! (LIST, OPTIONAL) -> repeated `list` -> `element` (DOUBLE, REQUIRED), so
//! the only definition levels are "list absent" (0), "list present, no
//! items" (1), and "item present" (2).

mod common;

use common::{elem, elem_converted, OnePage};
use parquet_core::basic::{Encoding, Repetition};
use parquet_core::column::page::Page;
use parquet_core::row::reader::RowReader;
use parquet_core::schema::from_thrift::schema_from_thrift;
use parquet_core::schema::projection::ProjectedSchema;
use parquet_core::util::bit_util::num_required_bits;
use parquet_core::util::memory::ByteBufferPtr;
use parquet_core::util::test_common::{write_bit_packed_run, write_plain_f64};

fn schema() -> parquet_core::schema::types::SchemaDescriptor {
    let mut root = elem("schema", None, None, Some(1));
    root.num_children = Some(1);
    let mut list_group = elem_converted("fare_components", None, Some(Repetition::OPTIONAL as i32), Some(1), Some(3));
    list_group.num_children = Some(1);
    let mut repeated = elem("list", None, Some(Repetition::REPEATED as i32), Some(1));
    repeated.num_children = Some(1);
    let element = elem("element", Some(5), Some(Repetition::REQUIRED as i32), None);
    let elements = vec![root, list_group, repeated, element];
    schema_from_thrift(&elements).unwrap()
}

fn page() -> Box<dyn parquet_core::column::page::PageReader> {
    // Entries: r0 item0, r0 item1, r1 (empty placeholder), r2 (null
    // placeholder), r3 item0. rep/def per entry below; only def==2 entries
    // carry a real value.
    let rep: Vec<i16> = vec![0, 1, 0, 0, 0];
    let def: Vec<i16> = vec![2, 2, 1, 0, 2];
    let rep_bits = num_required_bits(1) as usize;
    let def_bits = num_required_bits(2) as usize;
    let rep_body = write_bit_packed_run(&rep.iter().map(|&v| v as u32).collect::<Vec<_>>(), rep_bits);
    let def_body = write_bit_packed_run(&def.iter().map(|&v| v as u32).collect::<Vec<_>>(), def_bits);
    let mut buf = rep_body.clone();
    buf.extend(def_body.clone());
    buf.extend(write_plain_f64(&[1.0, 2.0, 3.0]));
    OnePage::new(Page::DataPageV2 {
        buf: ByteBufferPtr::new(buf),
        num_values: 5,
        num_nulls: 2,
        num_rows: 4,
        encoding: Encoding::PLAIN,
        def_levels_byte_len: def_body.len() as u32,
        rep_levels_byte_len: rep_body.len() as u32,
    })
}

#[test]
fn nested_row_reader_resolves_list_elements_and_nullity() {
    let schema = schema();
    let projection = ProjectedSchema::all(&schema);
    let mut reader = RowReader::try_new(&schema, &projection, vec![page()], 10).unwrap();

    let row0 = reader.next().unwrap();
    let list0 = row0.get_list("fare_components").unwrap().unwrap();
    assert_eq!(list0.len(), 2);
    assert_eq!(list0.get(0).unwrap().unwrap().as_f64().unwrap(), 1.0);
    assert_eq!(list0.get(1).unwrap().unwrap().as_f64().unwrap(), 2.0);

    let row1 = reader.next().unwrap();
    let list1 = row1.get_list("fare_components").unwrap().unwrap();
    assert!(list1.is_empty());

    let row2 = reader.next().unwrap();
    assert!(row2.get_list("fare_components").unwrap().is_none());

    let row3 = reader.next().unwrap();
    let list3 = row3.get_list("fare_components").unwrap().unwrap();
    assert_eq!(list3.len(), 1);
    assert_eq!(list3.get(0).unwrap().unwrap().as_f64().unwrap(), 3.0);

    assert!(!reader.has_next());
}
