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

//! Shared fixtures for the end-to-end scenario tests: a `SchemaElement`
//! builder and a single-page `PageReader` that replays one already-decoded
//! [`Page`], the same pattern the unit tests in `src/row/*` and
//! `src/column/reader.rs` use.

#![allow(dead_code)]

use parquet_core::column::page::{Page, PageReader};
use parquet_core::errors::Result;
use parquet_core::format::SchemaElement;

pub fn elem(name: &str, ty: Option<i32>, rep: Option<i32>, num_children: Option<i32>) -> SchemaElement {
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

pub fn elem_converted(
    name: &str,
    ty: Option<i32>,
    rep: Option<i32>,
    num_children: Option<i32>,
    converted_type: Option<i32>,
) -> SchemaElement {
    let mut e = elem(name, ty, rep, num_children);
    e.converted_type = converted_type;
    e
}

pub struct OnePage(Option<Page>);

impl OnePage {
    pub fn new(page: Page) -> Box<dyn PageReader> {
        Box::new(OnePage(Some(page)))
    }
}

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
