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

//! Row-oriented assembly on top of `column::reader`: a type-erased `Value`
//! (`value`), the projected schema shaped for row access (`field_desc`),
//! the per-batch join of every projected column's decode state
//! (`batch_index`), flyweight nested cursors over it (`cursor`), and the
//! public `RowReader` that picks flat or nested representation at
//! construction (`reader`).

pub mod batch_index;
pub mod cursor;
pub mod field_desc;
pub mod reader;
pub mod value;

pub use batch_index::BatchIndex;
pub use cursor::{ListCursor, MapCursor, StructCursor};
pub use field_desc::FieldDesc;
pub use reader::{FlatRow, RowReader, RowView};
pub use value::Value;
