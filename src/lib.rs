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

//! A columnar decode and row-assembly engine for the Apache Parquet file
//! format: Thrift Compact Protocol decoding of file metadata, per-encoding
//! value decoders, page iteration, a batch-oriented `ColumnReader`, and a
//! flyweight `RowReader` over nested schemas.
//!
//! Module map:
//! - [`thrift`]: the Thrift Compact Protocol reader metadata decoding is
//!   built on.
//! - [`format`]: the Thrift struct definitions for `FileMetaData`,
//!   `PageHeader`, and friends.
//! - [`basic`]: the small enums (`Type`, `Repetition`, `Encoding`,
//!   `Compression`, `PageType`) shared across the rest of the crate.
//! - [`schema`]: the schema tree, its Dremel coordinates, and logical-type
//!   annotations.
//! - [`data_type`]: the physical-type marker traits tying a `Type` tag to a
//!   Rust value representation.
//! - [`compression`]: the `Codec` trait and per-codec implementations.
//! - [`encodings`]: per-`Encoding` value decoders and level decoding.
//! - [`levels`]: the Dremel Nested-Level Computer.
//! - [`column`]: page iteration and the batch-oriented `ColumnReader`.
//! - [`file`]: footer/metadata parsing and the whole-file reader.
//! - [`row`]: the flyweight `RowReader` over nested schemas.
//! - [`scheduling`]: the two-pool concurrency fabric for multi-file reads.

pub mod basic;
pub mod column;
pub mod compression;
pub mod data_type;
pub mod encodings;
pub mod errors;
pub mod file;
pub mod format;
pub mod levels;
pub mod row;
pub mod scheduling;
pub mod schema;
pub mod thrift;
pub mod util;

pub use errors::{ParquetError, Result};
