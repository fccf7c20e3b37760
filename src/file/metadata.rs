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

//! Domain metadata types built from the decoded Thrift `FileMetaData`:
//! per-row-group, per-column-chunk offsets/sizes/codec/encodings, and the
//! reconstructed schema tree. Keeps the Thrift wire shapes in `format`
//! entirely behind `footer::parse_metadata`.

use std::sync::Arc;

use crate::basic::{Compression, Encoding, Type};
use crate::corrupt_metadata_err;
use crate::errors::Result;
use crate::format;
use crate::schema::from_thrift::schema_from_thrift;
use crate::schema::types::SchemaDescPtr;

/// One column chunk's location and decode parameters within a row group.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    column_path: Vec<String>,
    physical_type: Type,
    encodings: Vec<Encoding>,
    codec: Compression,
    num_values: i64,
    total_uncompressed_size: i64,
    total_compressed_size: i64,
    data_page_offset: i64,
    dictionary_page_offset: Option<i64>,
    file_path: Option<String>,
}

impl ColumnChunkMetaData {
    fn from_thrift(path: Vec<String>, physical_type: Type, file_path: Option<String>, c: format::ColumnMetaData) -> Result<Self> {
        let mut encodings = Vec::with_capacity(c.encodings.len());
        for e in &c.encodings {
            encodings.push(crate::basic::encoding_from_thrift(*e)?);
        }
        Ok(ColumnChunkMetaData {
            column_path: path,
            physical_type,
            encodings,
            codec: crate::basic::codec_from_thrift(c.codec)?,
            num_values: c.num_values,
            total_uncompressed_size: c.total_uncompressed_size,
            total_compressed_size: c.total_compressed_size,
            data_page_offset: c.data_page_offset,
            dictionary_page_offset: c.dictionary_page_offset,
            file_path,
        })
    }

    pub fn column_path(&self) -> &[String] {
        &self.column_path
    }

    pub fn physical_type(&self) -> Type {
        self.physical_type
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    pub fn compression(&self) -> Compression {
        self.codec
    }

    pub fn num_values(&self) -> i64 {
        self.num_values
    }

    pub fn total_uncompressed_size(&self) -> i64 {
        self.total_uncompressed_size
    }

    pub fn total_compressed_size(&self) -> i64 {
        self.total_compressed_size
    }

    /// Byte offset of the first page (dictionary page if present, else the
    /// first data page) within the file.
    pub fn starting_offset(&self) -> i64 {
        self.dictionary_page_offset.unwrap_or(self.data_page_offset)
    }

    pub fn data_page_offset(&self) -> i64 {
        self.data_page_offset
    }

    pub fn dictionary_page_offset(&self) -> Option<i64> {
        self.dictionary_page_offset
    }

    pub fn has_dictionary_page(&self) -> bool {
        self.dictionary_page_offset.is_some()
    }

    /// A column chunk stored in an external file, used by a handful of
    /// writer tools; this crate has no code path that produces one but
    /// surfaces it so callers can detect and reject it.
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }
}

/// One row group: its column chunks plus row/byte counts.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    columns: Vec<ColumnChunkMetaData>,
    num_rows: i64,
    total_byte_size: i64,
    schema_descr: SchemaDescPtr,
}

impl RowGroupMetaData {
    fn from_thrift(schema_descr: SchemaDescPtr, rg: format::RowGroup) -> Result<Self> {
        if rg.columns.len() != schema_descr.num_columns() {
            return Err(corrupt_metadata_err!(
                "row group has {} columns, schema has {}",
                rg.columns.len(),
                schema_descr.num_columns()
            ));
        }
        let mut columns = Vec::with_capacity(rg.columns.len());
        for (i, col) in rg.columns.into_iter().enumerate() {
            let descr = schema_descr.column(i);
            let meta = col
                .meta_data
                .ok_or_else(|| corrupt_metadata_err!("column chunk {} missing meta_data", i))?;
            columns.push(ColumnChunkMetaData::from_thrift(
                descr.path.clone(),
                descr.physical_type(),
                col.file_path,
                meta,
            )?);
        }
        Ok(RowGroupMetaData {
            columns,
            num_rows: rg.num_rows,
            total_byte_size: rg.total_byte_size,
            schema_descr,
        })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
        &self.columns[i]
    }

    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    pub fn total_byte_size(&self) -> i64 {
        self.total_byte_size
    }

    pub fn schema_descr(&self) -> &SchemaDescPtr {
        &self.schema_descr
    }
}

/// File-level metadata: format version, total row count, writer identity,
/// and the reconstructed schema.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    version: i32,
    num_rows: i64,
    created_by: Option<String>,
    schema_descr: SchemaDescPtr,
}

impl FileMetaData {
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn schema_descr(&self) -> &SchemaDescPtr {
        &self.schema_descr
    }
}

/// Top-level metadata for a parsed file: file metadata plus every row
/// group's metadata, as returned by [`crate::file::footer::parse_metadata`].
#[derive(Debug, Clone)]
pub struct ParquetMetaData {
    file_metadata: FileMetaData,
    row_groups: Vec<RowGroupMetaData>,
}

impl ParquetMetaData {
    pub(crate) fn from_thrift(t: format::FileMetaData) -> Result<Self> {
        let schema_descr: SchemaDescPtr = Arc::new(schema_from_thrift(&t.schema)?);
        let mut row_groups = Vec::with_capacity(t.row_groups.len());
        for rg in t.row_groups {
            row_groups.push(RowGroupMetaData::from_thrift(schema_descr.clone(), rg)?);
        }
        let file_metadata = FileMetaData {
            version: t.version,
            num_rows: t.num_rows,
            created_by: t.created_by,
            schema_descr,
        };
        Ok(ParquetMetaData { file_metadata, row_groups })
    }

    pub fn file_metadata(&self) -> &FileMetaData {
        &self.file_metadata
    }

    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    pub fn row_group(&self, i: usize) -> &RowGroupMetaData {
        &self.row_groups[i]
    }

    pub fn row_groups(&self) -> &[RowGroupMetaData] {
        &self.row_groups
    }
}
