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

//! The reader traits (`FileReader`, `RowGroupReader`) and their in-memory
//! implementation (`SerializedFileReader`, `SerializedRowGroupReader`). The
//! byte source abstraction (`Length`/`ChunkReader`) stands in for spec
//! §6's `ByteSource`: any random-access `[offset, length)` reader works,
//! memory-mapping being the expected but not required implementation.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use crate::column::page::{PageReader, SerializedPageReader};
use crate::column::reader::ColumnReader;
use crate::errors::Result;
use crate::file::footer;
use crate::file::metadata::{ParquetMetaData, RowGroupMetaData};
use crate::util::memory::ByteBufferPtr;

/// Total byte length of a random-access source.
pub trait Length {
    fn len(&self) -> u64;
}

/// Random-access byte source: the abstraction `footer::parse_metadata` and
/// the page readers read through. Implemented for in-memory buffers and
/// `std::fs::File`; a caller wanting memory-mapped I/O implements it over
/// their own mapping type.
pub trait ChunkReader: Length {
    fn get_bytes(&self, start: u64, length: usize) -> Result<ByteBufferPtr>;
}

impl Length for Vec<u8> {
    fn len(&self) -> u64 {
        self.len() as u64
    }
}

impl ChunkReader for Vec<u8> {
    fn get_bytes(&self, start: u64, length: usize) -> Result<ByteBufferPtr> {
        let start = start as usize;
        let end = start
            .checked_add(length)
            .filter(|&e| e <= <[u8]>::len(self))
            .ok_or_else(|| crate::eof_err!("requested [{}, {}+{}) past end of buffer", start, start, length))?;
        Ok(ByteBufferPtr::new(self[start..end].to_vec()))
    }
}

impl Length for File {
    fn len(&self) -> u64 {
        self.metadata().map(|m| m.len()).unwrap_or(0)
    }
}

impl ChunkReader for File {
    fn get_bytes(&self, start: u64, length: usize) -> Result<ByteBufferPtr> {
        let mut file = self.try_clone()?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; length];
        file.read_exact(&mut buf)?;
        Ok(ByteBufferPtr::new(buf))
    }
}

/// Top-level handle onto a parsed Parquet file: its metadata and access to
/// each row group's column data.
pub trait FileReader {
    fn metadata(&self) -> &ParquetMetaData;

    fn num_row_groups(&self) -> usize;

    fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>>;
}

/// Access to one row group's column chunks.
pub trait RowGroupReader {
    fn metadata(&self) -> &RowGroupMetaData;

    fn num_columns(&self) -> usize;

    fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>>;

    /// Convenience wrapper building a [`ColumnReader`] directly over column
    /// `i`'s page stream.
    fn get_column_reader(&self, i: usize, batch_size: usize) -> Result<ColumnReader> {
        let page_reader = self.get_column_page_reader(i)?;
        let descr = self.metadata().schema_descr().column(i).clone();
        ColumnReader::try_new(descr, page_reader, batch_size)
    }
}

/// A [`FileReader`] over any [`ChunkReader`] byte source, parsing the
/// footer once at construction and building a fresh [`SerializedPageReader`]
/// per column chunk on demand.
pub struct SerializedFileReader<R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: ParquetMetaData,
}

impl<R: ChunkReader> SerializedFileReader<R> {
    pub fn new(chunk_reader: R) -> Result<Self> {
        let metadata = footer::parse_metadata(&chunk_reader)?;
        Ok(SerializedFileReader { chunk_reader: Arc::new(chunk_reader), metadata })
    }
}

impl<R: ChunkReader> FileReader for SerializedFileReader<R> {
    fn metadata(&self) -> &ParquetMetaData {
        &self.metadata
    }

    fn num_row_groups(&self) -> usize {
        self.metadata.num_row_groups()
    }

    fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
        let row_group_metadata = self.metadata.row_group(i).clone();
        Ok(Box::new(SerializedRowGroupReader { chunk_reader: self.chunk_reader.clone(), row_group_metadata }))
    }
}

/// A [`RowGroupReader`] that slices column chunk byte ranges out of its
/// file's [`ChunkReader`] on demand.
pub struct SerializedRowGroupReader<R: ChunkReader> {
    chunk_reader: Arc<R>,
    row_group_metadata: RowGroupMetaData,
}

impl<R: ChunkReader> RowGroupReader for SerializedRowGroupReader<R> {
    fn metadata(&self) -> &RowGroupMetaData {
        &self.row_group_metadata
    }

    fn num_columns(&self) -> usize {
        self.row_group_metadata.num_columns()
    }

    fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>> {
        let col = self.row_group_metadata.column(i);
        let start = col.starting_offset() as u64;
        let len = col.total_compressed_size() as usize;
        let buf = self.chunk_reader.get_bytes(start, len)?;
        Ok(Box::new(SerializedPageReader::new(
            buf,
            col.num_values(),
            col.compression(),
            col.physical_type(),
            col.has_dictionary_page(),
        )?))
    }
}
