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

//! Opens and caches the files of a multi-file read, keeping exactly one
//! load in flight per file index and prefetching file `N+1` while file `N`
//! is being served. A file's load is the pipeline `open -> read footer ->
//! check schema compatibility`; the per-column page scan that follows runs
//! on the decode pool, one task per projected column, per spec's "scan
//! pages ... in parallel".

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::column::page::{Page, PageReader, SerializedPageReader};
use crate::errors::{ParquetError, Result};
use crate::file::footer;
use crate::file::metadata::ParquetMetaData;
use crate::file::reader::{ChunkReader, Length};
use crate::general_err;
use crate::schema::projection::ProjectedSchema;
use crate::schema::types::SchemaDescPtr;
use crate::scheduling::pool::Pools;
use crate::util::memory::ByteBufferPtr;

/// Opens one indexed file out of a list; the only collaborator this module
/// needs from the byte-source layer. `Vec<PathBuf>` is provided as the
/// on-disk implementation; any other ordered file list can implement it.
pub trait FileSource: Send + Sync {
    fn num_files(&self) -> usize;
    fn open(&self, index: usize) -> Result<Arc<dyn ChunkReader + Send + Sync>>;
}

impl FileSource for Vec<PathBuf> {
    fn num_files(&self) -> usize {
        self.len()
    }

    fn open(&self, index: usize) -> Result<Arc<dyn ChunkReader + Send + Sync>> {
        let file = std::fs::File::open(&self[index])?;
        Ok(Arc::new(file))
    }
}

/// Adapts a `FileSource`-returned trait object back into the concrete,
/// `Sized` type `footer::parse_metadata` is generic over.
struct DynChunkReader(Arc<dyn ChunkReader + Send + Sync>);

impl Length for DynChunkReader {
    fn len(&self) -> u64 {
        self.0.len()
    }
}

impl ChunkReader for DynChunkReader {
    fn get_bytes(&self, start: u64, length: usize) -> Result<ByteBufferPtr> {
        self.0.get_bytes(start, length)
    }
}

/// Concatenates the page streams of every row group's chunk for one column
/// into a single stream, so one `ColumnReader` can consume a whole file's
/// worth of one column regardless of row group count.
struct ChainedPageReader {
    inner: VecDeque<Box<dyn PageReader>>,
}

impl Iterator for ChainedPageReader {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_page().transpose()
    }
}

impl PageReader for ChainedPageReader {
    fn get_next_page(&mut self) -> Result<Option<Page>> {
        while let Some(front) = self.inner.front_mut() {
            if let Some(page) = front.get_next_page()? {
                return Ok(Some(page));
            }
            self.inner.pop_front();
        }
        Ok(None)
    }
}

/// One opened, metadata-parsed file. Cheap to share (`Arc`) across the
/// per-column page-scan tasks spawned for it.
pub struct LoadedFile {
    pub metadata: ParquetMetaData,
    reader: Arc<dyn ChunkReader + Send + Sync>,
}

impl LoadedFile {
    fn page_reader_for(&self, column_index: usize) -> Result<Box<dyn PageReader>> {
        let mut chunks = VecDeque::with_capacity(self.metadata.num_row_groups());
        for rg_idx in 0..self.metadata.num_row_groups() {
            let col = self.metadata.row_group(rg_idx).column(column_index);
            let start = col.starting_offset() as u64;
            let len = col.total_compressed_size() as usize;
            let buf = self.reader.get_bytes(start, len)?;
            let page_reader = SerializedPageReader::new(
                buf,
                col.num_values(),
                col.compression(),
                col.physical_type(),
                col.has_dictionary_page(),
            )?;
            chunks.push_back(Box::new(page_reader) as Box<dyn PageReader>);
        }
        Ok(Box::new(ChainedPageReader { inner: chunks }))
    }
}

fn check_schema_compatible(reference: &SchemaDescPtr, candidate: &SchemaDescPtr) -> Result<()> {
    for col in reference.columns() {
        let path = col.path.join(".");
        match candidate.column_by_path(&path) {
            Some(found) if found.physical_type() == col.physical_type() => {}
            Some(found) => {
                return Err(ParquetError::SchemaIncompatible(format!(
                    "column `{}` has physical type {:?} in this file, expected {:?}",
                    path,
                    found.physical_type(),
                    col.physical_type()
                )));
            }
            None => {
                return Err(ParquetError::SchemaIncompatible(format!("column `{}` missing from this file", path)));
            }
        }
    }
    Ok(())
}

/// Manages the set of files in a multi-file read: opening, schema
/// compatibility, and cross-file prefetch. One load future per file index,
/// idempotently upserted via [`tokio::sync::OnceCell`].
pub struct FileManager<S: FileSource + 'static> {
    source: Arc<S>,
    pools: Arc<Pools>,
    slots: Mutex<HashMap<usize, Arc<OnceCell<Arc<LoadedFile>>>>>,
    reference_schema: OnceCell<SchemaDescPtr>,
}

impl<S: FileSource + 'static> FileManager<S> {
    pub fn new(source: S, pools: Arc<Pools>) -> Self {
        FileManager {
            source: Arc::new(source),
            pools,
            slots: Mutex::new(HashMap::new()),
            reference_schema: OnceCell::new(),
        }
    }

    /// Maps file 0, parses its metadata, and fixes it as the reference
    /// schema every later file is checked against.
    pub async fn open_first(&self) -> Result<SchemaDescPtr> {
        let file = self.load_file(0).await?;
        let schema = file.metadata.file_metadata().schema_descr().clone();
        let _ = self.reference_schema.set(schema.clone());
        Ok(schema)
    }

    /// Scans pages for every projected column of file 0 and, if more files
    /// are queued, starts prefetching file 1.
    pub async fn initialize(&self, projection: &ProjectedSchema) -> Result<Vec<Box<dyn PageReader>>> {
        let file = self.load_file(0).await?;
        let pages = self.scan_projected(&file, projection).await?;
        if self.source.num_files() > 1 {
            self.spawn_prefetch(1);
        }
        Ok(pages)
    }

    /// Idempotently ensures file `index` is loading (or loaded), blocking
    /// on the result.
    pub async fn ensure_file_loading(&self, index: usize) -> Result<Arc<LoadedFile>> {
        self.load_file(index).await
    }

    /// Waits for file `index`'s load, then scans pages for every projected
    /// column; also ensures file `index + 1` is loading.
    pub async fn get_pages(&self, index: usize, projection: &ProjectedSchema) -> Result<Vec<Box<dyn PageReader>>> {
        let file = self.load_file(index).await?;
        if index + 1 < self.source.num_files() {
            self.spawn_prefetch(index + 1);
        }
        self.scan_projected(&file, projection).await
    }

    /// Drops every in-flight/loaded file slot. Outstanding tasks already
    /// holding an `Arc<LoadedFile>` run to completion but touch no shared
    /// state afterward; the mapping itself is freed once every holder
    /// (slot, in-flight page scan) drops its reference.
    pub fn close(&self) {
        self.slots.lock().unwrap().clear();
    }

    fn slot_for(&self, index: usize) -> Arc<OnceCell<Arc<LoadedFile>>> {
        self.slots.lock().unwrap().entry(index).or_insert_with(|| Arc::new(OnceCell::new())).clone()
    }

    fn spawn_prefetch(&self, index: usize) {
        let slot = self.slot_for(index);
        if slot.initialized() {
            return;
        }
        let source = self.source.clone();
        let reference = self.reference_schema.get().cloned();
        tracing::debug!(file_index = index, "enqueuing prefetch");
        self.pools.decode_handle().spawn(async move {
            let _ = slot.get_or_try_init(|| Self::do_load(source, reference, index)).await;
        });
    }

    async fn load_file(&self, index: usize) -> Result<Arc<LoadedFile>> {
        let slot = self.slot_for(index);
        let source = self.source.clone();
        let reference = self.reference_schema.get().cloned();
        let loaded = slot.get_or_try_init(|| Self::do_load(source, reference, index)).await?;
        Ok(loaded.clone())
    }

    async fn do_load(source: Arc<S>, reference: Option<SchemaDescPtr>, index: usize) -> Result<Arc<LoadedFile>> {
        tracing::debug!(file_index = index, "loading file");
        let reader = source.open(index)?;
        let metadata = footer::parse_metadata(&DynChunkReader(reader.clone()))?;
        if let Some(reference) = reference {
            check_schema_compatible(&reference, metadata.file_metadata().schema_descr())?;
        }
        Ok(Arc::new(LoadedFile { metadata, reader }))
    }

    async fn scan_projected(&self, file: &Arc<LoadedFile>, projection: &ProjectedSchema) -> Result<Vec<Box<dyn PageReader>>> {
        let decode = self.pools.decode_handle().clone();
        let mut tasks = Vec::with_capacity(projection.len());
        for pc in projection.columns() {
            let file = file.clone();
            let column_index = pc.source_column_index;
            tasks.push(decode.spawn_blocking(move || file.page_reader_for(column_index)));
        }
        let mut out = Vec::with_capacity(tasks.len());
        for t in tasks {
            let reader = t.await.map_err(|e| general_err!("page scan task panicked: {}", e))??;
            out.push(reader);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::footer::PARQUET_MAGIC;
    use crate::file::properties::ReaderProperties;

    impl FileSource for Vec<Vec<u8>> {
        fn num_files(&self) -> usize {
            self.len()
        }

        fn open(&self, index: usize) -> Result<Arc<dyn ChunkReader + Send + Sync>> {
            Ok(Arc::new(self[index].clone()))
        }
    }

    // Mirrors `file::footer`'s test fixture builder: one required leaf
    // column `a` of the given physical type, one row group of 1 row.
    struct StructWriter {
        buf: Vec<u8>,
        last_field_id: i16,
    }

    impl StructWriter {
        fn new() -> Self {
            StructWriter { buf: Vec::new(), last_field_id: 0 }
        }

        fn varint(mut v: u64) -> Vec<u8> {
            let mut out = Vec::new();
            loop {
                let mut byte = (v & 0x7F) as u8;
                v >>= 7;
                if v != 0 {
                    byte |= 0x80;
                }
                out.push(byte);
                if v == 0 {
                    break;
                }
            }
            out
        }

        fn zigzag(v: i64) -> u64 {
            ((v << 1) ^ (v >> 63)) as u64
        }

        fn field_header(&mut self, id: i16, type_code: u8) {
            let delta = id - self.last_field_id;
            self.last_field_id = id;
            self.buf.push(((delta as u8) << 4) | type_code);
        }

        fn i32_field(&mut self, id: i16, v: i32) {
            self.field_header(id, 0x05);
            self.buf.extend(Self::varint(Self::zigzag(v as i64)));
        }

        fn i64_field(&mut self, id: i16, v: i64) {
            self.field_header(id, 0x06);
            self.buf.extend(Self::varint(Self::zigzag(v)));
        }

        fn string_field(&mut self, id: i16, s: &str) {
            self.field_header(id, 0x08);
            self.buf.extend(Self::varint(s.len() as u64));
            self.buf.extend_from_slice(s.as_bytes());
        }

        fn list_field_header(&mut self, id: i16, len: usize, elem_type_code: u8) {
            self.field_header(id, 0x09);
            self.buf.push(((len as u8) << 4) | elem_type_code);
        }

        fn i32_list_elem(&mut self, v: i32) {
            self.buf.extend(Self::varint(Self::zigzag(v as i64)));
        }

        fn string_list_elem(&mut self, s: &str) {
            self.buf.extend(Self::varint(s.len() as u64));
            self.buf.extend_from_slice(s.as_bytes());
        }

        fn nested(&mut self, id: i16, inner: StructWriter) {
            self.field_header(id, 0x0C);
            self.buf.extend(inner.finish());
        }

        fn finish(mut self) -> Vec<u8> {
            self.buf.push(0x00);
            self.buf
        }
    }

    fn build_one_column_file(physical_type: i32) -> Vec<u8> {
        let mut root = StructWriter::new();
        root.i32_field(1, 1); // version

        root.list_field_header(2, 2, 0x0C); // schema: 2 struct elements
        let mut message_elem = StructWriter::new();
        message_elem.string_field(4, "schema");
        message_elem.i32_field(5, 1); // num_children
        root.buf.extend(message_elem.finish());

        let mut a_elem = StructWriter::new();
        a_elem.i32_field(1, physical_type);
        a_elem.i32_field(3, 0); // repetition = REQUIRED
        a_elem.string_field(4, "a");
        root.buf.extend(a_elem.finish());

        root.i64_field(3, 1); // num_rows

        root.list_field_header(4, 1, 0x0C); // row_groups: 1 struct element
        let mut row_group = StructWriter::new();

        row_group.list_field_header(1, 1, 0x0C); // columns: 1 struct element
        let mut column_chunk = StructWriter::new();
        column_chunk.i64_field(2, 0); // file_offset
        let mut column_meta = StructWriter::new();
        column_meta.i32_field(1, physical_type);
        column_meta.list_field_header(2, 1, 0x05); // encodings: [PLAIN]
        column_meta.i32_list_elem(0);
        column_meta.list_field_header(3, 1, 0x08); // path_in_schema: ["a"]
        column_meta.string_list_elem("a");
        column_meta.i32_field(4, 0); // codec = UNCOMPRESSED
        column_meta.i64_field(5, 1); // num_values
        column_meta.i64_field(6, 8); // total_uncompressed_size
        column_meta.i64_field(7, 8); // total_compressed_size
        column_meta.i64_field(9, 4); // data_page_offset
        column_chunk.nested(3, column_meta);
        row_group.buf.extend(column_chunk.finish());

        row_group.i64_field(2, 8); // total_byte_size
        row_group.i64_field(3, 1); // num_rows
        root.buf.extend(row_group.finish());

        let footer_bytes = root.finish();
        let mut file_bytes = Vec::new();
        file_bytes.extend_from_slice(&PARQUET_MAGIC);
        file_bytes.extend_from_slice(&footer_bytes);
        file_bytes.extend_from_slice(&(footer_bytes.len() as i32).to_le_bytes());
        file_bytes.extend_from_slice(&PARQUET_MAGIC);
        file_bytes
    }

    #[test]
    fn test_open_first_parses_reference_schema() {
        let pools = Pools::new(&ReaderProperties::default()).unwrap();
        let manager = FileManager::new(vec![build_one_column_file(1)], pools.clone());
        let schema = pools.decode_handle().block_on(manager.open_first()).unwrap();
        assert_eq!(schema.num_columns(), 1);
    }

    #[test]
    fn test_incompatible_second_file_rejected() {
        let pools = Pools::new(&ReaderProperties::default()).unwrap();
        let manager = FileManager::new(vec![build_one_column_file(1), build_one_column_file(2)], pools.clone());
        let err = pools
            .decode_handle()
            .block_on(async {
                manager.open_first().await.unwrap();
                manager.ensure_file_loading(1).await
            })
            .unwrap_err();
        assert!(matches!(err, ParquetError::SchemaIncompatible(_)));
    }

    #[test]
    fn test_initialize_scans_pages_and_prefetches_next_file() {
        let pools = Pools::new(&ReaderProperties::default()).unwrap();
        let manager = FileManager::new(vec![build_one_column_file(1), build_one_column_file(1)], pools.clone());
        pools.decode_handle().block_on(async {
            let schema = manager.open_first().await.unwrap();
            let projection = ProjectedSchema::all(&schema);
            let pages = manager.initialize(&projection).await.unwrap();
            assert_eq!(pages.len(), 1);
            // Give the background prefetch a chance to land, then confirm
            // file 1 is already available without a fresh load.
            tokio::task::yield_now().await;
            let _ = manager.get_pages(1, &projection).await.unwrap();
        });
    }
}
